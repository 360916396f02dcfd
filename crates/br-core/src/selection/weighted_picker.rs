use rand::{Rng, RngCore};

/// Weighted random selection without replacement inside a round.
///
/// Candidates are identified by position in the weight list. Each `pick`
/// consumes the chosen slot's whole weight, so within one round every
/// positive-weight index is returned exactly once. A round ends when the
/// remaining total reaches zero; `reset` starts the next one.
///
/// The random source is owned by the picker and injected at construction,
/// which keeps draw sequences reproducible in tests.
pub struct WeightedPicker<R> {
    weights: Vec<u32>,
    remaining: Vec<u32>,
    remaining_total: u64,
    rng: R,
}

impl<R: RngCore> WeightedPicker<R> {
    pub fn new(weights: Vec<u32>, rng: R) -> Self {
        let remaining_total = weights.iter().map(|w| u64::from(*w)).sum();
        Self {
            remaining: weights.clone(),
            weights,
            remaining_total,
            rng,
        }
    }

    /// Draw one index, or `None` once the round is exhausted.
    pub fn pick(&mut self) -> Option<usize> {
        if self.remaining_total == 0 {
            return None;
        }

        let mut draw = self.rng.gen_range(0..self.remaining_total);
        for (index, weight) in self.remaining.iter_mut().enumerate() {
            let slot = u64::from(*weight);
            if draw < slot {
                self.remaining_total -= slot;
                *weight = 0;
                return Some(index);
            }
            draw -= slot;
        }

        // remaining_total always equals the sum of remaining weights
        None
    }

    /// Restore every slot to its configured weight.
    pub fn reset(&mut self) {
        self.remaining.copy_from_slice(&self.weights);
        self.remaining_total = self.weights.iter().map(|w| u64::from(*w)).sum();
    }

    pub fn remaining_total(&self) -> u64 {
        self.remaining_total
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_total == 0
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[u32] {
        &self.weights
    }
}

impl<R> std::fmt::Debug for WeightedPicker<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedPicker")
            .field("weights", &self.weights)
            .field("remaining", &self.remaining)
            .field("remaining_total", &self.remaining_total)
            .finish()
    }
}
