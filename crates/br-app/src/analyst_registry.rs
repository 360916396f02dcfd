//! Weighted routing of analysis requests to scoring backends.

use std::sync::Arc;

use rand::RngCore;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use br_core::analysis::TaggedReport;
use br_core::ports::{AnalystError, AnalystPort};
use br_core::selection::WeightedPicker;
use br_core::storage::ObjectKey;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("analyst registry has no backends")]
    Empty,

    /// Every weight is zero, so no backend can ever be chosen.
    #[error("no analyst has a positive weight")]
    NoEligibleAnalyst,

    #[error(transparent)]
    Analyst(#[from] AnalystError),
}

type BoxedRng = Box<dyn RngCore + Send>;

/// Ordered set of analysts with selection weights.
///
/// Each round of selection hands out every positive-weight analyst exactly
/// once, in weighted-random order. The picker is reset as soon as a round
/// completes.
pub struct AnalystRegistry {
    analysts: Vec<Arc<dyn AnalystPort>>,
    picker: Mutex<WeightedPicker<BoxedRng>>,
}

impl AnalystRegistry {
    pub fn new(
        entries: Vec<(Arc<dyn AnalystPort>, u32)>,
        rng: impl RngCore + Send + 'static,
    ) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }

        let (analysts, weights): (Vec<_>, Vec<_>) = entries.into_iter().unzip();

        info!(
            analysts = ?analysts.iter().map(|a| a.name()).collect::<Vec<_>>(),
            weights = ?weights,
            "analyst registry configured"
        );

        let rng: BoxedRng = Box::new(rng);
        Ok(Self {
            analysts,
            picker: Mutex::new(WeightedPicker::new(weights, rng)),
        })
    }

    pub fn len(&self) -> usize {
        self.analysts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analysts.is_empty()
    }

    /// Choose a backend and run it on `image`.
    ///
    /// The backend's own failure is returned as is; there is no fallback to
    /// another analyst.
    #[tracing::instrument(
        name = "analyst_registry.select_and_analyze",
        skip(self, image),
        fields(image_ref = %image_ref, image_len = image.len())
    )]
    pub async fn select_and_analyze(
        &self,
        image: &[u8],
        image_ref: &ObjectKey,
    ) -> Result<TaggedReport, RegistryError> {
        let index = self.next_index().await?;
        let analyst = &self.analysts[index];

        debug!(analyst = analyst.name(), index, "analyst selected");

        let report = analyst.analyze(image, image_ref).await?;

        Ok(TaggedReport {
            analyst_type: analyst.analyst_type(),
            analyst_name: analyst.name().to_string(),
            report,
        })
    }

    async fn next_index(&self) -> Result<usize, RegistryError> {
        let mut picker = self.picker.lock().await;

        let index = match picker.pick() {
            Some(index) => index,
            None => {
                picker.reset();
                picker.pick().ok_or(RegistryError::NoEligibleAnalyst)?
            }
        };

        if picker.is_exhausted() {
            picker.reset();
        }

        Ok(index)
    }
}
