use std::sync::Mutex;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use br_core::analysis::{AnalystReport, AnalystType, ScoreDetail};
use br_core::ports::{AnalystError, AnalystPort};
use br_core::storage::ObjectKey;

const DESCRIPTIONS: &[&str] = &[
    "Balanced features and a relaxed expression give the portrait a natural warmth.",
    "Clear skin tone and soft light make the face look bright and fresh.",
    "Striking eyes and a confident gaze draw immediate attention.",
    "Gentle contours and a calm smile create an approachable, elegant look.",
    "Well-defined features with harmonious proportions, photogenic from this angle.",
    "A lively expression and good framing give the photo plenty of charm.",
];

const TAG_POOL: &[&str] = &[
    "radiant",
    "elegant",
    "gentle",
    "confident",
    "fresh",
    "charming",
    "natural",
    "graceful",
    "bright-eyed",
    "warm",
    "stylish",
    "serene",
];

struct LabelNotes {
    label: &'static str,
    notes: &'static [&'static str],
}

const SCORE_LABELS: &[LabelNotes] = &[
    LabelNotes {
        label: "Facial proportion",
        notes: &[
            "Proportions follow the classic thirds closely.",
            "Features are evenly spaced and symmetrical.",
            "Well balanced between forehead, nose and chin.",
        ],
    },
    LabelNotes {
        label: "Skin",
        notes: &[
            "Even tone with a healthy glow.",
            "Smooth texture, very little blemish.",
            "Clear complexion that catches the light well.",
        ],
    },
    LabelNotes {
        label: "Eyes",
        notes: &[
            "Bright, expressive eyes.",
            "Clear gaze with good depth.",
            "Eye shape fits the face nicely.",
        ],
    },
    LabelNotes {
        label: "Expression",
        notes: &[
            "Relaxed and natural.",
            "A warm smile that reads as genuine.",
            "Calm and composed.",
        ],
    },
    LabelNotes {
        label: "Photo quality",
        notes: &[
            "Soft, flattering light.",
            "Good framing and focus.",
            "Clean background keeps attention on the face.",
        ],
    },
];

const SCORE_RANGE: std::ops::RangeInclusive<i32> = 85..=99;
const DETAIL_SCORE_RANGE: std::ops::RangeInclusive<i32> = 85..=98;
const TAG_COUNT_RANGE: std::ops::RangeInclusive<usize> = 3..=6;

/// Offline analyst producing plausible, flattering reports at random.
pub struct MockAnalyst {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl MockAnalyst {
    pub const NAME: &'static str = "mock";

    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    fn generate(&self) -> AnalystReport {
        let mut guard = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        let rng = &mut *guard;

        let mut tags: Vec<&str> = TAG_POOL.to_vec();
        tags.shuffle(rng);
        tags.truncate(rng.gen_range(TAG_COUNT_RANGE));

        let details = SCORE_LABELS
            .iter()
            .map(|item| ScoreDetail {
                label: item.label.to_string(),
                score: rng.gen_range(DETAIL_SCORE_RANGE),
                note: item.notes.choose(rng).copied().unwrap_or_default().to_string(),
            })
            .collect();

        AnalystReport {
            score: rng.gen_range(SCORE_RANGE),
            description: DESCRIPTIONS.choose(rng).copied().unwrap_or_default().to_string(),
            tags: tags.into_iter().map(str::to_string).collect(),
            details,
        }
    }
}

#[async_trait]
impl AnalystPort for MockAnalyst {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn analyst_type(&self) -> AnalystType {
        AnalystType::Mock
    }

    async fn analyze(&self, _image: &[u8], _image_ref: &ObjectKey) -> Result<AnalystReport, AnalystError> {
        Ok(self.generate())
    }
}
