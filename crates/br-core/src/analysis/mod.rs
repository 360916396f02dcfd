//! Analysis domain: scored images and the reports analysts produce.

mod model;

pub use model::{
    AnalysisResult, AnalystReport, AnalystType, NewAnalysis, ScoreDetail, TaggedReport,
};

use rand::Rng;

/// Lower bound (inclusive) of the cosmetic percentile shown next to a score.
pub const PERCENTILE_MIN: i32 = 80;
/// Upper bound (exclusive) of the cosmetic percentile.
pub const PERCENTILE_MAX: i32 = 100;

/// Synthesize the display-only percentile for a new analysis.
///
/// The figure is decorative and carries no relation to other users' scores.
pub fn synthesize_percentile<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(PERCENTILE_MIN..PERCENTILE_MAX)
}
