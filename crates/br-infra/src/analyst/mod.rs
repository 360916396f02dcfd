//! Scoring backends.

mod mock_analyst;
mod vision_analyst;

pub use mock_analyst::MockAnalyst;
pub use vision_analyst::{mime_for, VisionAnalyst, VisionAnalystConfig};
