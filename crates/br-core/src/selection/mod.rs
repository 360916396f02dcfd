//! Weighted selection of analysis backends.

mod weighted_picker;

pub use weighted_picker::WeightedPicker;
