//! Helpers shared by several use cases.

pub mod image_url;

pub use image_url::{ApiRoute, ImageUrlResolver, PRESIGN_TTL};
