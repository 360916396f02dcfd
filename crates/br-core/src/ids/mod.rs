//! ID type wrappers for type safety.

mod id_macro;

use serde::{Deserialize, Serialize};

use id_macro::impl_int_id;

/// Identifier of a persisted analysis record. Only the repository mints these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(i64);

/// Identifier of the authenticated owner, supplied by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl_int_id!(AnalysisId, UserId);
