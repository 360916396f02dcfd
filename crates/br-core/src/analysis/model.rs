use serde::{Deserialize, Serialize};

use crate::ids::{AnalysisId, UserId};
use crate::storage::ObjectKey;

/// Which kind of backend produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalystType {
    Mock,
    Ai,
}

impl AnalystType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalystType::Mock => "mock",
            AnalystType::Ai => "ai",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "mock" => Some(AnalystType::Mock),
            "ai" => Some(AnalystType::Ai),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnalystType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labelled line of a score breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub label: String,
    pub score: i32,
    pub note: String,
}

/// What an analyst returns for one image, before it is tagged and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalystReport {
    pub score: i32,
    pub description: String,
    pub tags: Vec<String>,
    pub details: Vec<ScoreDetail>,
}

/// A report together with the type tag of the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedReport {
    pub analyst_type: AnalystType,
    pub analyst_name: String,
    pub report: AnalystReport,
}

/// An analysis that has not been persisted yet, so it has no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnalysis {
    pub user_id: UserId,
    pub image_ref: ObjectKey,
    pub score: i32,
    pub percentile: i32,
    pub description: String,
    pub tags: Vec<String>,
    pub score_details: Vec<ScoreDetail>,
    pub analyst_type: AnalystType,
    pub created_at_ms: i64,
}

impl NewAnalysis {
    pub fn from_report(
        user_id: UserId,
        image_ref: ObjectKey,
        tagged: TaggedReport,
        percentile: i32,
        created_at_ms: i64,
    ) -> Self {
        let TaggedReport {
            analyst_type,
            report,
            ..
        } = tagged;

        Self {
            user_id,
            image_ref,
            score: report.score,
            percentile,
            description: report.description,
            tags: report.tags,
            score_details: report.details,
            analyst_type,
            created_at_ms,
        }
    }

    /// Attach the id assigned by persistence. Called by repository adapters only.
    pub fn into_persisted(self, id: AnalysisId) -> AnalysisResult {
        AnalysisResult {
            id,
            user_id: self.user_id,
            image_ref: self.image_ref,
            score: self.score,
            percentile: self.percentile,
            description: self.description,
            tags: self.tags,
            score_details: self.score_details,
            analyst_type: self.analyst_type,
            is_favorite: false,
            created_at_ms: self.created_at_ms,
        }
    }
}

/// One scored image.
///
/// `id`, `user_id` and `created_at_ms` are read-only after construction;
/// the favorite flag changes only through [`AnalysisResult::mark_favorite`]
/// and [`AnalysisResult::unmark_favorite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    id: AnalysisId,
    user_id: UserId,
    pub image_ref: ObjectKey,
    pub score: i32,
    pub percentile: i32,
    pub description: String,
    pub tags: Vec<String>,
    pub score_details: Vec<ScoreDetail>,
    pub analyst_type: AnalystType,
    is_favorite: bool,
    created_at_ms: i64,
}

impl AnalysisResult {
    /// Rehydrate a stored record.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: AnalysisId,
        user_id: UserId,
        image_ref: ObjectKey,
        score: i32,
        percentile: i32,
        description: String,
        tags: Vec<String>,
        score_details: Vec<ScoreDetail>,
        analyst_type: AnalystType,
        is_favorite: bool,
        created_at_ms: i64,
    ) -> Self {
        Self {
            id,
            user_id,
            image_ref,
            score,
            percentile,
            description,
            tags,
            score_details,
            analyst_type,
            is_favorite,
            created_at_ms,
        }
    }

    pub fn id(&self) -> AnalysisId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    pub fn mark_favorite(&mut self) {
        self.is_favorite = true;
    }

    pub fn unmark_favorite(&mut self) {
        self.is_favorite = false;
    }
}
