use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use br_core::analysis::{AnalysisResult, AnalystType, ScoreDetail};

/// Display-ready analysis, as serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub id: i64,
    pub user_id: i64,
    pub image_url: String,
    pub score: i32,
    pub percentile: i32,
    pub date: DateTime<Utc>,
    pub description: String,
    pub tags: Vec<String>,
    pub score_details: Vec<ScoreDetailView>,
    pub is_favorite: bool,
    pub analyst_type: AnalystType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDetailView {
    pub label: String,
    pub score: i32,
    pub desc: String,
}

impl From<&ScoreDetail> for ScoreDetailView {
    fn from(detail: &ScoreDetail) -> Self {
        Self {
            label: detail.label.clone(),
            score: detail.score,
            desc: detail.note.clone(),
        }
    }
}

impl AnalysisView {
    pub fn from_record(record: &AnalysisResult, image_url: String) -> Self {
        // out-of-range timestamps only come from a corrupted row
        let date = Utc
            .timestamp_millis_opt(record.created_at_ms())
            .single()
            .unwrap_or_default();

        Self {
            id: record.id().get(),
            user_id: record.user_id().get(),
            image_url,
            score: record.score,
            percentile: record.percentile,
            date,
            description: record.description.clone(),
            tags: record.tags.clone(),
            score_details: record.score_details.iter().map(ScoreDetailView::from).collect(),
            is_favorite: record.is_favorite(),
            analyst_type: record.analyst_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    #[test]
    fn serializes_with_client_field_names() {
        let mut record = sample_record(7, 3);
        record.score_details = vec![ScoreDetail {
            label: "light".to_string(),
            score: 88,
            note: "soft and even".to_string(),
        }];

        let view = AnalysisView::from_record(&record, "http://h/api/v1/analysis/image/k".to_string());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["userId"], 3);
        assert_eq!(json["imageUrl"], "http://h/api/v1/analysis/image/k");
        assert_eq!(json["isFavorite"], false);
        assert_eq!(json["analystType"], "mock");
        assert_eq!(json["date"], "2023-11-14T22:13:20Z");
        assert_eq!(json["scoreDetails"][0]["desc"], "soft and even");
        assert_eq!(json["tags"][1], "warm");
    }
}
