use anyhow::{Context, Result};

use br_core::analysis::{AnalysisResult, AnalystType, NewAnalysis, ScoreDetail};
use br_core::ids::{AnalysisId, UserId};
use br_core::storage::ObjectKey;

use crate::db::models::{AnalysisChangeset, AnalysisRow, NewAnalysisRow};
use crate::db::ports::{InsertMapper, RowMapper};

pub struct AnalysisRowMapper;

impl InsertMapper<NewAnalysis, NewAnalysisRow> for AnalysisRowMapper {
    fn to_row(&self, domain: &NewAnalysis) -> Result<NewAnalysisRow> {
        Ok(NewAnalysisRow {
            user_id: domain.user_id.get(),
            image_key: domain.image_ref.as_str().to_string(),
            score: domain.score,
            percentile: domain.percentile,
            description: domain.description.clone(),
            tags: serde_json::to_string(&domain.tags).context("encode tags")?,
            score_details: serde_json::to_string(&domain.score_details)
                .context("encode score details")?,
            analyst_type: domain.analyst_type.as_str().to_string(),
            is_favorite: false,
            created_at: domain.created_at_ms,
            updated_at: domain.created_at_ms,
        })
    }
}

impl RowMapper<AnalysisRow, AnalysisResult> for AnalysisRowMapper {
    fn to_domain(&self, row: &AnalysisRow) -> Result<AnalysisResult> {
        let tags: Vec<String> = serde_json::from_str(&row.tags)
            .with_context(|| format!("decode tags of analysis {}", row.id))?;
        let score_details: Vec<ScoreDetail> = serde_json::from_str(&row.score_details)
            .with_context(|| format!("decode score details of analysis {}", row.id))?;
        let analyst_type = AnalystType::parse(&row.analyst_type)
            .ok_or_else(|| anyhow::anyhow!("unknown analyst type: {}", row.analyst_type))?;

        Ok(AnalysisResult::restore(
            AnalysisId::new(row.id),
            UserId::new(row.user_id),
            ObjectKey::new(row.image_key.clone()),
            row.score,
            row.percentile,
            row.description.clone(),
            tags,
            score_details,
            analyst_type,
            row.is_favorite,
            row.created_at,
        ))
    }
}

impl AnalysisRowMapper {
    pub fn to_changeset(&self, domain: &AnalysisResult, updated_at: i64) -> Result<AnalysisChangeset> {
        Ok(AnalysisChangeset {
            image_key: domain.image_ref.as_str().to_string(),
            score: domain.score,
            percentile: domain.percentile,
            description: domain.description.clone(),
            tags: serde_json::to_string(&domain.tags).context("encode tags")?,
            score_details: serde_json::to_string(&domain.score_details)
                .context("encode score details")?,
            analyst_type: domain.analyst_type.as_str().to_string(),
            is_favorite: domain.is_favorite(),
            updated_at,
        })
    }
}
