use crate::db::schema::t_analysis;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = t_analysis)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalysisRow {
    pub id: i64,
    pub user_id: i64,
    pub image_key: String,
    pub score: i32,
    pub percentile: i32,
    pub description: String,
    /// JSON array of strings
    pub tags: String,
    /// JSON array of score details
    pub score_details: String,
    pub analyst_type: String,
    pub is_favorite: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = t_analysis)]
pub struct NewAnalysisRow {
    pub user_id: i64,
    pub image_key: String,
    pub score: i32,
    pub percentile: i32,
    pub description: String,
    pub tags: String,
    pub score_details: String,
    pub analyst_type: String,
    pub is_favorite: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Columns rewritten by an update; identity and timestamps of creation stay.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = t_analysis)]
pub struct AnalysisChangeset {
    pub image_key: String,
    pub score: i32,
    pub percentile: i32,
    pub description: String,
    pub tags: String,
    pub score_details: String,
    pub analyst_type: String,
    pub is_favorite: bool,
    pub updated_at: i64,
}
