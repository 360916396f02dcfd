use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use br_core::analysis::{AnalysisResult, NewAnalysis};
use br_core::ids::{AnalysisId, UserId};
use br_core::ports::{AnalysisRepositoryError, AnalysisRepositoryPort, ClockPort};

use crate::db::mappers::AnalysisRowMapper;
use crate::db::models::{AnalysisRow, NewAnalysisRow};
use crate::db::ports::{DbExecutor, InsertMapper, RowMapper};
use crate::db::schema::t_analysis;

/// Analysis records in SQLite. Deletion is soft: rows get a `deleted_at`
/// stamp and every read skips them.
pub struct DieselAnalysisRepository<E> {
    executor: E,
    mapper: AnalysisRowMapper,
    clock: Arc<dyn ClockPort>,
}

impl<E> DieselAnalysisRepository<E> {
    pub fn new(executor: E, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            executor,
            mapper: AnalysisRowMapper,
            clock,
        }
    }
}

fn storage_err(e: anyhow::Error) -> AnalysisRepositoryError {
    AnalysisRepositoryError::Storage(format!("{:#}", e))
}

impl<E: DbExecutor> DieselAnalysisRepository<E> {
    fn load_where_user(
        &self,
        user: UserId,
        favorites_only: bool,
    ) -> Result<Vec<AnalysisResult>, AnalysisRepositoryError> {
        self.executor
            .run(|conn| {
                let mut query = t_analysis::table
                    .filter(t_analysis::user_id.eq(user.get()))
                    .filter(t_analysis::deleted_at.is_null())
                    .order((t_analysis::created_at.desc(), t_analysis::id.desc()))
                    .select(AnalysisRow::as_select())
                    .into_boxed::<Sqlite>();
                if favorites_only {
                    query = query.filter(t_analysis::is_favorite.eq(true));
                }

                let rows = query.load::<AnalysisRow>(conn)?;

                rows.iter().map(|row| self.mapper.to_domain(row)).collect()
            })
            .map_err(storage_err)
    }
}

#[async_trait]
impl<E: DbExecutor> AnalysisRepositoryPort for DieselAnalysisRepository<E> {
    async fn create(&self, new: NewAnalysis) -> Result<AnalysisResult, AnalysisRepositoryError> {
        let row: NewAnalysisRow = self.mapper.to_row(&new).map_err(storage_err)?;

        let assigned = self
            .executor
            .run(|conn| {
                let assigned = diesel::insert_into(t_analysis::table)
                    .values(&row)
                    .returning(t_analysis::id)
                    .get_result::<i64>(conn)?;
                Ok(assigned)
            })
            .map_err(storage_err)?;

        Ok(new.into_persisted(AnalysisId::new(assigned)))
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AnalysisResult>, AnalysisRepositoryError> {
        self.load_where_user(user_id, false)
    }

    async fn list_favorites_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AnalysisResult>, AnalysisRepositoryError> {
        self.load_where_user(user_id, true)
    }

    async fn get_owned(
        &self,
        user_id: UserId,
        id: AnalysisId,
    ) -> Result<Option<AnalysisResult>, AnalysisRepositoryError> {
        self.executor
            .run(|conn| {
                let row = t_analysis::table
                    .filter(t_analysis::id.eq(id.get()))
                    .filter(t_analysis::user_id.eq(user_id.get()))
                    .filter(t_analysis::deleted_at.is_null())
                    .select(AnalysisRow::as_select())
                    .first::<AnalysisRow>(conn)
                    .optional()?;

                row.map(|r| self.mapper.to_domain(&r)).transpose()
            })
            .map_err(storage_err)
    }

    async fn get_by_id(
        &self,
        id: AnalysisId,
    ) -> Result<Option<AnalysisResult>, AnalysisRepositoryError> {
        self.executor
            .run(|conn| {
                let row = t_analysis::table
                    .filter(t_analysis::id.eq(id.get()))
                    .filter(t_analysis::deleted_at.is_null())
                    .select(AnalysisRow::as_select())
                    .first::<AnalysisRow>(conn)
                    .optional()?;

                row.map(|r| self.mapper.to_domain(&r)).transpose()
            })
            .map_err(storage_err)
    }

    async fn update(&self, analysis: &AnalysisResult) -> Result<(), AnalysisRepositoryError> {
        let changes = self
            .mapper
            .to_changeset(analysis, self.clock.now_ms())
            .map_err(storage_err)?;

        let affected = self
            .executor
            .run(|conn| {
                let affected = diesel::update(
                    t_analysis::table
                        .filter(t_analysis::id.eq(analysis.id().get()))
                        .filter(t_analysis::user_id.eq(analysis.user_id().get()))
                        .filter(t_analysis::deleted_at.is_null()),
                )
                .set(&changes)
                .execute(conn)?;
                Ok(affected)
            })
            .map_err(storage_err)?;

        if affected == 0 {
            return Err(AnalysisRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_owned(
        &self,
        user_id: UserId,
        id: AnalysisId,
    ) -> Result<usize, AnalysisRepositoryError> {
        let now = self.clock.now_ms();

        self.executor
            .run(|conn| {
                let affected = diesel::update(
                    t_analysis::table
                        .filter(t_analysis::id.eq(id.get()))
                        .filter(t_analysis::user_id.eq(user_id.get()))
                        .filter(t_analysis::deleted_at.is_null()),
                )
                .set((
                    t_analysis::deleted_at.eq(Some(now)),
                    t_analysis::updated_at.eq(now),
                ))
                .execute(conn)?;
                Ok(affected)
            })
            .map_err(storage_err)
    }
}
