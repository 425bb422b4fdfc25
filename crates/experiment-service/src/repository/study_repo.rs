//! PostgreSQL 实验仓储
//!
//! 两个实验族共用同一套 SQL，表名和外键列在构造时按族展开一次。

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};

use super::traits::StudyRepository;
use crate::error::Result;
use crate::models::{NewStudy, NewVariantEvent, Study, StudyKind, StudyRow, VariantEvent};

const STUDY_COLUMNS: &str =
    "id, name, description, study_type, details, created_at, updated_at, deleted_at";

/// 按实验族展开后的 SQL
#[derive(Debug)]
struct Queries {
    insert_study: String,
    insert_event: String,
    find_active: String,
    soft_delete: String,
    cascade_events: String,
    list_events: String,
}

impl Queries {
    fn for_kind<K: StudyKind>() -> Self {
        let table = K::TABLE;
        let data_table = K::DATA_TABLE;
        let fk = K::FOREIGN_KEY;
        let event_columns = format!(
            "id, {fk} AS parent_id, variant, timestamp, conversion, revenue, \
             engagement_minutes, additional_data, created_at, updated_at, deleted_at"
        );

        Self {
            insert_study: format!(
                "INSERT INTO {table} (name, description, study_type, details, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $5) \
                 RETURNING {STUDY_COLUMNS}"
            ),
            insert_event: format!(
                "INSERT INTO {data_table} ({fk}, variant, timestamp, conversion, revenue, \
                 engagement_minutes, additional_data, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
                 RETURNING {event_columns}"
            ),
            find_active: format!(
                "SELECT {STUDY_COLUMNS} FROM {table} WHERE id = $1 AND deleted_at IS NULL"
            ),
            soft_delete: format!(
                "UPDATE {table} SET deleted_at = $2, updated_at = $2 \
                 WHERE id = $1 AND deleted_at IS NULL"
            ),
            cascade_events: format!(
                "UPDATE {data_table} SET deleted_at = $2, updated_at = $2 \
                 WHERE {fk} = $1 AND deleted_at IS NULL"
            ),
            list_events: format!(
                "SELECT {event_columns} FROM {data_table} \
                 WHERE {fk} = $1 AND deleted_at IS NULL ORDER BY id ASC"
            ),
        }
    }
}

/// PostgreSQL 实验仓储
pub struct PgStudyRepository<K: StudyKind> {
    pool: PgPool,
    queries: Queries,
    _kind: PhantomData<K>,
}

impl<K: StudyKind> PgStudyRepository<K> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            queries: Queries::for_kind::<K>(),
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<K: StudyKind> StudyRepository<K> for PgStudyRepository<K> {
    #[instrument(skip(self, study, events), fields(family = K::TABLE, events = events.len()))]
    async fn create_with_events(
        &self,
        study: NewStudy<K>,
        events: Vec<NewVariantEvent>,
    ) -> Result<(Study<K>, Vec<VariantEvent>)> {
        let now = Utc::now();
        let details = serde_json::to_value(&study.details)?;

        // 父记录与事件同一事务，避免留下没有事件的孤儿父记录
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, StudyRow>(&self.queries.insert_study)
            .bind(&study.name)
            .bind(&study.description)
            .bind(&study.study_type)
            .bind(&details)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(events.len());
        for event in events {
            let event = sqlx::query_as::<_, VariantEvent>(&self.queries.insert_event)
                .bind(row.id)
                .bind(&event.variant)
                .bind(event.timestamp)
                .bind(event.conversion)
                .bind(event.revenue)
                .bind(event.engagement_minutes)
                .bind(&event.additional_data)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;
            created.push(event);
        }

        tx.commit().await?;

        info!(study_id = row.id, events = created.len(), "Study created");

        Ok((row.into_study()?, created))
    }

    #[instrument(skip(self), fields(family = K::TABLE))]
    async fn find_active(&self, id: i64) -> Result<Option<Study<K>>> {
        let row = sqlx::query_as::<_, StudyRow>(&self.queries.find_active)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(StudyRow::into_study).transpose()
    }

    #[instrument(skip(self), fields(family = K::TABLE))]
    async fn soft_delete(&self, id: i64, cascade: bool) -> Result<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(&self.queries.soft_delete)
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if cascade {
            let events = sqlx::query(&self.queries.cascade_events)
                .bind(id)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            info!(study_id = id, events = events.rows_affected(), "Variant events soft-deleted");
        }

        tx.commit().await?;

        info!(study_id = id, "Study soft-deleted");

        Ok(true)
    }

    #[instrument(skip(self), fields(family = K::TABLE))]
    async fn list_events(&self, study_id: i64) -> Result<Vec<VariantEvent>> {
        let events = sqlx::query_as::<_, VariantEvent>(&self.queries.list_events)
            .bind(study_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
