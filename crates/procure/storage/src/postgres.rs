//! PostgreSQL adapter for procurement storage.
//!
//! Status transitions are a single conditional `UPDATE ... WHERE status =
//! $expected`, so two writers racing on the same vendor cannot both win.
//! Score and consensus uniqueness is enforced by unique indexes and
//! `ON CONFLICT` upserts.

use crate::traits::{
    ConsensusStore, CriterionStore, QueryWindow, ScoreStore, VendorQuery, VendorStore,
};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procure_types::{
    ConsensusId, ConsensusScore, Criterion, CriterionId, EvidenceId, ProjectId, Score,
    ScoreFilter, ScoreId, ScoreStatus, ScoreValue, StatusChange, StatusUpdate, UserId, Vendor,
    VendorDetails, VendorId, VendorStatus,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;

const VENDOR_COLUMNS: &str = "project_id, vendor_id, name, description, website, notes, status, \
     status_changed_at, status_changed_by, status_history, created_at, updated_at, \
     deleted_at, deleted_by";

const SCORE_COLUMNS: &str = "score_id, project_id, vendor_id, criterion_id, evaluator_id, value, \
     rationale, status, evidence_ids, created_at, updated_at, submitted_at";

const CONSENSUS_COLUMNS: &str = "consensus_id, project_id, vendor_id, criterion_id, \
     consensus_value, rationale, determined_by, source_score_ids, determined_at, created_at, \
     updated_at";

/// PostgreSQL-backed storage adapter.
#[derive(Clone)]
pub struct PostgresProcurementStorage {
    pool: PgPool,
}

impl PostgresProcurementStorage {
    /// Connect to PostgreSQL and initialize required schema.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to connect postgres: {e}")))?;
        Self::from_pool(pool).await
    }

    /// Create adapter from an existing pool.
    pub async fn from_pool(pool: PgPool) -> StorageResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn init_schema(&self) -> StorageResult<()> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS procure_vendors (
                project_id TEXT NOT NULL,
                vendor_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                website TEXT,
                notes TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL,
                status_changed_at TIMESTAMPTZ NOT NULL,
                status_changed_by TEXT NOT NULL,
                status_history JSONB NOT NULL DEFAULT '[]'::JSONB,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                deleted_at TIMESTAMPTZ,
                deleted_by TEXT,
                PRIMARY KEY (project_id, vendor_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS procure_criteria (
                project_id TEXT NOT NULL,
                criterion_id TEXT NOT NULL,
                category TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                weight DOUBLE PRECISION NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (project_id, criterion_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS procure_scores (
                score_id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                vendor_id TEXT NOT NULL,
                criterion_id TEXT NOT NULL,
                evaluator_id TEXT NOT NULL,
                value SMALLINT NOT NULL CHECK (value BETWEEN 1 AND 5),
                rationale TEXT,
                status TEXT NOT NULL,
                evidence_ids JSONB NOT NULL DEFAULT '[]'::JSONB,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                submitted_at TIMESTAMPTZ,
                UNIQUE (project_id, vendor_id, criterion_id, evaluator_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS procure_consensus (
                consensus_id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                vendor_id TEXT NOT NULL,
                criterion_id TEXT NOT NULL,
                consensus_value SMALLINT NOT NULL CHECK (consensus_value BETWEEN 1 AND 5),
                rationale TEXT NOT NULL,
                determined_by TEXT NOT NULL,
                source_score_ids JSONB NOT NULL,
                determined_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                UNIQUE (project_id, vendor_id, criterion_id)
            )
            "#,
        ];

        for stmt in ddl {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Backend(format!("schema init failed: {e}")))?;
        }
        debug!("procurement schema ready");
        Ok(())
    }

    async fn live_vendor_exists(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> StorageResult<bool> {
        Ok(self
            .get_vendor(project_id, vendor_id)
            .await?
            .is_some_and(|v| !v.is_deleted()))
    }
}

#[async_trait]
impl VendorStore for PostgresProcurementStorage {
    async fn create_vendor(&self, vendor: Vendor) -> StorageResult<()> {
        let history = to_json(&vendor.status_history)?;
        sqlx::query(&format!(
            "INSERT INTO procure_vendors ({VENDOR_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(&vendor.project_id.0)
        .bind(&vendor.id.0)
        .bind(&vendor.name)
        .bind(&vendor.description)
        .bind(&vendor.website)
        .bind(&vendor.notes)
        .bind(vendor.status.as_str())
        .bind(vendor.status_changed_at)
        .bind(&vendor.status_changed_by.0)
        .bind(history)
        .bind(vendor.created_at)
        .bind(vendor.updated_at)
        .bind(vendor.deleted_at)
        .bind(vendor.deleted_by.as_ref().map(|u| u.0.clone()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;
        Ok(())
    }

    async fn get_vendor(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> StorageResult<Option<Vendor>> {
        let row = sqlx::query(&format!(
            "SELECT {VENDOR_COLUMNS} FROM procure_vendors WHERE project_id = $1 AND vendor_id = $2"
        ))
        .bind(&project_id.0)
        .bind(&vendor_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(vendor_row_to_record).transpose()
    }

    async fn list_vendors(
        &self,
        project_id: &ProjectId,
        query: VendorQuery,
        window: QueryWindow,
    ) -> StorageResult<Vec<Vendor>> {
        let limit = if window.limit == 0 {
            None
        } else {
            Some(to_i64(window.limit)?)
        };
        let rows = sqlx::query(&format!(
            "SELECT {VENDOR_COLUMNS} FROM procure_vendors \
              WHERE project_id = $1 \
                AND ($2 OR deleted_at IS NULL) \
                AND ($3::TEXT IS NULL OR status = $3) \
              ORDER BY name, vendor_id \
              LIMIT $4 OFFSET $5"
        ))
        .bind(&project_id.0)
        .bind(query.include_deleted)
        .bind(query.status.map(VendorStatus::as_str))
        .bind(limit)
        .bind(to_i64(window.offset)?)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(vendor_row_to_record).collect()
    }

    async fn update_vendor_details(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        details: &VendorDetails,
        updated_at: DateTime<Utc>,
    ) -> StorageResult<Vendor> {
        let row = sqlx::query(&format!(
            "UPDATE procure_vendors \
                SET name = COALESCE($1, name), \
                    description = COALESCE($2, description), \
                    website = COALESCE($3, website), \
                    updated_at = $4 \
              WHERE project_id = $5 AND vendor_id = $6 AND deleted_at IS NULL \
          RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.website)
        .bind(updated_at)
        .bind(&project_id.0)
        .bind(&vendor_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(vendor_row_to_record)
            .transpose()?
            .ok_or_else(|| StorageError::NotFound(format!("vendor {vendor_id} not found")))
    }

    async fn transition_status(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        expected_from: VendorStatus,
        update: StatusUpdate,
    ) -> StorageResult<Vendor> {
        let change = StatusChange {
            from: expected_from,
            to: update.to,
            changed_at: update.changed_at,
            changed_by: update.changed_by.clone(),
            note: update.note.clone(),
        };
        let change_json = to_json(&[&change])?;

        let row = sqlx::query(&format!(
            "UPDATE procure_vendors \
                SET status = $1, \
                    status_changed_at = $2, \
                    status_changed_by = $3, \
                    updated_at = $2, \
                    notes = CASE WHEN notes = '' THEN $4 ELSE notes || E'\\n' || $4 END, \
                    status_history = status_history || $5::JSONB \
              WHERE project_id = $6 \
                AND vendor_id = $7 \
                AND status = $8 \
                AND deleted_at IS NULL \
          RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(update.to.as_str())
        .bind(update.changed_at)
        .bind(&update.changed_by.0)
        .bind(change.note_line())
        .bind(change_json)
        .bind(&project_id.0)
        .bind(&vendor_id.0)
        .bind(expected_from.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => vendor_row_to_record(row),
            None if self.live_vendor_exists(project_id, vendor_id).await? => {
                Err(StorageError::Conflict(format!(
                    "vendor {vendor_id} is no longer in status {expected_from}"
                )))
            }
            None => Err(StorageError::NotFound(format!(
                "vendor {vendor_id} not found"
            ))),
        }
    }

    async fn soft_delete_vendor(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        deleted_by: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> StorageResult<Vendor> {
        let row = sqlx::query(&format!(
            "UPDATE procure_vendors \
                SET deleted_at = $1, deleted_by = $2, updated_at = $1 \
              WHERE project_id = $3 AND vendor_id = $4 AND deleted_at IS NULL \
          RETURNING {VENDOR_COLUMNS}"
        ))
        .bind(deleted_at)
        .bind(&deleted_by.0)
        .bind(&project_id.0)
        .bind(&vendor_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(vendor_row_to_record)
            .transpose()?
            .ok_or_else(|| StorageError::NotFound(format!("vendor {vendor_id} not found")))
    }
}

#[async_trait]
impl CriterionStore for PostgresProcurementStorage {
    async fn create_criterion(&self, criterion: Criterion) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO procure_criteria
                (project_id, criterion_id, category, name, description, weight, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&criterion.project_id.0)
        .bind(&criterion.id.0)
        .bind(&criterion.category)
        .bind(&criterion.name)
        .bind(&criterion.description)
        .bind(criterion.weight)
        .bind(criterion.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_conflict)?;
        Ok(())
    }

    async fn get_criterion(
        &self,
        project_id: &ProjectId,
        criterion_id: &CriterionId,
    ) -> StorageResult<Option<Criterion>> {
        let row = sqlx::query(
            r#"
            SELECT project_id, criterion_id, category, name, description, weight, created_at
              FROM procure_criteria
             WHERE project_id = $1 AND criterion_id = $2
            "#,
        )
        .bind(&project_id.0)
        .bind(&criterion_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(criterion_row_to_record).transpose()
    }

    async fn list_criteria(&self, project_id: &ProjectId) -> StorageResult<Vec<Criterion>> {
        let rows = sqlx::query(
            r#"
            SELECT project_id, criterion_id, category, name, description, weight, created_at
              FROM procure_criteria
             WHERE project_id = $1
             ORDER BY category, name, criterion_id
            "#,
        )
        .bind(&project_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(criterion_row_to_record).collect()
    }
}

#[async_trait]
impl ScoreStore for PostgresProcurementStorage {
    async fn upsert_score(&self, score: Score) -> StorageResult<Score> {
        let evidence = to_json(&score.evidence_ids)?;
        let row = sqlx::query(&format!(
            "INSERT INTO procure_scores ({SCORE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (project_id, vendor_id, criterion_id, evaluator_id) DO UPDATE \
                SET value = EXCLUDED.value, \
                    rationale = EXCLUDED.rationale, \
                    status = EXCLUDED.status, \
                    evidence_ids = EXCLUDED.evidence_ids, \
                    updated_at = EXCLUDED.updated_at, \
                    submitted_at = EXCLUDED.submitted_at \
          RETURNING {SCORE_COLUMNS}"
        ))
        .bind(&score.id.0)
        .bind(&score.project_id.0)
        .bind(&score.vendor_id.0)
        .bind(&score.criterion_id.0)
        .bind(&score.evaluator_id.0)
        .bind(i16::from(score.value.get()))
        .bind(&score.rationale)
        .bind(score.status.as_str())
        .bind(evidence)
        .bind(score.created_at)
        .bind(score.updated_at)
        .bind(score.submitted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        score_row_to_record(row)
    }

    async fn list_scores(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        filter: &ScoreFilter,
    ) -> StorageResult<Vec<Score>> {
        let rows = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM procure_scores \
              WHERE project_id = $1 \
                AND vendor_id = $2 \
                AND ($3::TEXT IS NULL OR evaluator_id = $3) \
                AND ($4::TEXT IS NULL OR criterion_id = $4) \
                AND ($5::TEXT IS NULL OR status = $5) \
              ORDER BY criterion_id, evaluator_id"
        ))
        .bind(&project_id.0)
        .bind(&vendor_id.0)
        .bind(filter.evaluator_id.as_ref().map(|e| e.0.clone()))
        .bind(filter.criterion_id.as_ref().map(|c| c.0.clone()))
        .bind(filter.status.map(ScoreStatus::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(score_row_to_record).collect()
    }

    async fn submit_scores(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        evaluator_id: &UserId,
        submitted_at: DateTime<Utc>,
    ) -> StorageResult<usize> {
        let result = sqlx::query(
            r#"
            UPDATE procure_scores
               SET status = 'submitted',
                   submitted_at = $1
             WHERE project_id = $2
               AND vendor_id = $3
               AND evaluator_id = $4
               AND status = 'draft'
            "#,
        )
        .bind(submitted_at)
        .bind(&project_id.0)
        .bind(&vendor_id.0)
        .bind(&evaluator_id.0)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        usize::try_from(result.rows_affected())
            .map_err(|_| StorageError::InvariantViolation("row count overflow".to_string()))
    }
}

#[async_trait]
impl ConsensusStore for PostgresProcurementStorage {
    async fn upsert_consensus(&self, consensus: ConsensusScore) -> StorageResult<ConsensusScore> {
        let sources = to_json(&consensus.source_score_ids)?;
        let row = sqlx::query(&format!(
            "INSERT INTO procure_consensus ({CONSENSUS_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (project_id, vendor_id, criterion_id) DO UPDATE \
                SET consensus_value = EXCLUDED.consensus_value, \
                    rationale = EXCLUDED.rationale, \
                    determined_by = EXCLUDED.determined_by, \
                    source_score_ids = EXCLUDED.source_score_ids, \
                    determined_at = EXCLUDED.determined_at, \
                    updated_at = EXCLUDED.updated_at \
          RETURNING {CONSENSUS_COLUMNS}"
        ))
        .bind(&consensus.id.0)
        .bind(&consensus.project_id.0)
        .bind(&consensus.vendor_id.0)
        .bind(&consensus.criterion_id.0)
        .bind(i16::from(consensus.consensus_value.get()))
        .bind(&consensus.rationale)
        .bind(&consensus.determined_by.0)
        .bind(sources)
        .bind(consensus.determined_at)
        .bind(consensus.created_at)
        .bind(consensus.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        consensus_row_to_record(row)
    }

    async fn get_consensus(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
        criterion_id: &CriterionId,
    ) -> StorageResult<Option<ConsensusScore>> {
        let row = sqlx::query(&format!(
            "SELECT {CONSENSUS_COLUMNS} FROM procure_consensus \
              WHERE project_id = $1 AND vendor_id = $2 AND criterion_id = $3"
        ))
        .bind(&project_id.0)
        .bind(&vendor_id.0)
        .bind(&criterion_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(consensus_row_to_record).transpose()
    }

    async fn list_consensus(
        &self,
        project_id: &ProjectId,
        vendor_id: &VendorId,
    ) -> StorageResult<Vec<ConsensusScore>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONSENSUS_COLUMNS} FROM procure_consensus \
              WHERE project_id = $1 AND vendor_id = $2 \
              ORDER BY criterion_id"
        ))
        .bind(&project_id.0)
        .bind(&vendor_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(consensus_row_to_record).collect()
    }
}

fn vendor_row_to_record(row: PgRow) -> StorageResult<Vendor> {
    let status: String = get(&row, "status")?;
    let history: serde_json::Value = get(&row, "status_history")?;
    let deleted_by: Option<String> = get(&row, "deleted_by")?;

    Ok(Vendor {
        id: VendorId::new(get::<String>(&row, "vendor_id")?),
        project_id: ProjectId::new(get::<String>(&row, "project_id")?),
        name: get(&row, "name")?,
        description: get(&row, "description")?,
        website: get(&row, "website")?,
        notes: get(&row, "notes")?,
        status: parse_status(&status)?,
        status_changed_at: get(&row, "status_changed_at")?,
        status_changed_by: UserId::new(get::<String>(&row, "status_changed_by")?),
        status_history: from_json(history)?,
        created_at: get(&row, "created_at")?,
        updated_at: get(&row, "updated_at")?,
        deleted_at: get(&row, "deleted_at")?,
        deleted_by: deleted_by.map(UserId::new),
    })
}

fn criterion_row_to_record(row: PgRow) -> StorageResult<Criterion> {
    Ok(Criterion {
        id: CriterionId::new(get::<String>(&row, "criterion_id")?),
        project_id: ProjectId::new(get::<String>(&row, "project_id")?),
        category: get(&row, "category")?,
        name: get(&row, "name")?,
        description: get(&row, "description")?,
        weight: get(&row, "weight")?,
        created_at: get(&row, "created_at")?,
    })
}

fn score_row_to_record(row: PgRow) -> StorageResult<Score> {
    let status: String = get(&row, "status")?;
    let evidence: serde_json::Value = get(&row, "evidence_ids")?;
    let evidence_ids: Vec<EvidenceId> = from_json(evidence)?;

    Ok(Score {
        id: ScoreId::new(get::<String>(&row, "score_id")?),
        project_id: ProjectId::new(get::<String>(&row, "project_id")?),
        vendor_id: VendorId::new(get::<String>(&row, "vendor_id")?),
        criterion_id: CriterionId::new(get::<String>(&row, "criterion_id")?),
        evaluator_id: UserId::new(get::<String>(&row, "evaluator_id")?),
        value: parse_value(get(&row, "value")?)?,
        rationale: get(&row, "rationale")?,
        status: parse_score_status(&status)?,
        evidence_ids,
        created_at: get(&row, "created_at")?,
        updated_at: get(&row, "updated_at")?,
        submitted_at: get(&row, "submitted_at")?,
    })
}

fn consensus_row_to_record(row: PgRow) -> StorageResult<ConsensusScore> {
    let sources: serde_json::Value = get(&row, "source_score_ids")?;

    Ok(ConsensusScore {
        id: ConsensusId::new(get::<String>(&row, "consensus_id")?),
        project_id: ProjectId::new(get::<String>(&row, "project_id")?),
        vendor_id: VendorId::new(get::<String>(&row, "vendor_id")?),
        criterion_id: CriterionId::new(get::<String>(&row, "criterion_id")?),
        consensus_value: parse_value(get(&row, "consensus_value")?)?,
        rationale: get(&row, "rationale")?,
        determined_by: UserId::new(get::<String>(&row, "determined_by")?),
        source_score_ids: from_json(sources)?,
        determined_at: get(&row, "determined_at")?,
        created_at: get(&row, "created_at")?,
        updated_at: get(&row, "updated_at")?,
    })
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> StorageResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column).map_err(backend)
}

fn parse_status(raw: &str) -> StorageResult<VendorStatus> {
    raw.parse()
        .map_err(|e: procure_types::UnknownStatus| StorageError::Serialization(e.to_string()))
}

fn parse_score_status(raw: &str) -> StorageResult<ScoreStatus> {
    match raw {
        "draft" => Ok(ScoreStatus::Draft),
        "submitted" => Ok(ScoreStatus::Submitted),
        _ => Err(StorageError::Serialization(format!(
            "unknown score status `{raw}`"
        ))),
    }
}

fn parse_value(raw: i16) -> StorageResult<ScoreValue> {
    ScoreValue::new(i64::from(raw)).map_err(|e| StorageError::InvariantViolation(e.to_string()))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> StorageResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> StorageResult<T> {
    serde_json::from_value(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn backend(err: sqlx::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn map_sqlx_conflict(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StorageError::Conflict(db_err.message().to_string());
        }
    }
    backend(err)
}

fn to_i64(value: usize) -> StorageResult<i64> {
    i64::try_from(value)
        .map_err(|_| StorageError::InvalidInput("window value too large".to_string()))
}
