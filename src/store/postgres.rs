use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use super::{CandidateStore, ReferenceLookup, StatusCountRow};
use crate::error::Result;
use crate::models::candidate::{
    Candidate, CandidateFilter, CandidatePatch, CandidateRow, NewCandidate, StatusColumns,
    StatusTracking,
};

const CANDIDATE_COLUMNS: &str = r#"
    id, full_name, linkedin, portfolio, filiere_id, center_id,
    cv_data, cv_name, cover_letter_data, cover_letter_name,
    status,
    stage_company, stage_title, stage_start_date, stage_end_date, stage_type,
    job_company, job_title, job_contract_type, job_start_date,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_candidates(rows: Vec<CandidateRow>) -> Result<Vec<Candidate>> {
    rows.into_iter().map(Candidate::try_from).collect()
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn insert(&self, draft: NewCandidate) -> Result<Candidate> {
        let (cv_data, cv_name) = split_attachment(draft.cv);
        let (cover_data, cover_name) = split_attachment(draft.cover_letter);
        let sql = format!(
            r#"
            INSERT INTO candidates (
                full_name, linkedin, portfolio, filiere_id, center_id,
                cv_data, cv_name, cover_letter_data, cover_letter_name, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'available')
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );

        let row = sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(draft.full_name)
            .bind(draft.linkedin)
            .bind(draft.portfolio)
            .bind(draft.filiere_id)
            .bind(draft.center_id)
            .bind(cv_data)
            .bind(cv_name)
            .bind(cover_data)
            .bind(cover_name)
            .fetch_one(&self.pool)
            .await?;
        Candidate::try_from(row)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>> {
        let sql = format!("SELECT {} FROM candidates WHERE id = $1", CANDIDATE_COLUMNS);
        let row = sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn update(&self, id: Uuid, patch: CandidatePatch) -> Result<Option<Candidate>> {
        let (cv_data, cv_name) = split_attachment(patch.cv);
        let (cover_data, cover_name) = split_attachment(patch.cover_letter);
        let sql = format!(
            r#"
            UPDATE candidates
            SET full_name = COALESCE($2, full_name),
                linkedin = COALESCE($3, linkedin),
                portfolio = COALESCE($4, portfolio),
                filiere_id = COALESCE($5, filiere_id),
                center_id = COALESCE($6, center_id),
                cv_data = COALESCE($7, cv_data),
                cv_name = COALESCE($8, cv_name),
                cover_letter_data = COALESCE($9, cover_letter_data),
                cover_letter_name = COALESCE($10, cover_letter_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );

        let row = sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(id)
            .bind(patch.full_name)
            .bind(patch.linkedin)
            .bind(patch.portfolio)
            .bind(patch.filiere_id)
            .bind(patch.center_id)
            .bind(cv_data)
            .bind(cv_name)
            .bind(cover_data)
            .bind(cover_name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn replace_status(
        &self,
        id: Uuid,
        tracking: StatusTracking,
    ) -> Result<Option<Candidate>> {
        let columns = StatusColumns::from(&tracking);
        let sql = format!(
            r#"
            UPDATE candidates
            SET status = $2,
                stage_company = $3,
                stage_title = $4,
                stage_start_date = $5,
                stage_end_date = $6,
                stage_type = $7,
                job_company = $8,
                job_title = $9,
                job_contract_type = $10,
                job_start_date = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );

        let row = sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(id)
            .bind(columns.status)
            .bind(columns.stage_company)
            .bind(columns.stage_title)
            .bind(columns.stage_start_date)
            .bind(columns.stage_end_date)
            .bind(columns.stage_type)
            .bind(columns.job_company)
            .bind(columns.job_title)
            .bind(columns.job_contract_type)
            .bind(columns.job_start_date)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: CandidateFilter) -> Result<Vec<Candidate>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM candidates WHERE TRUE",
            CANDIDATE_COLUMNS
        ));
        if let Some(center_id) = filter.center_id {
            query.push(" AND center_id = ").push_bind(center_id);
        }
        if let Some(filiere_id) = filter.filiere_id {
            query.push(" AND filiere_id = ").push_bind(filiere_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.slug());
        }
        query.push(" ORDER BY created_at DESC, id");

        let rows = query
            .build_query_as::<CandidateRow>()
            .fetch_all(&self.pool)
            .await?;
        into_candidates(rows)
    }

    async fn status_counts(&self, center_id: Uuid) -> Result<Vec<StatusCountRow>> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r#"
            SELECT center_id, status, COUNT(*) AS total
            FROM candidates
            WHERE center_id = $1
            GROUP BY center_id, status
            "#,
        )
        .bind(center_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn status_counts_by_center(&self) -> Result<Vec<StatusCountRow>> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r#"
            SELECT center_id, status, COUNT(*) AS total
            FROM candidates
            GROUP BY center_id, status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ReferenceLookup for PgCandidateStore {
    async fn center_exists(&self, id: Uuid) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM centers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn filiere_exists(&self, id: Uuid) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM filieres WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn center_names(&self) -> Result<HashMap<Uuid, String>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM centers")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }
}

fn split_attachment(
    attachment: Option<crate::models::candidate::Attachment>,
) -> (Option<Vec<u8>>, Option<String>) {
    match attachment {
        Some(a) => (Some(a.data), Some(a.file_name)),
        None => (None, None),
    }
}
