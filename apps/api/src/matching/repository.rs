//! Read-only repositories feeding the match engine.
//!
//! Records are normalized into `CandidateProfile` / `JobPosting` here, so the
//! engine never sees legacy column fallbacks.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::job::{JobPosting, JobRow};
use crate::models::profile::{CandidateProfile, ProfileRow};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, RepositoryError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobPosting>, RepositoryError>;

    /// Fetches every job in `job_ids` in one round-trip. Unknown ids are
    /// simply absent from the result.
    async fn get_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<JobPosting>, RepositoryError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres implementations
// ────────────────────────────────────────────────────────────────────────────

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<CandidateProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, skills, seniority, work_modes, location, desired_min_salary
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CandidateProfile::from))
    }
}

const JOB_SELECT: &str = r#"
    SELECT j.id, j.company_id, j.skills, j.technical_skills, j.seniority,
           j.experience_level, j.remote, j.is_remote, j.location, j.location_raw,
           j.salary_min, j.salary_max, j.published_at, j.created_at, j.views_count,
           c.trust_score
    FROM jobs j
    LEFT JOIN companies c ON c.id = j.company_id
"#;

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn get_job(&self, job_id: Uuid) -> Result<Option<JobPosting>, RepositoryError> {
        let sql = format!("{JOB_SELECT} WHERE j.id = $1");
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(JobPosting::from))
    }

    async fn get_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<JobPosting>, RepositoryError> {
        let sql = format!("{JOB_SELECT} WHERE j.id = ANY($1)");
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(job_ids)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            requested = job_ids.len(),
            found = rows.len(),
            "Fetched jobs for batch match"
        );
        Ok(rows.into_iter().map(JobPosting::from).collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory fake for tests
// ────────────────────────────────────────────────────────────────────────────
