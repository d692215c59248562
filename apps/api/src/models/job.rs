use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::non_blank;

/// Raw `jobs` row joined with the employer's trust score.
///
/// Several columns are legacy duplicates written by different importers
/// (`seniority`/`experience_level`, `remote`/`is_remote`,
/// `location`/`location_raw`); `JobPosting::from` resolves them once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub skills: Option<Vec<String>>,
    pub technical_skills: Option<Vec<String>>,
    pub seniority: Option<String>,
    pub experience_level: Option<String>,
    pub remote: Option<bool>,
    pub is_remote: Option<bool>,
    pub location: Option<String>,
    pub location_raw: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub views_count: Option<i32>,
    pub trust_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employer {
    pub trust_score: Option<f64>,
}

/// Normalized job posting consumed by the match engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub skills: Vec<String>,
    pub technical_skills: Vec<String>,
    pub seniority_label: Option<String>,
    pub is_remote: bool,
    pub location: Option<String>,
    pub compensation_max: Option<f64>,
    /// `None` when neither a publish nor a creation timestamp exists; the
    /// engine then treats the job as published at evaluation time.
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    /// Apply clicks are not tracked yet, so this stays 0 for stored jobs.
    pub apply_count: i64,
    pub employer: Employer,
}

impl From<JobRow> for JobPosting {
    fn from(row: JobRow) -> Self {
        JobPosting {
            id: row.id,
            skills: row.skills.unwrap_or_default(),
            technical_skills: row.technical_skills.unwrap_or_default(),
            seniority_label: non_blank(row.seniority).or_else(|| non_blank(row.experience_level)),
            is_remote: row.remote.unwrap_or(false) || row.is_remote.unwrap_or(false),
            location: non_blank(row.location).or_else(|| non_blank(row.location_raw)),
            compensation_max: row.salary_max.or(row.salary_min).map(f64::from),
            published_at: row.published_at.or(row.created_at),
            view_count: row.views_count.map(i64::from).unwrap_or(0),
            apply_count: 0,
            employer: Employer {
                trust_score: row.trust_score,
            },
        }
    }
}
