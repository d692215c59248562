use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use super::non_blank;

/// Raw `user_profiles` row as stored by the profile service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub skills: Option<Vec<String>>,
    pub seniority: Option<String>,
    pub work_modes: Option<Vec<String>>,
    pub location: Option<String>,
    pub desired_min_salary: Option<i32>,
}

/// A work arrangement, either preferred by a candidate or offered by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkMode {
    /// Parses the free-text values the profile form has stored over time.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "remote" => Some(WorkMode::Remote),
            "hybrid" => Some(WorkMode::Hybrid),
            "onsite" | "on-site" | "office" => Some(WorkMode::Onsite),
            _ => None,
        }
    }
}

/// Normalized candidate profile consumed by the match engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: Uuid,
    pub skills: Vec<String>,
    pub seniority: Option<String>,
    /// Empty means "no preference".
    pub work_modes: BTreeSet<WorkMode>,
    pub location: Option<String>,
    /// `None` when the candidate has not set a salary floor.
    pub desired_min_salary: Option<f64>,
}

impl From<ProfileRow> for CandidateProfile {
    fn from(row: ProfileRow) -> Self {
        let work_modes = row
            .work_modes
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| {
                let mode = WorkMode::parse(raw);
                if mode.is_none() {
                    debug!(user_id = %row.user_id, value = %raw, "Ignoring unknown work mode");
                }
                mode
            })
            .collect();

        CandidateProfile {
            user_id: row.user_id,
            skills: row.skills.unwrap_or_default(),
            seniority: non_blank(row.seniority),
            work_modes,
            location: non_blank(row.location),
            desired_min_salary: row
                .desired_min_salary
                .filter(|salary| *salary > 0)
                .map(f64::from),
        }
    }
}
