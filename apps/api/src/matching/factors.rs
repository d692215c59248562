//! Factor normalization — maps each raw signal onto a 0–100 sub-score.
//!
//! Every policy value lives in a named constant grouped with its factor so the
//! banding can be read (and tested) without hunting through the formulas.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::profile::WorkMode;

/// Upper and lower bound shared by every factor.
pub const FACTOR_MAX: f64 = 100.0;
pub const FACTOR_MIN: f64 = 0.0;

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// A job that lists no skills gives full credit.
pub const SKILLS_NO_REQUIREMENT: f64 = FACTOR_MAX;

/// Lowercases and deduplicates skills, keeping first-seen order.
pub fn normalize_skills<'a, I>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.to_lowercase())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Share of the (normalized) job skills present in the candidate set, 0–100.
pub fn skills_factor(job_skills: &[String], candidate_skills: &HashSet<String>) -> f64 {
    if job_skills.is_empty() {
        return SKILLS_NO_REQUIREMENT;
    }
    let matched = job_skills
        .iter()
        .filter(|s| candidate_skills.contains(*s))
        .count();
    matched as f64 / job_skills.len() as f64 * FACTOR_MAX
}

/// Splits job skills into (matched, missing), both in job-skill order.
pub fn partition_skills(
    job_skills: &[String],
    candidate_skills: &HashSet<String>,
) -> (Vec<String>, Vec<String>) {
    job_skills
        .iter()
        .cloned()
        .partition(|s| candidate_skills.contains(s))
}

// ────────────────────────────────────────────────────────────────────────────
// Seniority
// ────────────────────────────────────────────────────────────────────────────

/// Substring → ordinal, checked top to bottom; the first hit wins.
const SENIORITY_LEVELS: &[(&[&str], u8)] = &[
    (&["intern", "stage"], 0),
    (&["junior"], 1),
    (&["mid", "medior"], 2),
    (&["senior"], 3),
    (&["lead"], 4),
];

pub const SENIORITY_BOTH_UNKNOWN: f64 = 50.0;
pub const SENIORITY_ONE_UNKNOWN: f64 = 40.0;
pub const SENIORITY_PERFECT: f64 = 100.0;
pub const SENIORITY_OVERQUALIFIED: f64 = 70.0;
pub const SENIORITY_UNDERQUALIFIED_CLOSE: f64 = 30.0;
pub const SENIORITY_UNDERQUALIFIED_FAR: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityGap {
    Perfect,
    Overqualified,
    UnderqualifiedClose,
    UnderqualifiedFar,
    Unknown,
}

/// Maps a free-text seniority label onto the five-level ordinal scale.
pub fn seniority_level(label: Option<&str>) -> Option<u8> {
    let label = label?.to_lowercase();
    SENIORITY_LEVELS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| label.contains(n)))
        .map(|(_, level)| *level)
}

pub fn seniority_factor(candidate: Option<u8>, job: Option<u8>) -> (f64, SeniorityGap) {
    let (candidate, job) = match (candidate, job) {
        (None, None) => return (SENIORITY_BOTH_UNKNOWN, SeniorityGap::Unknown),
        (None, Some(_)) | (Some(_), None) => {
            return (SENIORITY_ONE_UNKNOWN, SeniorityGap::Unknown)
        }
        (Some(c), Some(j)) => (i16::from(c), i16::from(j)),
    };

    match candidate - job {
        0 => (SENIORITY_PERFECT, SeniorityGap::Perfect),
        d if d > 0 => (SENIORITY_OVERQUALIFIED, SeniorityGap::Overqualified),
        -1 => (
            SENIORITY_UNDERQUALIFIED_CLOSE,
            SeniorityGap::UnderqualifiedClose,
        ),
        _ => (SENIORITY_UNDERQUALIFIED_FAR, SeniorityGap::UnderqualifiedFar),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Location / work mode
// ────────────────────────────────────────────────────────────────────────────

pub const LOCATION_MATCH: f64 = FACTOR_MAX;
pub const LOCATION_MISMATCH: f64 = FACTOR_MIN;
pub const LOCATION_AMBIGUOUS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    RemoteMatch,
    RemoteMismatch,
    RemoteOnlyMismatch,
    Exact,
    DifferentLocation,
    Unknown,
}

/// Locations are expected lowercased; `None` means absent.
pub fn location_factor(
    job_is_remote: bool,
    job_location: Option<&str>,
    work_modes: &BTreeSet<WorkMode>,
    candidate_location: Option<&str>,
) -> (f64, LocationStatus) {
    let no_preference = work_modes.is_empty();

    if job_is_remote {
        return if no_preference || work_modes.contains(&WorkMode::Remote) {
            (LOCATION_MATCH, LocationStatus::RemoteMatch)
        } else {
            (LOCATION_MISMATCH, LocationStatus::RemoteMismatch)
        };
    }

    let remote_only = !no_preference && work_modes.iter().all(|m| *m == WorkMode::Remote);
    if remote_only {
        return (LOCATION_MISMATCH, LocationStatus::RemoteOnlyMismatch);
    }

    match (job_location, candidate_location) {
        (Some(job), Some(candidate)) if job.contains(candidate) || candidate.contains(job) => {
            (LOCATION_MATCH, LocationStatus::Exact)
        }
        (Some(_), Some(_)) => (LOCATION_MISMATCH, LocationStatus::DifferentLocation),
        _ => (LOCATION_AMBIGUOUS, LocationStatus::Unknown),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Employer trust
// ────────────────────────────────────────────────────────────────────────────

/// Assumed when the employer record carries no trust score.
pub const DEFAULT_TRUST_SCORE: f64 = 80.0;
/// Strictly above this → high band; 80 itself is medium.
const TRUST_HIGH_ABOVE: f64 = 80.0;
const TRUST_MEDIUM_FROM: f64 = 60.0;
const TRUST_LOW_FROM: f64 = 40.0;

const TRUST_HIGH: f64 = 100.0;
const TRUST_MEDIUM: f64 = 70.0;
const TRUST_LOW: f64 = 50.0;
const TRUST_POOR: f64 = 20.0;

pub fn trust_factor(trust_score: Option<f64>) -> f64 {
    match trust_score.unwrap_or(DEFAULT_TRUST_SCORE) {
        t if t > TRUST_HIGH_ABOVE => TRUST_HIGH,
        t if t >= TRUST_MEDIUM_FROM => TRUST_MEDIUM,
        t if t >= TRUST_LOW_FROM => TRUST_LOW,
        _ => TRUST_POOR,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Timeliness
// ────────────────────────────────────────────────────────────────────────────

/// (max hours since publish, inclusive) → factor.
const TIMELINESS_BANDS: &[(f64, f64)] = &[
    (24.0, 100.0),
    (72.0, 70.0),
    (168.0, 40.0),
    (336.0, 20.0),
];

pub fn timeliness_factor(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let hours = (now - published_at).num_milliseconds() as f64 / 3_600_000.0;
    TIMELINESS_BANDS
        .iter()
        .find(|(max_hours, _)| hours <= *max_hours)
        .map_or(FACTOR_MIN, |(_, factor)| *factor)
}

// ────────────────────────────────────────────────────────────────────────────
// Competition and application rate (exposed, not weighted)
// ────────────────────────────────────────────────────────────────────────────

/// (view count upper bound, exclusive) → factor.
const COMPETITION_BANDS: &[(f64, f64)] = &[(30.0, 100.0), (100.0, 60.0), (300.0, 30.0)];

/// (apply/view percentage upper bound, exclusive) → factor. Lower is better.
const APPLICATION_RATE_BANDS: &[(f64, f64)] = &[(15.0, 100.0), (30.0, 60.0), (50.0, 30.0)];

fn band_below(value: f64, bands: &[(f64, f64)]) -> f64 {
    bands
        .iter()
        .find(|(bound, _)| value < *bound)
        .map_or(FACTOR_MIN, |(_, factor)| *factor)
}

pub fn competition_factor(view_count: i64) -> f64 {
    band_below(view_count as f64, COMPETITION_BANDS)
}

pub fn application_rate_factor(apply_count: i64, view_count: i64) -> f64 {
    let ratio = if view_count > 0 {
        apply_count as f64 / view_count as f64 * 100.0
    } else {
        0.0
    };
    band_below(ratio, APPLICATION_RATE_BANDS)
}

// ────────────────────────────────────────────────────────────────────────────
// Salary
// ────────────────────────────────────────────────────────────────────────────

pub const SALARY_NO_FLOOR: f64 = FACTOR_MAX;
pub const SALARY_NO_DATA: f64 = 50.0;

pub fn salary_factor(desired_min: Option<f64>, compensation_max: Option<f64>) -> f64 {
    let Some(min) = desired_min.filter(|m| *m > 0.0) else {
        return SALARY_NO_FLOOR;
    };
    match compensation_max {
        None => SALARY_NO_DATA,
        Some(max) if max >= min => FACTOR_MAX,
        Some(max) => (max / min * 100.0).round().min(FACTOR_MAX),
    }
}
