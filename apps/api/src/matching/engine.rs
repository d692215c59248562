//! Match engine — one shared factor computation behind both call shapes.
//!
//! `evaluate` is the only place factors are computed. The single path adds
//! the matched/missing skill lists on top of it; the batch path keeps only the
//! score and label. Both go through `weighted_score`, so they cannot drift.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::matching::factors::{
    application_rate_factor, competition_factor, location_factor, normalize_skills,
    partition_skills, salary_factor, seniority_factor, seniority_level, skills_factor,
    timeliness_factor, trust_factor, LocationStatus, SeniorityGap, FACTOR_MAX, FACTOR_MIN,
};
use crate::models::job::JobPosting;
use crate::models::profile::{CandidateProfile, WorkMode};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// All eight factors, each in 0–100. Competition and application rate are
/// reported but carry no weight in the final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFactors {
    pub skills_match: f64,
    pub seniority_match: f64,
    pub location_match: f64,
    pub trust_score: f64,
    pub timeliness: f64,
    pub competition: f64,
    pub application_rate: f64,
    pub salary_match: f64,
}

impl MatchFactors {
    /// (name, value) pairs in a stable order.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("skills_match", self.skills_match),
            ("seniority_match", self.seniority_match),
            ("location_match", self.location_match),
            ("trust_score", self.trust_score),
            ("timeliness", self.timeliness),
            ("competition", self.competition),
            ("application_rate", self.application_rate),
            ("salary_match", self.salary_match),
        ]
    }
}

/// Explanation attached to a single-job evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub seniority_gap: SeniorityGap,
    pub location_status: LocationStatus,
}

/// Full result of the single-job evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: u8,
    pub factors: MatchFactors,
    pub details: MatchDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLabel {
    Excellent,
    Good,
    Fair,
    Low,
}

impl MatchLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 75 => MatchLabel::Excellent,
            s if s >= 50 => MatchLabel::Good,
            s if s >= 30 => MatchLabel::Fair,
            _ => MatchLabel::Low,
        }
    }
}

/// Per-job entry of the batch evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchScore {
    pub score: u8,
    pub label: MatchLabel,
}

/// A record whose numeric fields cannot be turned into factors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactorError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

// ────────────────────────────────────────────────────────────────────────────
// Weights
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub skills: f64,
    pub seniority: f64,
    pub location: f64,
    pub trust: f64,
    pub timeliness: f64,
    pub salary: f64,
}

/// Sums to 1.0; competition and application rate are deliberately absent.
pub const MATCH_WEIGHTS: MatchWeights = MatchWeights {
    skills: 0.42,
    seniority: 0.20,
    location: 0.14,
    trust: 0.09,
    timeliness: 0.08,
    salary: 0.07,
};

impl MatchWeights {
    pub fn total(&self) -> f64 {
        self.skills + self.seniority + self.location + self.trust + self.timeliness + self.salary
    }
}

/// Final 0–100 score: weighted sum of the six scoring factors, rounded.
pub fn weighted_score(factors: &MatchFactors) -> u8 {
    let w = &MATCH_WEIGHTS;
    debug_assert!((w.total() - 1.0).abs() < 1e-9);
    let sum = factors.skills_match * w.skills
        + factors.seniority_match * w.seniority
        + factors.location_match * w.location
        + factors.trust_score * w.trust
        + factors.timeliness * w.timeliness
        + factors.salary_match * w.salary;
    sum.round().clamp(FACTOR_MIN, FACTOR_MAX) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Shared evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Candidate-side inputs, normalized once per call and reused for every job.
#[derive(Debug, Clone)]
pub struct CandidateSignals {
    skills: HashSet<String>,
    level: Option<u8>,
    work_modes: BTreeSet<WorkMode>,
    location: Option<String>,
    desired_min_salary: Option<f64>,
}

impl CandidateSignals {
    pub fn from_profile(profile: &CandidateProfile) -> Self {
        Self {
            skills: normalize_skills(&profile.skills).into_iter().collect(),
            level: seniority_level(profile.seniority.as_deref()),
            work_modes: profile.work_modes.clone(),
            location: profile.location.as_deref().map(str::to_lowercase),
            desired_min_salary: profile.desired_min_salary,
        }
    }
}

/// Factors plus the classifications produced while computing them.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub factors: MatchFactors,
    pub seniority_gap: SeniorityGap,
    pub location_status: LocationStatus,
    /// Unioned, lowercased job skills in job order.
    pub job_skills: Vec<String>,
}

impl Evaluation {
    pub fn score(&self) -> u8 {
        weighted_score(&self.factors)
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<f64, FactorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FactorError::NonFinite { field, value })
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<f64, FactorError> {
    let value = require_finite(field, value)?;
    if value < 0.0 {
        return Err(FactorError::Negative { field, value });
    }
    Ok(value)
}

/// Computes every factor for one candidate/job pair.
pub fn evaluate(
    candidate: &CandidateSignals,
    job: &JobPosting,
    now: DateTime<Utc>,
) -> Result<Evaluation, FactorError> {
    let trust_score = job
        .employer
        .trust_score
        .map(|t| require_finite("trust_score", t))
        .transpose()?;
    let compensation_max = job
        .compensation_max
        .map(|c| require_non_negative("compensation_max", c))
        .transpose()?;
    let view_count = require_non_negative("view_count", job.view_count as f64)? as i64;
    let apply_count = require_non_negative("apply_count", job.apply_count as f64)? as i64;

    let job_skills = normalize_skills(job.skills.iter().chain(job.technical_skills.iter()));
    let job_level = seniority_level(job.seniority_label.as_deref());
    let (seniority_match, seniority_gap) = seniority_factor(candidate.level, job_level);

    let job_location = job.location.as_deref().map(str::to_lowercase);
    let (location_match, location_status) = location_factor(
        job.is_remote,
        job_location.as_deref(),
        &candidate.work_modes,
        candidate.location.as_deref(),
    );

    let factors = MatchFactors {
        skills_match: skills_factor(&job_skills, &candidate.skills),
        seniority_match,
        location_match,
        trust_score: trust_factor(trust_score),
        timeliness: timeliness_factor(job.published_at.unwrap_or(now), now),
        competition: competition_factor(view_count),
        application_rate: application_rate_factor(apply_count, view_count),
        salary_match: salary_factor(candidate.desired_min_salary, compensation_max),
    };

    Ok(Evaluation {
        factors,
        seniority_gap,
        location_status,
        job_skills,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Call shapes
// ────────────────────────────────────────────────────────────────────────────

/// Single-job evaluation with the full explanation.
pub fn score_single(
    profile: &CandidateProfile,
    job: &JobPosting,
    now: DateTime<Utc>,
) -> Result<MatchResult, FactorError> {
    let candidate = CandidateSignals::from_profile(profile);
    let evaluation = evaluate(&candidate, job, now)?;
    Ok(explain(&candidate, evaluation))
}

/// Attaches matched/missing skills to an evaluation.
pub fn explain(candidate: &CandidateSignals, evaluation: Evaluation) -> MatchResult {
    let score = evaluation.score();
    let (matched_skills, missing_skills) =
        partition_skills(&evaluation.job_skills, &candidate.skills);

    MatchResult {
        score,
        factors: evaluation.factors,
        details: MatchDetails {
            matched_skills,
            missing_skills,
            seniority_gap: evaluation.seniority_gap,
            location_status: evaluation.location_status,
        },
    }
}

/// Batch evaluation: scored jobs plus the ones that could not be scored.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub scores: BTreeMap<Uuid, BatchScore>,
    pub rejected: Vec<(Uuid, FactorError)>,
}

/// Scores every job against one candidate. A job that fails to evaluate is
/// reported in `rejected` and does not affect the others.
pub fn score_batch(
    profile: &CandidateProfile,
    jobs: &[JobPosting],
    now: DateTime<Utc>,
) -> BatchOutcome {
    let candidate = CandidateSignals::from_profile(profile);
    let mut outcome = BatchOutcome::default();

    for job in jobs {
        match evaluate(&candidate, job, now) {
            Ok(evaluation) => {
                let score = evaluation.score();
                outcome.scores.insert(
                    job.id,
                    BatchScore {
                        score,
                        label: MatchLabel::from_score(score),
                    },
                );
            }
            Err(e) => outcome.rejected.push((job.id, e)),
        }
    }

    outcome
}
