use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::matching::engine::{self, BatchScore, FactorError, MatchResult};
use crate::matching::repository::{JobRepository, ProfileRepository, RepositoryError};

/// Source of "now" for the timeliness factor.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("candidate profile {0} not found")]
    ProfileNotFound(Uuid),

    #[error("job {0} not found")]
    JobNotFound(Uuid),

    #[error("job {job_id} cannot be scored: {source}")]
    InvalidRecord {
        job_id: Uuid,
        #[source]
        source: FactorError,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Loads profile and job snapshots, then hands them to the pure engine.
pub struct MatchService {
    profiles: Arc<dyn ProfileRepository>,
    jobs: Arc<dyn JobRepository>,
    clock: Clock,
}

impl MatchService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, jobs: Arc<dyn JobRepository>) -> Self {
        Self {
            profiles,
            jobs,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Scores one job for one candidate, with the full explanation.
    pub async fn score(&self, user_id: Uuid, job_id: Uuid) -> Result<MatchResult, MatchError> {
        let (profile, job) = tokio::try_join!(
            self.profiles.get_profile(user_id),
            self.jobs.get_job(job_id)
        )?;

        let profile = profile.ok_or(MatchError::ProfileNotFound(user_id))?;
        let job = job.ok_or(MatchError::JobNotFound(job_id))?;

        let result = engine::score_single(&profile, &job, (self.clock)())
            .map_err(|source| MatchError::InvalidRecord { job_id, source })?;

        debug!(
            %user_id,
            %job_id,
            score = result.score,
            factors = ?result.factors.entries(),
            "Computed match score"
        );
        Ok(result)
    }

    /// Scores many jobs for one candidate with a single job fetch.
    ///
    /// A missing profile yields an empty map. Unknown job ids and jobs whose
    /// records cannot be scored are left out of the result.
    pub async fn score_batch(
        &self,
        user_id: Uuid,
        job_ids: &[Uuid],
    ) -> Result<BTreeMap<Uuid, BatchScore>, MatchError> {
        let Some(profile) = self.profiles.get_profile(user_id).await? else {
            debug!(%user_id, "No profile for batch match; returning empty result");
            return Ok(BTreeMap::new());
        };

        let unique: Vec<Uuid> = job_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unique.is_empty() {
            return Ok(BTreeMap::new());
        }

        let jobs = self.jobs.get_jobs(&unique).await?;
        let outcome = engine::score_batch(&profile, &jobs, (self.clock)());

        for (job_id, error) in &outcome.rejected {
            warn!(%user_id, %job_id, %error, "Skipping job that cannot be scored");
        }
        info!(
            %user_id,
            requested = unique.len(),
            scored = outcome.scores.len(),
            rejected = outcome.rejected.len(),
            "Batch match complete"
        );

        Ok(outcome.scores)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::TimeZone;

    use super::*;
    use crate::matching::engine::MatchLabel;
    use crate::matching::repository::memory::InMemoryRepository;
    use crate::models::job::{Employer, JobPosting};
    use crate::models::profile::CandidateProfile;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn make_profile() -> CandidateProfile {
        CandidateProfile {
            user_id: Uuid::new_v4(),
            skills: vec!["React".to_string(), "Node.js".to_string()],
            seniority: Some("senior".to_string()),
            work_modes: BTreeSet::new(),
            location: Some("Milan".to_string()),
            desired_min_salary: None,
        }
    }

    fn make_job(skills: &[&str]) -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            technical_skills: vec![],
            seniority_label: Some("senior".to_string()),
            is_remote: true,
            location: None,
            compensation_max: None,
            published_at: Some(fixed_now()),
            view_count: 12,
            apply_count: 0,
            employer: Employer::default(),
        }
    }

    fn service(repo: Arc<InMemoryRepository>) -> MatchService {
        MatchService::new(repo.clone(), repo).with_clock(Arc::new(fixed_now))
    }

    #[tokio::test]
    async fn test_score_returns_breakdown() {
        let profile = make_profile();
        let job = make_job(&["React", "Node.js", "Python"]);
        let repo = Arc::new(InMemoryRepository::with(vec![profile.clone()], vec![job.clone()]));

        let result = service(repo).score(profile.user_id, job.id).await.unwrap();
        assert_eq!(result.score, 83);
        assert_eq!(result.details.missing_skills, vec!["python".to_string()]);
    }

    #[tokio::test]
    async fn test_score_missing_profile_is_not_found() {
        let job = make_job(&["Rust"]);
        let repo = Arc::new(InMemoryRepository::with(vec![], vec![job.clone()]));
        let user_id = Uuid::new_v4();

        let err = service(repo).score(user_id, job.id).await.unwrap_err();
        assert!(matches!(err, MatchError::ProfileNotFound(id) if id == user_id));
    }

    #[tokio::test]
    async fn test_score_missing_job_is_not_found() {
        let profile = make_profile();
        let repo = Arc::new(InMemoryRepository::with(vec![profile.clone()], vec![]));
        let job_id = Uuid::new_v4();

        let err = service(repo).score(profile.user_id, job_id).await.unwrap_err();
        assert!(matches!(err, MatchError::JobNotFound(id) if id == job_id));
    }

    #[tokio::test]
    async fn test_score_invalid_record_is_reported() {
        let profile = make_profile();
        let mut job = make_job(&["Rust"]);
        job.employer.trust_score = Some(f64::INFINITY);
        let repo = Arc::new(InMemoryRepository::with(vec![profile.clone()], vec![job.clone()]));

        let err = service(repo).score(profile.user_id, job.id).await.unwrap_err();
        assert!(matches!(err, MatchError::InvalidRecord { job_id, .. } if job_id == job.id));
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let repo = Arc::new(InMemoryRepository::failing());
        let err = service(repo)
            .score_batch(Uuid::new_v4(), &[Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::Repository(_)));
    }

    #[tokio::test]
    async fn test_batch_without_profile_is_empty() {
        let job = make_job(&["Rust"]);
        let repo = Arc::new(InMemoryRepository::with(vec![], vec![job.clone()]));

        let scores = service(repo.clone())
            .score_batch(Uuid::new_v4(), &[job.id])
            .await
            .unwrap();
        assert!(scores.is_empty());
        assert_eq!(repo.batch_lookups.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_batch_skips_unknown_and_uses_one_fetch() {
        let profile = make_profile();
        let jobs = vec![
            make_job(&["React"]),
            make_job(&["Go", "Kubernetes"]),
            make_job(&[]),
        ];
        let repo = Arc::new(InMemoryRepository::with(vec![profile.clone()], jobs.clone()));
        let unknown = Uuid::new_v4();

        let mut ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
        ids.push(unknown);
        ids.push(jobs[0].id);

        let scores = service(repo.clone())
            .score_batch(profile.user_id, &ids)
            .await
            .unwrap();

        assert_eq!(scores.len(), 3);
        assert!(!scores.contains_key(&unknown));
        assert_eq!(repo.batch_lookups.load(Ordering::Relaxed), 1);
        assert_eq!(repo.job_lookups.load(Ordering::Relaxed), 0);
        assert_eq!(scores[&jobs[0].id].label, MatchLabel::Excellent);
    }

    #[tokio::test]
    async fn test_batch_isolates_unscorable_job() {
        let profile = make_profile();
        let good = make_job(&["React"]);
        let mut bad = make_job(&["React"]);
        bad.compensation_max = Some(f64::NAN);
        let repo = Arc::new(InMemoryRepository::with(
            vec![profile.clone()],
            vec![good.clone(), bad.clone()],
        ));

        let scores = service(repo)
            .score_batch(profile.user_id, &[good.id, bad.id])
            .await
            .unwrap();
        assert_eq!(scores.len(), 1);
        assert!(scores.contains_key(&good.id));
    }

    #[tokio::test]
    async fn test_batch_agrees_with_single() {
        let profile = make_profile();
        let mut job = make_job(&["React", "Python", "SQL"]);
        job.is_remote = false;
        job.location = Some("Milano, Italy".to_string());
        job.seniority_label = Some("mid".to_string());
        job.employer.trust_score = Some(42.0);
        let repo = Arc::new(InMemoryRepository::with(vec![profile.clone()], vec![job.clone()]));
        let svc = service(repo);

        let single = svc.score(profile.user_id, job.id).await.unwrap();
        let batch = svc.score_batch(profile.user_id, &[job.id]).await.unwrap();
        assert_eq!(batch[&job.id].score, single.score);
    }
}
