//! Queue client abstraction and the in-memory implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use sellerpay_core::TenantId;

use crate::types::{Job, JobId, JobStatus};

/// Queue client error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JobQueueError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("tenant isolation violation")]
    TenantIsolation,
    #[error("job already enqueued: {0}")]
    AlreadyEnqueued(JobId),
    #[error("job is in a terminal state: {0}")]
    Terminal(JobId),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Per-tenant queue counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct QueueStats {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub dead_lettered: usize,
    pub cancelled: usize,
}

/// Queue client. Object-safe so callers can hold `Arc<dyn JobQueue>` —
/// the client is always passed in explicitly, never resolved from a global.
pub trait JobQueue: Send + Sync {
    /// Enqueue a new job.
    fn enqueue(&self, job: Job) -> Result<JobId, JobQueueError>;

    /// Fetch a job, enforcing tenant isolation.
    fn get(&self, tenant_id: TenantId, job_id: JobId) -> Result<Option<Job>, JobQueueError>;

    /// Persist updated job state.
    fn update(&self, job: &Job) -> Result<(), JobQueueError>;

    /// Claim the oldest ready job (pending, or failed and due for retry),
    /// marking it running. FIFO by creation time.
    fn claim_next(&self, tenant_id: Option<TenantId>) -> Result<Option<Job>, JobQueueError>;

    /// Cancel a non-terminal job.
    fn cancel(&self, tenant_id: TenantId, job_id: JobId) -> Result<(), JobQueueError>;

    /// List jobs currently dead-lettered for a tenant.
    fn list_dead_letters(
        &self,
        tenant_id: TenantId,
        limit: usize,
    ) -> Result<Vec<Job>, JobQueueError>;

    /// Re-queue a dead-lettered job from scratch.
    fn retry_dead_letter(&self, tenant_id: TenantId, job_id: JobId) -> Result<Job, JobQueueError>;

    /// Counters for a tenant.
    fn stats(&self, tenant_id: TenantId) -> Result<QueueStats, JobQueueError>;
}

/// In-memory queue for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryJobQueue {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobQueue for InMemoryJobQueue {
    fn enqueue(&self, job: Job) -> Result<JobId, JobQueueError> {
        let mut jobs = self.jobs.write().unwrap();
        if jobs.contains_key(&job.id) {
            return Err(JobQueueError::AlreadyEnqueued(job.id));
        }
        let id = job.id;
        jobs.insert(id, job);
        Ok(id)
    }

    fn get(&self, tenant_id: TenantId, job_id: JobId) -> Result<Option<Job>, JobQueueError> {
        let jobs = self.jobs.read().unwrap();
        match jobs.get(&job_id) {
            Some(job) if job.tenant_id == tenant_id => Ok(Some(job.clone())),
            Some(_) => Err(JobQueueError::TenantIsolation),
            None => Ok(None),
        }
    }

    fn update(&self, job: &Job) -> Result<(), JobQueueError> {
        let mut jobs = self.jobs.write().unwrap();
        if !jobs.contains_key(&job.id) {
            return Err(JobQueueError::NotFound(job.id));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    fn claim_next(&self, tenant_id: Option<TenantId>) -> Result<Option<Job>, JobQueueError> {
        let mut jobs = self.jobs.write().unwrap();
        let now = Utc::now();

        let next_id = jobs
            .values()
            .filter(|j| {
                matches!(j.status, JobStatus::Pending | JobStatus::Failed { .. })
                    && j.is_ready(now)
                    && tenant_id.is_none_or(|t| j.tenant_id == t)
            })
            .min_by_key(|j| (j.created_at, j.id.0))
            .map(|j| j.id);

        if let Some(id) = next_id {
            let job = jobs.get_mut(&id).ok_or(JobQueueError::NotFound(id))?;
            job.mark_running();
            return Ok(Some(job.clone()));
        }
        Ok(None)
    }

    fn cancel(&self, tenant_id: TenantId, job_id: JobId) -> Result<(), JobQueueError> {
        let mut jobs = self.jobs.write().unwrap();
        let job = jobs.get_mut(&job_id).ok_or(JobQueueError::NotFound(job_id))?;
        if job.tenant_id != tenant_id {
            return Err(JobQueueError::TenantIsolation);
        }
        if job.status.is_terminal() {
            return Err(JobQueueError::Terminal(job_id));
        }
        job.mark_cancelled();
        Ok(())
    }

    fn list_dead_letters(
        &self,
        tenant_id: TenantId,
        limit: usize,
    ) -> Result<Vec<Job>, JobQueueError> {
        let jobs = self.jobs.read().unwrap();
        let mut result: Vec<Job> = jobs
            .values()
            .filter(|j| {
                j.tenant_id == tenant_id && matches!(j.status, JobStatus::DeadLettered { .. })
            })
            .cloned()
            .collect();
        result.sort_by_key(|j| j.updated_at);
        result.truncate(limit);
        Ok(result)
    }

    fn retry_dead_letter(&self, tenant_id: TenantId, job_id: JobId) -> Result<Job, JobQueueError> {
        let mut jobs = self.jobs.write().unwrap();
        let job = jobs.get_mut(&job_id).ok_or(JobQueueError::NotFound(job_id))?;
        if job.tenant_id != tenant_id {
            return Err(JobQueueError::TenantIsolation);
        }
        if !matches!(job.status, JobStatus::DeadLettered { .. }) {
            return Err(JobQueueError::Storage(format!(
                "job {job_id} is not dead-lettered"
            )));
        }

        job.status = JobStatus::Pending;
        job.attempt = 0;
        job.scheduled_at = None;
        job.last_error = None;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    fn stats(&self, tenant_id: TenantId) -> Result<QueueStats, JobQueueError> {
        let jobs = self.jobs.read().unwrap();
        let mut stats = QueueStats::default();

        for job in jobs.values().filter(|j| j.tenant_id == tenant_id) {
            match &job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed { .. } => stats.failed += 1,
                JobStatus::DeadLettered { .. } => stats.dead_lettered += 1,
                JobStatus::Cancelled => stats.cancelled += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobKind;

    fn job_for(tenant: TenantId) -> Job {
        Job::new(
            tenant,
            JobKind::Custom {
                kind: "test".to_string(),
            },
            serde_json::json!({}),
        )
    }

    #[test]
    fn claim_is_fifo_by_creation() {
        let queue = InMemoryJobQueue::new();
        let tenant = TenantId::new();

        let first = queue.enqueue(job_for(tenant)).unwrap();
        let second = queue.enqueue(job_for(tenant)).unwrap();

        assert_eq!(queue.claim_next(Some(tenant)).unwrap().unwrap().id, first);
        assert_eq!(queue.claim_next(Some(tenant)).unwrap().unwrap().id, second);
        assert!(queue.claim_next(Some(tenant)).unwrap().is_none());
    }

    #[test]
    fn claimed_job_is_marked_running() {
        let queue = InMemoryJobQueue::new();
        let tenant = TenantId::new();
        queue.enqueue(job_for(tenant)).unwrap();

        let claimed = queue.claim_next(Some(tenant)).unwrap().unwrap();
        assert_eq!(claimed.status, JobStatus::Running);
        assert_eq!(claimed.attempt, 1);
    }

    #[test]
    fn tenant_isolation_on_reads_and_claims() {
        let queue = InMemoryJobQueue::new();
        let owner = TenantId::new();
        let intruder = TenantId::new();

        let id = queue.enqueue(job_for(owner)).unwrap();

        assert!(matches!(
            queue.get(intruder, id),
            Err(JobQueueError::TenantIsolation)
        ));
        assert!(queue.claim_next(Some(intruder)).unwrap().is_none());
        assert!(matches!(
            queue.cancel(intruder, id),
            Err(JobQueueError::TenantIsolation)
        ));
    }

    #[test]
    fn scheduled_jobs_are_not_claimable_early() {
        let queue = InMemoryJobQueue::new();
        let tenant = TenantId::new();

        let job = job_for(tenant).delayed(std::time::Duration::from_secs(3600));
        queue.enqueue(job).unwrap();

        assert!(queue.claim_next(Some(tenant)).unwrap().is_none());
    }

    #[test]
    fn dead_letter_retry_resets_the_job() {
        let queue = InMemoryJobQueue::new();
        let tenant = TenantId::new();

        let job = job_for(tenant).with_retry_policy(crate::types::RetryPolicy::no_retry());
        let id = queue.enqueue(job).unwrap();

        let mut claimed = queue.claim_next(Some(tenant)).unwrap().unwrap();
        claimed.mark_failed("exploded".to_string());
        queue.update(&claimed).unwrap();

        let dead = queue.list_dead_letters(tenant, 10).unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id, id);

        let retried = queue.retry_dead_letter(tenant, id).unwrap();
        assert_eq!(retried.status, JobStatus::Pending);
        assert_eq!(retried.attempt, 0);
        assert!(retried.last_error.is_none());
        assert!(queue.list_dead_letters(tenant, 10).unwrap().is_empty());
    }

    #[test]
    fn cancel_rejects_terminal_jobs() {
        let queue = InMemoryJobQueue::new();
        let tenant = TenantId::new();
        let id = queue.enqueue(job_for(tenant)).unwrap();

        let mut claimed = queue.claim_next(Some(tenant)).unwrap().unwrap();
        claimed.mark_completed();
        queue.update(&claimed).unwrap();

        assert!(matches!(
            queue.cancel(tenant, id),
            Err(JobQueueError::Terminal(_))
        ));
    }

    #[test]
    fn stats_count_by_status() {
        let queue = InMemoryJobQueue::new();
        let tenant = TenantId::new();

        for _ in 0..4 {
            queue.enqueue(job_for(tenant)).unwrap();
        }
        queue.claim_next(Some(tenant)).unwrap();

        let stats = queue.stats(tenant).unwrap();
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.running, 1);
    }
}
