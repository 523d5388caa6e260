//! High-level job service with an explicitly injected queue client.
//!
//! No module-level singleton: every caller is handed a `JobService` built
//! around the queue instance it should use, which keeps shared state visible
//! and tests trivial to isolate.

use std::sync::Arc;

use tracing::info;

use sellerpay_core::{SellerId, SettlementRunId, TenantId};

use crate::queue::{JobQueue, JobQueueError, QueueStats};
use crate::types::{Job, JobId, JobKind, RetryPolicy};

/// Facade for enqueuing domain work.
#[derive(Clone)]
pub struct JobService {
    queue: Arc<dyn JobQueue>,
}

impl JobService {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &Arc<dyn JobQueue> {
        &self.queue
    }

    /// Enqueue a settlement run for later execution.
    pub fn enqueue_settlement_run(
        &self,
        tenant_id: TenantId,
        run_id: SettlementRunId,
        payload: serde_json::Value,
    ) -> Result<JobId, JobQueueError> {
        let job = Job::new(tenant_id, JobKind::SettlementRun { run_id }, payload);
        let job_id = self.queue.enqueue(job)?;
        info!(%tenant_id, %run_id, %job_id, "enqueued settlement run");
        Ok(job_id)
    }

    /// Enqueue invoice generation for one seller's settled orders.
    pub fn enqueue_invoice_generation(
        &self,
        tenant_id: TenantId,
        seller_id: SellerId,
        payload: serde_json::Value,
    ) -> Result<JobId, JobQueueError> {
        let job = Job::new(tenant_id, JobKind::InvoiceGeneration { seller_id }, payload)
            .with_retry_policy(RetryPolicy::default());
        let job_id = self.queue.enqueue(job)?;
        info!(%tenant_id, %seller_id, %job_id, "enqueued invoice generation");
        Ok(job_id)
    }

    /// Enqueue a prepared job as-is (custom kinds, delays, policies).
    pub fn enqueue(&self, job: Job) -> Result<JobId, JobQueueError> {
        let kind = job.kind.type_name().to_string();
        let job_id = self.queue.enqueue(job)?;
        info!(%job_id, kind, "enqueued job");
        Ok(job_id)
    }

    pub fn cancel(&self, tenant_id: TenantId, job_id: JobId) -> Result<(), JobQueueError> {
        self.queue.cancel(tenant_id, job_id)?;
        info!(%tenant_id, %job_id, "cancelled job");
        Ok(())
    }

    pub fn stats(&self, tenant_id: TenantId) -> Result<QueueStats, JobQueueError> {
        self.queue.stats(tenant_id)
    }
}
