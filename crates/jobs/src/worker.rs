//! Polling worker: claims jobs, runs handlers, applies retry policy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use sellerpay_core::TenantId;

use crate::queue::{JobQueue, JobQueueError};
use crate::types::{Job, JobStatus};

/// Handler for one job kind. Errors are stringified into the job record and
/// drive the retry policy.
pub type JobHandler = Box<dyn Fn(&Job) -> anyhow::Result<()> + Send + Sync>;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    /// Name used in log output.
    pub name: String,
    /// Restrict the worker to one tenant's jobs.
    pub tenant_id: Option<TenantId>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            name: "settlement-worker".to_string(),
            tenant_id: None,
        }
    }
}

impl WorkerConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }
}

/// Counters exposed by a running worker.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct WorkerStats {
    pub jobs_processed: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub jobs_dead_lettered: u64,
}

/// Handle to a spawned worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the thread to finish.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats.lock().unwrap().clone()
    }
}

/// Background worker over an injected queue client.
pub struct Worker {
    queue: Arc<dyn JobQueue>,
    handlers: HashMap<String, JobHandler>,
}

impl Worker {
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self {
            queue,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a kind pattern: an exact type name
    /// (`settlement.run`), a category prefix (`settlement.*`), or `*`.
    pub fn register_handler<F>(&mut self, kind_pattern: impl Into<String>, handler: F)
    where
        F: Fn(&Job) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(kind_pattern.into(), Box::new(handler));
    }

    fn handler_for(&self, type_name: &str) -> Option<&JobHandler> {
        if let Some(handler) = self.handlers.get(type_name) {
            return Some(handler);
        }
        for (pattern, handler) in &self.handlers {
            if let Some(prefix) = pattern.strip_suffix(".*") {
                if type_name.starts_with(prefix) {
                    return Some(handler);
                }
            }
        }
        self.handlers.get("*")
    }

    /// Claim and process at most one job, returning its resulting status
    /// (None when the queue had nothing ready). Exposed so tests (and
    /// cron-style callers) can drive the worker synchronously without a
    /// thread.
    pub fn tick(&self, tenant_id: Option<TenantId>) -> Result<Option<JobStatus>, JobQueueError> {
        let Some(mut job) = self.queue.claim_next(tenant_id)? else {
            return Ok(None);
        };

        let type_name = job.kind.type_name().to_string();
        debug!(job_id = %job.id, kind = %type_name, attempt = job.attempt, "processing job");

        match self.handler_for(&type_name) {
            Some(handler) => match handler(&job) {
                Ok(()) => {
                    job.mark_completed();
                    debug!(job_id = %job.id, "job completed");
                }
                Err(err) => {
                    warn!(job_id = %job.id, error = %err, "job attempt failed");
                    job.mark_failed(err.to_string());
                }
            },
            None => {
                error!(job_id = %job.id, kind = %type_name, "no handler registered");
                job.mark_failed(format!("no handler registered for kind '{type_name}'"));
            }
        }

        self.queue.update(&job)?;
        Ok(Some(job.status))
    }

    /// Spawn the polling loop in a background thread.
    pub fn spawn(self, config: WorkerConfig) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let stats = Arc::new(Mutex::new(WorkerStats::default()));
        let stats_inner = stats.clone();

        let join = thread::spawn(move || {
            info!(worker = %config.name, "worker started");
            loop {
                match shutdown_rx.recv_timeout(config.poll_interval) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }

                // Drain everything that is ready before sleeping again.
                loop {
                    match self.tick(config.tenant_id) {
                        Ok(Some(status)) => {
                            let mut s = stats_inner.lock().unwrap();
                            s.jobs_processed += 1;
                            match status {
                                JobStatus::Completed => s.jobs_succeeded += 1,
                                JobStatus::DeadLettered { .. } => s.jobs_dead_lettered += 1,
                                _ => s.jobs_failed += 1,
                            }
                        }
                        Ok(None) => break,
                        Err(err) => {
                            error!(worker = %config.name, error = %err, "queue error");
                            break;
                        }
                    }
                }
            }
            info!(worker = %config.name, "worker stopped");
        });

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
            stats,
        }
    }
}
