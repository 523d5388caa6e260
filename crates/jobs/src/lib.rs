//! Background job queue for settlement and invoicing work.
//!
//! The calculation crates are pure; everything that must happen *later* or
//! *again* — settlement runs, invoice generation — goes through this queue.
//! There is no global service instance: callers construct a [`JobService`]
//! around an explicitly injected [`JobQueue`] client.

pub mod queue;
pub mod service;
pub mod types;
pub mod worker;

pub use queue::{InMemoryJobQueue, JobQueue, JobQueueError, QueueStats};
pub use service::JobService;
pub use types::{BackoffStrategy, Job, JobId, JobKind, JobStatus, RetryPolicy};
pub use worker::{Worker, WorkerConfig, WorkerHandle, WorkerStats};
