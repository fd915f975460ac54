//! Worker pool draining the review queue.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use critiq_analysis::{Analysis, AnalysisError, DocumentAnalyzer};
use critiq_core::ReviewId;
use critiq_ledger::{CreditLedger, TransactionKind};
use critiq_notify::NotificationEmitter;
use critiq_queue::{JobQueue, QueueEntry};
use critiq_review::{ReviewRecord, ReviewStore};

use crate::messages;
use crate::retry::RetryPolicy;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// How long a worker blocks on the queue before re-checking shutdown.
    pub claim_timeout: Duration,
    /// Retry policy for transient analysis failures.
    pub retry: RetryPolicy,
    /// Thread name prefix (logging).
    pub name: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            claim_timeout: Duration::from_millis(250),
            retry: RetryPolicy::default(),
            name: "review-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Shared collaborators a worker needs.
#[derive(Clone)]
pub struct WorkerDeps {
    pub ledger: Arc<dyn CreditLedger>,
    pub reviews: Arc<dyn ReviewStore>,
    pub queue: Arc<JobQueue>,
    pub emitter: NotificationEmitter,
    pub analyzer: Arc<dyn DocumentAnalyzer>,
}

#[derive(Debug, Default)]
struct WorkerStats {
    processed: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

/// Point-in-time copy of the pool's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatsSnapshot {
    /// Entries claimed and carried into `Processing`.
    pub processed: u64,
    pub completed: u64,
    pub failed: u64,
    /// Claims dropped before `Processing` (double-claim, vanished record).
    pub skipped: u64,
}

/// A bounded set of worker threads, each running claim → process.
///
/// Exactly one worker holds a given record at a time (the queue's claim is
/// atomic), so record mutation needs no further locking.
pub struct WorkerPool {
    queue: Arc<JobQueue>,
    handles: Vec<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl WorkerPool {
    /// Spawn `config.workers` threads draining the queue.
    pub fn spawn(config: WorkerPoolConfig, deps: WorkerDeps) -> Self {
        let stats = Arc::new(WorkerStats::default());
        let queue = deps.queue.clone();

        let handles = (0..config.workers)
            .map(|i| {
                let worker = Worker {
                    deps: deps.clone(),
                    config: config.clone(),
                    stats: stats.clone(),
                };
                thread::Builder::new()
                    .name(format!("{}-{i}", config.name))
                    .spawn(move || worker.run())
                    .expect("failed to spawn review worker thread")
            })
            .collect();

        info!(workers = config.workers, "worker pool started");
        WorkerPool {
            queue,
            handles,
            stats,
        }
    }

    pub fn stats(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            processed: self.stats.processed.load(Ordering::Relaxed),
            completed: self.stats.completed.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
            skipped: self.stats.skipped.load(Ordering::Relaxed),
        }
    }

    /// Graceful shutdown: close the queue so no new claims are handed out,
    /// let in-flight work finish, then join every worker.
    ///
    /// A worker killed mid-`process` (process death, not this shutdown)
    /// leaves its record stuck in `Processing`; with a non-durable queue
    /// that is a documented gap, not something shutdown can repair.
    pub fn shutdown(mut self) {
        info!("worker pool shutting down");
        self.queue.close();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("review worker panicked during shutdown");
            }
        }
        info!("worker pool stopped");
    }
}

struct Worker {
    deps: WorkerDeps,
    config: WorkerPoolConfig,
    stats: Arc<WorkerStats>,
}

impl Worker {
    fn run(&self) {
        debug!("review worker started");
        loop {
            match self.deps.queue.claim(self.config.claim_timeout) {
                Some(entry) => self.process(entry),
                None => {
                    if self.deps.queue.is_closed() {
                        break;
                    }
                    // Timed out with nothing to do; block again.
                }
            }
        }
        debug!("review worker stopped");
    }

    fn process(&self, entry: QueueEntry) {
        let review_id = entry.review_id;

        let mut record = match self.deps.reviews.get(review_id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!(%review_id, "claimed review no longer exists, dropping");
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Err(e) => {
                error!(%review_id, error = %e, "failed to load claimed review");
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        // Double-claim protection: only a Pending record enters Processing.
        if let Err(e) = record.start_processing() {
            warn!(%review_id, error = %e, "skipping already-claimed review");
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if let Err(e) = self.deps.reviews.update(&record) {
            error!(%review_id, error = %e, "failed to persist processing transition");
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.stats.processed.fetch_add(1, Ordering::Relaxed);
        self.notify(&record, messages::processing());

        match self.analyze_with_retry(review_id, &record.document_text) {
            Ok(analysis) => self.complete(record, analysis),
            Err(err) => self.fail(record, err),
        }
    }

    /// Call the analyzer, retrying transient failures with backoff.
    fn analyze_with_retry(
        &self,
        review_id: ReviewId,
        text: &str,
    ) -> Result<Analysis, AnalysisError> {
        let salt = jitter_salt(review_id);
        let mut attempt = 1u32;
        loop {
            match self.deps.analyzer.summarize(text) {
                Ok(analysis) => return Ok(analysis),
                Err(err) if err.is_transient() && self.config.retry.should_retry(attempt) => {
                    let delay = self.config.retry.delay_for_attempt(attempt, salt);
                    warn!(
                        %review_id,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "transient analysis failure, backing off"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn complete(&self, mut record: ReviewRecord, analysis: Analysis) {
        if let Err(e) = record.complete(analysis.report, analysis.score) {
            warn!(review_id = %record.id, error = %e, "completion rejected by state machine");
            return;
        }
        if let Err(e) = self.deps.reviews.update(&record) {
            error!(review_id = %record.id, error = %e, "failed to persist completed review");
            return;
        }
        self.stats.completed.fetch_add(1, Ordering::Relaxed);
        info!(review_id = %record.id, score = record.score, "review completed");
        self.notify(&record, messages::completed());
    }

    fn fail(&self, mut record: ReviewRecord, err: AnalysisError) {
        warn!(review_id = %record.id, error = %err, "review failed");
        if let Err(e) = record.fail() {
            warn!(review_id = %record.id, error = %e, "failure rejected by state machine");
            return;
        }
        if let Err(e) = self.deps.reviews.update(&record) {
            error!(review_id = %record.id, error = %e, "failed to persist failed review");
            return;
        }
        self.stats.failed.fetch_add(1, Ordering::Relaxed);

        // You only pay for a review you received: reverse the original debit.
        if let Err(e) = self.deps.ledger.credit(
            record.account_id,
            record.cost,
            TransactionKind::Refund,
            &format!("Refund for failed review of {}", record.document_name),
        ) {
            error!(
                review_id = %record.id,
                account_id = %record.account_id,
                error = %e,
                "failed to refund credits for failed review"
            );
        }

        self.notify(&record, messages::failed(&err.to_string()));
    }

    /// Best effort: a lost notification must not roll back the transition
    /// that triggered it.
    fn notify(&self, record: &ReviewRecord, message: String) {
        if let Err(e) = self
            .deps
            .emitter
            .emit(record.account_id, Some(record.id), message)
        {
            warn!(review_id = %record.id, error = %e, "failed to emit notification");
        }
    }
}

fn jitter_salt(review_id: ReviewId) -> u64 {
    let mut hasher = DefaultHasher::new();
    review_id.hash(&mut hasher);
    hasher.finish()
}
