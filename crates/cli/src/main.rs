//! Demo driver: wires the in-memory stack end to end.
//!
//! Registers an account, submits a couple of sample documents against the
//! canned analyzer, waits for the workers to finish, and prints the ledger
//! and notification feed.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use critiq_analysis::{CannedAnalyzer, PlainTextExtractor};
use critiq_ledger::InMemoryCreditLedger;
use critiq_notify::{InMemoryNotificationStore, NotificationEmitter};
use critiq_pipeline::{Coordinator, WorkerDeps, WorkerPool, WorkerPoolConfig};
use critiq_queue::JobQueue;
use critiq_review::InMemoryReviewStore;

const SAMPLE_CV: &str = "Jane Doe\nSoftware Engineer\n\n\
    Experience: 6 years building data pipelines.\n\
    Skills: Rust, SQL, distributed systems.";

const SAMPLE_NOTES: &str = "# Project notes\n\nShipped the billing migration ahead of schedule.";

fn main() -> Result<()> {
    critiq_observability::init();

    let workers = std::env::var("CRITIQ_WORKERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4);

    let ledger = InMemoryCreditLedger::arc();
    let reviews = InMemoryReviewStore::arc();
    let queue = Arc::new(JobQueue::new());
    let notifications = InMemoryNotificationStore::arc();

    let coordinator = Coordinator::new(
        ledger.clone(),
        reviews.clone(),
        queue.clone(),
        notifications.clone(),
        Arc::new(PlainTextExtractor),
    );
    let pool = WorkerPool::spawn(
        WorkerPoolConfig::default().with_workers(workers),
        WorkerDeps {
            ledger: ledger.clone(),
            reviews,
            queue,
            emitter: NotificationEmitter::new(notifications),
            analyzer: Arc::new(CannedAnalyzer::mock_review()),
        },
    );

    let account = coordinator.register_account()?;
    tracing::info!(%account, balance = coordinator.balance(account)?, "demo account ready");

    let submissions = [
        ("cv-jane.txt", SAMPLE_CV),
        ("notes.md", SAMPLE_NOTES),
    ];
    let mut ids = Vec::new();
    for (name, body) in submissions {
        ids.push(coordinator.submit(account, name, body.as_bytes())?);
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    for id in &ids {
        loop {
            let record = coordinator.get_review(*id)?;
            if record.status.is_terminal() {
                println!(
                    "{} -> {} (score: {})",
                    record.document_name,
                    record.status,
                    record
                        .score
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                break;
            }
            if Instant::now() > deadline {
                bail!("review {id} did not finish in time");
            }
            thread::sleep(Duration::from_millis(25));
        }
    }

    pool.shutdown();

    println!("\nbalance: {}", coordinator.balance(account)?);
    for tx in coordinator.transactions(account)? {
        println!("  {:?} {:+} {}", tx.kind, tx.amount, tx.description);
    }

    println!("\nnotifications:");
    for n in coordinator.list_notifications(account, false)? {
        println!("  [{}] {}", if n.read { "read" } else { "new" }, n.message);
    }

    Ok(())
}
