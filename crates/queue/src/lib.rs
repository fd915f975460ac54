//! `critiq-queue` — in-process FIFO dispatch queue.
//!
//! At-least-once, non-durable: entries live in memory only, and an entry
//! claimed by a worker that dies mid-flight is gone. Crash-safe dispatch
//! requires persisting the queue, which this core intentionally does not do.

pub mod queue;

pub use queue::{JobQueue, QueueClosed, QueueEntry};
