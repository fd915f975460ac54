use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use critiq_core::ReviewId;

/// A queued unit of work: a stable reference to a review record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    pub review_id: ReviewId,
    pub enqueued_at: DateTime<Utc>,
}

/// Returned when work is offered to a queue that has been shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("queue is closed")]
pub struct QueueClosed;

#[derive(Debug, Default)]
struct QueueState {
    entries: VecDeque<QueueEntry>,
    closed: bool,
}

/// Unbounded FIFO queue of pending reviews.
///
/// - `enqueue` never blocks the submitting caller (the debit already
///   happened synchronously; memory is the only bound).
/// - A claim pops the head inside one critical section, so no two workers
///   can dispatch the same review.
/// - Blocked claimers wait on a condvar rather than poll-sleeping.
#[derive(Debug, Default)]
pub struct JobQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a review to the tail and wake one waiting worker.
    pub fn enqueue(&self, review_id: ReviewId) -> Result<(), QueueClosed> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(QueueClosed);
        }
        state.entries.push_back(QueueEntry {
            review_id,
            enqueued_at: Utc::now(),
        });
        drop(state);
        self.available.notify_one();
        Ok(())
    }

    /// Block up to `timeout` for the next entry.
    ///
    /// Returns `None` on timeout or once the queue is closed. The pop *is*
    /// the claim: the entry is out of the queue the moment this returns.
    pub fn claim(&self, timeout: Duration) -> Option<QueueEntry> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        loop {
            if state.closed {
                return None;
            }
            if let Some(entry) = state.entries.pop_front() {
                return Some(entry);
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let (next, wait) = self.available.wait_timeout(state, remaining).unwrap();
            state = next;
            if wait.timed_out() {
                if state.closed {
                    return None;
                }
                return state.entries.pop_front();
            }
        }
    }

    /// Non-blocking claim.
    pub fn try_claim(&self) -> Option<QueueEntry> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return None;
        }
        state.entries.pop_front()
    }

    /// Number of entries waiting to be claimed.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting work and claims, and wake every blocked claimer.
    ///
    /// Entries still queued are abandoned; their records stay `Pending`.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        drop(state);
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;

    #[test]
    fn claims_come_out_in_enqueue_order() {
        let queue = JobQueue::new();
        let ids: Vec<_> = (0..3).map(|_| ReviewId::new()).collect();
        for id in &ids {
            queue.enqueue(*id).unwrap();
        }

        for id in &ids {
            assert_eq!(queue.try_claim().unwrap().review_id, *id);
        }
        assert!(queue.try_claim().is_none());
    }

    #[test]
    fn one_entry_is_claimed_by_exactly_one_of_two_racers() {
        let queue = Arc::new(JobQueue::new());
        queue.enqueue(ReviewId::new()).unwrap();

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let queue = queue.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    queue.try_claim().is_some()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();
        assert_eq!(winners, 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn blocked_claim_wakes_on_enqueue() {
        let queue = Arc::new(JobQueue::new());
        let waiter = {
            let queue = queue.clone();
            thread::spawn(move || queue.claim(Duration::from_secs(5)))
        };

        // Give the waiter a moment to block, then feed it.
        thread::sleep(Duration::from_millis(20));
        let id = ReviewId::new();
        queue.enqueue(id).unwrap();

        let entry = waiter.join().unwrap().expect("waiter should get the entry");
        assert_eq!(entry.review_id, id);
    }

    #[test]
    fn claim_times_out_on_an_empty_queue() {
        let queue = JobQueue::new();
        assert!(queue.claim(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn close_wakes_blocked_claimers_and_rejects_new_work() {
        let queue = Arc::new(JobQueue::new());
        let waiter = {
            let queue = queue.clone();
            thread::spawn(move || queue.claim(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();

        assert!(waiter.join().unwrap().is_none());
        assert_eq!(queue.enqueue(ReviewId::new()), Err(QueueClosed));
        assert!(queue.try_claim().is_none());
    }

    #[test]
    fn entries_left_at_close_are_abandoned() {
        let queue = JobQueue::new();
        queue.enqueue(ReviewId::new()).unwrap();
        queue.close();

        // Closed queues hand out nothing, even with entries still inside.
        assert!(queue.try_claim().is_none());
        assert_eq!(queue.len(), 1);
    }
}
