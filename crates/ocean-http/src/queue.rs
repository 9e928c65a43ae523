//! Bounded single-consumer queue for trace records.
//!
//! Publishing never waits on the consumer indefinitely: when the queue is
//! full the configured [`OverflowPolicy`] decides whether the oldest record
//! is evicted or the publisher waits a bounded time for space before
//! dropping the new record. Every dropped record is counted.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::warn;

use crate::record::TraceRecord;

/// What to do when a record is published into a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued record. Never blocks.
    #[default]
    DropOldest,
    /// Wait up to the given duration for space, then drop the new record.
    BlockWithTimeout(Duration),
}

/// Sizing and overflow behaviour for a trace stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceConfig {
    /// Maximum records held per stream.
    pub capacity: usize,
    /// Behaviour when the stream is full.
    pub overflow: OverflowPolicy,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            overflow: OverflowPolicy::default(),
        }
    }
}

impl TraceConfig {
    /// Default per-stream capacity.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Creates a config. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self {
            capacity: capacity.max(1),
            overflow,
        }
    }
}

/// Outcome of publishing one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The record was queued.
    Queued,
    /// The record was queued after evicting the oldest one.
    DisplacedOldest,
    /// The record was discarded.
    Dropped,
}

struct Shared {
    queue: Mutex<VecDeque<TraceRecord>>,
    capacity: usize,
    overflow: OverflowPolicy,
    /// Signalled when a record is pushed or the last sender goes away.
    items: Notify,
    /// Signalled when a record is popped or the receiver goes away.
    space: Notify,
    dropped: AtomicU64,
    senders: AtomicUsize,
    receiver_alive: AtomicBool,
}

impl Shared {
    fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Creates a connected sender/receiver pair.
#[must_use]
pub fn trace_queue(config: &TraceConfig) -> (TraceSender, TraceReceiver) {
    let shared = Arc::new(Shared {
        queue: Mutex::new(VecDeque::with_capacity(config.capacity.max(1))),
        capacity: config.capacity.max(1),
        overflow: config.overflow,
        items: Notify::new(),
        space: Notify::new(),
        dropped: AtomicU64::new(0),
        senders: AtomicUsize::new(1),
        receiver_alive: AtomicBool::new(true),
    });

    (
        TraceSender {
            shared: Arc::clone(&shared),
        },
        TraceReceiver { shared },
    )
}

/// Publishing end of a trace stream.
pub struct TraceSender {
    shared: Arc<Shared>,
}

impl TraceSender {
    /// Publishes a record according to the overflow policy.
    pub async fn send(&self, record: TraceRecord) -> Delivery {
        if !self.shared.receiver_alive.load(Ordering::Acquire) {
            self.shared.record_drop();
            return Delivery::Dropped;
        }

        match self.shared.overflow {
            OverflowPolicy::DropOldest => self.push_displacing(record),
            OverflowPolicy::BlockWithTimeout(limit) => self.push_waiting(record, limit).await,
        }
    }

    fn push_displacing(&self, record: TraceRecord) -> Delivery {
        let displaced = {
            let mut queue = self.shared.queue.lock();
            let displaced = if queue.len() >= self.shared.capacity {
                queue.pop_front()
            } else {
                None
            };
            queue.push_back(record);
            displaced
        };
        self.shared.items.notify_one();

        match displaced {
            Some(old) => {
                self.shared.record_drop();
                warn!(trace_id = %old.id, direction = %old.direction, "trace queue full, dropped oldest record");
                Delivery::DisplacedOldest
            }
            None => Delivery::Queued,
        }
    }

    async fn push_waiting(&self, record: TraceRecord, limit: Duration) -> Delivery {
        let deadline = tokio::time::Instant::now() + limit;

        loop {
            let space = self.shared.space.notified();
            {
                let mut queue = self.shared.queue.lock();
                if queue.len() < self.shared.capacity {
                    queue.push_back(record);
                    drop(queue);
                    self.shared.items.notify_one();
                    return Delivery::Queued;
                }
            }

            if !self.shared.receiver_alive.load(Ordering::Acquire)
                || tokio::time::timeout_at(deadline, space).await.is_err()
            {
                self.shared.record_drop();
                warn!(trace_id = %record.id, direction = %record.direction, "trace queue full, dropped record");
                return Delivery::Dropped;
            }
        }
    }

    /// Records discarded so far on this stream.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl Clone for TraceSender {
    fn clone(&self) -> Self {
        self.shared.senders.fetch_add(1, Ordering::AcqRel);
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for TraceSender {
    fn drop(&mut self) {
        if self.shared.senders.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.items.notify_one();
        }
    }
}

impl fmt::Debug for TraceSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceSender")
            .field("capacity", &self.shared.capacity)
            .field("overflow", &self.shared.overflow)
            .finish_non_exhaustive()
    }
}

/// Consuming end of a trace stream. There is exactly one per stream.
pub struct TraceReceiver {
    shared: Arc<Shared>,
}

impl TraceReceiver {
    /// Waits for the next record.
    ///
    /// Returns `None` once every sender is gone and the queue is drained.
    pub async fn recv(&mut self) -> Option<TraceRecord> {
        let shared = Arc::clone(&self.shared);
        loop {
            let items = shared.items.notified();

            if let Some(record) = self.try_recv() {
                return Some(record);
            }
            if shared.senders.load(Ordering::Acquire) == 0 {
                // A final push may have landed after the check above.
                return self.try_recv();
            }

            items.await;
        }
    }

    /// Takes the next record without waiting.
    pub fn try_recv(&mut self) -> Option<TraceRecord> {
        let record = self.shared.queue.lock().pop_front();
        if record.is_some() {
            self.shared.space.notify_one();
        }
        record
    }

    /// Number of records currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records discarded so far on this stream.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for TraceReceiver {
    fn drop(&mut self) {
        self.shared.receiver_alive.store(false, Ordering::Release);
        self.shared.space.notify_waiters();
    }
}

impl fmt::Debug for TraceReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceReceiver")
            .field("capacity", &self.shared.capacity)
            .field("queued", &self.len())
            .field("dropped", &self.dropped())
            .finish_non_exhaustive()
    }
}
