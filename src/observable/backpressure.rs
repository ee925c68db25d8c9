//! Bounded delivery for bound streams whose subscriber may not keep pace with the
//! source.

use std::{
    collections::VecDeque,
    error::Error,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::JoinHandle,
};

use super::forward::{Forward, Terminal};
use crate::{observer::Observer, subscribe::Subscriber, IndicatorError};

/// Buffer size used when none is given.
pub const DEFAULT_CAPACITY: usize = 128;

/// What happens to items a slow subscriber cannot take yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackpressureStrategy {
    /// Buffer every item, without limit.
    Buffer,
    /// Drop the newest item while the buffer is full.
    Drop,
    /// Overwrite the newest buffered item while the buffer is full, so the latest
    /// item is always delivered.
    Latest,
    /// Fail the stream with [`IndicatorError::MissingBackpressure`] once the buffer
    /// is full.
    Error,
    /// No buffering. Items are delivered on the source's own context and the
    /// subscriber is expected to handle demand itself.
    Missing,
}

/// A backpressure policy and the buffer size it applies to.
///
/// ```
/// use rxbusy::{Backpressure, BackpressureStrategy};
///
/// let policy = Backpressure::from(BackpressureStrategy::Drop).with_capacity(16);
/// assert_eq!(policy.capacity, 16);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Backpressure {
    /// What happens once the buffer is full.
    pub strategy: BackpressureStrategy,
    /// Number of items held for the subscriber before `strategy` applies. Ignored
    /// by [`Buffer`](BackpressureStrategy::Buffer), which never bounds its queue,
    /// and by [`Missing`](BackpressureStrategy::Missing), which does not buffer.
    pub capacity: usize,
}

impl Backpressure {
    /// A policy for `strategy` with [`DEFAULT_CAPACITY`].
    pub fn new(strategy: BackpressureStrategy) -> Self {
        Backpressure {
            strategy,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Sets the buffer size. Sizes below one are raised to one.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}

impl From<BackpressureStrategy> for Backpressure {
    fn from(strategy: BackpressureStrategy) -> Self {
        Backpressure::new(strategy)
    }
}

enum End {
    Complete,
    Error(Arc<dyn Error + Send + Sync>),
}

struct Pending<T> {
    items: VecDeque<T>,
    end: Option<End>,
    closed: bool,
    detached: bool,
    dropped: u64,
}

/// Buffer between the source and a drain thread feeding the subscriber at its own
/// pace.
pub(crate) struct BackpressureBuffer<T> {
    strategy: BackpressureStrategy,
    capacity: usize,
    pending: Mutex<Pending<T>>,
    ready: Condvar,
}

impl<T: Send + 'static> BackpressureBuffer<T> {
    pub(crate) fn new(backpressure: Backpressure) -> Self {
        BackpressureBuffer {
            strategy: backpressure.strategy,
            capacity: backpressure.capacity.max(1),
            pending: Mutex::new(Pending {
                items: VecDeque::new(),
                end: None,
                closed: false,
                detached: false,
                dropped: 0,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Pending<T>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts the thread delivering buffered events to `downstream`. The thread
    /// ends after delivering the terminal event, or when the buffer is detached.
    pub(crate) fn spawn_drain(buffer: Arc<Self>, downstream: Subscriber<T>) -> JoinHandle<()> {
        std::thread::spawn(move || buffer.drain(downstream))
    }

    fn drain(&self, mut downstream: Subscriber<T>) {
        loop {
            let next = {
                let mut pending = self.lock();
                loop {
                    if pending.detached {
                        return;
                    }
                    if let Some(item) = pending.items.pop_front() {
                        break Ok(item);
                    }
                    if let Some(end) = pending.end.take() {
                        break Err(end);
                    }
                    pending = self.ready.wait(pending).unwrap_or_else(PoisonError::into_inner);
                }
            };

            match next {
                Ok(item) => downstream.next(item),
                Err(End::Complete) => return downstream.complete(),
                Err(End::Error(e)) => return downstream.error(e),
            }
        }
    }
}

impl<T: Send + 'static> Forward<T> for BackpressureBuffer<T> {
    fn item(&self, value: T) -> Result<(), IndicatorError> {
        let mut pending = self.lock();
        if pending.closed {
            return Ok(());
        }

        if pending.items.len() < self.capacity {
            pending.items.push_back(value);
        } else {
            match self.strategy {
                BackpressureStrategy::Buffer | BackpressureStrategy::Missing => {
                    pending.items.push_back(value);
                }
                BackpressureStrategy::Drop => {
                    pending.dropped += 1;
                    tracing::trace!(capacity = self.capacity, "buffer full, item dropped");
                    return Ok(());
                }
                BackpressureStrategy::Latest => {
                    pending.dropped += 1;
                    match pending.items.back_mut() {
                        Some(newest) => *newest = value,
                        None => pending.items.push_back(value),
                    }
                }
                BackpressureStrategy::Error => {
                    return Err(IndicatorError::MissingBackpressure {
                        capacity: self.capacity,
                    });
                }
            }
        }

        drop(pending);
        self.ready.notify_one();
        Ok(())
    }

    fn terminate(&self, terminal: Terminal) {
        let mut pending = self.lock();
        if pending.closed {
            return;
        }
        pending.closed = true;
        if pending.dropped > 0 {
            tracing::debug!(
                dropped = pending.dropped,
                strategy = ?self.strategy,
                "items discarded by backpressure"
            );
        }

        match terminal {
            Terminal::Complete => pending.end = Some(End::Complete),
            Terminal::Error(e) => pending.end = Some(End::Error(e)),
            Terminal::Interrupt => {
                pending.items.clear();
                pending.end = Some(End::Complete);
            }
            Terminal::Detach => {
                pending.items.clear();
                pending.detached = true;
            }
        }

        drop(pending);
        self.ready.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    fn slow_recording(delay: Duration) -> (Subscriber<u32>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let (l1, l2, l3) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));
        let subscriber = Subscriber::new(
            move |v| {
                std::thread::sleep(delay);
                l1.lock().unwrap().push(format!("next {v}"));
            },
            move |e| l2.lock().unwrap().push(format!("error {e}")),
            move || l3.lock().unwrap().push("complete".into()),
        );
        (subscriber, log)
    }

    fn fill(buffer: &BackpressureBuffer<u32>, n: u32) -> Result<(), IndicatorError> {
        (0..n).try_for_each(|i| buffer.item(i))
    }

    #[test]
    fn capacity_is_at_least_one() {
        assert_eq!(Backpressure::new(BackpressureStrategy::Drop).with_capacity(0).capacity, 1);
        assert_eq!(Backpressure::from(BackpressureStrategy::Buffer).capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn drop_keeps_the_oldest_items() {
        let buffer = BackpressureBuffer::new(Backpressure::new(BackpressureStrategy::Drop).with_capacity(3));
        fill(&buffer, 10).unwrap();
        assert_eq!(buffer.lock().items, [0, 1, 2]);
        assert_eq!(buffer.lock().dropped, 7);
    }

    #[test]
    fn latest_overwrites_the_newest_item() {
        let buffer = BackpressureBuffer::new(Backpressure::new(BackpressureStrategy::Latest).with_capacity(3));
        fill(&buffer, 10).unwrap();
        assert_eq!(buffer.lock().items, [0, 1, 9]);
    }

    #[test]
    fn buffer_ignores_capacity() {
        let buffer = BackpressureBuffer::new(Backpressure::new(BackpressureStrategy::Buffer).with_capacity(3));
        fill(&buffer, 10).unwrap();
        assert_eq!(buffer.lock().items.len(), 10);
    }

    #[test]
    fn error_refuses_overflow() {
        let buffer = BackpressureBuffer::new(Backpressure::new(BackpressureStrategy::Error).with_capacity(3));
        let err = fill(&buffer, 10).unwrap_err();
        assert!(matches!(err, IndicatorError::MissingBackpressure { capacity: 3 }));
        assert_eq!(buffer.lock().items.len(), 3);
    }

    #[test]
    fn drain_delivers_buffered_items_before_completion() {
        let (subscriber, log) = slow_recording(Duration::from_millis(1));
        let buffer = Arc::new(BackpressureBuffer::new(Backpressure::new(BackpressureStrategy::Buffer)));

        fill(&buffer, 5).unwrap();
        buffer.terminate(Terminal::Complete);
        buffer.item(99).unwrap();

        BackpressureBuffer::spawn_drain(Arc::clone(&buffer), subscriber)
            .join()
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["next 0", "next 1", "next 2", "next 3", "next 4", "complete"]
        );
    }

    #[test]
    fn interrupt_discards_buffered_items() {
        let (subscriber, log) = slow_recording(Duration::ZERO);
        let buffer = Arc::new(BackpressureBuffer::new(Backpressure::new(BackpressureStrategy::Buffer)));

        fill(&buffer, 5).unwrap();
        buffer.terminate(Terminal::Interrupt);

        BackpressureBuffer::spawn_drain(Arc::clone(&buffer), subscriber)
            .join()
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["complete"]);
    }

    #[test]
    fn detach_stops_the_drain_thread() {
        let (subscriber, log) = slow_recording(Duration::ZERO);
        let buffer = Arc::new(BackpressureBuffer::new(Backpressure::new(BackpressureStrategy::Buffer)));

        let worker = BackpressureBuffer::spawn_drain(Arc::clone(&buffer), subscriber);
        buffer.terminate(Terminal::Detach);
        worker.join().unwrap();

        assert!(log.lock().unwrap().is_empty());
    }
}
