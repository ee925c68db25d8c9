use std::{
    fmt::Display,
    sync::{Arc, Mutex},
    time::Duration,
};

use rxbusy::subscribe::Subscriber;
use tokio::time::Instant;

/// Ordered log of everything the host and the subscriber observed, with the time
/// elapsed since the timeline was created.
pub struct Timeline {
    start: Instant,
    entries: Mutex<Vec<(Duration, String)>>,
}

impl Timeline {
    pub fn new() -> Arc<Self> {
        Arc::new(Timeline {
            start: Instant::now(),
            entries: Mutex::new(Vec::new()),
        })
    }

    pub fn record(&self, what: impl Into<String>) {
        let at = self.start.elapsed();
        self.entries.lock().unwrap().push((at, what.into()));
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, what)| what.clone())
            .collect()
    }

    /// Time of the first entry equal to `what`.
    pub fn at(&self, what: &str) -> Option<Duration> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(_, w)| w == what)
            .map(|(at, _)| *at)
    }

    pub fn count(&self, what: &str) -> usize {
        self.entries().iter().filter(|w| *w == what).count()
    }

    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|w| w.starts_with(prefix))
            .count()
    }

    pub fn position(&self, what: &str) -> Option<usize> {
        self.entries().iter().position(|w| w == what)
    }

    /// A subscriber logging `next <v>`, `error <e>` and `complete`.
    pub fn subscriber<T: Display + 'static>(self: &Arc<Self>) -> Subscriber<T> {
        let (t1, t2, t3) = (Arc::clone(self), Arc::clone(self), Arc::clone(self));
        Subscriber::new(
            move |v: T| t1.record(format!("next {}", v)),
            move |e| t2.record(format!("error {}", e)),
            move || t3.record("complete"),
        )
    }
}
