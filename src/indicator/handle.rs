use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use super::{Host, Indicator};

/// Lifecycle state of an [`IndicatorHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// Shown, not yet disposed.
    Active,
    /// Disposed. Terminal.
    Disposed,
}

/// A shown busy indicator.
///
/// The handle goes from `Active` to `Disposed` exactly once. Releasing an already
/// disposed handle is a no-op. The handle keeps its host alive while active, and a
/// handle dropped while still active disposes its indicator.
///
/// Clones share the same indicator.
#[derive(Clone)]
pub struct IndicatorHandle {
    inner: Arc<Inner>,
}

struct Inner {
    disposed: AtomicBool,
    indicator: Box<dyn Indicator>,
    _host: Arc<dyn Host>,
}

impl Inner {
    fn dispose_once(&self) -> bool {
        if self
            .disposed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("indicator already disposed");
            return false;
        }
        match self.indicator.dispose() {
            Ok(()) => tracing::debug!("indicator released"),
            Err(e) => tracing::warn!(error = %e, "indicator released with a dispose failure"),
        }
        true
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if !*self.disposed.get_mut() {
            tracing::debug!("indicator handle dropped while active");
            self.dispose_once();
        }
    }
}

impl IndicatorHandle {
    pub(crate) fn new(indicator: Box<dyn Indicator>, host: Arc<dyn Host>) -> Self {
        IndicatorHandle {
            inner: Arc::new(Inner {
                disposed: AtomicBool::new(false),
                indicator,
                _host: host,
            }),
        }
    }

    /// Current lifecycle state of the indicator.
    pub fn state(&self) -> HandleState {
        if self.is_disposed() {
            HandleState::Disposed
        } else {
            HandleState::Active
        }
    }

    /// Returns `true` once the indicator has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Disposes the indicator. Returns `true` only for the call that performed the
    /// disposal; every later call does nothing and returns `false`.
    ///
    /// A dispose failure reported by the host is logged and otherwise ignored.
    pub fn release(&self) -> bool {
        self.inner.dispose_once()
    }

    pub(crate) fn indicator(&self) -> &dyn Indicator {
        self.inner.indicator.as_ref()
    }
}

impl fmt::Debug for IndicatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorHandle")
            .field("state", &self.state())
            .finish()
    }
}
