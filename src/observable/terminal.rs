use std::sync::atomic::{AtomicU8, Ordering};

/// Why a binding ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TerminalReason {
    /// The source completed.
    Completed = 1,
    /// The source signalled an error.
    Errored,
    /// The bounded forwarding stage ran out of buffer.
    Overflow,
    /// The user cancelled the indicator.
    Cancelled,
    /// The indicator was dismissed.
    Dismissed,
    /// The downstream subscriber unsubscribed.
    Unsubscribed,
}

impl TerminalReason {
    fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(TerminalReason::Completed),
            2 => Some(TerminalReason::Errored),
            3 => Some(TerminalReason::Overflow),
            4 => Some(TerminalReason::Cancelled),
            5 => Some(TerminalReason::Dismissed),
            6 => Some(TerminalReason::Unsubscribed),
            _ => None,
        }
    }

    /// Whether the source may still be running and has to be told to stop.
    pub(crate) fn stops_source(self) -> bool {
        !matches!(self, TerminalReason::Completed | TerminalReason::Errored)
    }
}

const OPEN: u8 = 0;

/// Single-assignment slot holding the reason a binding ended.
///
/// Every termination path races on [`claim`](Self::claim); exactly one wins and
/// the others back off. No lock is taken, so claiming from inside a host callback
/// running on the UI context cannot block it.
#[derive(Debug, Default)]
pub(crate) struct TerminalGuard {
    slot: AtomicU8,
}

impl TerminalGuard {
    pub(crate) fn new() -> Self {
        TerminalGuard {
            slot: AtomicU8::new(OPEN),
        }
    }

    /// Records `reason` if no reason was recorded yet. Returns `true` for the
    /// winning claim only.
    pub(crate) fn claim(&self, reason: TerminalReason) -> bool {
        let won = self
            .slot
            .compare_exchange(OPEN, reason as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            tracing::debug!(?reason, "binding terminated");
        } else {
            tracing::trace!(?reason, winner = ?self.reason(), "termination already claimed");
        }
        won
    }

    pub(crate) fn reason(&self) -> Option<TerminalReason> {
        TerminalReason::from_u8(self.slot.load(Ordering::Acquire))
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.slot.load(Ordering::Acquire) != OPEN
    }
}
