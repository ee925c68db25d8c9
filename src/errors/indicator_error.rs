use thiserror::Error;

/// Errors raised by the indicator lifecycle.
///
/// Errors signalled by a wrapped source stream are not wrapped in this type, they
/// reach the downstream subscriber as the very same `Arc` the source emitted.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// The host can no longer show UI, for example because its window was torn
    /// down. Delivered as the only event of the subscription.
    #[error("host unavailable: {reason}")]
    HostUnavailable { reason: String },

    /// The host failed to dispose a shown indicator. Never delivered downstream,
    /// only logged.
    #[error("failed to dispose indicator: {reason}")]
    DisposeFailed { reason: String },

    /// The `Error` backpressure strategy found its buffer full.
    #[error("could not emit value due to lack of requests, buffer of {capacity} is full")]
    MissingBackpressure { capacity: usize },
}

impl IndicatorError {
    /// Creates a [`HostUnavailable`](Self::HostUnavailable) error with the given reason.
    pub fn host_unavailable(reason: impl Into<String>) -> Self {
        IndicatorError::HostUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a [`DisposeFailed`](Self::DisposeFailed) error with the given reason.
    pub fn dispose_failed(reason: impl Into<String>) -> Self {
        IndicatorError::DisposeFailed {
            reason: reason.into(),
        }
    }
}
