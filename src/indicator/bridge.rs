//! Turns host cancel and dismiss callbacks into termination of a bound stream.

use super::IndicatorHandle;
use crate::observable::terminal::TerminalReason;

/// Wires the indicator behind `handle` to `fire`.
///
/// The dismiss callback is always registered. The user cancel callback only for
/// cancelable configurations, so cancelling a non-cancelable indicator never ends
/// the stream.
pub(crate) fn register<F>(handle: &IndicatorHandle, cancelable: bool, fire: F)
where
    F: Fn(TerminalReason) + Clone + Send + 'static,
{
    let indicator = handle.indicator();

    if cancelable {
        let on_cancel = fire.clone();
        indicator.on_user_cancel(Box::new(move || {
            tracing::debug!("indicator cancelled by user");
            on_cancel(TerminalReason::Cancelled);
        }));
    }
    indicator.on_dismiss(Box::new(move || {
        tracing::debug!("indicator dismissed");
        fire(TerminalReason::Dismissed);
    }));
}
