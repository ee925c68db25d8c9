//! Shows and disposes indicators on behalf of a binding.

use std::sync::Arc;

use super::{Host, IndicatorConfig, IndicatorHandle};
use crate::IndicatorError;

/// Shows an indicator for `config` on `host`.
///
/// # Errors
///
/// Fails with [`IndicatorError::HostUnavailable`] when the host cannot show UI.
/// Any other error reported by `show` is reported as `HostUnavailable` as well.
pub fn acquire(config: &IndicatorConfig, host: &Arc<dyn Host>) -> Result<IndicatorHandle, IndicatorError> {
    let options = config.resolve(host.as_ref());

    match host.show(&options) {
        Ok(indicator) => {
            tracing::debug!(
                message = %options.message,
                cancelable = options.cancelable,
                determinate = options.determinate,
                "indicator shown"
            );
            Ok(IndicatorHandle::new(indicator, Arc::clone(host)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "indicator could not be shown");
            match e {
                e @ IndicatorError::HostUnavailable { .. } => Err(e),
                other => Err(IndicatorError::host_unavailable(other.to_string())),
            }
        }
    }
}

/// Disposes the indicator behind `handle`. Safe to call any number of times, only
/// the first call has an effect and returns `true`.
pub fn release(handle: &IndicatorHandle) -> bool {
    handle.release()
}
