use std::{error::Error, sync::Arc};

use crate::IndicatorError;

/// How a forwarding stage ends.
pub(crate) enum Terminal {
    /// Complete after every pending item was delivered.
    Complete,
    /// Error after every pending item was delivered.
    Error(Arc<dyn Error + Send + Sync>),
    /// Drop pending items and complete right away.
    Interrupt,
    /// Drop pending items and deliver nothing else.
    Detach,
}

/// The stage between a binding and its downstream subscriber.
pub(crate) trait Forward<T>: Send + Sync {
    /// Hands an item to the stage.
    ///
    /// # Errors
    ///
    /// The stage refuses the item and asks the binding to fail, e.g. because its
    /// buffer overflowed.
    fn item(&self, value: T) -> Result<(), IndicatorError>;

    /// Ends the stage. Only the first call has an effect.
    fn terminate(&self, terminal: Terminal);
}

impl<T, F: Forward<T> + ?Sized> Forward<T> for Arc<F> {
    fn item(&self, value: T) -> Result<(), IndicatorError> {
        (**self).item(value)
    }

    fn terminate(&self, terminal: Terminal) {
        (**self).terminate(terminal);
    }
}
