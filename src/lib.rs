//! `rxbusy` binds the lifecycle of a busy indicator to the lifecycle of a
//! push-based stream.
//!
//! Wrapping an [`Observable`] with [`ProgressIndicator::for_observable`] (or
//! [`ObservableExt::with_indicator`]) produces an observable that, for every
//! subscription:
//!
//! - shows an indicator through a [`Host`] when the subscription starts,
//! - forwards every item, the error and the completion of the source unchanged,
//! - dismisses the indicator exactly once, on whichever comes first of the source
//!   terminating, the user cancelling the indicator, the indicator being dismissed,
//!   or the subscription being unsubscribed,
//! - completes when the indicator is cancelled or dismissed before the source
//!   terminated.
//!
//! The bounded variant, [`ProgressIndicator::for_flowable`], additionally applies a
//! [`BackpressureStrategy`] to item delivery without changing when the indicator
//! is shown or dismissed.
//!
//! The crate never renders anything. A [`Host`] implementation owns the UI, shows an
//! [`Indicator`] and reports user cancels and dismissals back through callbacks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//!
//! use rxbusy::{
//!     indicator::Callback,
//!     subscribe::{Subscriber, Subscription},
//!     Host, Indicator, IndicatorError, Observable, Observer, ProgressIndicator, ShowOptions,
//!     Subscribeable,
//! };
//!
//! struct Console;
//!
//! struct Spinner(Mutex<Option<Callback>>);
//!
//! impl Indicator for Spinner {
//!     fn on_user_cancel(&self, _: Callback) {}
//!
//!     fn on_dismiss(&self, callback: Callback) {
//!         *self.0.lock().unwrap() = Some(callback);
//!     }
//!
//!     fn dispose(&self) -> Result<(), IndicatorError> {
//!         println!("[done]");
//!         Ok(())
//!     }
//! }
//!
//! impl Host for Console {
//!     fn show(&self, options: &ShowOptions) -> Result<Box<dyn Indicator>, IndicatorError> {
//!         println!("[{}]", options.message);
//!         Ok(Box::new(Spinner(Mutex::new(None))))
//!     }
//! }
//!
//! let source = Observable::new(|mut o: Subscriber<&'static str>| {
//!     o.next("A");
//!     o.complete();
//!     Subscription::empty()
//! });
//!
//! ProgressIndicator::new(Arc::new(Console))
//!     .with_message("Logging in...")
//!     .for_observable(source)
//!     .subscribe(Subscriber::on_next(|v| println!("{}", v)));
//! ```

mod errors;
pub mod indicator;
mod observable;
mod observer;
mod subscription;

pub use errors::*;
pub use indicator::{
    factory, HandleState, Host, Indicator, IndicatorConfig, IndicatorHandle, ProgressIndicator,
    ShowOptions, Text, DEFAULT_MESSAGE_KEY,
};
pub use observable::backpressure::{Backpressure, BackpressureStrategy, DEFAULT_CAPACITY};
pub use observable::{Observable, ObservableExt};
pub use observer::Observer;
pub use subscription::subscribe;
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};
