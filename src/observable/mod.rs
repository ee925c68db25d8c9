//! The `observable` module provides the `Observable` stream type and the operators
//! binding a stream to a busy indicator.

pub(crate) mod backpressure;
pub(crate) mod binding;
mod forward;
mod serialize;
pub(crate) mod terminal;

use std::sync::{Arc, Mutex, PoisonError};

use crate::indicator::ProgressIndicator;
use crate::observer::Observer;
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription};

use self::backpressure::Backpressure;

/// The `Observable` struct represents a source of values that can be observed
/// and transformed.
///
/// An `Observable` is cold: nothing happens until it is subscribed to, and every
/// subscription runs the subscribe function again. The subscribe function receives
/// the `Subscriber` and returns a `Subscription` carrying the unsubscribe logic and,
/// for asynchronous observables, a handle to await.
///
/// # Example: asynchronous `Observable` with `unsubscribe`
///
/// Emits a value after a delay on an OS thread, and stops early when unsubscribed.
///
/// ```no_run
/// use std::{
///     sync::{
///         atomic::{AtomicBool, Ordering},
///         Arc,
///     },
///     time::Duration,
/// };
///
/// use rxbusy::{
///     subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
///     Observable, Observer, Subscribeable,
/// };
///
/// let mut login = Observable::new(|mut o: Subscriber<String>| {
///     let cancelled = Arc::new(AtomicBool::new(false));
///     let cancelled_c = Arc::clone(&cancelled);
///
///     let join_handle = std::thread::spawn(move || {
///         std::thread::sleep(Duration::from_millis(2000));
///         if cancelled_c.load(Ordering::Acquire) {
///             return;
///         }
///         o.next("User id is 42".to_string());
///         o.complete();
///     });
///
///     Subscription::new(
///         UnsubscribeLogic::Logic(Box::new(move || cancelled.store(true, Ordering::Release))),
///         SubscriptionHandle::JoinThread(join_handle),
///     )
/// });
///
/// let subscription = login.subscribe(Subscriber::on_next(|id| println!("{}", id)));
/// if subscription.join().is_err() {
///     // Handle error
/// }
/// ```
pub struct Observable<T> {
    subscribe_fn: Box<dyn FnMut(Subscriber<T>) -> Subscription + Send + Sync>,
}

impl<T> Observable<T> {
    /// Creates a new `Observable` with the provided subscribe function.
    ///
    /// When the `Observable` is subscribed to, the `sf` function is invoked to manage
    /// the delivery of values to the `Subscriber`. It should also return a
    /// `Subscription` that enables unsubscribing and can be used for awaiting `Tokio`
    /// tasks or joining OS threads when the `Observable` is asynchronous.
    pub fn new(sf: impl FnMut(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Box::new(sf),
        }
    }
}

impl<T> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&mut self, v: Subscriber<Self::ObsType>) -> Subscription {
        (self.subscribe_fn)(v)
    }
}

/// The `ObservableExt` trait provides extension methods for observables, most
/// importantly the ones binding a stream to a busy indicator.
pub trait ObservableExt<T: 'static>: Subscribeable<ObsType = T> {
    /// Transforms the items emitted by the observable using a transformation
    /// function.
    ///
    /// The transformation function `f` is applied to each item emitted by the
    /// observable, and the resulting value is emitted by the resulting observable.
    fn map<U, F>(mut self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: (FnOnce(T) -> U) + Copy + Sync + Send + 'static,
        U: 'static,
    {
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let u = Subscriber::new(
                move |v| {
                    let t = f(v);
                    o_shared
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .next(t);
                },
                move |observable_error| {
                    o_cloned_e
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .error(observable_error);
                },
                move || {
                    o_cloned_c
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Shows a busy indicator for as long as each subscription lives.
    ///
    /// Every subscription shows its own indicator through the host of `indicator`
    /// and dismisses it exactly once, on whichever comes first:
    ///
    /// - the source completes or errors, in which case the event is forwarded
    ///   after the indicator is dismissed;
    /// - the user cancels the indicator (cancelable configurations only) or the
    ///   indicator is dismissed, in which case the source is unsubscribed and the
    ///   returned observable completes;
    /// - the returned `Subscription` is unsubscribed.
    ///
    /// If the host cannot show the indicator, the subscriber receives a single
    /// [`IndicatorError::HostUnavailable`] error and the source is never
    /// subscribed.
    ///
    /// [`IndicatorError::HostUnavailable`]: crate::IndicatorError::HostUnavailable
    fn with_indicator(self, indicator: &ProgressIndicator) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        T: Send,
    {
        binding::bind(self, Arc::clone(indicator.host()), indicator.config().clone())
    }

    /// Same as [`with_indicator`](Self::with_indicator), with a backpressure policy
    /// governing how items reach a subscriber slower than the source.
    ///
    /// The policy never changes when the indicator is shown or dismissed. With the
    /// buffered strategies the indicator is dismissed as soon as the source
    /// terminates, while the remaining buffered items and the terminal event are
    /// still delivered. The returned `Subscription` joins the thread delivering
    /// them.
    fn with_indicator_bounded(
        self,
        indicator: &ProgressIndicator,
        backpressure: impl Into<Backpressure>,
    ) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        T: Send,
    {
        binding::bind_bounded(
            self,
            Arc::clone(indicator.host()),
            indicator.config().clone(),
            backpressure.into(),
        )
    }
}

impl<O, T: 'static> ObservableExt<T> for O where O: Subscribeable<ObsType = T> {}
