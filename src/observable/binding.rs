//! Wraps a source stream so that each subscription shows a busy indicator for
//! exactly as long as it lives.

use std::{
    error::Error,
    marker::PhantomData,
    panic,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::JoinHandle as ThreadJoinHandle,
};

use tokio::runtime;

use super::{
    backpressure::{Backpressure, BackpressureBuffer, BackpressureStrategy},
    forward::{Forward, Terminal},
    serialize::Serializer,
    terminal::{TerminalGuard, TerminalReason},
};
use crate::{
    indicator::{bridge, factory, Host, IndicatorConfig, IndicatorHandle},
    observer::Observer,
    subscribe::{
        Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
        Unsubscribeable,
    },
    Observable,
};

/// State shared by everything taking part in one subscription: the source's
/// subscriber, the indicator callbacks and the returned `Subscription`.
struct Binding<T, F: Forward<T>> {
    guard: TerminalGuard,
    handle: IndicatorHandle,
    forward: F,
    source: Mutex<Option<Subscription>>,
    _item: PhantomData<fn(T)>,
}

impl<T, F> Binding<T, F>
where
    T: Send + 'static,
    F: Forward<T> + 'static,
{
    fn new(handle: IndicatorHandle, forward: F) -> Self {
        Binding {
            guard: TerminalGuard::new(),
            handle,
            forward,
            source: Mutex::new(None),
            _item: PhantomData,
        }
    }

    fn lock_source(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.source.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next(&self, v: T) {
        if self.guard.is_terminated() {
            return;
        }
        if let Err(e) = self.forward.item(v) {
            self.finish(TerminalReason::Overflow, Terminal::Error(Arc::new(e)));
        }
    }

    fn error(&self, e: Arc<dyn Error + Send + Sync>) {
        self.finish(TerminalReason::Errored, Terminal::Error(e));
    }

    fn complete(&self) {
        self.finish(TerminalReason::Completed, Terminal::Complete);
    }

    /// Host cancel or dismiss, seen downstream as a completion.
    fn interrupt(&self, reason: TerminalReason) {
        self.finish(reason, Terminal::Interrupt);
    }

    fn unsubscribe(&self) {
        self.finish(TerminalReason::Unsubscribed, Terminal::Detach);
    }

    fn finish(&self, reason: TerminalReason, terminal: Terminal) {
        if !self.guard.claim(reason) {
            return;
        }
        self.handle.release();

        let source = self.lock_source().take();
        if let (Some(source), true) = (source, reason.stops_source()) {
            source.unsubscribe();
        }

        self.forward.terminate(terminal);
    }

    /// Keeps the source's subscription for a later unsubscribe, or unsubscribes it
    /// right away when the binding was already stopped from outside.
    fn attach_source(&self, subscription: Subscription) {
        let mut slot = self.lock_source();
        match self.guard.reason() {
            None => *slot = Some(subscription),
            Some(reason) if reason.stops_source() => {
                drop(slot);
                subscription.unsubscribe();
            }
            Some(_) => (),
        }
    }

    /// Wires the indicator callbacks, then subscribes to `source`. Returns the
    /// source's join handle.
    fn connect<S>(self: &Arc<Self>, source: &mut S, cancelable: bool) -> SubscriptionHandle
    where
        S: Subscribeable<ObsType = T>,
    {
        let weak = Arc::downgrade(self);
        bridge::register(&self.handle, cancelable, move |reason| {
            if let Some(binding) = weak.upgrade() {
                binding.interrupt(reason);
            }
        });

        if self.guard.is_terminated() {
            // Dismissed while the callbacks were being wired.
            return SubscriptionHandle::Nil;
        }

        let on_next = Arc::clone(self);
        let on_error = Arc::clone(self);
        let on_complete = Arc::clone(self);
        let mut subscription = source.subscribe(Subscriber::new(
            move |v| on_next.next(v),
            move |e| on_error.error(e),
            move || on_complete.complete(),
        ));

        let handle = subscription.take_handle();
        self.attach_source(subscription);
        handle
    }

    fn into_subscription(self: Arc<Self>, handle: SubscriptionHandle) -> Subscription {
        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || self.unsubscribe())),
            handle,
        )
    }
}

impl<T, F: Forward<T>> Drop for Binding<T, F> {
    fn drop(&mut self) {
        // Nobody can signal this binding anymore, let a drain thread go.
        self.forward.terminate(Terminal::Detach);
    }
}

/// Shows the indicator, or reports `HostUnavailable` as the only event of
/// `downstream`.
fn acquire_or_fail<T>(
    config: &IndicatorConfig,
    host: &Arc<dyn Host>,
    downstream: &mut Subscriber<T>,
) -> Option<IndicatorHandle> {
    match factory::acquire(config, host) {
        Ok(handle) => Some(handle),
        Err(e) => {
            downstream.error(Arc::new(e));
            None
        }
    }
}

fn bind_serialized<T, S>(
    source: &mut S,
    handle: IndicatorHandle,
    downstream: Subscriber<T>,
    cancelable: bool,
) -> Subscription
where
    T: Send + 'static,
    S: Subscribeable<ObsType = T>,
{
    let binding = Arc::new(Binding::new(handle, Serializer::new(downstream)));
    let source_handle = binding.connect(source, cancelable);
    binding.into_subscription(source_handle)
}

/// Unbounded variant: events are forwarded on the context the source emits on.
pub(crate) fn bind<T, S>(mut source: S, host: Arc<dyn Host>, config: IndicatorConfig) -> Observable<T>
where
    T: Send + 'static,
    S: Subscribeable<ObsType = T> + Send + Sync + 'static,
{
    Observable::new(move |mut downstream: Subscriber<T>| {
        let Some(handle) = acquire_or_fail(&config, &host, &mut downstream) else {
            return Subscription::empty();
        };
        bind_serialized(&mut source, handle, downstream, config.cancelable)
    })
}

/// Bounded variant: buffered strategies deliver from a drain thread, and the
/// returned `Subscription` joins that thread together with the source's own work.
pub(crate) fn bind_bounded<T, S>(
    mut source: S,
    host: Arc<dyn Host>,
    config: IndicatorConfig,
    backpressure: Backpressure,
) -> Observable<T>
where
    T: Send + 'static,
    S: Subscribeable<ObsType = T> + Send + Sync + 'static,
{
    Observable::new(move |mut downstream: Subscriber<T>| {
        let Some(handle) = acquire_or_fail(&config, &host, &mut downstream) else {
            return Subscription::empty();
        };

        if backpressure.strategy == BackpressureStrategy::Missing {
            return bind_serialized(&mut source, handle, downstream, config.cancelable);
        }

        let buffer = Arc::new(BackpressureBuffer::new(backpressure));
        let drain = BackpressureBuffer::spawn_drain(Arc::clone(&buffer), downstream);

        let binding = Arc::new(Binding::new(handle, buffer));
        let source_handle = binding.connect(&mut source, config.cancelable);
        binding.into_subscription(join_both(source_handle, drain))
    })
}

/// One handle awaiting both the source's background work and the drain thread.
/// A panic in either one is resumed in the joining task or thread.
fn join_both(source: SubscriptionHandle, drain: ThreadJoinHandle<()>) -> SubscriptionHandle {
    match source {
        SubscriptionHandle::Nil => SubscriptionHandle::JoinThread(drain),
        SubscriptionHandle::JoinThread(source) => {
            SubscriptionHandle::JoinThread(std::thread::spawn(move || {
                let source = source.join();
                let drained = drain.join();
                if let Err(payload) = source.and(drained) {
                    panic::resume_unwind(payload);
                }
            }))
        }
        SubscriptionHandle::JoinTask(source) => match runtime::Handle::try_current() {
            Ok(runtime) => SubscriptionHandle::JoinTask(runtime.spawn(async move {
                let source = source.await;
                let drained = tokio::task::spawn_blocking(move || drain.join()).await;
                match (source, drained) {
                    (Err(e), _) if e.is_panic() => panic::resume_unwind(e.into_panic()),
                    (_, Ok(Err(payload))) => panic::resume_unwind(payload),
                    (_, Err(e)) if e.is_panic() => panic::resume_unwind(e.into_panic()),
                    // An aborted source is the normal outcome of a cancel or dismiss.
                    _ => (),
                }
            })),
            Err(e) => {
                tracing::warn!("source task cannot be joined, subscribed outside of a Tokio runtime: {e}");
                SubscriptionHandle::JoinThread(drain)
            }
        },
    }
}
