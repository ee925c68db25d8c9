use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use rxbusy::{
    subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
    Observable, Observer,
};

/// Test side of a source whose events are pushed by hand.
pub struct Manual<T> {
    subscriber: Arc<Mutex<Option<Subscriber<T>>>>,
    subscribes: Arc<AtomicUsize>,
    unsubscribes: Arc<AtomicUsize>,
}

impl<T> Manual<T> {
    pub fn next(&self, v: T) {
        if let Some(s) = self.subscriber.lock().unwrap().as_mut() {
            s.next(v);
        }
    }

    pub fn error(&self, e: Arc<dyn std::error::Error + Send + Sync>) {
        if let Some(s) = self.subscriber.lock().unwrap().as_mut() {
            s.error(e);
        }
    }

    pub fn complete(&self) {
        if let Some(s) = self.subscriber.lock().unwrap().as_mut() {
            s.complete();
        }
    }

    pub fn subscribes(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn unsubscribes(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }
}

/// A source that keeps its latest subscriber for the test to drive.
pub fn manual_source<T: 'static>() -> (Observable<T>, Manual<T>) {
    let subscriber: Arc<Mutex<Option<Subscriber<T>>>> = Arc::new(Mutex::new(None));
    let subscribes = Arc::new(AtomicUsize::new(0));
    let unsubscribes = Arc::new(AtomicUsize::new(0));

    let manual = Manual {
        subscriber: Arc::clone(&subscriber),
        subscribes: Arc::clone(&subscribes),
        unsubscribes: Arc::clone(&unsubscribes),
    };

    let observable = Observable::new(move |o: Subscriber<T>| {
        subscribes.fetch_add(1, Ordering::SeqCst);
        *subscriber.lock().unwrap() = Some(o);

        let unsubscribes = Arc::clone(&unsubscribes);
        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                unsubscribes.fetch_add(1, Ordering::SeqCst);
            })),
            SubscriptionHandle::Nil,
        )
    });
    (observable, manual)
}

/// A source running `emit` synchronously inside every subscribe call. The returned
/// counter tracks how often it was unsubscribed.
pub fn eager_source<T: 'static>(
    mut emit: impl FnMut(&mut Subscriber<T>) + Send + Sync + 'static,
) -> (Observable<T>, Arc<AtomicUsize>) {
    let unsubscribes = Arc::new(AtomicUsize::new(0));
    let unsubscribes_c = Arc::clone(&unsubscribes);

    let observable = Observable::new(move |mut o: Subscriber<T>| {
        emit(&mut o);
        let unsubscribes = Arc::clone(&unsubscribes_c);
        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                unsubscribes.fetch_add(1, Ordering::SeqCst);
            })),
            SubscriptionHandle::Nil,
        )
    });
    (observable, unsubscribes)
}

/// Emits `values` after `delay` on a Tokio task, then completes.
pub fn delayed<T: Clone + Send + Sync + 'static>(values: Vec<T>, delay: Duration) -> Observable<T> {
    Observable::new(move |mut o: Subscriber<T>| {
        let values = values.clone();
        let join_handle = tokio::task::spawn(async move {
            tokio::time::sleep(delay).await;
            for v in values {
                o.next(v);
            }
            o.complete();
        });
        let abort = join_handle.abort_handle();

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || abort.abort())),
            SubscriptionHandle::JoinTask(join_handle),
        )
    })
}

/// Emits `0..count` as fast as possible on an OS thread, then completes.
pub fn burst(count: u32) -> Observable<u32> {
    Observable::new(move |mut o: Subscriber<u32>| {
        let join_handle = std::thread::spawn(move || {
            for i in 0..count {
                o.next(i);
            }
            o.complete();
        });
        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::JoinThread(join_handle))
    })
}

/// Emits `0..count` synchronously, then completes.
pub fn range(count: u32) -> Observable<u32> {
    Observable::new(move |mut o: Subscriber<u32>| {
        for i in 0..count {
            o.next(i);
        }
        o.complete();
        Subscription::empty()
    })
}
