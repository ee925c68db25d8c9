use std::{
    collections::VecDeque,
    error::Error,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use super::forward::{Forward, Terminal};
use crate::{observer::Observer, subscribe::Subscriber, IndicatorError};

enum Event<T> {
    Next(T),
    Complete,
    Error(Arc<dyn Error + Send + Sync>),
}

struct Drain<T> {
    queue: VecDeque<Event<T>>,
    emitting: bool,
    done: bool,
}

/// Delivers events to a subscriber one at a time, in the order they arrive.
///
/// Whichever thread finds the stage idle becomes the emitter and drains the queue.
/// Events arriving meanwhile, including ones raised from inside the subscriber's
/// own callbacks, are queued for that emitter instead of waiting on a lock.
pub(crate) struct Serializer<T> {
    drain: Mutex<Drain<T>>,
    downstream: Mutex<Subscriber<T>>,
}

impl<T: Send> Serializer<T> {
    pub(crate) fn new(downstream: Subscriber<T>) -> Self {
        Serializer {
            drain: Mutex::new(Drain {
                queue: VecDeque::new(),
                emitting: false,
                done: false,
            }),
            downstream: Mutex::new(downstream),
        }
    }

    fn lock_drain(&self) -> MutexGuard<'_, Drain<T>> {
        self.drain.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: Event<T>, discard_pending: bool) {
        {
            let mut drain = self.lock_drain();
            if drain.done {
                return;
            }
            if discard_pending {
                drain.queue.clear();
            }
            drain.queue.push_back(event);
            if drain.emitting {
                return;
            }
            drain.emitting = true;
        }
        self.drain_loop();
    }

    fn drain_loop(&self) {
        loop {
            let event = {
                let mut drain = self.lock_drain();
                let next = if drain.done {
                    None
                } else {
                    drain.queue.pop_front()
                };
                match next {
                    Some(event) => {
                        if !matches!(event, Event::Next(_)) {
                            // Nothing gets through once a terminal is on its way.
                            drain.done = true;
                            drain.queue.clear();
                        }
                        event
                    }
                    None => {
                        drain.emitting = false;
                        return;
                    }
                }
            };

            // Only the emitter ever locks the subscriber.
            let mut downstream = self.downstream.lock().unwrap_or_else(PoisonError::into_inner);
            match event {
                Event::Next(v) => downstream.next(v),
                Event::Complete => downstream.complete(),
                Event::Error(e) => downstream.error(e),
            }
        }
    }
}

impl<T: Send> Forward<T> for Serializer<T> {
    fn item(&self, value: T) -> Result<(), IndicatorError> {
        self.emit(Event::Next(value), false);
        Ok(())
    }

    fn terminate(&self, terminal: Terminal) {
        match terminal {
            Terminal::Complete => self.emit(Event::Complete, false),
            Terminal::Error(e) => self.emit(Event::Error(e), false),
            Terminal::Interrupt => self.emit(Event::Complete, true),
            Terminal::Detach => {
                let mut drain = self.lock_drain();
                drain.done = true;
                drain.queue.clear();
            }
        }
    }
}
