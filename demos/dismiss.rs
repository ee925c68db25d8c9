/**
 * A stream that never ends, stopped by dismissing its indicator from elsewhere in
 * the program. The subscriber sees a completion and the source stops emitting.
 */
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use rxbusy::{
    indicator::Callback,
    subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
    Host, Indicator, IndicatorError, Observable, Observer, ProgressIndicator, ShowOptions,
    Subscribeable,
};

use tokio::{task, time};

/// Keeps the dismiss callback of the last indicator so `main` can close it.
#[derive(Default)]
struct Console {
    dismiss: Arc<Mutex<Option<Callback>>>,
}

impl Console {
    fn dismiss(&self) {
        let callback = self.dismiss.lock().unwrap().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

struct ConsoleIndicator(Arc<Mutex<Option<Callback>>>);

impl Indicator for ConsoleIndicator {
    fn on_user_cancel(&self, _: Callback) {}

    fn on_dismiss(&self, callback: Callback) {
        *self.0.lock().unwrap() = Some(callback);
    }

    fn dispose(&self) -> Result<(), IndicatorError> {
        println!("[x] dismissed");
        Ok(())
    }
}

impl Host for Console {
    fn show(&self, options: &ShowOptions) -> Result<Box<dyn Indicator>, IndicatorError> {
        println!("[ ] {}", options.message);
        Ok(Box::new(ConsoleIndicator(Arc::clone(&self.dismiss))))
    }
}

fn ticks() -> Observable<u64> {
    Observable::new(|mut o: Subscriber<u64>| {
        let stopped = Arc::new(AtomicBool::new(false));
        let stopped_c = Arc::clone(&stopped);

        let join_handle = task::spawn(async move {
            let mut i = 0;
            while !stopped_c.load(Ordering::SeqCst) {
                o.next(i);
                i += 1;
                time::sleep(Duration::from_millis(100)).await;
            }
            println!("Source stopped after {} ticks", i);
        });

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || stopped.store(true, Ordering::SeqCst))),
            SubscriptionHandle::JoinTask(join_handle),
        )
    })
}

#[tokio::main()]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let console = Arc::new(Console::default());

    let mut observer = Subscriber::on_next(|v| println!("Tick {}", v));
    observer.on_complete(|| println!("Completed"));

    let subscription = ProgressIndicator::new(Arc::clone(&console) as Arc<dyn Host>)
        .with_message("Listening...")
        .for_observable(ticks())
        .subscribe(observer);

    time::sleep(Duration::from_millis(550)).await;
    console.dismiss();

    if subscription.join_concurrent().await.is_err() {
        println!("Source task failed");
    }

    println!("`main` function done")
}
