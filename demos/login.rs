/**
 * A login request wrapped with a busy indicator. The console host prints when the
 * indicator is shown and dismissed, and the request answers after two seconds.
 * The second run pushes a burst of progress updates through the bounded variant,
 * keeping only what a slow consumer can take.
 */
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rxbusy::{
    indicator::Callback,
    subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
    BackpressureStrategy, Host, Indicator, IndicatorError, Observable, ObservableExt, Observer,
    ProgressIndicator, ShowOptions, Subscribeable,
};

use tokio::{task, time};

struct ConsoleIndicator {
    message: String,
    dismiss: Mutex<Option<Callback>>,
}

impl Indicator for ConsoleIndicator {
    // A console has nothing to tap outside of.
    fn on_user_cancel(&self, _: Callback) {}

    fn on_dismiss(&self, callback: Callback) {
        *self.dismiss.lock().unwrap() = Some(callback);
    }

    fn dispose(&self) -> Result<(), IndicatorError> {
        println!("[x] {}", self.message);
        Ok(())
    }
}

struct Console;

impl Host for Console {
    fn show(&self, options: &ShowOptions) -> Result<Box<dyn Indicator>, IndicatorError> {
        match &options.title {
            Some(title) => println!("[ ] {}: {}", title, options.message),
            None => println!("[ ] {}", options.message),
        }
        Ok(Box::new(ConsoleIndicator {
            message: options.message.clone(),
            dismiss: Mutex::new(None),
        }))
    }

    fn resolve(&self, key: &str) -> Option<String> {
        (key == "loading").then(|| "Please wait...".to_owned())
    }
}

fn login(user: &'static str) -> Observable<usize> {
    Observable::new(move |mut o: Subscriber<usize>| {
        let join_handle = task::spawn(async move {
            time::sleep(Duration::from_millis(2000)).await;
            o.next(user.len() * 1000 + 7);
            o.complete();
        });
        let abort = join_handle.abort_handle();

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || abort.abort())),
            SubscriptionHandle::JoinTask(join_handle),
        )
    })
}

fn progress(steps: u32) -> Observable<u32> {
    Observable::new(move |mut o: Subscriber<u32>| {
        let join_handle = std::thread::spawn(move || {
            for i in 1..=steps {
                o.next(i);
            }
            o.complete();
        });
        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::JoinThread(join_handle))
    })
}

#[tokio::main()]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let indicator = ProgressIndicator::new(Arc::new(Console))
        .with_title("Login")
        .with_message("Logging in...");

    let mut observer = Subscriber::on_next(|v| println!("{}", v));
    observer.on_complete(|| println!("Login finished"));

    let subscription = indicator
        .for_observable(login("alice"))
        .map(|id| format!("User id is {}", id))
        .subscribe(observer);
    if subscription.join_concurrent().await.is_err() {
        println!("Login task failed");
    }

    // Default message, resolved by the host.
    let mut observer = Subscriber::on_next(|v| {
        println!("Step {}", v);
        std::thread::sleep(Duration::from_millis(1));
    });
    observer.on_complete(|| println!("Upload finished"));

    let subscription = ProgressIndicator::new(Arc::new(Console))
        .for_flowable(progress(500), BackpressureStrategy::Drop)
        .subscribe(observer);
    if subscription.join_concurrent().await.is_err() {
        println!("Upload drain failed");
    }

    println!("`main` function done")
}
