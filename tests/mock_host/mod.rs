use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use rxbusy::{indicator::Callback, Host, Indicator, IndicatorError, ShowOptions};

use crate::timeline::Timeline;

/// Host-side state of one shown indicator. Tests use it to play the user.
pub struct IndicatorState {
    timeline: Arc<Timeline>,
    pub options: ShowOptions,
    cancel: Mutex<Option<Callback>>,
    dismiss: Mutex<Option<Callback>>,
    disposals: AtomicUsize,
    fail_dispose: bool,
    dismiss_on_dispose: bool,
    dismiss_on_register: bool,
}

impl IndicatorState {
    /// The user taps outside the indicator or presses back.
    pub fn user_cancel(&self) {
        self.timeline.record("user cancel");
        let callback = self.cancel.lock().unwrap().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// The indicator is dismissed without going through the binding.
    pub fn dismiss(&self) {
        self.timeline.record("dismiss");
        self.fire_dismiss();
    }

    fn fire_dismiss(&self) {
        let callback = self.dismiss.lock().unwrap().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn has_cancel_listener(&self) -> bool {
        self.cancel.lock().unwrap().is_some()
    }

    pub fn has_dismiss_listener(&self) -> bool {
        self.dismiss.lock().unwrap().is_some()
    }

    pub fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }
}

struct MockIndicator(Arc<IndicatorState>);

impl Indicator for MockIndicator {
    fn on_user_cancel(&self, callback: Callback) {
        *self.0.cancel.lock().unwrap() = Some(callback);
    }

    fn on_dismiss(&self, callback: Callback) {
        if self.0.dismiss_on_register {
            // Closed before the listener was even attached.
            self.0.timeline.record("dismiss");
            return callback();
        }
        *self.0.dismiss.lock().unwrap() = Some(callback);
    }

    fn dispose(&self) -> Result<(), IndicatorError> {
        self.0.disposals.fetch_add(1, Ordering::SeqCst);
        self.0.timeline.record("release");
        if self.0.dismiss_on_dispose {
            // Like a dialog whose dismiss listener also runs on programmatic dismissal.
            self.0.fire_dismiss();
        }
        if self.0.fail_dispose {
            return Err(IndicatorError::dispose_failed("window already detached"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockHost {
    timeline: Option<Arc<Timeline>>,
    torn_down: AtomicBool,
    fail_dispose: bool,
    dismiss_on_dispose: bool,
    dismiss_on_register: bool,
    strings: HashMap<String, String>,
    shown: Mutex<Vec<Arc<IndicatorState>>>,
}

impl MockHost {
    pub fn new(timeline: &Arc<Timeline>) -> Self {
        MockHost {
            timeline: Some(Arc::clone(timeline)),
            ..Default::default()
        }
    }

    pub fn failing_dispose(mut self) -> Self {
        self.fail_dispose = true;
        self
    }

    pub fn dismissing_on_dispose(mut self) -> Self {
        self.dismiss_on_dispose = true;
        self
    }

    pub fn dismissing_on_register(mut self) -> Self {
        self.dismiss_on_register = true;
        self
    }

    pub fn with_string(mut self, key: &str, text: &str) -> Self {
        self.strings.insert(key.to_owned(), text.to_owned());
        self
    }

    /// The window hosting the indicators is gone.
    pub fn tear_down(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }

    pub fn shown(&self) -> usize {
        self.shown.lock().unwrap().len()
    }

    pub fn indicator(&self, i: usize) -> Arc<IndicatorState> {
        Arc::clone(&self.shown.lock().unwrap()[i])
    }

    pub fn last(&self) -> Arc<IndicatorState> {
        Arc::clone(self.shown.lock().unwrap().last().expect("no indicator shown"))
    }

    fn timeline(&self) -> Arc<Timeline> {
        self.timeline.clone().unwrap_or_else(Timeline::new)
    }
}

impl Host for MockHost {
    fn show(&self, options: &ShowOptions) -> Result<Box<dyn Indicator>, IndicatorError> {
        if self.torn_down.load(Ordering::SeqCst) {
            return Err(IndicatorError::host_unavailable("activity destroyed"));
        }
        let timeline = self.timeline();
        timeline.record("acquire");

        let state = Arc::new(IndicatorState {
            timeline,
            options: options.clone(),
            cancel: Mutex::new(None),
            dismiss: Mutex::new(None),
            disposals: AtomicUsize::new(0),
            fail_dispose: self.fail_dispose,
            dismiss_on_dispose: self.dismiss_on_dispose,
            dismiss_on_register: self.dismiss_on_register,
        });
        self.shown.lock().unwrap().push(Arc::clone(&state));
        Ok(Box::new(MockIndicator(state)))
    }

    fn resolve(&self, key: &str) -> Option<String> {
        self.strings.get(key).cloned()
    }
}
