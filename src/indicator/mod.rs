//! The `indicator` module describes the busy indicator side of a binding: the
//! configuration a caller builds, the host collaborator that actually shows the
//! indicator, and the handle tracking a shown indicator until it is disposed.
//!
//! The visual rendering of the indicator is never performed here. A [`Host`]
//! implementation owns the UI and marshals `show` and `dispose` onto its single
//! UI-owning execution context.

pub(crate) mod bridge;
pub mod factory;
mod handle;

pub use handle::*;

use std::sync::Arc;

use crate::{
    observable::{backpressure::Backpressure, binding},
    IndicatorError, Observable,
};

/// Callback handed to an [`Indicator`] to be invoked when the host reports a user
/// cancel or a dismissal.
pub type Callback = Box<dyn FnOnce() + Send>;

/// Text shown by an indicator, either literal or a key the [`Host`] resolves when
/// the indicator is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Text {
    /// Shown as is.
    Literal(String),
    /// Key looked up with [`Host::resolve`].
    Resource(String),
}

impl Text {
    /// Resolves the text against `host`. A resource key the host does not know is
    /// shown as the key itself.
    pub fn resolve(&self, host: &dyn Host) -> String {
        match self {
            Text::Literal(text) => text.clone(),
            Text::Resource(key) => host.resolve(key).unwrap_or_else(|| {
                tracing::debug!(key = %key, "resource key not resolved by host, showing the key");
                key.clone()
            }),
        }
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::Literal(text.to_owned())
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::Literal(text)
    }
}

/// Resource key of the default indicator message.
pub const DEFAULT_MESSAGE_KEY: &str = "loading";

/// Options for a busy indicator.
///
/// A configuration is a plain value. It can be built with named fields on top of
/// `Default`, or with the chainable `with_*` setters. Binding a stream copies the
/// configuration, so one value can seed any number of independent bindings.
///
/// ```
/// use rxbusy::{IndicatorConfig, Text};
///
/// let config = IndicatorConfig::default()
///     .with_title("Account")
///     .with_message("Logging in...")
///     .with_cancelable(true);
///
/// assert_eq!(config.message, Text::Literal("Logging in...".into()));
/// assert!(!config.determinate);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndicatorConfig {
    pub title: Option<Text>,
    pub message: Text,
    pub determinate: bool,
    pub cancelable: bool,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            title: None,
            message: Text::Resource(DEFAULT_MESSAGE_KEY.to_owned()),
            determinate: false,
            cancelable: false,
        }
    }
}

impl IndicatorConfig {
    /// Sets a literal title. Indicators have no title by default.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Text::Literal(title.into()));
        self
    }

    /// Sets the title to a resource key resolved by the host.
    #[must_use]
    pub fn with_title_key(mut self, key: impl Into<String>) -> Self {
        self.title = Some(Text::Resource(key.into()));
        self
    }

    /// Sets a literal message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Text::Literal(message.into());
        self
    }

    /// Sets the message to a resource key resolved by the host.
    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message = Text::Resource(key.into());
        self
    }

    /// Cancelable indicators complete the bound stream when the user cancels them.
    #[must_use]
    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Determinate indicators show progress instead of spinning.
    #[must_use]
    pub fn with_determinate(mut self, determinate: bool) -> Self {
        self.determinate = determinate;
        self
    }

    /// Resolves every text of the configuration against `host`.
    pub fn resolve(&self, host: &dyn Host) -> ShowOptions {
        ShowOptions {
            title: self.title.as_ref().map(|t| t.resolve(host)),
            message: self.message.resolve(host),
            determinate: self.determinate,
            cancelable: self.cancelable,
        }
    }
}

/// Resolved, host-facing form of an [`IndicatorConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowOptions {
    pub title: Option<String>,
    pub message: String,
    pub determinate: bool,
    /// Whether the host should let the user cancel the indicator.
    pub cancelable: bool,
}

/// The UI-owning environment able to show busy indicators.
///
/// `show` is called when a bound stream is subscribed to and the returned
/// [`Indicator`] is disposed exactly once per subscription. Implementations are
/// responsible for running both on their UI-owning execution context.
pub trait Host: Send + Sync {
    /// Shows an indicator synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::HostUnavailable`] when the host can no longer show
    /// UI, for example after its window was torn down.
    fn show(&self, options: &ShowOptions) -> Result<Box<dyn Indicator>, IndicatorError>;

    /// Resolves a text resource key, `None` when the key is unknown.
    fn resolve(&self, _key: &str) -> Option<String> {
        None
    }
}

/// A shown indicator, as seen from the host.
///
/// Each callback is registered at most once per indicator and should be invoked at
/// most once. Invoking a callback after the indicator was disposed is allowed and
/// has no effect on the bound stream.
pub trait Indicator: Send + Sync {
    /// Registers the callback fired when the user cancels the indicator. Only
    /// registered for cancelable configurations.
    fn on_user_cancel(&self, callback: Callback);

    /// Registers the callback fired when the indicator is dismissed, whether by the
    /// user or programmatically.
    fn on_dismiss(&self, callback: Callback);

    /// Removes the indicator from the screen.
    ///
    /// # Errors
    ///
    /// A failure is logged by the caller and never replaces the signal that
    /// triggered the disposal.
    fn dispose(&self) -> Result<(), IndicatorError>;
}

/// Fluent entry point binding streams to a busy indicator shown by one host.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use rxbusy::{subscribe::Subscriber, Host, Observable, ProgressIndicator, Subscribeable};
///
/// fn login(host: Arc<dyn Host>, request: Observable<String>) {
///     let mut bound = ProgressIndicator::new(host)
///         .with_message("Logging in...")
///         .for_observable(request);
///
///     bound.subscribe(Subscriber::new(
///         |id| println!("{}", id),
///         |e| eprintln!("login failed: {}", e),
///         || {},
///     ));
/// }
/// ```
#[derive(Clone)]
pub struct ProgressIndicator {
    host: Arc<dyn Host>,
    config: IndicatorConfig,
}

impl ProgressIndicator {
    /// Starts a default configuration for indicators shown by `host`.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_config(host, IndicatorConfig::default())
    }

    /// Starts from an existing configuration for indicators shown by `host`.
    pub fn with_config(host: Arc<dyn Host>, config: IndicatorConfig) -> Self {
        ProgressIndicator { host, config }
    }

    /// See [`IndicatorConfig::with_title`].
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config = self.config.with_title(title);
        self
    }

    /// See [`IndicatorConfig::with_title_key`].
    #[must_use]
    pub fn with_title_key(mut self, key: impl Into<String>) -> Self {
        self.config = self.config.with_title_key(key);
        self
    }

    /// See [`IndicatorConfig::with_message`].
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.config = self.config.with_message(message);
        self
    }

    /// See [`IndicatorConfig::with_message_key`].
    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.config = self.config.with_message_key(key);
        self
    }

    /// See [`IndicatorConfig::with_cancelable`].
    #[must_use]
    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.config = self.config.with_cancelable(cancelable);
        self
    }

    /// See [`IndicatorConfig::with_determinate`].
    #[must_use]
    pub fn with_determinate(mut self, determinate: bool) -> Self {
        self.config = self.config.with_determinate(determinate);
        self
    }

    /// The configuration every binding made from this value starts with.
    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// The host showing the indicators.
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Wraps `source` so that every subscription shows an indicator for as long as
    /// the subscription lives.
    ///
    /// Items, the error and the completion of `source` are forwarded unchanged and
    /// in order. The indicator is dismissed exactly once, on whichever comes first
    /// of the source's terminal event, a user cancel (cancelable configurations
    /// only), a dismissal, or an unsubscribe. A cancel or a dismissal completes the
    /// returned stream.
    pub fn for_observable<T: Send + 'static>(&self, source: Observable<T>) -> Observable<T> {
        binding::bind(source, Arc::clone(&self.host), self.config.clone())
    }

    /// Same as [`for_observable`](Self::for_observable), with a backpressure policy
    /// applied to item delivery.
    ///
    /// The policy only governs how items reach a slow subscriber. Showing and
    /// dismissing the indicator happen at the same points as for the unbounded
    /// variant.
    pub fn for_flowable<T: Send + 'static>(
        &self,
        source: Observable<T>,
        backpressure: impl Into<Backpressure>,
    ) -> Observable<T> {
        binding::bind_bounded(
            source,
            Arc::clone(&self.host),
            self.config.clone(),
            backpressure.into(),
        )
    }
}

impl From<Arc<dyn Host>> for ProgressIndicator {
    fn from(host: Arc<dyn Host>) -> Self {
        ProgressIndicator::new(host)
    }
}

impl std::fmt::Debug for ProgressIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressIndicator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
