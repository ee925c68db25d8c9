use std::{error::Error, sync::Arc};

/// Receiving side of a stream: items, a single error or a single completion.
pub trait Observer {
    type NextFnType;

    /// Receives the next item.
    fn next(&mut self, _: Self::NextFnType);
    /// Signals the end of the stream.
    fn complete(&mut self);
    /// Signals that the stream failed.
    fn error(&mut self, _: Arc<dyn Error + Send + Sync>);
}
