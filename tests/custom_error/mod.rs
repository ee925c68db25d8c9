use std::error::Error;

/// Error emitted by the test login streams.
#[derive(Debug)]
pub struct LoginError;

impl std::fmt::Display for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid credentials")
    }
}

impl Error for LoginError {}
