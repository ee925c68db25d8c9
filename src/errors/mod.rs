mod indicator_error;

pub use indicator_error::*;
