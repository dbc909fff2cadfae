pub use crate::error::{ClResult, Error, PushError};
pub use crate::types::Timestamp;

pub use tracing::{debug, error, info, warn};

// vim: ts=4
