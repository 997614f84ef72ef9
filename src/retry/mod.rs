//! Bounded exponential-backoff retry for request-issuing operations
//!
//! [`RetryPolicy`] is plain data; [`retry_with_backoff`] runs an operation
//! under it, classifying each failure exactly once at the loop boundary.

pub mod backoff;
pub mod policy;

pub use backoff::{retry_with_backoff, retry_with_backoff_using, RetryError};
pub use policy::{RetryPolicy, DEFAULT_MAX_RETRIES};
