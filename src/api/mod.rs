//! External API surface: the error family wrapped operations raise, and a
//! thin model-listing client.

pub mod client;
pub mod error;

pub use client::{get_available_models, ModelsClient, OPENAI_API_BASE, OPENAI_API_BASE_ENV};
pub use error::{ApiError, FailureKind, ERROR_CODES_DOCS};
