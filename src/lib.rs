//! Integration helpers for OpenAI-compatible chat APIs
//!
//! Three small pieces, composable but independent:
//! - a bounded exponential-backoff retry wrapper for request-issuing
//!   operations ([`retry`]),
//! - a token-budget-aware message truncator with an injectable token
//!   counter ([`context`]),
//! - a thin model-listing client over the hosted API ([`api`]).

pub mod api;
pub mod context;
pub mod retry;

pub use api::{get_available_models, ApiError, FailureKind, ModelsClient};
pub use context::{
    count_tokens, truncate_for_token_limit, truncate_with_encoder, ChatMessage, TiktokenEncoder,
    TokenEncoder, TokenError, TruncateSide,
};
pub use retry::{retry_with_backoff, retry_with_backoff_using, RetryError, RetryPolicy};
