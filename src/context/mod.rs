//! Chat message modeling, token accounting, and budget-aware truncation
//!
//! Token counts drive truncation decisions, so counting is exact per model
//! family rather than approximated; unsupported families are refused
//! outright.

pub mod models;
pub mod token_counter;
pub mod truncate;

pub use models::ChatMessage;
pub use token_counter::{count_tokens, TiktokenEncoder, TokenEncoder, TokenError};
pub use truncate::{truncate_for_token_limit, truncate_with_encoder, TruncateSide};
