//! Token-budget-aware message truncation

use super::models::ChatMessage;
use super::token_counter::{count_tokens, TiktokenEncoder, TokenEncoder, TokenError};
use tracing::debug;

/// Which end of the conversation to shed when over budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncateSide {
    /// Drop the oldest non-priming message first.
    #[default]
    First,
    /// Drop the newest message first.
    Last,
}

/// Truncate `messages` until its token count fits `max_tokens`, using the
/// tokenizer registered for `model`.
///
/// The first message holds the system-priming directive and is kept alive
/// for as long as the sequence has anything else to shed.
pub fn truncate_for_token_limit(
    messages: &[ChatMessage],
    model: &str,
    max_tokens: usize,
    side: TruncateSide,
) -> Result<Vec<ChatMessage>, TokenError> {
    let encoder = TiktokenEncoder::for_model(model)?;
    truncate_with_encoder(messages, &encoder, model, max_tokens, side)
}

/// [`truncate_for_token_limit`] with a caller-supplied encoder.
///
/// Iteratively rebuilds the sequence as priming + a shrinking tail until the
/// count from [`count_tokens`] fits. Two structural floors end the loop: a
/// 2-message sequence over budget keeps only the priming message, and a
/// 1-message sequence is returned as-is since nothing more can go.
pub fn truncate_with_encoder(
    messages: &[ChatMessage],
    encoder: &dyn TokenEncoder,
    model: &str,
    max_tokens: usize,
    side: TruncateSide,
) -> Result<Vec<ChatMessage>, TokenError> {
    if messages.is_empty() {
        return Ok(Vec::new());
    }

    let sys_priming = messages[0].clone();
    let mut messages = messages.to_vec();
    let mut n_tokens = count_tokens(&messages, encoder, model)?;

    while n_tokens > max_tokens {
        if messages.len() == 2 {
            // over budget by a single input; the priming message wins
            messages.truncate(1);
            break;
        }
        if messages.len() == 1 {
            break;
        }

        messages = match side {
            TruncateSide::First => std::iter::once(sys_priming.clone())
                .chain(messages[2..].iter().cloned())
                .collect(),
            TruncateSide::Last => std::iter::once(sys_priming.clone())
                .chain(messages[1..messages.len() - 1].iter().cloned())
                .collect(),
        };

        n_tokens = count_tokens(&messages, encoder, model)?;
        debug!(n_tokens, max_tokens, remaining = messages.len(), "truncated");
    }

    Ok(messages)
}
