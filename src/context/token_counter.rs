//! Token accounting for chat-completion message framing

use super::models::ChatMessage;
use tiktoken_rs::{get_bpe_from_model, CoreBPE};

/// Marker identifying the chat-completion family with known framing
/// overhead. Only `-0301` really complies; later models may deviate.
const CHAT_FAMILY_MARKER: &str = "gpt-3.5-turbo";

/// Tokens of framing per message: `<im_start>{role/name}\n{content}<im_end>\n`.
const PER_MESSAGE_OVERHEAD: usize = 4;

/// Tokens priming the assistant's reply: `<im_start>assistant`.
const REPLY_PRIMING_OVERHEAD: usize = 2;

/// Token accounting errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token counting is a hard boundary: framing overhead differs by model
    /// family, and a wrong count would mis-truncate.
    #[error("token counting is not implemented for model {0}")]
    UnsupportedModel(String),

    #[error("no tokenizer available for model {model}")]
    EncoderUnavailable {
        model: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Maps text to its encoded token length for one tokenization scheme.
pub trait TokenEncoder: Send + Sync {
    fn encoded_len(&self, text: &str) -> usize;
}

/// Tiktoken-backed encoder for a specific model.
pub struct TiktokenEncoder {
    bpe: CoreBPE,
}

impl TiktokenEncoder {
    /// Look up the BPE vocabulary registered for `model`.
    pub fn for_model(model: &str) -> Result<Self, TokenError> {
        let bpe = get_bpe_from_model(model).map_err(|source| TokenError::EncoderUnavailable {
            model: model.to_string(),
            source,
        })?;
        Ok(Self { bpe })
    }
}

impl TokenEncoder for TiktokenEncoder {
    fn encoded_len(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Count the tokens `messages` would consume in `model`'s chat-completion
/// request framing.
///
/// Each message costs [`PER_MESSAGE_OVERHEAD`] plus the encoded length of
/// every present field value; a `name` field refunds one token because the
/// role is then omitted from the framing. The reply priming costs
/// [`REPLY_PRIMING_OVERHEAD`] once.
pub fn count_tokens(
    messages: &[ChatMessage],
    encoder: &dyn TokenEncoder,
    model: &str,
) -> Result<usize, TokenError> {
    if !model.contains(CHAT_FAMILY_MARKER) {
        return Err(TokenError::UnsupportedModel(model.to_string()));
    }

    let mut num_tokens = 0usize;
    for message in messages {
        num_tokens += PER_MESSAGE_OVERHEAD;
        num_tokens += encoder.encoded_len(&message.role);
        num_tokens += encoder.encoded_len(&message.content);
        if let Some(name) = &message.name {
            num_tokens += encoder.encoded_len(name);
            num_tokens -= 1; // role omitted when a name is present
        }
    }
    num_tokens += REPLY_PRIMING_OVERHEAD;
    Ok(num_tokens)
}
