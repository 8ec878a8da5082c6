use std::fmt;

use tiktoken_rs::CoreBPE;

use crate::error::TokenizerError;

/// Maps text to the token ids a model consumes. The number of ids is the
/// cost charged against a history's budget.
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Vec<u32>;

    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// Thin wrapper around a `tiktoken_rs::CoreBPE` encoder.
#[derive(Clone)]
pub struct TiktokenTokenizer {
    inner: CoreBPE,
}

impl TiktokenTokenizer {
    /// Build a tokenizer using an OpenAI model name.
    /// Unknown models fall back to the `o200k_base` encoding.
    pub fn for_model(model: &str) -> Result<Self, TokenizerError> {
        match tiktoken_rs::get_bpe_from_model(model) {
            Ok(inner) => Ok(Self { inner }),
            Err(_) => {
                tracing::warn!(model, "no encoding registered for model, using o200k_base");
                Self::o200k_base()
            }
        }
    }

    pub fn o200k_base() -> Result<Self, TokenizerError> {
        let inner = tiktoken_rs::o200k_base().map_err(|source| TokenizerError::LoadEncoding {
            encoding: "o200k_base",
            source,
        })?;
        Ok(Self { inner })
    }

    pub fn cl100k_base() -> Result<Self, TokenizerError> {
        let inner = tiktoken_rs::cl100k_base().map_err(|source| TokenizerError::LoadEncoding {
            encoding: "cl100k_base",
            source,
        })?;
        Ok(Self { inner })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        self.inner.encode_ordinary(text).into_iter().collect()
    }
}

impl fmt::Debug for TiktokenTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TiktokenTokenizer {{ inner: <CoreBPE> }}")
    }
}
