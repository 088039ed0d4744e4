//! Exact token counting for generated context documents
//!
//! The serializer always reports the `chars / 4` approximation; this module
//! adds a real count for a chosen model when asked to.

mod error;
mod model;

pub use error::{TokenizerError, TokenizerResult};
pub use model::Model;

use tiktoken_rs::CoreBPE;

/// Trait defining the interface for tokenizers
pub trait Tokenizer: Send + Sync {
    /// Count tokens in the given text
    fn count_tokens(&self, text: &str) -> TokenizerResult<usize>;

    /// Get the context window size for this model
    fn model_context_window(&self) -> usize;
}

/// Create a tokenizer for the specified model
pub fn create_tokenizer(model: Model) -> TokenizerResult<Box<dyn Tokenizer>> {
    Ok(Box::new(TiktokenTokenizer::new(model)?))
}

/// Tokenizer backed by tiktoken's bundled BPE tables
pub struct TiktokenTokenizer {
    model: Model,
    encoding: CoreBPE,
}

impl TiktokenTokenizer {
    /// Create a new tokenizer
    pub fn new(model: Model) -> TokenizerResult<Self> {
        let encoding = tiktoken_rs::get_bpe_from_model(model.model_id())
            .map_err(|e| TokenizerError::UnsupportedModel(format!("{}: {}", model, e)))?;

        Ok(Self { model, encoding })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> TokenizerResult<usize> {
        Ok(self.encoding.encode_ordinary(text).len())
    }

    fn model_context_window(&self) -> usize {
        self.model.context_window()
    }
}

/// Share of a model's context window taken by `tokens`, in percent
pub fn context_usage(tokens: usize, window: usize) -> f64 {
    if window == 0 {
        return 0.0;
    }
    tokens as f64 / window as f64 * 100.0
}
