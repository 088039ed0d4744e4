//! Model definitions and metadata

use clap::ValueEnum;
use serde::Serialize;
use strum::{Display, EnumProperty};

/// Models whose tokenizers ship with tiktoken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ValueEnum, Serialize, EnumProperty)]
pub enum Model {
    #[strum(props(model_id = "gpt-4", context_window = "8192"))]
    Gpt4,

    #[strum(props(model_id = "gpt-4-0125-preview", context_window = "128000"))]
    Gpt4Turbo,

    #[strum(props(model_id = "gpt-4o", context_window = "128000"))]
    Gpt4o,

    #[strum(props(model_id = "gpt-3.5-turbo", context_window = "16385"))]
    Gpt35Turbo,
}

impl Model {
    /// Get the context window size for this model
    pub fn context_window(&self) -> usize {
        self.get_str("context_window")
            .and_then(|window| window.parse().ok())
            .unwrap_or(0)
    }

    /// Get the model identifier understood by tiktoken
    pub fn model_id(&self) -> &'static str {
        self.get_str("model_id").unwrap_or("unknown")
    }
}
