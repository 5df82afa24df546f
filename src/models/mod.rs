//! Model definitions.

pub mod anthropic;

pub use anthropic::{AnthropicModel, DEFAULT_MODEL};
