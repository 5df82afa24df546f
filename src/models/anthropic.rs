//! Anthropic model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Anthropic models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AnthropicModel {
    #[strum(serialize = "claude-3-5-sonnet-20240620")]
    Claude35Sonnet20240620,
    #[strum(serialize = "claude-3-5-sonnet-20241022")]
    Claude35Sonnet20241022,
    #[strum(serialize = "claude-3-5-haiku-20241022")]
    Claude35Haiku,
    #[strum(serialize = "claude-sonnet-4-20250514")]
    ClaudeSonnet4,
    #[strum(serialize = "claude-3-opus-20240229")]
    Claude3Opus,
    #[strum(serialize = "claude-3-haiku-20240307")]
    Claude3Haiku,
    /// Custom/unknown Anthropic model by ID.
    #[strum(default)]
    Custom(String),
}

impl Default for AnthropicModel {
    fn default() -> Self {
        Self::Claude35Sonnet20240620
    }
}

impl AnthropicModel {
    /// Resolve an optional, possibly blank, model id. Blank means default.
    pub fn from_optional(model: Option<&str>) -> Self {
        match model.map(str::trim) {
            Some(id) if !id.is_empty() => id.parse().unwrap_or_else(|_| Self::Custom(id.into())),
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Claude35Sonnet20240620 => "claude-3-5-sonnet-20240620",
            Self::Claude35Sonnet20241022 => "claude-3-5-sonnet-20241022",
            Self::Claude35Haiku => "claude-3-5-haiku-20241022",
            Self::ClaudeSonnet4 => "claude-sonnet-4-20250514",
            Self::Claude3Opus => "claude-3-opus-20240229",
            Self::Claude3Haiku => "claude-3-haiku-20240307",
            Self::Custom(s) => s,
        }
    }

    /// Output budget sent as `max_tokens` when settings leave it unset.
    pub fn default_max_tokens(&self) -> u32 {
        match self {
            Self::Claude3Opus | Self::Claude3Haiku => 4_096,
            _ => 8_192,
        }
    }
}
