//! Convenience re-exports for common use.

pub use crate::agent_loop::{AgentLoop, LoopLimits, ReactLoop};
pub use crate::brief::{BriefGenerator, BriefRequest, DEFAULT_THREAD_ID, FALLBACK_BRIEF};
pub use crate::config::BriefConfig;
pub use crate::error::{BriefError, Result};
pub use crate::memory::{FileMemoryStore, InMemoryStore, MemoryStore};
pub use crate::provider::ModelProvider;
pub use crate::search::{SearchProvider, SearchResult};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};
pub use crate::types::{ContentPart, ModelMessage, Role, Usage};
