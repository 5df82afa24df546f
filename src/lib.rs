//! Research brief generation with a tool-using Claude agent.
//!
//! Given a topic, [`brief::BriefGenerator`] asks an Anthropic model for a
//! markdown brief, letting it call Tavily web search as often as it needs
//! before answering. Conversation history is kept per thread id, so repeated
//! calls on one thread continue the same conversation.
//!
//! # Quick Start
//!
//! ```no_run
//! use research_brief::prelude::*;
//!
//! # async fn example() -> research_brief::error::Result<()> {
//! let generator = BriefGenerator::from_config(&BriefConfig::from_env())?;
//! let brief = generator
//!     .generate_brief("Impact of renewable energy on job markets", None)
//!     .await?;
//! println!("{brief}");
//! # Ok(())
//! # }
//! ```

pub mod agent_loop;
pub mod brief;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod search;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
