//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::BriefConfig;

/// Generate a research brief on a topic using Claude and Tavily web search.
#[derive(Parser, Debug)]
#[command(name = "research-brief", version, about)]
pub struct Cli {
    /// Research topic, e.g. "Impact of renewable energy on job markets"
    pub topic: String,

    /// Conversation thread to continue
    #[arg(short, long, conflicts_with = "new_thread")]
    pub thread_id: Option<String>,

    /// Start a fresh thread with a random id (printed to stderr)
    #[arg(long)]
    pub new_thread: bool,

    /// Anthropic model id
    #[arg(short, long)]
    pub model: Option<String>,

    /// Model turns allowed before giving up
    #[arg(long)]
    pub max_turns: Option<usize>,

    /// Overall time limit in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Search results per query
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Persist thread history as JSON files in this directory
    #[arg(long)]
    pub memory_dir: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of env configuration.
    pub fn apply(&self, mut config: BriefConfig) -> BriefConfig {
        if let Some(ref model) = self.model {
            config = config.with_model(model.clone());
        }
        if let Some(turns) = self.max_turns {
            config = config.with_max_turns(turns);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Some(std::time::Duration::from_secs(secs)));
        }
        if let Some(results) = self.max_results {
            config = config.with_max_results(results);
        }
        if let Some(ref dir) = self.memory_dir {
            config = config.with_memory_dir(dir.clone());
        }
        config
    }

    /// Thread id to run on: explicit, freshly generated, or `None` for the default.
    pub fn resolve_thread_id(&self) -> Option<String> {
        if self.new_thread {
            return Some(uuid::Uuid::new_v4().to_string());
        }
        self.thread_id.clone()
    }
}
