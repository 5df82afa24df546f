//! Tool-using conversational loop.
//!
//! [`AgentLoop`] is the narrow seam the brief generator talks to: submit new
//! messages for a thread, get back the thread's full ordered message list.
//! [`ReactLoop`] is the shipped implementation; tests and callers with their
//! own orchestration inject something else.

pub mod runner;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BriefError;
use crate::types::ModelMessage;

pub use runner::ReactLoop;

/// Model turns allowed per submission before giving up.
pub const DEFAULT_MAX_TURNS: usize = 25;

/// Orchestrates model turns and tool calls for one conversation thread.
#[async_trait]
pub trait AgentLoop: Send + Sync {
    /// Append `messages` to `thread_id`, run to a final answer, and return the
    /// whole thread (prior history, the submitted messages, everything the
    /// run produced) oldest first.
    async fn submit(
        &self,
        messages: Vec<ModelMessage>,
        thread_id: &str,
    ) -> Result<Vec<ModelMessage>, BriefError>;
}

/// Bounds applied to each submission.
///
/// Only constructible through [`LoopLimits::new`] or `Default`, so a zero
/// turn budget or a zero timeout never reaches the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopLimits {
    max_turns: usize,
    timeout: Option<Duration>,
}

impl LoopLimits {
    /// `max_turns` provider calls allowed before [`BriefError::IterationLimit`];
    /// `timeout` bounds the whole submission (`None` waits indefinitely).
    pub fn new(max_turns: usize, timeout: Option<Duration>) -> Result<Self, BriefError> {
        if max_turns == 0 {
            return Err(BriefError::Configuration(
                "max_turns must be at least 1".into(),
            ));
        }
        if timeout.is_some_and(|t| t.is_zero()) {
            return Err(BriefError::Configuration(
                "timeout must be greater than zero".into(),
            ));
        }
        Ok(Self { max_turns, timeout })
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limits_are_rejected() {
        assert!(matches!(
            LoopLimits::new(0, None),
            Err(BriefError::Configuration(_))
        ));
        assert!(matches!(
            LoopLimits::new(3, Some(Duration::ZERO)),
            Err(BriefError::Configuration(_))
        ));

        let limits = LoopLimits::new(3, Some(Duration::from_secs(1))).unwrap();
        assert_eq!(limits.max_turns(), 3);
        assert_eq!(limits.timeout(), Some(Duration::from_secs(1)));
        assert_eq!(LoopLimits::default().max_turns(), DEFAULT_MAX_TURNS);
    }
}
