//! Configuration system (layered: code > env > `.env` file).

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::warn;

use crate::agent_loop::DEFAULT_MAX_TURNS;
use crate::search::DEFAULT_MAX_RESULTS;
use crate::types::GenerationSettings;

const ANTHROPIC: &str = "anthropic";
const TAVILY: &str = "tavily";

/// Layered configuration for the brief generator.
///
/// Keys and base URLs live behind shared locks so a cloned config can be
/// updated from anywhere; loop settings are plain values set at build time.
#[derive(Clone)]
pub struct BriefConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    model: Option<String>,
    max_turns: usize,
    timeout: Option<Duration>,
    max_results: usize,
    memory_dir: Option<PathBuf>,
    settings: GenerationSettings,
}

impl fmt::Debug for BriefConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers: Vec<String> = self
            .api_keys
            .read()
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("BriefConfig")
            .field("api_keys_for", &providers)
            .field("base_urls", &self.base_urls)
            .field("model", &self.model)
            .field("max_turns", &self.max_turns)
            .field("timeout", &self.timeout)
            .field("max_results", &self.max_results)
            .field("memory_dir", &self.memory_dir)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BriefConfig {
    /// Empty config with default limits.
    pub fn new() -> Self {
        Self {
            api_keys: Arc::new(RwLock::new(HashMap::new())),
            base_urls: Arc::new(RwLock::new(HashMap::new())),
            model: None,
            max_turns: DEFAULT_MAX_TURNS,
            timeout: None,
            max_results: DEFAULT_MAX_RESULTS,
            memory_dir: None,
            settings: GenerationSettings::default(),
        }
    }

    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        for (var, provider) in [("ANTHROPIC_API_KEY", ANTHROPIC), ("TAVILY_API_KEY", TAVILY)] {
            if let Some(key) = lookup(var).filter(|v| !v.trim().is_empty()) {
                config.set_api_key(provider, key);
            }
        }
        for (var, provider) in [("ANTHROPIC_BASE_URL", ANTHROPIC), ("TAVILY_BASE_URL", TAVILY)] {
            if let Some(url) = lookup(var).filter(|v| !v.trim().is_empty()) {
                config.set_base_url(provider, url);
            }
        }

        config.model = lookup("BRIEF_MODEL").filter(|v| !v.trim().is_empty());
        if let Some(turns) = parse_positive(&lookup, "BRIEF_MAX_TURNS") {
            config.max_turns = turns;
        }
        if let Some(results) = parse_positive(&lookup, "BRIEF_MAX_RESULTS") {
            config.max_results = results;
        }
        config.timeout =
            parse_positive(&lookup, "BRIEF_TIMEOUT_SECS").map(|secs| Duration::from_secs(secs as u64));
        config.memory_dir = lookup("BRIEF_MEMORY_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        config.settings = GenerationSettings::builder()
            .maybe_max_tokens(
                parse_positive(&lookup, "BRIEF_MAX_TOKENS").and_then(|n| u32::try_from(n).ok()),
            )
            .maybe_temperature(parse_temperature(&lookup))
            .build();

        config
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        self.api_keys
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys.read().ok()?.get(provider).cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        self.base_urls
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls.read().ok()?.get(provider).cloned()
    }

    pub fn anthropic_api_key(&self) -> Option<String> {
        self.get_api_key(ANTHROPIC)
    }

    pub fn tavily_api_key(&self) -> Option<String> {
        self.get_api_key(TAVILY)
    }

    pub fn anthropic_base_url(&self) -> Option<String> {
        self.get_base_url(ANTHROPIC)
    }

    pub fn tavily_base_url(&self) -> Option<String> {
        self.get_base_url(TAVILY)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_memory_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.memory_dir = Some(dir.into());
        self
    }

    /// Sampling settings for every model call (max tokens, temperature, ...).
    pub fn with_generation_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn model(&self) -> Option<String> {
        self.model.clone()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Directory for file-backed thread memory; `None` keeps memory in process.
    pub fn memory_dir(&self) -> Option<PathBuf> {
        self.memory_dir.clone()
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        self.settings.clone()
    }
}

fn parse_positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => {
            warn!(key, value = %raw, "ignoring invalid positive integer setting");
            None
        }
        Ok(value) => Some(value),
    }
}

fn parse_temperature(lookup: &impl Fn(&str) -> Option<String>) -> Option<f64> {
    let raw = lookup("BRIEF_TEMPERATURE")?;
    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Some(value),
        _ => {
            warn!(key = "BRIEF_TEMPERATURE", value = %raw, "ignoring temperature outside 0.0..=1.0");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = BriefConfig::from_lookup(lookup(&[]));
        assert_eq!(config.anthropic_api_key(), None);
        assert_eq!(config.model(), None);
        assert_eq!(config.max_turns(), DEFAULT_MAX_TURNS);
        assert_eq!(config.max_results(), 5);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.memory_dir(), None);
        assert_eq!(config.generation_settings().max_tokens, None);
        assert_eq!(config.generation_settings().temperature, None);
    }

    #[test]
    fn reads_keys_urls_and_limits() {
        let config = BriefConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("TAVILY_API_KEY", "tvly"),
            ("TAVILY_BASE_URL", "http://localhost:9000"),
            ("BRIEF_MODEL", "claude-3-haiku-20240307"),
            ("BRIEF_MAX_TURNS", "8"),
            ("BRIEF_TIMEOUT_SECS", "90"),
            ("BRIEF_MAX_RESULTS", "3"),
            ("BRIEF_MEMORY_DIR", "/tmp/threads"),
            ("BRIEF_MAX_TOKENS", "2048"),
            ("BRIEF_TEMPERATURE", "0.3"),
        ]));
        assert_eq!(config.anthropic_api_key().as_deref(), Some("sk-ant"));
        assert_eq!(config.tavily_api_key().as_deref(), Some("tvly"));
        assert_eq!(config.tavily_base_url().as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.anthropic_base_url(), None);
        assert_eq!(config.model().as_deref(), Some("claude-3-haiku-20240307"));
        assert_eq!(config.max_turns(), 8);
        assert_eq!(config.timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.max_results(), 3);
        assert_eq!(config.memory_dir(), Some(PathBuf::from("/tmp/threads")));
        assert_eq!(config.generation_settings().max_tokens, Some(2048));
        assert_eq!(config.generation_settings().temperature, Some(0.3));
    }

    #[test]
    fn invalid_numbers_and_blank_values_are_ignored() {
        let config = BriefConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "  "),
            ("BRIEF_MAX_TURNS", "0"),
            ("BRIEF_TIMEOUT_SECS", "soon"),
            ("BRIEF_TEMPERATURE", "1.7"),
        ]));
        assert_eq!(config.anthropic_api_key(), None);
        assert_eq!(config.generation_settings().temperature, None);
        assert_eq!(config.max_turns(), DEFAULT_MAX_TURNS);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn code_overrides_win() {
        let config = BriefConfig::from_lookup(lookup(&[("BRIEF_MAX_TURNS", "8")]))
            .with_max_turns(2)
            .with_model("claude-sonnet-4-20250514");
        config.set_api_key("anthropic", "explicit".into());
        assert_eq!(config.max_turns(), 2);
        assert_eq!(config.anthropic_api_key().as_deref(), Some("explicit"));

        let config = config.with_generation_settings(
            GenerationSettings::builder().top_k(40).build(),
        );
        assert_eq!(config.generation_settings().top_k, Some(40));

        let clone = config.clone();
        clone.set_base_url("anthropic", "http://proxy".into());
        assert_eq!(config.anthropic_base_url().as_deref(), Some("http://proxy"));
    }
}
