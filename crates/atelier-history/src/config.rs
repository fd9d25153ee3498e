//! Configuration management.
//!
//! Handles loading configuration from multiple sources:
//! - Global config (`~/.config/atelier/config.json`)
//! - `ATELIER_CONFIG_CONTENT` environment variable
//! - Project config (`atelier.jsonc` or `atelier.json`)
//!
//! Later sources override earlier ones field by field. Files may contain
//! `//` and `/* */` comments.

use crate::error::{ConfigError, HistoryResult};
use crate::retry::RetryPolicy;
use crate::stack::DEFAULT_MAX_DEPTH;
use crate::store::DEFAULT_MAX_VERSIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable holding inline JSONC config.
pub const CONFIG_ENV_VAR: &str = "ATELIER_CONFIG_CONTENT";

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

const GLOBAL_CONFIG_NAMES: &[&str] = &["config.json", "atelier.jsonc", "atelier.json"];
const PROJECT_CONFIG_NAMES: &[&str] = &["atelier.jsonc", "atelier.json"];

/// Config file contents. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Log level (error, warn, info, debug, trace).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// History engine settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<HistorySettings>,
}

/// History section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySettings {
    /// Versions kept per design.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_versions: Option<usize>,

    /// Undo steps kept per editing session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_undo_depth: Option<usize>,

    /// Seconds between auto-save ticks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosave_interval_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetrySettings>,
}

/// Storage retry section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_factor: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
}

/// Resolved history engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub max_versions: usize,
    pub max_undo_depth: usize,
    pub autosave_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_versions: DEFAULT_MAX_VERSIONS,
            max_undo_depth: DEFAULT_MAX_DEPTH,
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl HistoryConfig {
    /// Load and resolve the history settings from all config sources.
    pub async fn load(project_dir: Option<&Path>) -> HistoryResult<Self> {
        let (config, _) = Config::load(project_dir).await?;
        config.history_config()
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Validation {
                message: message.to_string(),
            })
        };

        if self.max_versions == 0 {
            return invalid("history.maxVersions must be at least 1");
        }
        if self.max_undo_depth == 0 {
            return invalid("history.maxUndoDepth must be at least 1");
        }
        if self.autosave_interval.is_zero() {
            return invalid("history.autosaveIntervalSecs must be at least 1");
        }
        if self.retry.max_attempts == 0 {
            return invalid("history.retry.maxAttempts must be at least 1");
        }
        if self.retry.backoff_factor == 0 {
            return invalid("history.retry.backoffFactor must be at least 1");
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Loading order (later sources override earlier):
    /// 1. Global config from `~/.config/atelier/`
    /// 2. `ATELIER_CONFIG_CONTENT` environment variable
    /// 3. Project config from `project_dir`
    ///
    /// Returns the merged config and the files it was read from.
    pub async fn load(project_dir: Option<&Path>) -> HistoryResult<(Self, Vec<PathBuf>)> {
        let env_content = std::env::var(CONFIG_ENV_VAR).ok();
        Self::load_from(
            atelier_util::path::config_dir().as_deref(),
            env_content.as_deref(),
            project_dir,
        )
        .await
    }

    /// Load configuration from explicit sources.
    pub async fn load_from(
        global_dir: Option<&Path>,
        env_content: Option<&str>,
        project_dir: Option<&Path>,
    ) -> HistoryResult<(Self, Vec<PathBuf>)> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        // 1. Load global config
        if let Some(dir) = global_dir {
            if let Some(path) = first_existing(dir, GLOBAL_CONFIG_NAMES) {
                config = config.merge(Self::load_file(&path).await?);
                sources.push(path);
            }
        }

        // 2. Load from environment variable
        if let Some(content) = env_content {
            config = config.merge(Self::parse_jsonc(content, "<env>")?);
        }

        // 3. Load project config
        if let Some(dir) = project_dir {
            if let Some(path) = first_existing(dir, PROJECT_CONFIG_NAMES) {
                config = config.merge(Self::load_file(&path).await?);
                sources.push(path);
            }
        }

        debug!(sources = ?sources, "Loaded configuration");
        Ok((config, sources))
    }

    /// Load configuration from a file.
    pub async fn load_file(path: &Path) -> HistoryResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self::parse_jsonc(&content, &path.display().to_string())?)
    }

    /// Parse JSONC (JSON with comments).
    pub fn parse_jsonc(content: &str, source: &str) -> Result<Self, ConfigError> {
        let stripped = strip_comments(content);
        serde_json::from_str(&stripped).map_err(|e| ConfigError::InvalidJson {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(mut self, other: Self) -> Self {
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        self.history = match (self.history, other.history) {
            (Some(base), Some(other)) => Some(base.merge(other)),
            (base, None) => base,
            (None, other) => other,
        };
        self
    }

    /// Resolve the history section onto the defaults and validate it.
    pub fn history_config(&self) -> HistoryResult<HistoryConfig> {
        let mut resolved = HistoryConfig::default();
        if let Some(history) = &self.history {
            history.apply(&mut resolved);
        }
        resolved.validate()?;
        Ok(resolved)
    }

    /// A fully populated config describing the effective settings.
    pub fn effective(&self) -> HistoryResult<Self> {
        let history = self.history_config()?;
        Ok(Self {
            log_level: self.log_level.clone(),
            history: Some(HistorySettings::from(&history)),
        })
    }
}

impl HistorySettings {
    pub fn merge(mut self, other: Self) -> Self {
        self.max_versions = merge_option(self.max_versions, other.max_versions);
        self.max_undo_depth = merge_option(self.max_undo_depth, other.max_undo_depth);
        self.autosave_interval_secs =
            merge_option(self.autosave_interval_secs, other.autosave_interval_secs);
        self.retry = match (self.retry, other.retry) {
            (Some(base), Some(other)) => Some(base.merge(other)),
            (base, None) => base,
            (None, other) => other,
        };
        self
    }

    fn apply(&self, config: &mut HistoryConfig) {
        if let Some(n) = self.max_versions {
            config.max_versions = n;
        }
        if let Some(n) = self.max_undo_depth {
            config.max_undo_depth = n;
        }
        if let Some(secs) = self.autosave_interval_secs {
            config.autosave_interval = Duration::from_secs(secs);
        }
        if let Some(retry) = &self.retry {
            retry.apply(&mut config.retry);
        }
    }
}

impl From<&HistoryConfig> for HistorySettings {
    fn from(config: &HistoryConfig) -> Self {
        Self {
            max_versions: Some(config.max_versions),
            max_undo_depth: Some(config.max_undo_depth),
            autosave_interval_secs: Some(config.autosave_interval.as_secs()),
            retry: Some(RetrySettings {
                max_attempts: Some(config.retry.max_attempts),
                initial_delay_ms: Some(config.retry.initial_delay.as_millis() as u64),
                backoff_factor: Some(config.retry.backoff_factor),
                max_delay_ms: Some(config.retry.max_delay.as_millis() as u64),
            }),
        }
    }
}

impl RetrySettings {
    pub fn merge(mut self, other: Self) -> Self {
        self.max_attempts = merge_option(self.max_attempts, other.max_attempts);
        self.initial_delay_ms = merge_option(self.initial_delay_ms, other.initial_delay_ms);
        self.backoff_factor = merge_option(self.backoff_factor, other.backoff_factor);
        self.max_delay_ms = merge_option(self.max_delay_ms, other.max_delay_ms);
        self
    }

    fn apply(&self, policy: &mut RetryPolicy) {
        if let Some(n) = self.max_attempts {
            policy.max_attempts = n;
        }
        if let Some(ms) = self.initial_delay_ms {
            policy.initial_delay = Duration::from_millis(ms);
        }
        if let Some(factor) = self.backoff_factor {
            policy.backoff_factor = factor;
        }
        if let Some(ms) = self.max_delay_ms {
            policy.max_delay = Duration::from_millis(ms);
        }
    }
}

fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Merge two Option values.
fn merge_option<T>(base: Option<T>, other: Option<T>) -> Option<T> {
    match (base, other) {
        (_, Some(o)) => Some(o),
        (b, None) => b,
    }
}

/// Strip JSON comments.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            result.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            result.push(c);
            continue;
        }

        if in_string {
            result.push(c);
            continue;
        }

        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        // Keep line numbers stable for parse errors
                        if c == '\n' {
                            result.push('\n');
                        }
                        prev = c;
                    }
                    continue;
                }
                _ => {}
            }
        }

        result.push(c);
    }

    result
}
