//! Configuration for the alarm daemon.
//!
//! Loads settings from a TOML file or uses defaults. Parse failures are
//! logged and fall back to defaults; a missing config file is normal.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default config file path.
pub const CONFIG_PATH: &str = "/etc/alarma/config.toml";

/// Catalog source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Primary catalog file (CSV or workbook).
    #[serde(default = "default_source_path")]
    pub path: PathBuf,

    /// Fallback paths probed in order when the primary path is absent.
    /// The exports land in different directories depending on which
    /// operations team produced them.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<PathBuf>,

    /// Worksheet to read from workbook sources. When absent or not found,
    /// the second sheet by position is used.
    #[serde(default)]
    pub sheet: Option<String>,

    /// Seconds between modification-time checks on the source file.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

/// Search tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum similarity (0.0–1.0) for the fuzzy element-name fallback.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// How many fuzzy candidates are considered before picking the best.
    #[serde(default = "default_fuzzy_candidates")]
    pub fuzzy_candidates: usize,
}

/// Session store bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of live sessions before LRU eviction.
    #[serde(default = "default_session_capacity")]
    pub capacity: usize,

    /// Idle seconds after which a session resets to a fresh state.
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
}

/// Conversation flow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Require the collected alarm number to be all digits, re-prompting
    /// otherwise. Some catalogs carry alphanumeric codes; those deployments
    /// turn this off.
    #[serde(default = "default_require_numeric_alarm")]
    pub require_numeric_alarm: bool,
}

/// Daemon configuration root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_source_config")]
    pub source: SourceConfig,

    #[serde(default = "default_search_config")]
    pub search: SearchConfig,

    #[serde(default = "default_session_config")]
    pub sessions: SessionConfig,

    #[serde(default = "default_conversation_config")]
    pub conversation: ConversationConfig,
}

fn default_source_path() -> PathBuf {
    PathBuf::from("data/CatalogoAlarmas.csv")
}

fn default_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("static/data/CatalogoAlarmas.csv"),
        PathBuf::from("instructivos/data/CatalogoAlarmas.csv"),
        PathBuf::from("CatalogoAlarmas.csv"),
    ]
}

fn default_refresh_secs() -> u64 {
    300
}

fn default_fuzzy_threshold() -> f64 {
    0.4
}

fn default_fuzzy_candidates() -> usize {
    3
}

fn default_session_capacity() -> usize {
    1024
}

fn default_session_ttl_secs() -> u64 {
    1800
}

fn default_require_numeric_alarm() -> bool {
    true
}

fn default_source_config() -> SourceConfig {
    SourceConfig {
        path: default_source_path(),
        candidates: default_candidates(),
        sheet: None,
        refresh_secs: default_refresh_secs(),
    }
}

fn default_search_config() -> SearchConfig {
    SearchConfig {
        fuzzy_threshold: default_fuzzy_threshold(),
        fuzzy_candidates: default_fuzzy_candidates(),
    }
}

fn default_session_config() -> SessionConfig {
    SessionConfig {
        capacity: default_session_capacity(),
        ttl_secs: default_session_ttl_secs(),
    }
}

fn default_conversation_config() -> ConversationConfig {
    ConversationConfig {
        require_numeric_alarm: default_require_numeric_alarm(),
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            source: default_source_config(),
            search: default_search_config(),
            sessions: default_session_config(),
            conversation: default_conversation_config(),
        }
    }
}

impl DaemonConfig {
    /// Load config from `path`, falling back to defaults when the file is
    /// absent or unparsable.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Using default config ({e:#})");
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}
