use serde::{Deserialize, Serialize};

use crate::error::DbStorageError;

/// Journal mode pragma applied when a connection is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    pub(crate) fn as_pragma(self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

/// Driver-tuning options.
///
/// The engine passes these through to the driver when it opens a connection;
/// none of the fields influence engine logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub journal_mode: JournalMode,
    /// Page cache size in `KiB`; the driver default applies when unset.
    #[serde(default)]
    pub cache_size_kib: Option<u32>,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
            cache_size_kib: None,
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder {
            opts: StorageConfig::default(),
        }
    }

    /// Load options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `DbStorageError::ConfigError` if the document does not parse.
    pub fn from_json_str(json: &str) -> Result<Self, DbStorageError> {
        serde_json::from_str(json)
            .map_err(|e| DbStorageError::ConfigError(format!("invalid config JSON: {e}")))
    }
}

/// Fluent builder for [`StorageConfig`].
#[derive(Debug, Clone)]
pub struct StorageConfigBuilder {
    opts: StorageConfig,
}

impl StorageConfigBuilder {
    #[must_use]
    pub fn busy_timeout_ms(mut self, timeout: u64) -> Self {
        self.opts.busy_timeout_ms = timeout;
        self
    }

    #[must_use]
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.opts.journal_mode = mode;
        self
    }

    #[must_use]
    pub fn cache_size_kib(mut self, kib: u32) -> Self {
        self.opts.cache_size_kib = Some(kib);
        self
    }

    #[must_use]
    pub fn finish(self) -> StorageConfig {
        self.opts
    }
}
