//! The settings document and its load/write lifecycle.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::fsync::{fsync_dir, fsync_file};
use crate::types::StatusId;

/// Log filename template used when the configured one is empty.
pub const DEFAULT_LOG_FILE_TEMPLATE: &str = "%Y-%m.txt";

/// Errors that can occur while loading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No settings file existed. A default one has been written at the path;
    /// the operator must edit it before the bot can run.
    #[error("no settings file at {path}; a default file has been created")]
    ConfigMissing { path: PathBuf },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// The persisted settings document.
///
/// Typed fields cover everything the framework itself reads. Bot-specific
/// keys survive load/write cycles through the flattened `extra` map and are
/// reached via [`Settings::get_or`] / [`Settings::set`].
///
/// Absent keys deserialize to their defaults, never to an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsDoc {
    /// The application's consumer key.
    pub app_key: String,

    /// The application's consumer secret.
    pub app_secret: String,

    /// OAuth access token.
    pub access_token: String,

    /// OAuth access token secret.
    pub access_token_secret: String,

    /// Epoch seconds of the last successful post. Monotonically
    /// non-decreasing across runs; zero means "never posted".
    pub last_update: u64,

    /// Cursor: ID of the most recently processed mention.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_mention_id: Option<StatusId>,

    /// Per-cycle chance of posting, in [0, 1]. Not validated here; an
    /// out-of-range value is an operator error.
    pub tweet_probability: f64,

    /// Floor (seconds) between probabilistic posts.
    pub minimum_spacing: u64,

    /// Ceiling (seconds) after which a post is forced.
    pub maximum_spacing: u64,

    /// strftime template for the bot log filename.
    pub log_file_path: String,

    /// Human-readable timestamp of the last completed batch run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_executed: Option<String>,

    /// Bot-specific keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Default for SettingsDoc {
    fn default() -> Self {
        SettingsDoc {
            app_key: "!!! Your app's 'Consumer Key'".to_string(),
            app_secret: "!!! Your app's 'Consumer Secret'".to_string(),
            access_token: "!!! your access token".to_string(),
            access_token_secret: "!!! your access token secret".to_string(),
            last_update: 0,
            last_mention_id: None,
            // about one post per hour, drawn once a minute
            tweet_probability: 24.0 / 1440.0,
            minimum_spacing: 60 * 60,
            maximum_spacing: 4 * 60 * 60,
            log_file_path: DEFAULT_LOG_FILE_TEMPLATE.to_string(),
            last_executed: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// An in-memory settings document bound to its file path.
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
    doc: SettingsDoc,
}

impl Settings {
    /// Loads the settings file at `path`.
    ///
    /// If the file does not exist, atomically writes one populated from
    /// `defaults` and returns [`SettingsError::ConfigMissing`]. The caller
    /// must treat that as fatal: the fresh file holds placeholder secrets
    /// that an operator has to fill in by hand.
    ///
    /// # Errors
    ///
    /// `ConfigMissing` as above, `Io` for filesystem errors, `Json` if the
    /// existing file is not valid JSON.
    pub fn load(path: impl Into<PathBuf>, defaults: SettingsDoc) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            write_doc_atomic(&path, &defaults)?;
            return Err(SettingsError::ConfigMissing { path });
        }

        let bytes = std::fs::read(&path)?;
        let doc: SettingsDoc = serde_json::from_slice(&bytes)?;
        Ok(Settings { path, doc })
    }

    /// Returns the path this document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read access to the typed fields.
    pub fn doc(&self) -> &SettingsDoc {
        &self.doc
    }

    /// Mutable access to the typed fields.
    pub fn doc_mut(&mut self) -> &mut SettingsDoc {
        &mut self.doc
    }

    /// Returns the value stored under a bot-specific key, or `fallback` if
    /// the key is absent or has the wrong shape. Never fails.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.doc
            .extra
            .get(key)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or(fallback)
    }

    /// Stores a bot-specific key. Mutates in memory only; call
    /// [`Settings::write`] to persist.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.doc.extra.insert(key.into(), value.into());
    }

    /// Advances `lastUpdate` to `now`, never moving it backwards.
    pub fn record_update(&mut self, now: u64) {
        self.doc.last_update = self.doc.last_update.max(now);
    }

    /// Serializes the current in-memory state back to the file, fully
    /// replacing the prior contents.
    ///
    /// Uses the temp-write-rename-fsync sequence, so a crash mid-write
    /// leaves either the old document or the new one, never a partial file.
    pub fn write(&self) -> Result<()> {
        write_doc_atomic(&self.path, &self.doc)
    }
}

/// Writes a settings document atomically to `path`.
fn write_doc_atomic(path: &Path, doc: &SettingsDoc) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let bytes = serde_json::to_vec_pretty(doc)?;
    let tmp_path = path.with_extension("json.tmp");

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&bytes)?;
        fsync_file(&file)?;
    }

    std::fs::rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fsync_dir(parent)?;
        }
    }

    Ok(())
}
