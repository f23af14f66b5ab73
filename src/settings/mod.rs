//! Durable settings and run-state store.
//!
//! Each bot keeps a single JSON document at `<botPath>/<botName>.json`
//! holding both hand-edited configuration (credentials, spacing bounds) and
//! mutable run state (`lastUpdate`, `lastMentionId`). The document is loaded
//! at the start of a run, mutated in memory, and written back at the end.
//!
//! # Atomic Writes
//!
//! Writes fully replace the file using write-to-temp-then-rename:
//! 1. Write to `<name>.json.tmp`
//! 2. fsync the temp file
//! 3. Rename to `<name>.json`
//! 4. fsync the directory
//!
//! A crash mid-write therefore never leaves a truncated document for the
//! next load to trip over.
//!
//! # Missing Config
//!
//! If no file exists at the given path, [`Settings::load`] writes one
//! populated from the supplied defaults and returns
//! [`SettingsError::ConfigMissing`]. The caller is expected to tell the
//! operator to fill in the credentials and halt; silently continuing with
//! placeholder secrets would only produce authentication failures later.

mod store;

pub use store::{Settings, SettingsDoc, SettingsError, DEFAULT_LOG_FILE_TEMPLATE};
