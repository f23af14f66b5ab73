//! Writer side of the mailbox: used by the streaming listener process.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use uuid::Uuid;

use crate::fsync::{fsync_dir, fsync_file};

use super::Result;

/// Filename extension for mailbox event files.
pub const STREAM_EXTENSION: &str = "stream";

/// Writes one event record into the mailbox directory.
///
/// The filename is a fresh uuid-v4 token, so concurrent writers can never
/// collide. The write uses temp-then-rename with fsyncs, so the reader only
/// ever sees complete files: an in-flight write is a `.stream.tmp` file,
/// which drain ignores.
///
/// Returns the path of the created file.
pub fn spool_event(dir: &Path, record: &Value) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let token = Uuid::new_v4().simple().to_string();
    let final_path = dir.join(format!("{token}.{STREAM_EXTENSION}"));
    let tmp_path = dir.join(format!("{token}.{STREAM_EXTENSION}.tmp"));

    let bytes = serde_json::to_vec(record)?;
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;
        file.write_all(&bytes)?;
        fsync_file(&file)?;
    }

    std::fs::rename(&tmp_path, &final_path)?;
    fsync_dir(dir)?;

    Ok(final_path)
}
