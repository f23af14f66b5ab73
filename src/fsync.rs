//! Low-level fsync helpers used by the settings store and the mailbox.
//!
//! Both writers use the write-to-temp-then-rename pattern, and on POSIX
//! systems a rename only becomes durable once the containing directory has
//! been synced. Skipping the directory sync can lose a freshly renamed file
//! on power loss even when the file contents themselves were synced.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Syncs a file's contents and metadata to disk (`fsync(2)`).
pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Syncs a directory so that entry creations, renames, and deletions within
/// it are durable.
///
/// # Errors
///
/// Fails if the path cannot be opened or the fsync system call fails.
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(dir_path)?;
    dir.sync_all()
}
