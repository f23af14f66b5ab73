//! The bot's append-only event log.
//!
//! Each entry is one newline-terminated, tab-separated line:
//!
//! ```text
//! <epoch seconds> \t <event type> \t <field 1> \t <field 2> ...
//! ```
//!
//! The log filename comes from the `logFilePath` setting and is run through
//! strftime expansion against the current local time, so a template like
//! `%Y-%m.txt` rolls the log monthly without any maintenance.
//!
//! This file is part of the bot's observable behavior (operators grep it);
//! diagnostics for developers go through `tracing` instead.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::settings::DEFAULT_LOG_FILE_TEMPLATE;

/// Handle for appending to the bot's log file.
#[derive(Debug, Clone)]
pub struct BotLog {
    dir: PathBuf,
    template: String,
}

impl BotLog {
    /// Creates a log rooted at `dir` with the given filename template.
    ///
    /// An empty template falls back to [`DEFAULT_LOG_FILE_TEMPLATE`].
    pub fn new(dir: impl Into<PathBuf>, template: impl Into<String>) -> Self {
        let template = template.into();
        let template = if template.is_empty() {
            DEFAULT_LOG_FILE_TEMPLATE.to_string()
        } else {
            template
        };
        BotLog {
            dir: dir.into(),
            template,
        }
    }

    /// Returns the log path for the given instant, with the template's
    /// strftime codes expanded.
    ///
    /// A template with invalid format codes is used literally rather than
    /// panicking.
    pub fn path_for(&self, at: DateTime<Local>) -> PathBuf {
        let items: Vec<Item<'_>> = StrftimeItems::new(&self.template).collect();
        let name = if items.iter().any(|i| matches!(i, Item::Error)) {
            self.template.clone()
        } else {
            at.format_with_items(items.into_iter()).to_string()
        };
        self.dir.join(name)
    }

    /// Returns the directory the log lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends one entry with the current timestamp.
    pub fn append(&self, event_type: &str, fields: &[&str]) -> io::Result<()> {
        self.append_at(Local::now(), event_type, fields)
    }

    /// Appends one entry at an explicit instant.
    pub fn append_at(
        &self,
        at: DateTime<Local>,
        event_type: &str,
        fields: &[&str],
    ) -> io::Result<()> {
        let path = self.path_for(at);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let line = format!(
            "{}\t{}\t{}\n",
            at.timestamp(),
            event_type,
            fields.join("\t")
        );
        file.write_all(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at() -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn line_is_tab_separated_and_newline_terminated() {
        let dir = tempdir().unwrap();
        let log = BotLog::new(dir.path(), "fixed.txt");

        log.append_at(at(), "Tweet", &["3 o'clock"]).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("fixed.txt")).unwrap();
        assert_eq!(contents, "1700000000\tTweet\t3 o'clock\n");
    }

    #[test]
    fn appends_rather_than_truncates() {
        let dir = tempdir().unwrap();
        let log = BotLog::new(dir.path(), "fixed.txt");

        log.append_at(at(), "Mention", &["alice"]).unwrap();
        log.append_at(at(), "Reply", &["bob"]).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("fixed.txt")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Mention\talice"));
        assert!(lines[1].ends_with("Reply\tbob"));
    }

    #[test]
    fn template_expands_against_the_clock() {
        let dir = tempdir().unwrap();
        let log = BotLog::new(dir.path(), "%Y-%m.txt");

        let expected = dir.path().join(at().format("%Y-%m.txt").to_string());
        assert_eq!(log.path_for(at()), expected);
    }

    #[test]
    fn empty_template_uses_default() {
        let dir = tempdir().unwrap();
        let log = BotLog::new(dir.path(), "");
        let name = log.path_for(at());
        assert_eq!(
            name.file_name().unwrap().to_str().unwrap(),
            at().format(DEFAULT_LOG_FILE_TEMPLATE).to_string()
        );
    }

    #[test]
    fn invalid_template_is_used_literally() {
        let dir = tempdir().unwrap();
        let log = BotLog::new(dir.path(), "%Q-broken.txt");
        let name = log.path_for(at());
        assert_eq!(
            name.file_name().unwrap().to_str().unwrap(),
            "%Q-broken.txt"
        );
    }
}
