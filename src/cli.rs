//! The command-line surface shared by every bot binary.

use std::path::PathBuf;

use clap::Parser;

/// Flags common to every bot. Bots that need extra flags define their own
/// parser struct and `#[command(flatten)]` this one into it.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Run one cycle (or the streaming listener) of a bot")]
pub struct BaseArgs {
    /// Print what would be posted instead of talking to the network.
    #[arg(long)]
    pub debug: bool,

    /// Post this cycle regardless of the rate-limit policy.
    #[arg(long)]
    pub force: bool,

    /// Run the long-lived streaming listener instead of one batch cycle.
    #[arg(long)]
    pub stream: bool,

    /// Directory holding the bot's settings file, mailbox, and logs.
    #[arg(long, default_value = ".")]
    pub bot_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_a_plain_batch_run() {
        let args = BaseArgs::parse_from(["tockbot"]);
        assert!(!args.debug);
        assert!(!args.force);
        assert!(!args.stream);
        assert_eq!(args.bot_path, PathBuf::from("."));
    }

    #[test]
    fn flags_parse() {
        let args = BaseArgs::parse_from([
            "tockbot",
            "--debug",
            "--force",
            "--stream",
            "--bot-path",
            "/var/bots/tock",
        ]);
        assert!(args.debug);
        assert!(args.force);
        assert!(args.stream);
        assert_eq!(args.bot_path, PathBuf::from("/var/bots/tock"));
    }
}
