use clap::Parser;
use crate::types::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "tgaudio-rs",
    about = "Download music, voice notes and audio documents from a Telegram channel"
)]
pub struct Cli {
    /// Telegram API id (from https://my.telegram.org/apps)
    #[arg(long, env = "API_ID")]
    pub api_id: Option<String>,

    /// Telegram API hash.
    /// WARNING: passing via --api-hash is visible in process listings.
    /// Prefer the API_HASH environment variable or a .env file instead.
    #[arg(long, env = "API_HASH", hide_env_values = true)]
    pub api_hash: Option<String>,

    /// Channel to scan: '@channelname', a t.me link, or a numeric channel id
    #[arg(short = 'c', long, env = "CHANNEL_USERNAME")]
    pub channel: Option<String>,

    /// Local directory for downloads (a subfolder per channel is created)
    #[arg(short = 'd', long, env = "DOWNLOAD_DIR", default_value = "./downloads")]
    pub directory: String,

    /// Session name; the session is stored in `<name>.session`
    #[arg(long, env = "SESSION_NAME", default_value = "telegram_music_downloader")]
    pub session_name: String,

    /// Phone number used for the first login (prompted if absent)
    #[arg(long, env = "PHONE_NUMBER")]
    pub phone: Option<String>,

    /// File listing filenames that must never be downloaded
    #[arg(long, env = "IGNORE_LIST", default_value = "ignore_list.txt")]
    pub ignore_list: String,

    /// Only scan the N most recent messages
    #[arg(long)]
    pub recent: Option<usize>,

    /// Skip messages posted before this ISO date or interval (e.g., 2025-01-02 or 20d)
    #[arg(long)]
    pub skip_created_before: Option<String>,

    /// Skip messages posted after this ISO date or interval
    #[arg(long)]
    pub skip_created_after: Option<String>,

    /// Only authenticate (create/update the session file)
    #[arg(long)]
    pub auth_only: bool,

    /// Report what would be downloaded without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["tgaudio-rs"]).unwrap();
        assert_eq!(cli.directory, "./downloads");
        assert_eq!(cli.session_name, "telegram_music_downloader");
        assert_eq!(cli.ignore_list, "ignore_list.txt");
        assert_eq!(cli.log_level, LogLevel::Info);
        assert!(!cli.dry_run);
        assert!(cli.recent.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "tgaudio-rs",
            "--api-id",
            "123",
            "--api-hash",
            "abc",
            "-c",
            "@music",
            "-d",
            "/tmp/out",
            "--recent",
            "50",
            "--dry-run",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.api_id.as_deref(), Some("123"));
        assert_eq!(cli.api_hash.as_deref(), Some("abc"));
        assert_eq!(cli.channel.as_deref(), Some("@music"));
        assert_eq!(cli.directory, "/tmp/out");
        assert_eq!(cli.recent, Some(50));
        assert!(cli.dry_run);
        assert_eq!(cli.log_level, LogLevel::Debug);
    }
}
