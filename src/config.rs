use crate::types::ChannelRef;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::path::PathBuf;

/// Application configuration, validated from the CLI/env layer.
pub struct Config {
    pub api_id: i32,
    pub api_hash: String,
    /// `None` only when `auth_only` is set.
    pub channel: Option<ChannelRef>,
    pub phone: Option<String>,
    pub directory: PathBuf,
    pub session_path: PathBuf,
    pub ignore_list: PathBuf,

    pub skip_created_before: Option<DateTime<Local>>,
    pub skip_created_after: Option<DateTime<Local>>,

    pub recent: Option<usize>,

    pub auth_only: bool,
    pub dry_run: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("channel", &self.channel)
            .field("directory", &self.directory)
            .field("session_path", &self.session_path)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Session files live next to the working directory by default and always
/// carry the `.session` extension.
fn session_path(session_name: &str) -> PathBuf {
    let path = expand_tilde(session_name);
    if path.extension().is_some_and(|e| e == "session") {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(".session");
        PathBuf::from(name)
    }
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        let (api_id, api_hash) = match (cli.api_id.as_deref(), cli.api_hash) {
            (Some(id), Some(hash)) if !id.trim().is_empty() && !hash.trim().is_empty() => {
                let id = id.trim().parse::<i32>().map_err(|_| {
                    anyhow::anyhow!("API_ID must be an integer, got '{}'", id.trim())
                })?;
                (id, hash.trim().to_string())
            }
            _ => anyhow::bail!(
                "API_ID and API_HASH must be set in .env file or environment variables.\n\
                 Get them from https://my.telegram.org/apps"
            ),
        };

        let channel = cli.channel.as_deref().map(ChannelRef::parse).transpose()?;
        if channel.is_none() && !cli.auth_only {
            anyhow::bail!(
                "CHANNEL_USERNAME must be set in .env file or environment variables.\n\
                 Format: '@channelname' or channel ID"
            );
        }

        let skip_created_before = cli
            .skip_created_before
            .as_deref()
            .map(parse_date_or_interval)
            .transpose()?;
        let skip_created_after = cli
            .skip_created_after
            .as_deref()
            .map(parse_date_or_interval)
            .transpose()?;
        if let (Some(before), Some(after)) = (&skip_created_before, &skip_created_after) {
            if before > after {
                anyhow::bail!(
                    "--skip-created-before ({}) is later than --skip-created-after ({}); \
                     no message could match",
                    before.format("%Y-%m-%d %H:%M:%S"),
                    after.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        Ok(Self {
            api_id,
            api_hash,
            channel,
            phone: cli.phone.filter(|p| !p.trim().is_empty()),
            directory: expand_tilde(&cli.directory),
            session_path: session_path(&cli.session_name),
            ignore_list: expand_tilde(&cli.ignore_list),
            skip_created_before,
            skip_created_after,
            recent: cli.recent,
            auth_only: cli.auth_only,
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
        })
    }
}

/// Parse a human-friendly date spec into a concrete timestamp.
///
/// Supports three formats:
/// - Relative interval: `"20d"` (20 days ago from now)
/// - ISO date: `"2025-01-02"` (midnight local time)
/// - ISO datetime: `"2025-01-02T14:30:00"` (local time)
pub(crate) fn parse_date_or_interval(s: &str) -> anyhow::Result<DateTime<Local>> {
    if let Some(days_str) = s.strip_suffix('d') {
        if let Ok(days) = days_str.parse::<i64>() {
            return Ok(Local::now() - chrono::Duration::days(days));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive_dt) = date.and_hms_opt(0, 0, 0) {
            if let Some(dt) = naive_dt.and_local_timezone(Local).single() {
                return Ok(dt);
            }
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        if let Some(local) = dt.and_local_timezone(Local).single() {
            return Ok(local);
        }
    }
    anyhow::bail!(
        "Cannot parse '{}' as a date. Expected ISO date (2025-01-02), \
         datetime (2025-01-02T14:30:00), or interval (20d)",
        s
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_with_home() {
        let result = expand_tilde("~/Music");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(result, home.join("Music"));
        }
    }

    #[test]
    fn test_expand_tilde_no_prefix() {
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn test_session_path_appends_extension() {
        assert_eq!(
            session_path("telegram_music_downloader"),
            PathBuf::from("telegram_music_downloader.session")
        );
        assert_eq!(session_path("a.session"), PathBuf::from("a.session"));
        assert_eq!(session_path("dir/my.bot"), PathBuf::from("dir/my.bot.session"));
    }

    #[test]
    fn test_parse_date_iso() {
        let dt = parse_date_or_interval("2025-01-15").unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_datetime_iso() {
        let dt = parse_date_or_interval("2025-06-15T14:30:00").unwrap();
        let naive = dt.naive_local();
        assert_eq!(naive.date(), NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(
            naive.time(),
            chrono::NaiveTime::from_hms_opt(14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_interval_days() {
        let before = chrono::Local::now();
        let dt = parse_date_or_interval("10d").unwrap();
        let after = chrono::Local::now();
        assert!(dt >= before - chrono::Duration::days(10) - chrono::Duration::seconds(1));
        assert!(dt <= after - chrono::Duration::days(10) + chrono::Duration::seconds(1));
    }

    #[test]
    fn test_parse_invalid_date() {
        assert!(parse_date_or_interval("not-a-date").is_err());
        assert!(parse_date_or_interval("").is_err());
    }

    fn make_cli(args: &[&str]) -> crate::cli::Cli {
        use clap::Parser;
        let mut full = vec!["tgaudio-rs"];
        full.extend_from_slice(args);
        crate::cli::Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_from_cli_valid() {
        let cli = make_cli(&["--api-id", "12345", "--api-hash", "deadbeef", "-c", "@tunes"]);
        let cfg = Config::from_cli(cli).unwrap();
        assert_eq!(cfg.api_id, 12345);
        assert_eq!(cfg.api_hash, "deadbeef");
        assert_eq!(cfg.channel, Some(ChannelRef::Username("tunes".into())));
        assert_eq!(cfg.directory, PathBuf::from("./downloads"));
        assert_eq!(
            cfg.session_path,
            PathBuf::from("telegram_music_downloader.session")
        );
    }

    #[test]
    fn test_from_cli_rejects_non_numeric_api_id() {
        let cli = make_cli(&["--api-id", "abc", "--api-hash", "h", "-c", "@tunes"]);
        let err = Config::from_cli(cli).unwrap_err();
        assert!(err.to_string().contains("API_ID must be an integer"));
    }

    #[test]
    fn test_from_cli_requires_channel_unless_auth_only() {
        let cli = make_cli(&["--api-id", "1", "--api-hash", "h"]);
        assert!(Config::from_cli(cli).is_err());

        let cli = make_cli(&["--api-id", "1", "--api-hash", "h", "--auth-only"]);
        let cfg = Config::from_cli(cli).unwrap();
        assert!(cfg.auth_only);
        assert!(cfg.channel.is_none());
    }

    #[test]
    fn test_from_cli_rejects_inverted_date_window() {
        let cli = make_cli(&[
            "--api-id",
            "1",
            "--api-hash",
            "h",
            "-c",
            "@tunes",
            "--skip-created-before",
            "2025-02-01",
            "--skip-created-after",
            "2025-01-01",
        ]);
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn test_debug_redacts_api_hash() {
        let cli = make_cli(&["--api-id", "1", "--api-hash", "topsecret", "-c", "@tunes"]);
        let cfg = Config::from_cli(cli).unwrap();
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("topsecret"));
        assert!(dbg.contains("<redacted>"));
    }
}
