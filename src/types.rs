use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How the operator identified the channel to scan.
///
/// Numeric ids (including the `-100`-prefixed form Telegram clients show for
/// channels) cannot be resolved directly without an access hash, so they are
/// looked up among the account's dialogs instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Username(String),
    Id(i64),
}

impl ChannelRef {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            anyhow::bail!("Channel must not be empty. Format: '@channelname' or channel ID");
        }
        if let Ok(id) = trimmed.parse::<i64>() {
            return Ok(ChannelRef::Id(normalize_channel_id(id)));
        }
        let name = trimmed
            .strip_prefix("https://t.me/")
            .or_else(|| trimmed.strip_prefix("t.me/"))
            .unwrap_or(trimmed);
        let name = name.strip_prefix('@').unwrap_or(name);
        if name.is_empty() {
            anyhow::bail!("Channel '{}' has no username after the prefix", raw);
        }
        Ok(ChannelRef::Username(name.to_string()))
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Username(name) => write!(f, "@{}", name),
            ChannelRef::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Strip the Bot-API style `-100` marker so ids compare against bare chat ids.
fn normalize_channel_id(id: i64) -> i64 {
    const CHANNEL_MARKER: i64 = -1_000_000_000_000;
    if id < CHANNEL_MARKER {
        CHANNEL_MARKER - id
    } else {
        id.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_username_with_at() {
        assert_eq!(
            ChannelRef::parse("@music").unwrap(),
            ChannelRef::Username("music".into())
        );
    }

    #[test]
    fn test_parse_bare_username_and_link() {
        assert_eq!(
            ChannelRef::parse("music").unwrap(),
            ChannelRef::Username("music".into())
        );
        assert_eq!(
            ChannelRef::parse("https://t.me/music").unwrap(),
            ChannelRef::Username("music".into())
        );
    }

    #[test]
    fn test_parse_numeric_ids() {
        assert_eq!(ChannelRef::parse("1234567").unwrap(), ChannelRef::Id(1234567));
        assert_eq!(
            ChannelRef::parse("-1001234567890").unwrap(),
            ChannelRef::Id(1234567890)
        );
        assert_eq!(ChannelRef::parse("-42").unwrap(), ChannelRef::Id(42));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(ChannelRef::parse("").is_err());
        assert!(ChannelRef::parse("   ").is_err());
        assert!(ChannelRef::parse("@").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ChannelRef::Username("x".into()).to_string(), "@x");
        assert_eq!(ChannelRef::Id(7).to_string(), "7");
    }
}
