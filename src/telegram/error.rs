use thiserror::Error;

/// Errors raised at the Telegram service boundary.
///
/// Library errors are captured as display strings: the scan never branches on
/// their inner variants, it only reports them.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Failed to connect to Telegram: {0}")]
    Connect(String),

    #[error("Telegram request failed: {0}")]
    Invocation(String),

    #[error("Sign-in failed: {0}")]
    SignIn(String),

    #[error("Could not find channel '{0}'. Make sure you have access to it.")]
    ChannelNotFound(String),

    #[error(
        "Not logged in and stdin is not a terminal.\n\
         Run `tgaudio-rs --auth-only` interactively to create the session file,\n\
         then restart."
    )]
    Headless,

    #[error("Another tgaudio-rs instance is using this session (lock: {0})")]
    SessionLocked(String),

    #[error("Session file error: {0}")]
    Session(#[from] std::io::Error),
}

impl TelegramError {
    pub(crate) fn invocation(e: impl std::fmt::Display) -> Self {
        TelegramError::Invocation(e.to_string())
    }
}
