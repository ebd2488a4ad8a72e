use thiserror::Error;

use crate::telegram::TelegramError;

/// Per-item download failures. Each one is counted and the scan moves on.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Transfer failed for {path}: {source}")]
    Transfer {
        source: TelegramError,
        path: String,
    },

    #[error("Download failed (empty file): {0}")]
    EmptyFile(String),

    #[error("Interrupted while downloading {0}")]
    Interrupted(String),

    #[error("Disk error: {0}")]
    Disk(#[from] std::io::Error),
}

impl DownloadError {
    /// Whether the failure was caused by a shutdown request rather than the
    /// item itself.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, DownloadError::Interrupted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_classification() {
        assert!(DownloadError::Interrupted("x".into()).is_interrupted());
        assert!(!DownloadError::EmptyFile("x".into()).is_interrupted());
        assert!(!DownloadError::Disk(std::io::Error::other("disk full")).is_interrupted());
    }

    #[test]
    fn test_transfer_message_includes_path_and_cause() {
        let e = DownloadError::Transfer {
            source: TelegramError::Invocation("FILE_REFERENCE_EXPIRED".into()),
            path: "song.mp3".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("song.mp3"));
        assert!(msg.contains("FILE_REFERENCE_EXPIRED"));
    }
}
