use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use grammers_client::Client;
use grammers_session::Session;

use super::error::TelegramError;

/// Owns the on-disk session file and the advisory lock guarding it.
///
/// The session itself is managed by the client library; this type only
/// decides where it lives, makes sure one process uses it at a time, and
/// writes it back after login and at exit.
pub struct SessionStore {
    path: PathBuf,
    /// Held for the lifetime of the store; released when the file is dropped.
    _lock_file: std::fs::File,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

pub(crate) fn lock_path(session_path: &Path) -> PathBuf {
    let mut name = session_path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

impl SessionStore {
    /// Lock the session path and load (or create) the session stored there.
    pub async fn open(path: &Path) -> Result<(Self, Session), TelegramError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::open_blocking(path))
            .await
            .map_err(|e| TelegramError::Session(std::io::Error::other(e)))?
    }

    fn open_blocking(path: PathBuf) -> Result<(Self, Session), TelegramError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let lock_path = lock_path(&path);
        let lock_file = std::fs::File::create(&lock_path)?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| TelegramError::SessionLocked(lock_path.display().to_string()))?;

        let session = Session::load_file_or_create(&path)?;
        tracing::debug!("Session loaded from {}", path.display());

        Ok((
            Self {
                path,
                _lock_file: lock_file,
            },
            session,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the client's current session (auth key, DC, cached peers).
    pub fn save(&self, client: &Client) -> Result<(), TelegramError> {
        client.session().save_to_file(&self.path)?;
        tracing::debug!("Session saved to {}", self.path.display());
        Ok(())
    }
}
