//! File-based session store implementation.
//!
//! The session lives in a single JSON document under the platform config
//! directory, e.g. `~/.config/kennel/session.json` on Linux. The file
//! keeps the long-standing `admin_token` / `admin_refresh_token` /
//! `admin_user` / `admin_token_expiration` key layout, so sessions
//! written by earlier builds keep loading.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use kennel_application::ports::{FileSystem, FileSystemError, SessionStore, StoreError};
use kennel_domain::Session;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Converts `FileSystemError` to `std::io::Error` for `StoreError`.
fn to_io_error(e: FileSystemError) -> std::io::Error {
    match e {
        FileSystemError::Io(io_err) => io_err,
        FileSystemError::NotFound(path) => {
            std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string())
        }
        FileSystemError::PermissionDenied(path) => std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            path.display().to_string(),
        ),
    }
}

/// File-based session store.
///
/// The whole session is replaced on every save; there is no partial
/// update, so a crash can never leave mixed generations of tokens in
/// the file.
#[derive(Debug, Clone)]
pub struct FileSessionStore<F> {
    fs: F,
    path: PathBuf,
}

impl<F: FileSystem> FileSessionStore<F> {
    /// Creates a store that reads and writes the given file.
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Default session file location under the platform config directory.
    ///
    /// Falls back to the working directory when the platform reports no
    /// config directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kennel")
            .join("session.json")
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<F: FileSystem> SessionStore for FileSessionStore<F> {
    async fn load(&self) -> Result<Option<Session>, StoreError> {
        if !self.fs.exists(&self.path).await {
            return Ok(None);
        }

        let content = self
            .fs
            .read_file(&self.path)
            .await
            .map_err(|e| StoreError::Io(to_io_error(e)))?;

        let session: Session =
            from_json_bytes(&content).map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            self.fs
                .create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(to_io_error(e)))?;
        }

        let content = to_json_stable_bytes(session)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.fs
            .write_file(&self.path, &content)
            .await
            .map_err(|e| StoreError::Io(to_io_error(e)))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if !self.fs.exists(&self.path).await {
            return Ok(());
        }

        self.fs
            .remove_file(&self.path)
            .await
            .map_err(|e| StoreError::Io(to_io_error(e)))
    }
}
