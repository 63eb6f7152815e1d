//! File system port

use std::future::Future;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced by file system operations.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path does not exist.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// The path exists but is not accessible.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),
}

/// Port for the file system operations the client needs.
pub trait FileSystem: Send + Sync {
    /// Reads a file into memory.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing or unreadable.
    fn read_file(&self, path: &Path) -> impl Future<Output = Result<Vec<u8>, FileSystemError>> + Send;

    /// Writes a file, replacing any existing contents.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    fn write_file(
        &self,
        path: &Path,
        contents: &[u8],
    ) -> impl Future<Output = Result<(), FileSystemError>> + Send;

    /// Creates a directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> impl Future<Output = Result<(), FileSystemError>> + Send;

    /// Whether the path exists.
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    /// Removes a file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be removed.
    fn remove_file(&self, path: &Path) -> impl Future<Output = Result<(), FileSystemError>> + Send;
}
