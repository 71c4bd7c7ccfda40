//! Scoped temporary working directory.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

const PAYLOAD_FILE: &str = "testFile.txt";
const DOWNLOAD_FILE: &str = "testFileIn.txt";

/// Temporary directory holding the upload payload and its downloaded copy.
///
/// Released explicitly by the aggregator; dropping it also removes the
/// directory.
#[derive(Debug)]
pub struct Workdir {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workdir {
    /// Creates a fresh working directory under the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created.
    pub fn create() -> io::Result<Self> {
        Ok(Self::from_tempdir(
            tempfile::Builder::new().prefix("s3probe-").tempdir()?,
        ))
    }

    /// Creates a fresh working directory under `parent`.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created.
    pub fn create_in(parent: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_tempdir(
            tempfile::Builder::new()
                .prefix("s3probe-")
                .tempdir_in(parent)?,
        ))
    }

    fn from_tempdir(dir: TempDir) -> Self {
        Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        }
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the generated upload payload is written.
    #[must_use]
    pub fn payload_path(&self) -> PathBuf {
        self.path.join(PAYLOAD_FILE)
    }

    /// Where the downloaded copy is written.
    #[must_use]
    pub fn download_path(&self) -> PathBuf {
        self.path.join(DOWNLOAD_FILE)
    }

    /// Returns true once [`release`](Self::release) has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }

    /// Removes the directory and everything in it.
    ///
    /// Best effort: failures are logged and swallowed. Calling this more than
    /// once is a no-op.
    pub fn release(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => debug!(path = %self.path.display(), "Released working directory"),
            Err(e) => debug!(path = %self.path.display(), error = %e, "Failed to release working directory"),
        }
    }
}
