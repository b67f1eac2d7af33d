use std::path::{Path, PathBuf};

use futures_util::future::{BoxFuture, FutureExt};

use crate::channel::{ShareChannel, ShareError};
use crate::export::SharePayload;

/// Writes the payload body to a file.
///
/// With a directory path the payload's file name is appended, so the
/// result is `<dir>/event-logs.json`.
#[derive(Debug, Clone)]
pub struct FileChannel {
    path: PathBuf,
}

impl FileChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The configured path, before a directory gets the file name appended.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn target(&self, payload: &SharePayload) -> PathBuf {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_dir() => self.path.join(&payload.file_name),
            _ => self.path.clone(),
        }
    }
}

impl ShareChannel for FileChannel {
    fn name(&self) -> &'static str {
        "file"
    }

    fn deliver<'a>(&'a self, payload: &'a SharePayload) -> BoxFuture<'a, Result<(), ShareError>> {
        async move {
            let target = self.target(payload).await;
            tokio::fs::write(&target, payload.body.as_bytes()).await?;
            tracing::debug!(path = %target.display(), bytes = payload.body.len(), "payload written");
            Ok(())
        }
        .boxed()
    }
}
