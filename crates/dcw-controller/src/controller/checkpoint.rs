use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tokio::{fs, io::AsyncWriteExt};

/// Durable home of the generator checkpoint.
///
/// Writes go to a sibling temp file which is synced and then renamed over the
/// checkpoint, so a crash mid-write leaves the previous checkpoint intact.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored checkpoint, or `None` if none was written yet.
    pub async fn load(&self) -> anyhow::Result<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("failed to read checkpoint {}", self.path.display())),
        }
    }

    pub async fn save(&self, checkpoint: &[u8]) -> anyhow::Result<()> {
        let tmp = self.tmp_path();

        let mut file = fs::File::create(&tmp)
            .await
            .with_context(|| format!("failed to create {}", tmp.display()))?;
        file.write_all(checkpoint)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("failed to sync {}", tmp.display()))?;
        drop(file);

        fs::rename(&tmp, &self.path).await.with_context(|| {
            format!(
                "failed to move {} to {}",
                tmp.display(),
                self.path.display()
            )
        })?;

        tracing::debug!("Checkpoint saved to {}", self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("checkpoint"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
