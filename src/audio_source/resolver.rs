//! Resolution of audio sources to filesystem paths.

use super::{AudioSource, Blob};
use crate::error::Result;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// A readable audio path, plus the temporary file backing it when one was created.
///
/// The temporary file is closed and unlinked when this value is dropped or
/// [`ResolvedAudio::cleanup`] is called, whichever comes first.
#[derive(Debug)]
pub struct ResolvedAudio {
    path: PathBuf,
    temp: Option<NamedTempFile>,
}

impl ResolvedAudio {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the resolver created a temporary file for this source.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Close and delete the temporary file, if any.
    pub fn cleanup(self) -> Result<()> {
        if let Some(temp) = self.temp {
            temp.close()?;
            debug!("Removed temporary audio file {}", self.path.display());
        }
        Ok(())
    }
}

/// Resolves [`AudioSource`]s, downloading blobs into `temp_dir` when needed.
#[derive(Debug, Clone)]
pub struct AudioResolver {
    temp_dir: PathBuf,
}

impl AudioResolver {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    #[instrument(skip_all, fields(kind = source.kind()))]
    pub async fn resolve(&self, source: &AudioSource) -> Result<ResolvedAudio> {
        match source {
            AudioSource::Path(path) => Ok(ResolvedAudio {
                path: path.clone(),
                temp: None,
            }),
            AudioSource::Blob(blob) => self.download_to_tempfile(blob.as_ref()).await,
            AudioSource::Attached(attachment) => {
                self.download_to_tempfile(attachment.blob()).await
            }
            AudioSource::Uploaded(upload) => Ok(ResolvedAudio {
                path: upload.path().to_path_buf(),
                temp: None,
            }),
        }
    }

    async fn download_to_tempfile(&self, blob: &dyn Blob) -> Result<ResolvedAudio> {
        let suffix = Path::new(blob.filename())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        std::fs::create_dir_all(&self.temp_dir)?;
        let mut temp = tempfile::Builder::new()
            .prefix("audio")
            .suffix(&suffix)
            .tempfile_in(&self.temp_dir)?;

        let bytes = blob.download().await?;
        temp.write_all(&bytes)?;
        temp.flush()?;
        temp.rewind()?;

        debug!(
            "Downloaded {} ({} bytes) to {}",
            blob.filename(),
            bytes.len(),
            temp.path().display()
        );

        Ok(ResolvedAudio {
            path: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }
}
