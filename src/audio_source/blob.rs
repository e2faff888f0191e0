//! Stored blobs and uploaded files.

use crate::error::{LingopairError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Read access to a stored blob.
#[async_trait]
pub trait Blob: Send + Sync {
    /// Original filename, used to preserve the extension.
    fn filename(&self) -> &str;

    /// Download the full blob content.
    async fn download(&self) -> Result<Vec<u8>>;
}

/// A blob stored as a file under the disk blob service root.
#[derive(Debug, Clone)]
pub struct DiskBlob {
    key: String,
    path: PathBuf,
    filename: String,
}

impl DiskBlob {
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl Blob for DiskBlob {
    fn filename(&self) -> &str {
        &self.filename
    }

    async fn download(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LingopairError::InvalidAudioSource(format!("blob not found: {}", self.key))
            } else {
                LingopairError::Io(e)
            }
        })
    }
}

/// Disk-backed blob service: blob `key` lives at `root/key`.
#[derive(Debug, Clone)]
pub struct DiskBlobService {
    root: PathBuf,
}

impl DiskBlobService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Look up a blob by key. `filename` defaults to the key's last component.
    pub fn find(&self, key: &str, filename: Option<&str>) -> Result<DiskBlob> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(LingopairError::InvalidAudioSource(format!(
                "invalid blob key: {:?}",
                key
            )));
        }

        let filename = filename
            .map(str::to_string)
            .or_else(|| {
                relative
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| key.to_string());

        Ok(DiskBlob {
            key: key.to_string(),
            path: self.root.join(relative),
            filename,
        })
    }
}

/// A blob attached to a record under a name (e.g. a journal's `recording`).
#[derive(Clone)]
pub struct Attachment {
    name: String,
    blob: Arc<dyn Blob>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, blob: Arc<dyn Blob>) -> Self {
        Self {
            name: name.into(),
            blob,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blob(&self) -> &dyn Blob {
        self.blob.as_ref()
    }
}

/// An uploaded file whose body already sits in its own temporary file.
#[derive(Debug)]
pub struct UploadedFile {
    original_filename: String,
    content_type: Option<String>,
    tempfile: NamedTempFile,
}

impl UploadedFile {
    pub fn new(
        original_filename: impl Into<String>,
        content_type: Option<String>,
        tempfile: NamedTempFile,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            content_type,
            tempfile,
        }
    }

    /// Spool an upload body into a new temporary file inside `dir`.
    pub fn from_bytes(
        original_filename: impl Into<String>,
        content_type: Option<String>,
        bytes: &[u8],
        dir: &Path,
    ) -> Result<Self> {
        let mut tempfile = tempfile::Builder::new().prefix("upload").tempfile_in(dir)?;
        tempfile.write_all(bytes)?;
        tempfile.flush()?;
        Ok(Self::new(original_filename, content_type, tempfile))
    }

    /// Path of the backing temporary file.
    pub fn path(&self) -> &Path {
        self.tempfile.path()
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Blob held in memory.
#[cfg(test)]
pub(crate) struct StaticBlob {
    pub filename: String,
    pub data: Vec<u8>,
}

#[cfg(test)]
#[async_trait]
impl Blob for StaticBlob {
    fn filename(&self) -> &str {
        &self.filename
    }

    async fn download(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_rejects_traversal() {
        let service = DiskBlobService::new("/srv/blobs");
        assert!(service.find("../etc/passwd", None).is_err());
        assert!(service.find("/abs/path", None).is_err());
        assert!(service.find("", None).is_err());
    }

    #[test]
    fn test_find_defaults_filename_to_key() {
        let service = DiskBlobService::new("/srv/blobs");
        let blob = service.find("ab/cd/voice.m4a", None).unwrap();
        assert_eq!(blob.filename(), "voice.m4a");

        let named = service.find("ab12", Some("memo.mp3")).unwrap();
        assert_eq!(named.filename(), "memo.mp3");
        assert_eq!(named.key(), "ab12");
    }

    #[tokio::test]
    async fn test_disk_blob_download() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("k1"), b"RIFF").unwrap();
        let service = DiskBlobService::new(dir.path());

        let blob = service.find("k1", Some("a.wav")).unwrap();
        assert_eq!(blob.download().await.unwrap(), b"RIFF");

        let missing = service.find("k2", None).unwrap();
        assert!(matches!(
            missing.download().await,
            Err(LingopairError::InvalidAudioSource(_))
        ));
    }

    #[test]
    fn test_uploaded_file_from_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let upload =
            UploadedFile::from_bytes("clip.webm", Some("audio/webm".into()), b"abc", dir.path())
                .unwrap();
        assert_eq!(std::fs::read(upload.path()).unwrap(), b"abc");
        assert_eq!(upload.original_filename(), "clip.webm");
        assert_eq!(upload.content_type(), Some("audio/webm"));
    }
}
