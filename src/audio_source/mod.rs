//! Audio source abstraction for Lingopair.
//!
//! Callers hand audio over in one of a few shapes: a path on disk, a stored blob,
//! a named attachment wrapping a blob, or an uploaded file. [`AudioResolver`]
//! turns any of them into a readable filesystem path.

mod blob;
mod resolver;

pub use blob::{Attachment, Blob, DiskBlob, DiskBlobService, UploadedFile};
#[cfg(test)]
pub(crate) use blob::StaticBlob;
pub use resolver::{AudioResolver, ResolvedAudio};

use crate::error::{LingopairError, Result};
use crate::parser::json_type_name;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Supported audio source representations.
pub enum AudioSource {
    /// A plain filesystem path.
    Path(PathBuf),
    /// A stored blob.
    Blob(Arc<dyn Blob>),
    /// A blob attached to a record.
    Attached(Attachment),
    /// An uploaded file backed by its own temporary file.
    Uploaded(UploadedFile),
}

impl AudioSource {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AudioSource::Path(_) => "path",
            AudioSource::Blob(_) => "blob",
            AudioSource::Attached(_) => "attachment",
            AudioSource::Uploaded(_) => "upload",
        }
    }

    /// Build a source from a loosely-typed JSON descriptor.
    ///
    /// Accepted shapes:
    /// - `"path/to/audio.m4a"`
    /// - `{"blob_key": "...", "filename": "..."}`
    /// - `{"attachment": "recording", "blob_key": "...", "filename": "..."}`
    ///
    /// Any other JSON type fails with [`LingopairError::UnsupportedSourceType`].
    pub fn from_json(value: &Value, blobs: &DiskBlobService) -> Result<Self> {
        match value {
            Value::String(path) => Ok(AudioSource::Path(PathBuf::from(path))),
            Value::Object(map) => {
                let key = map.get("blob_key").and_then(Value::as_str).ok_or_else(|| {
                    LingopairError::UnsupportedSourceType("object without blob_key".to_string())
                })?;
                let filename = map.get("filename").and_then(Value::as_str);
                let blob: Arc<dyn Blob> = Arc::new(blobs.find(key, filename)?);

                match map.get("attachment").and_then(Value::as_str) {
                    Some(name) => Ok(AudioSource::Attached(Attachment::new(name, blob))),
                    None => Ok(AudioSource::Blob(blob)),
                }
            }
            other => Err(LingopairError::UnsupportedSourceType(
                json_type_name(other).to_string(),
            )),
        }
    }

    /// Parse a command-line argument: JSON descriptors are tried first, anything
    /// that is not JSON is taken as a path.
    pub fn from_arg(arg: &str, blobs: &DiskBlobService) -> Result<Self> {
        match serde_json::from_str::<Value>(arg) {
            Ok(value) => Self::from_json(&value, blobs),
            Err(_) => Ok(AudioSource::Path(PathBuf::from(arg))),
        }
    }
}

impl std::fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            AudioSource::Blob(blob) => f.debug_tuple("Blob").field(&blob.filename()).finish(),
            AudioSource::Attached(att) => f
                .debug_struct("Attached")
                .field("name", &att.name())
                .field("filename", &att.blob().filename())
                .finish(),
            AudioSource::Uploaded(upload) => f.debug_tuple("Uploaded").field(upload).finish(),
        }
    }
}
