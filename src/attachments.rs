//! Reading image and audio files to attach to a new entry.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{JournalError, Result};
use crate::remote::UploadRecord;
use crate::types::AttachmentKind;

/// Sent when the extension gives no type matching the attachment kind.
pub const FALLBACK_MIME: &str = "application/octet-stream";

fn top_level(kind: AttachmentKind) -> &'static str {
    match kind {
        AttachmentKind::Image => "image/",
        AttachmentKind::Audio => "audio/",
    }
}

/// Guess a MIME type from the file extension.
///
/// Only types under the kind's top-level type are accepted, so an image
/// flag never uploads `audio/*` and vice versa.
pub fn mime_type_for(path: &Path, kind: AttachmentKind) -> String {
    let prefix = top_level(kind);
    mime_guess::from_path(path)
        .iter_raw()
        .find(|mime| mime.starts_with(prefix))
        .unwrap_or(FALLBACK_MIME)
        .to_string()
}

/// Read and encode each file in `paths`.
pub fn load_uploads(paths: &[PathBuf], kind: AttachmentKind) -> Result<Vec<UploadRecord>> {
    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|e| {
                JournalError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read {kind} file {}: {}", path.display(), e),
                ))
            })?;
            tracing::debug!(path = %path.display(), bytes = bytes.len(), %kind, "attaching file");
            Ok(UploadRecord {
                data: STANDARD.encode(&bytes),
                mime_type: mime_type_for(path, kind),
            })
        })
        .collect()
}
