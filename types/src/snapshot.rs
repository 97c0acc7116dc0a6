//! Encoded still image of the drawing surface.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A PNG snapshot carried as a `data:` URI.
///
/// Immutable once produced; clones share the same buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    uri: Arc<str>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotDecodeError {
    #[error("snapshot is not a base64 PNG data URI")]
    NotPngDataUri,
    #[error("snapshot payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("snapshot payload is empty")]
    Empty,
}

impl Snapshot {
    /// Wrap raw PNG bytes.
    #[must_use]
    pub fn from_png(png: &[u8]) -> Self {
        let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len() * 4 / 3 + 4);
        uri.push_str(PNG_DATA_URI_PREFIX);
        STANDARD.encode_string(png, &mut uri);
        Self { uri: uri.into() }
    }

    /// Adopt an existing data URI. Validation happens on [`Snapshot::decode`].
    #[must_use]
    pub fn from_data_uri(uri: impl Into<Arc<str>>) -> Self {
        Self { uri: uri.into() }
    }

    #[must_use]
    pub fn as_data_uri(&self) -> &str {
        &self.uri
    }

    /// Decode the URI back into PNG bytes.
    pub fn decode(&self) -> Result<Vec<u8>, SnapshotDecodeError> {
        let payload = self
            .uri
            .strip_prefix(PNG_DATA_URI_PREFIX)
            .ok_or(SnapshotDecodeError::NotPngDataUri)?;
        let bytes = STANDARD.decode(payload)?;
        if bytes.is_empty() {
            return Err(SnapshotDecodeError::Empty);
        }
        Ok(bytes)
    }
}

// Data URIs run to tens of kilobytes; keep logs readable.
impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("uri_bytes", &self.uri.len())
            .finish()
    }
}
