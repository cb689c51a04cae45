//! Image payloads and their transport encoding.
//!
//! Images arrive either as raw bytes (an upload) or as a data URI (a live
//! camera capture). Vision APIs want a MIME type plus base64 data, so both
//! forms are encoded into an [`InlineImage`] before a remote call.

use base64::{engine::general_purpose, Engine as _};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// MIME type assumed when the caller does not supply one.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Errors from encoding an image for transport.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Not a data URI (expected 'data:<mime>;base64,<payload>')")]
    NotADataUri,

    #[error("Data URI is not base64-encoded")]
    NotBase64,

    #[error("Image payload is empty")]
    EmptyPayload,

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// An image as supplied by the caller.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Raw image bytes with an optional MIME type
    Bytes {
        data: Vec<u8>,
        mime_type: Option<String>,
    },

    /// An already-encoded `data:` URI
    DataUri(String),
}

impl ImageInput {
    /// Raw bytes of unknown type.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            data: data.into(),
            mime_type: None,
        }
    }

    /// Raw bytes with a known MIME type.
    pub fn bytes_with_mime(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self::Bytes {
            data: data.into(),
            mime_type: Some(mime_type.into()),
        }
    }

    /// A `data:image/...;base64,...` URI.
    pub fn data_uri(uri: impl Into<String>) -> Self {
        Self::DataUri(uri.into())
    }

    /// Read an image file, guessing its MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let mime_type = mime_guess::from_path(path)
            .first()
            .filter(|m| m.type_() == mime_guess::mime::IMAGE)
            .map(|m| m.essence_str().to_string());
        Ok(Self::Bytes { data, mime_type })
    }

    /// Whether there is nothing to analyze.
    ///
    /// A data URI counts as empty when the text after its first `,` is blank.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bytes { data, .. } => data.is_empty(),
            Self::DataUri(uri) => match uri.split_once(',') {
                Some((_, payload)) => payload.trim().is_empty(),
                None => uri.trim().is_empty(),
            },
        }
    }

    /// Encode into the MIME type + base64 form vision APIs expect.
    ///
    /// Bytes are base64-encoded; data URIs are split and passed through.
    pub fn encode(&self) -> Result<InlineImage, ImageError> {
        match self {
            Self::Bytes { data, mime_type } => {
                if data.is_empty() {
                    return Err(ImageError::EmptyPayload);
                }
                Ok(InlineImage {
                    mime_type: mime_type
                        .clone()
                        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
                    data: general_purpose::STANDARD.encode(data),
                })
            }
            Self::DataUri(uri) => parse_data_uri(uri.trim()),
        }
    }
}

impl std::fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Payloads are large; show sizes only
        match self {
            Self::Bytes { data, mime_type } => f
                .debug_struct("Bytes")
                .field("len", &data.len())
                .field("mime_type", mime_type)
                .finish(),
            Self::DataUri(uri) => f.debug_struct("DataUri").field("len", &uri.len()).finish(),
        }
    }
}

/// A base64 image ready to be embedded in a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,

    /// Standard base64, no `data:` prefix
    pub data: String,
}

fn parse_data_uri(uri: &str) -> Result<InlineImage, ImageError> {
    let rest = uri.strip_prefix("data:").ok_or(ImageError::NotADataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImageError::NotADataUri)?;

    let mut params = meta.split(';');
    let mime_type = params.next().unwrap_or_default().trim();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(ImageError::NotBase64);
    }

    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ImageError::EmptyPayload);
    }
    general_purpose::STANDARD.decode(payload)?;

    Ok(InlineImage {
        mime_type: if mime_type.is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            mime_type.to_string()
        },
        data: payload.to_string(),
    })
}
