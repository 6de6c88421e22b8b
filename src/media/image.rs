//! Image attachments for card sides.
//!
//! Images are stored on the card as opaque data URLs. Only JPEG, PNG and GIF files
//! under the size limit are accepted.

use crate::error::{FlashcardError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub trait ImageEncoder {
    /// Turns the raw file into the string stored on the card.
    fn encode(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}

#[derive(Clone, Debug)]
pub struct DataUrlEncoder {
    pub max_bytes: usize,
}

impl Default for DataUrlEncoder {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl DataUrlEncoder {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl ImageEncoder for DataUrlEncoder {
    fn encode(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let mime = mime_type(file_name).ok_or_else(|| {
            FlashcardError::Image("Invalid file type. Please upload JPEG, PNG, or GIF.".to_string())
        })?;
        if bytes.len() > self.max_bytes {
            return Err(FlashcardError::Image(format!(
                "File size exceeds {}MB limit.",
                self.max_bytes / (1024 * 1024)
            )));
        }
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }
}

/// Image bytes recovered from a stored data URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// File extension matching the MIME type, e.g. `png`.
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Reverses `DataUrlEncoder::encode`. Returns `None` for anything that is not a base64
/// data URL of a supported image type.
pub fn decode_data_url(data_url: &str) -> Option<DecodedImage> {
    let (mime, payload) = data_url.strip_prefix("data:")?.split_once(";base64,")?;
    let extension = match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        _ => return None,
    };
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some(DecodedImage { extension, bytes })
}

fn mime_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Encodes an optional attachment. A failed encode leaves the image empty and
/// hands back the error so the caller can tell the user; the card is still created.
pub fn encode_or_empty<E: ImageEncoder + ?Sized>(
    encoder: &E,
    file: Option<(&str, &[u8])>,
) -> (String, Option<FlashcardError>) {
    let Some((file_name, bytes)) = file else {
        return (String::new(), None);
    };
    match encoder.encode(file_name, bytes) {
        Ok(encoded) => (encoded, None),
        Err(e) => {
            warn!(file_name, error = %e, "image encode failed, card keeps an empty image");
            (String::new(), Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_png_as_data_url() {
        let encoded = DataUrlEncoder::default().encode("flag.PNG", b"abc").unwrap();
        assert_eq!(encoded, "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_rejects_unsupported_type() {
        let result = DataUrlEncoder::default().encode("notes.txt", b"abc");
        assert!(matches!(result, Err(FlashcardError::Image(_))));

        let result = DataUrlEncoder::default().encode("no_extension", b"abc");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_oversized_file() {
        let encoder = DataUrlEncoder::new(2);
        assert!(encoder.encode("photo.jpg", b"abc").is_err());
        assert!(encoder.encode("photo.jpeg", b"ab").is_ok());
    }

    #[test]
    fn test_encode_or_empty_degrades() {
        let encoder = DataUrlEncoder::default();

        let (image, error) = encode_or_empty(&encoder, Some(("bad.bmp", b"abc".as_slice())));
        assert!(image.is_empty());
        assert!(error.is_some());

        let (image, error) = encode_or_empty(&encoder, None);
        assert!(image.is_empty());
        assert!(error.is_none());

        let (image, error) = encode_or_empty(&encoder, Some(("ok.gif", b"abc".as_slice())));
        assert!(image.starts_with("data:image/gif;base64,"));
        assert!(error.is_none());
    }

    #[test]
    fn test_decode_data_url_recovers_encoded_bytes() {
        let encoded = DataUrlEncoder::default()
            .encode("photo.jpeg", &[0xff, 0xd8, 0xff])
            .unwrap();
        let decoded = decode_data_url(&encoded).unwrap();

        assert_eq!(decoded.extension, "jpg");
        assert_eq!(decoded.bytes, vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn test_decode_data_url_rejects_garbage() {
        assert_eq!(decode_data_url(""), None);
        assert_eq!(decode_data_url("https://example.com/a.png"), None);
        assert_eq!(decode_data_url("data:text/plain;base64,YWJj"), None);
        assert_eq!(decode_data_url("data:image/png;base64,@@@"), None);
        assert_eq!(decode_data_url("data:image/png,YWJj"), None);
    }
}
