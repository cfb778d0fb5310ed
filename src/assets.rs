//! Asset store
//!
//! In-memory holder for the up-to-three user-supplied images of one
//! generation attempt: product photo, brand logo, style reference. Payloads
//! arrive from the browser as data URLs; bytes are format-sniffed on ingest
//! so a malformed upload is rejected locally instead of by the remote model.
//! Nothing here is persisted; the bundle dies with its attempt.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;

use crate::errors::{ClassifiedError, ErrorKind};

/// Image formats the generation models accept
const SUPPORTED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Not a base64 image data URL")]
    InvalidDataUrl,

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Payload is not a recognizable image")]
    UndecodableImage,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

impl From<AssetError> for ClassifiedError {
    fn from(_: AssetError) -> Self {
        ClassifiedError::new(ErrorKind::AssetInvalid)
    }
}

/// One self-describing image payload: raw bytes plus mime type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPayload {
    bytes: Vec<u8>,
    mime_type: String,
}

impl AssetPayload {
    /// Ingest raw bytes, sniffing the format from the magic numbers.
    /// The declared mime type from the browser is ignored; the bytes decide.
    pub fn new(bytes: Vec<u8>) -> Result<Self, AssetError> {
        let format = image::guess_format(&bytes).map_err(|_| AssetError::UndecodableImage)?;
        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(AssetError::UnsupportedFormat(format!("{:?}", format)));
        }
        Ok(Self {
            bytes,
            mime_type: format.to_mime_type().to_string(),
        })
    }

    /// Ingest a browser data URL (`data:<mime>;base64,<payload>`)
    pub fn from_data_url(data_url: &str) -> Result<Self, AssetError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or(AssetError::InvalidDataUrl)?;
        let (_header, payload) = rest.split_once(";base64,").ok_or(AssetError::InvalidDataUrl)?;
        let bytes = BASE64.decode(payload.trim())?;
        Self::new(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 of the raw bytes, as the Gemini `inlineData` field expects
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// The three optional uploads of one generation attempt
#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    pub product_photo: Option<AssetPayload>,
    pub brand_logo: Option<AssetPayload>,
    pub style_reference: Option<AssetPayload>,
}

impl AssetBundle {
    pub fn is_empty(&self) -> bool {
        self.product_photo.is_none() && self.brand_logo.is_none() && self.style_reference.is_none()
    }

    /// Attachments in model-priority order: product photo first, then style
    /// reference, then brand logo. Later attachments are weighted less by the
    /// model, so this order is a deliberate quality lever.
    pub fn ordered_attachments(&self) -> Vec<&AssetPayload> {
        [
            self.product_photo.as_ref(),
            self.style_reference.as_ref(),
            self.brand_logo.as_ref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Magic numbers of a PNG file; enough for format sniffing
    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    #[test]
    fn test_png_bytes_are_sniffed() {
        let payload = AssetPayload::new(PNG_MAGIC.to_vec()).unwrap();
        assert_eq!(payload.mime_type(), "image/png");
    }

    #[test]
    fn test_jpeg_bytes_are_sniffed() {
        let payload = AssetPayload::new(JPEG_MAGIC.to_vec()).unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = AssetPayload::new(b"definitely not an image".to_vec());
        assert!(matches!(result, Err(AssetError::UndecodableImage)));
    }

    #[test]
    fn test_data_url_roundtrip() {
        let original = AssetPayload::new(PNG_MAGIC.to_vec()).unwrap();
        let reparsed = AssetPayload::from_data_url(&original.to_data_url()).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_data_url_with_wrong_declared_mime_trusts_bytes() {
        let data_url = format!("data:image/jpeg;base64,{}", BASE64.encode(PNG_MAGIC));
        let payload = AssetPayload::from_data_url(&data_url).unwrap();
        assert_eq!(payload.mime_type(), "image/png");
    }

    #[test]
    fn test_malformed_data_url_is_rejected() {
        assert!(AssetPayload::from_data_url("http://example.com/a.png").is_err());
        assert!(AssetPayload::from_data_url("data:image/png,raw-not-base64").is_err());
        assert!(AssetPayload::from_data_url("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_asset_error_maps_to_asset_invalid() {
        let err = AssetPayload::new(vec![0u8; 4]).unwrap_err();
        let classified: ClassifiedError = err.into();
        assert_eq!(classified.kind, ErrorKind::AssetInvalid);
    }

    #[test]
    fn test_bundle_attachment_priority_order() {
        let product = AssetPayload::new(PNG_MAGIC.to_vec()).unwrap();
        let logo = AssetPayload::new(JPEG_MAGIC.to_vec()).unwrap();
        let bundle = AssetBundle {
            product_photo: Some(product.clone()),
            brand_logo: Some(logo.clone()),
            style_reference: None,
        };
        let ordered = bundle.ordered_attachments();
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0], &product);
        assert_eq!(ordered[1], &logo);
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = AssetBundle::default();
        assert!(bundle.is_empty());
        assert!(bundle.ordered_attachments().is_empty());
    }
}
