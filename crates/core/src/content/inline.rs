//! Decoding of `data:<mimetype>;base64,<body>` uploads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use super::descriptor::DATA_URI_PREFIX;
use super::error::ContentError;
use crate::media::ImageFormatKind;

const BASE64_MARKER: &str = ";base64,";

/// A decoded inline upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePayload {
    /// MIME type declared in the data URI.
    pub mimetype: String,
    /// Decoded body.
    pub data: Bytes,
}

impl InlinePayload {
    /// Parse a data URI.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Decode`] if the prefix or base64 marker is
    /// missing, the MIME type is empty, or the body is not valid base64.
    pub fn parse(descriptor: &str) -> Result<Self, ContentError> {
        let body = descriptor
            .strip_prefix(DATA_URI_PREFIX)
            .ok_or_else(|| ContentError::decode("missing `data:` prefix"))?;
        let (mimetype, encoded) = body
            .split_once(BASE64_MARKER)
            .ok_or_else(|| ContentError::decode("missing `;base64,` marker"))?;
        if mimetype.is_empty() {
            return Err(ContentError::decode("empty MIME type"));
        }

        let data = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ContentError::decode(format!("invalid base64 body: {e}")))?;

        Ok(Self {
            mimetype: mimetype.to_string(),
            data: Bytes::from(data),
        })
    }

    /// Compressible image format of this payload, if any.
    #[must_use]
    pub fn image_format(&self) -> Option<ImageFormatKind> {
        ImageFormatKind::from_mimetype(&self.mimetype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_png() {
        let payload = InlinePayload::parse("data:image/png;base64,AAAA").unwrap();
        assert_eq!(payload.mimetype, "image/png");
        assert_eq!(payload.data.as_ref(), &[0, 0, 0]);
        assert_eq!(payload.image_format(), Some(ImageFormatKind::Png));
    }

    #[test]
    fn test_parse_document_bypasses_compression() {
        let payload = InlinePayload::parse("data:application/pdf;base64,JVBERi0=").unwrap();
        assert_eq!(payload.mimetype, "application/pdf");
        assert_eq!(payload.data.as_ref(), b"%PDF-");
        assert_eq!(payload.image_format(), None);
    }

    #[rstest]
    #[case("image/png;base64,AAAA")]
    #[case("data:image/png,AAAA")]
    #[case("data:;base64,AAAA")]
    #[case("data:image/png;base64,***")]
    fn test_parse_rejects_malformed(#[case] descriptor: &str) {
        let result = InlinePayload::parse(descriptor);
        assert!(matches!(result, Err(ContentError::Decode(_))));
    }
}
