//! Classification of attachment descriptors sent by the admin UI.
//!
//! A descriptor is either a URL of an object that is already stored or a
//! `data:` URI carrying a new upload.

use tracing::warn;

/// Prefix of an inline upload.
pub const DATA_URI_PREFIX: &str = "data:";

/// Query marker appended to document preview URLs so the object key can be
/// recovered from them.
pub const OBJECT_QUERY_MARKER: &str = "?object=";

/// Number of characters of an unrecognized descriptor written to the log.
const ANOMALY_PREVIEW_CHARS: usize = 30;

/// What a descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// An object that is already stored.
    Existing,
    /// An inline payload that still has to be uploaded.
    New,
}

/// Classify a descriptor.
///
/// Anything that is neither an `http(s)://` URL nor a `data:` URI is kept as
/// existing, so an unrecognized value never causes a stored object to be
/// deleted.
pub fn classify(descriptor: &str) -> DescriptorKind {
    if descriptor.starts_with("https://") || descriptor.starts_with("http://") {
        DescriptorKind::Existing
    } else if descriptor.starts_with(DATA_URI_PREFIX) {
        DescriptorKind::New
    } else {
        let preview: String = descriptor.chars().take(ANOMALY_PREVIEW_CHARS).collect();
        warn!(%preview, "unrecognized attachment descriptor, treating it as existing");
        DescriptorKind::Existing
    }
}

/// Split descriptors into existing references and inline payloads, keeping
/// their relative order.
pub fn partition(descriptors: &[String]) -> (Vec<&str>, Vec<&str>) {
    descriptors
        .iter()
        .map(String::as_str)
        .partition(|descriptor| classify(descriptor) == DescriptorKind::Existing)
}

/// Object key referenced by an existing descriptor.
///
/// Preview URLs carry the key after `?object=`; direct storage URLs end with
/// it as their last path segment.
pub fn object_key(reference: &str) -> &str {
    if let Some((_, key)) = reference.rsplit_once(OBJECT_QUERY_MARKER) {
        return key;
    }
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Display URL for a document: the preview URL tagged with its object key.
pub fn document_url(preview_url: &str, key: &str) -> String {
    format!("{preview_url}{OBJECT_QUERY_MARKER}{key}")
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Any flat key, rendered as a direct URL or as a document URL, is
    // recovered exactly by `object_key`.
    proptest! {
        #[test]
        fn prop_object_key_roundtrip(
            key in "[a-f0-9]{32}(\\.[a-z]{2,4})?",
            base in "https://[a-z]{1,10}\\.example\\.com(/[a-z]{1,8}){0,3}",
        ) {
            let direct = format!("{base}/{key}");
            prop_assert_eq!(object_key(&direct), key.as_str());

            let document = document_url(&format!("https://viewer.example/v?url={base}"), &key);
            prop_assert_eq!(object_key(&document), key.as_str());
        }
    }
}
