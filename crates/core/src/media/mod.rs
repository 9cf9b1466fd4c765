//! Media transforms applied to uploads before they reach object storage.
//!
//! Only PNG and JPEG photos are touched; every other MIME type is stored
//! byte-for-byte.

mod compress;

pub use compress::{ImageCompressor, ImageFormatKind, MediaError, scaled_width};
