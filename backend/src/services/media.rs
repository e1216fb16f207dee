//! Media type detection for uploaded audio.
//!
//! Only the payload bytes are inspected; client-supplied file names and
//! content types are ignored.

/// Detect the MIME type of `bytes` from its magic numbers.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.is_empty() {
        return None;
    }
    infer::get(bytes).map(|kind| kind.mime_type())
}
