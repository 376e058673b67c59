//! Image byte-format sniffing
//!
//! The image codec proper is a collaborator layered above this crate; the only
//! thing the storage layer needs is a best-effort check that bytes handed to
//! the image convenience API actually are an image.

/// Detect an image format from magic bytes, returning its MIME type
pub fn detect_image(data: &[u8]) -> Option<&'static str> {
    let kind = infer::get(data)?;
    match kind.matcher_type() {
        infer::MatcherType::Image => Some(kind.mime_type()),
        _ => None,
    }
}
