/// MIME type assumed when the payload is not recognized; matches the
/// encoding requested from the image service.
pub const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                FALLBACK_IMAGE_MIME
            );
            FALLBACK_IMAGE_MIME
        }
    }
}

/// MIME type for a generated image: the service-declared `image/*` type when
/// present, otherwise sniffed from the bytes.
pub fn resolve_image_mime(declared: Option<&str>, bytes: &[u8]) -> String {
    match declared.map(str::trim) {
        Some(mime) if mime.starts_with("image/") => mime.to_string(),
        Some(other) => {
            tracing::debug!("Ignoring non-image MIME type {:?} from service", other);
            detect_image_mime(bytes).to_string()
        }
        None => detect_image_mime(bytes).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_image_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            "image/png"
        );
    }

    #[test]
    fn test_detect_webp() {
        assert_eq!(
            detect_image_mime(&[
                0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50
            ]),
            "image/webp"
        );
    }

    #[test]
    fn test_unknown_falls_back_to_jpeg() {
        assert_eq!(detect_image_mime(&[0x00, 0x01, 0x02, 0x03]), FALLBACK_IMAGE_MIME);
    }

    #[test]
    fn test_empty_falls_back_to_jpeg() {
        assert_eq!(detect_image_mime(&[]), FALLBACK_IMAGE_MIME);
    }

    #[test]
    fn test_resolve_prefers_declared_image_type() {
        assert_eq!(
            resolve_image_mime(Some("image/png"), &[0xFF, 0xD8, 0xFF]),
            "image/png"
        );
    }

    #[test]
    fn test_resolve_sniffs_when_declaration_is_missing_or_bogus() {
        assert_eq!(resolve_image_mime(None, &[0x89, 0x50, 0x4E, 0x47]), "image/png");
        assert_eq!(
            resolve_image_mime(Some("application/octet-stream"), &[0xFF, 0xD8, 0xFF]),
            "image/jpeg"
        );
    }
}
