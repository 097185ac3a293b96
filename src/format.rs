use std::path::Path;

/// Image format detected from file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Tiff,
    WebP,
    Heic,
    Dng,
    Gif,
    Bmp,
    Unknown,
}

impl ImageKind {
    /// Short label for display (e.g. "JPEG", "HEIC").
    pub fn label(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::Tiff => "TIFF",
            ImageKind::WebP => "WebP",
            ImageKind::Heic => "HEIC",
            ImageKind::Dng => "DNG",
            ImageKind::Gif => "GIF",
            ImageKind::Bmp => "BMP",
            ImageKind::Unknown => "unknown",
        }
    }

    /// MIME type for this format, used when the extension lookup fails.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Tiff => "image/tiff",
            ImageKind::WebP => "image/webp",
            ImageKind::Heic => "image/heic",
            ImageKind::Dng => "image/x-adobe-dng",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Unknown => "application/octet-stream",
        }
    }

    /// Whether the `image` crate can decode pixel data for this format.
    /// HEIC and DNG carry metadata we can read, but no decodable pixels.
    pub fn is_decodable(self) -> bool {
        !matches!(self, ImageKind::Heic | ImageKind::Dng | ImageKind::Unknown)
    }
}

fn is_tiff_magic(data: &[u8]) -> bool {
    data.len() >= 4
        && ((data[0] == 0x49 && data[1] == 0x49 && data[2] == 0x2A && data[3] == 0x00)
            || (data[0] == 0x4D && data[1] == 0x4D && data[2] == 0x00 && data[3] == 0x2A))
}

fn is_heic_brand(brand: &[u8]) -> bool {
    matches!(
        brand,
        b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" | b"mif1" | b"msf1"
    )
}

/// Detect the image format from magic bytes. The extension is only consulted
/// to tell DNG apart from plain TIFF, which share the same magic.
pub fn detect_format(data: &[u8], path: &Path) -> ImageKind {
    if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return ImageKind::Jpeg;
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return ImageKind::Png;
    }
    if is_tiff_magic(data) {
        let is_dng = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("dng"))
            .unwrap_or(false);
        return if is_dng { ImageKind::Dng } else { ImageKind::Tiff };
    }
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return ImageKind::WebP;
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" && is_heic_brand(&data[8..12]) {
        return ImageKind::Heic;
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return ImageKind::Gif;
    }
    if data.starts_with(b"BM") {
        return ImageKind::Bmp;
    }
    ImageKind::Unknown
}

/// MIME type for a path, preferring the extension table and falling back to
/// the sniffed format.
pub fn mime_for(path: &Path, kind: ImageKind) -> String {
    let guessed: Option<mime::Mime> = mime_guess::from_path(path).first();
    match guessed {
        Some(m) => m.essence_str().to_string(),
        None => kind.mime_type().to_string(),
    }
}
