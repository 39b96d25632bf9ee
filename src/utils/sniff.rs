// src/utils/sniff.rs

/// Content type detected from the leading bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub mime: &'static str,
    pub extension: &'static str,
}

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_GIF: &str = "image/gif";
pub const MIME_WEBP: &str = "image/webp";
pub const MIME_PDF: &str = "application/pdf";

const SIGNATURES: &[(&[u8], Sniffed)] = &[
    (
        b"\x89PNG\r\n\x1a\n",
        Sniffed { mime: MIME_PNG, extension: "png" },
    ),
    (
        b"\xFF\xD8\xFF",
        Sniffed { mime: MIME_JPEG, extension: "jpg" },
    ),
    (b"GIF87a", Sniffed { mime: MIME_GIF, extension: "gif" }),
    (b"GIF89a", Sniffed { mime: MIME_GIF, extension: "gif" }),
    (b"%PDF-", Sniffed { mime: MIME_PDF, extension: "pdf" }),
];

/// Detects the file type from magic numbers, ignoring any client-supplied name.
pub fn sniff(bytes: &[u8]) -> Option<Sniffed> {
    // RIFF....WEBP
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(Sniffed {
            mime: MIME_WEBP,
            extension: "webp",
        });
    }

    SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, sniffed)| *sniffed)
}

pub fn is_png_or_jpeg(bytes: &[u8]) -> bool {
    matches!(sniff(bytes), Some(s) if s.mime == MIME_PNG || s.mime == MIME_JPEG)
}
