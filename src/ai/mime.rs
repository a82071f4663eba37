//! MIME allow-lists and magic-byte sniffing for uploaded media.

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF_MIME: &str = "application/pdf";
pub const TEXT_MIME: &str = "text/plain";

pub const IMAGE_MIMES: &[&str] = &["image/png", "image/jpeg", "image/webp"];
pub const AUDIO_MIMES: &[&str] = &[
    "audio/wav",
    "audio/x-wav",
    "audio/wave",
    "audio/mpeg",
    "audio/mp3",
];

pub fn is_allowed_image(mime: &str) -> bool {
    IMAGE_MIMES.contains(&mime)
}

pub fn is_allowed_audio(mime: &str) -> bool {
    AUDIO_MIMES.contains(&mime)
}

/// Normalizes aliases (`image/jpg`, `audio/x-mp3`, ...) onto allow-list entries.
pub fn canonical(mime: &str) -> &str {
    match mime {
        "image/jpg" | "image/pjpeg" => "image/jpeg",
        "audio/x-mp3" | "audio/mpeg3" => "audio/mpeg",
        "audio/vnd.wave" => "audio/wav",
        other => other,
    }
}

/// Detects a media type from the leading bytes, if recognised.
pub fn sniff(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x41, 0x56, 0x45, ..] => Some("audio/wav"),
        [0x49, 0x44, 0x33, ..] => Some("audio/mpeg"),
        [0xFF, second, ..] if second & 0xE0 == 0xE0 => Some("audio/mpeg"),
        [0x25, 0x50, 0x44, 0x46, 0x2D, ..] => Some(PDF_MIME),
        _ => None,
    }
}

/// True when the bytes start with a ZIP local file header, as DOCX files do.
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
}
