//! MIME type detection utilities

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME from a file name (extension-based)
pub fn guess_mime_from_filename(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first_raw()
        .map(|s| s.to_string())
}

/// Combined guess: prefer bytes, fall back to the file name, otherwise
/// `application/octet-stream`.
pub fn guess_mime(bytes: Option<&[u8]>, filename: Option<&str>) -> String {
    if let Some(b) = bytes
        && let Some(m) = guess_mime_from_bytes(b)
    {
        return m;
    }
    if let Some(p) = filename
        && let Some(m) = guess_mime_from_filename(p)
    {
        return m;
    }
    crate::http::media_type::APPLICATION_OCTET_STREAM.to_string()
}

/// Watson audio media type for a detected container, e.g. `audio/ogg` with
/// an Opus stream becomes `audio/ogg;codecs=opus`.
pub fn audio_content_type(bytes: &[u8]) -> Option<&'static str> {
    use crate::http::media_type::{AUDIO_FLAC, AUDIO_MP3, AUDIO_OGG_OPUS, AUDIO_OGG_VORBIS, AUDIO_WAV};
    match infer::get(bytes)?.mime_type() {
        "audio/ogg" | "audio/opus" => {
            if bytes.windows(8).take(64).any(|w| w == b"OpusHead") {
                Some(AUDIO_OGG_OPUS)
            } else {
                Some(AUDIO_OGG_VORBIS)
            }
        }
        "audio/x-wav" | "audio/wav" => Some(AUDIO_WAV),
        "audio/x-flac" | "audio/flac" => Some(AUDIO_FLAC),
        "audio/mpeg" => Some(AUDIO_MP3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_filename_then_octet_stream() {
        assert_eq!(guess_mime(Some(b"plain"), Some("train.csv")), "text/csv");
        assert_eq!(guess_mime(Some(b"plain"), None), "application/octet-stream");
    }

    #[test]
    fn detects_png_from_bytes() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(guess_mime(Some(&png), Some("x.csv")), "image/png");
    }

    #[test]
    fn unknown_audio_is_none() {
        assert_eq!(audio_content_type(b"not audio at all"), None);
    }
}
