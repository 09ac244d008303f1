//! Media types used by the Watson services.

use once_cell::sync::Lazy;
use regex::Regex;

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_JSON_PATCH: &str = "application/json-patch+json";
pub const APPLICATION_MERGE_PATCH: &str = "application/merge-patch+json";
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_CSV: &str = "text/csv";
pub const AUDIO_OGG_OPUS: &str = "audio/ogg;codecs=opus";
pub const AUDIO_OGG_VORBIS: &str = "audio/ogg;codecs=vorbis";
pub const AUDIO_WAV: &str = "audio/wav";
pub const AUDIO_FLAC: &str = "audio/flac";
pub const AUDIO_PCM: &str = "audio/l16";
pub const AUDIO_MP3: &str = "audio/mp3";
pub const AUDIO_BASIC: &str = "audio/basic";
pub const AUDIO_WEBM: &str = "audio/webm";

static JSON_MIME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^application/((json)|(merge-patch\+json))(;.*)?$").ok());

static JSON_PATCH_MIME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^application/json-patch\+json(;.*)?$").ok());

/// `application/json` or `application/merge-patch+json`, with optional parameters.
pub fn is_json_mime_type(mime_type: &str) -> bool {
    JSON_MIME.as_ref().is_some_and(|re| re.is_match(mime_type))
}

/// `application/json-patch+json`, with optional parameters.
pub fn is_json_patch_mime_type(mime_type: &str) -> bool {
    JSON_PATCH_MIME
        .as_ref()
        .is_some_and(|re| re.is_match(mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_mime_types() {
        assert!(is_json_mime_type("application/json"));
        assert!(is_json_mime_type("Application/JSON; charset=utf-8"));
        assert!(is_json_mime_type("application/merge-patch+json"));
        assert!(!is_json_mime_type("application/json-patch+json"));
        assert!(!is_json_mime_type("text/json"));
        assert!(!is_json_mime_type("application/jsonx"));
    }

    #[test]
    fn json_patch_mime_types() {
        assert!(is_json_patch_mime_type("application/json-patch+json"));
        assert!(is_json_patch_mime_type("application/json-patch+json;charset=utf-8"));
        assert!(!is_json_patch_mime_type("application/json"));
    }
}
