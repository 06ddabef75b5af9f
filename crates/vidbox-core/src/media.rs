//! Media-domain types: container format classification and MIME resolution.
//!
//! Format decisions are made once per request from the file extension and
//! expressed as the closed [`MediaFormat`] enum; nothing downstream re-checks
//! extension strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Extensions the catalog accepts as video files.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts", "mts", "m2ts",
    "3gp", "ogv", "asf", "divx", "vob", "rmvb", "rm", "f4v", "m2v", "mxf", "dv", "xvid", "qt",
    "amv", "nsv",
];

/// Containers browsers play without help.
const BROWSER_NATIVE_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];

/// How a media file can be delivered to a browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// The container plays natively; serve bytes as-is.
    Native,
    /// The container needs re-encoding into fragmented MP4 first.
    NeedsTranscode,
}

impl MediaFormat {
    /// Classify a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Self {
        if BROWSER_NATIVE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            Self::Native
        } else {
            Self::NeedsTranscode
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::NeedsTranscode => write!(f, "needs-transcode"),
        }
    }
}

/// Whether the extension is one the catalog indexes at all.
pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Resolve a MIME type from a lower-cased file extension.
///
/// Unrecognized extensions fall back to `video/mp4`; unknown containers only
/// reach the client through the transcode path, which muxes into MP4 anyway.
pub fn mime_type(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" | "xvid" => "video/x-msvideo",
        "mov" | "qt" => "video/quicktime",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "webm" => "video/webm",
        "m4v" => "video/x-m4v",
        "mpg" | "mpeg" | "m2v" => "video/mpeg",
        "ts" | "mts" | "m2ts" => "video/mp2t",
        "3gp" => "video/3gpp",
        "ogv" | "ogg" => "video/ogg",
        "asf" => "video/x-ms-asf",
        "divx" => "video/divx",
        "vob" => "video/dvd",
        "rmvb" => "application/vnd.rn-realmedia-vbr",
        "rm" => "application/vnd.rn-realmedia",
        "f4v" => "video/x-f4v",
        "mxf" => "application/mxf",
        "dv" => "video/dv",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_formats() {
        assert_eq!(MediaFormat::from_extension("mp4"), MediaFormat::Native);
        assert_eq!(MediaFormat::from_extension("webm"), MediaFormat::Native);
        assert_eq!(MediaFormat::from_extension("ogg"), MediaFormat::Native);
        assert_eq!(MediaFormat::from_extension("MP4"), MediaFormat::Native);
    }

    #[test]
    fn non_native_formats() {
        assert_eq!(MediaFormat::from_extension("mkv"), MediaFormat::NeedsTranscode);
        assert_eq!(MediaFormat::from_extension("avi"), MediaFormat::NeedsTranscode);
        assert_eq!(MediaFormat::from_extension("wmv"), MediaFormat::NeedsTranscode);
        assert_eq!(MediaFormat::from_extension(""), MediaFormat::NeedsTranscode);
    }

    #[test]
    fn mime_lookup() {
        assert_eq!(mime_type("mp4"), "video/mp4");
        assert_eq!(mime_type("mkv"), "video/x-matroska");
        assert_eq!(mime_type("MKV"), "video/x-matroska");
        assert_eq!(mime_type("ts"), "video/mp2t");
    }

    #[test]
    fn mime_fallback() {
        assert_eq!(mime_type("weird"), "video/mp4");
        assert_eq!(mime_type(""), "video/mp4");
    }

    #[test]
    fn supported_extension_check() {
        assert!(is_supported_extension("mkv"));
        assert!(is_supported_extension("MKV"));
        assert!(!is_supported_extension("txt"));
        assert!(!is_supported_extension("exe"));
    }
}
