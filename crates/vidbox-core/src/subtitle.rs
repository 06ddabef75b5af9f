//! Subtitle format handling and SRT-to-WebVTT conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subtitle formats the server is willing to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    Srt,
    Vtt,
    Ass,
    Ssa,
    Sub,
}

impl SubtitleFormat {
    /// Classify a file extension (case-insensitive). Anything else is
    /// rejected upstream as a bad request.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "srt" => Some(Self::Srt),
            "vtt" => Some(Self::Vtt),
            "ass" => Some(Self::Ass),
            "ssa" => Some(Self::Ssa),
            "sub" => Some(Self::Sub),
            _ => None,
        }
    }

    /// MIME type the format is served under.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Srt => "text/srt",
            Self::Vtt => "text/vtt",
            Self::Ass => "text/x-ass",
            Self::Ssa => "text/x-ssa",
            Self::Sub => "text/x-microdvd",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srt => write!(f, "srt"),
            Self::Vtt => write!(f, "vtt"),
            Self::Ass => write!(f, "ass"),
            Self::Ssa => write!(f, "ssa"),
            Self::Sub => write!(f, "sub"),
        }
    }
}

/// Convert SRT cue text into WebVTT.
///
/// Prepends the mandatory `WEBVTT` signature, normalizes CRLF/CR line endings
/// to LF, and rewrites each timing line's `HH:MM:SS,mmm` fractional separator
/// from comma to period. Cue numbering lines are left in place; browsers
/// treat them as cue identifiers. Commas inside cue text are untouched since
/// only lines containing the `-->` arrow are rewritten.
pub fn srt_to_vtt(srt: &str) -> String {
    let normalized = srt.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(normalized.len() + 8);
    out.push_str("WEBVTT\n\n");

    for (i, line) in normalized.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.contains("-->") {
            out.push_str(&line.replace(',', "."));
        } else {
            out.push_str(line);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(SubtitleFormat::from_extension("srt"), Some(SubtitleFormat::Srt));
        assert_eq!(SubtitleFormat::from_extension("VTT"), Some(SubtitleFormat::Vtt));
        assert_eq!(SubtitleFormat::from_extension("ass"), Some(SubtitleFormat::Ass));
        assert_eq!(SubtitleFormat::from_extension("exe"), None);
        assert_eq!(SubtitleFormat::from_extension(""), None);
    }

    #[test]
    fn mime_types() {
        assert_eq!(SubtitleFormat::Srt.mime_type(), "text/srt");
        assert_eq!(SubtitleFormat::Vtt.mime_type(), "text/vtt");
        assert_eq!(SubtitleFormat::Sub.mime_type(), "text/x-microdvd");
    }

    #[test]
    fn basic_conversion() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nHi\n";
        let vtt = srt_to_vtt(srt);
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("00:00:01.000 --> 00:00:02.000"));
        assert!(vtt.contains("\nHi\n"));
    }

    #[test]
    fn crlf_is_normalized() {
        let srt = "1\r\n00:00:01,000 --> 00:00:02,500\r\nHello\r\n";
        let vtt = srt_to_vtt(srt);
        assert!(!vtt.contains('\r'));
        assert!(vtt.contains("00:00:02.500"));
    }

    #[test]
    fn cue_text_commas_survive() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nwell, hello, there\n";
        let vtt = srt_to_vtt(srt);
        assert!(vtt.contains("well, hello, there"));
        assert!(vtt.contains("00:00:01.000"));
    }

    #[test]
    fn non_ascii_cue_text() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nHallöchen, Welt\n";
        let vtt = srt_to_vtt(srt);
        assert!(vtt.contains("Hallöchen, Welt"));
        assert!(vtt.contains("00:00:01.000 --> 00:00:02.000"));
    }

    #[test]
    fn multiple_cues() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nA\n\n2\n00:01:03,250 --> 00:01:04,750\nB\n";
        let vtt = srt_to_vtt(srt);
        assert!(vtt.contains("00:01:03.250 --> 00:01:04.750"));
    }
}
