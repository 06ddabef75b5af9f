//! Media delivery: range parsing, direct file serving, and transcoding.

pub mod direct;
pub mod range;
pub mod transcode;

pub use range::{parse_range_header, ByteRange};
pub use transcode::TranscodeProfile;
