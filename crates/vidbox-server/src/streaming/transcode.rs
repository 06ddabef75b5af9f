//! On-the-fly transcoding into a progressive fragmented-MP4 stream.
//!
//! Spawns ffmpeg against the source file and forwards its stdout to the
//! client chunk by chunk as it is produced. The [`ChildStream`] owns the
//! encoder process for its whole lifetime: on EOF it reaps it, and on any
//! early drop (client disconnect, read error, cancellation) `kill_on_drop`
//! terminates it, so no encoder outlives its request.

use std::path::Path;
use std::process::Stdio;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use futures_core::Stream;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};

use vidbox_core::config::TranscodeConfig;
use vidbox_core::{Error, Result};

/// Encoder settings chosen once per request and fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeProfile {
    pub video_codec: &'static str,
    pub audio_codec: &'static str,
    pub video_bitrate: &'static str,
    pub audio_bitrate: &'static str,
    pub preset: &'static str,
}

/// Desktop-tier profile.
const DESKTOP: TranscodeProfile = TranscodeProfile {
    video_codec: "libx264",
    audio_codec: "aac",
    video_bitrate: "2500k",
    audio_bitrate: "128k",
    preset: "ultrafast",
};

/// Mobile-tier profile: same codecs, lower video bitrate.
const MOBILE: TranscodeProfile = TranscodeProfile {
    video_bitrate: "1000k",
    ..DESKTOP
};

impl TranscodeProfile {
    /// Two-tier selection on the `User-Agent` header. The substring match is
    /// heuristic; anything that does not look mobile gets the desktop tier.
    pub fn for_user_agent(user_agent: Option<&str>) -> Self {
        const MOBILE_MARKERS: &[&str] = &["Mobile", "Android", "iPhone", "iPad"];
        match user_agent {
            Some(ua) if MOBILE_MARKERS.iter().any(|m| ua.contains(m)) => MOBILE,
            _ => DESKTOP,
        }
    }
}

/// ffmpeg invocation: re-encode with the profile, mux into fragmented MP4
/// suitable for progressive playback over a pipe.
fn ffmpeg_args(input: &Path, profile: &TranscodeProfile) -> Vec<String> {
    vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-c:v".into(),
        profile.video_codec.into(),
        "-preset".into(),
        profile.preset.into(),
        "-crf".into(),
        "23".into(),
        "-b:v".into(),
        profile.video_bitrate.into(),
        "-c:a".into(),
        profile.audio_codec.into(),
        "-b:a".into(),
        profile.audio_bitrate.into(),
        "-movflags".into(),
        "+frag_keyframe+separate_moof+omit_tfhd_offset+empty_moov".into(),
        "-f".into(),
        "mp4".into(),
        "pipe:1".into(),
    ]
}

/// An owned, self-cleaning pipe from a spawned encoder process.
#[derive(Debug)]
pub struct ChildStream {
    child: Child,
    stdout: ChildStdout,
    chunk_size: usize,
}

impl ChildStream {
    /// Spawn the encoder. Failure to spawn is a [`Error::Tool`] (HTTP 500).
    pub fn spawn(
        cfg: &TranscodeConfig,
        input: &Path,
        profile: &TranscodeProfile,
        chunk_size: usize,
    ) -> Result<Self> {
        let mut child = Command::new(&cfg.ffmpeg_path)
            .args(ffmpeg_args(input, profile))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::tool("ffmpeg", format!("failed to spawn: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::tool("ffmpeg", "stdout pipe unavailable"))?;

        Ok(Self {
            child,
            stdout,
            chunk_size,
        })
    }

    /// Turn the pipe into a chunked byte stream for a response body.
    ///
    /// Each chunk is yielded as soon as the encoder produces it. When the
    /// body is dropped before EOF the generator (and with it the child) is
    /// dropped mid-await, which terminates the encoder.
    pub fn into_stream(mut self) -> impl Stream<Item = std::io::Result<Vec<u8>>> {
        async_stream::stream! {
            let mut buf = vec![0u8; self.chunk_size.max(1)];
            loop {
                match self.stdout.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => yield Ok(buf[..n].to_vec()),
                    Err(e) => {
                        tracing::debug!("Encoder pipe read error: {e}");
                        yield Err(e);
                        break;
                    }
                }
            }

            // Normal completion or read error: reap the process here so the
            // exit status is collected instead of leaving a zombie.
            match self.child.wait().await {
                Ok(status) if status.success() => {
                    tracing::debug!("Encoder finished cleanly");
                }
                Ok(status) => {
                    tracing::warn!("Encoder exited with status {status}");
                }
                Err(e) => {
                    tracing::warn!("Failed to reap encoder: {e}");
                }
            }
        }
    }
}

/// Serve `input` as a continuously-muxed transcode stream.
///
/// No range support: a transcode always plays from the beginning, and the
/// response carries no `Content-Length` since the output size is unknown.
pub fn serve(
    cfg: &TranscodeConfig,
    input: &Path,
    user_agent: Option<&str>,
    chunk_size: usize,
) -> Result<Response> {
    let profile = TranscodeProfile::for_user_agent(user_agent);
    tracing::debug!(
        input = %input.display(),
        video_bitrate = profile.video_bitrate,
        "Starting transcode stream"
    );

    let child = ChildStream::spawn(cfg, input, &profile, chunk_size)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(child.into_stream()))
        .map_err(|e| Error::Internal(format!("response build failed: {e}")))
}
