//! Subtitle delivery with on-the-fly SRT-to-WebVTT conversion.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde::Deserialize;
use std::path::PathBuf;

use vidbox_core::paths::is_path_allowed;
use vidbox_core::subtitle::{srt_to_vtt, SubtitleFormat};
use vidbox_core::Error;

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SubtitleQuery {
    pub file: Option<String>,
    pub path: Option<String>,
}

/// GET /api/subtitles?file=&path=
///
/// Modern caption formats pass through with their own MIME type; legacy SRT
/// is rewritten to WebVTT. The extension allowlist is checked before any
/// filesystem access, and the full path must canonicalize into an allowed
/// media root.
pub async fn subtitles(
    State(ctx): State<AppContext>,
    Query(query): Query<SubtitleQuery>,
) -> Result<Response, AppError> {
    let file = query
        .file
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("file is required".into()))?;
    let dir = query
        .path
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("path is required".into()))?;

    let extension = file.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    let format = SubtitleFormat::from_extension(extension)
        .ok_or_else(|| Error::Validation(format!("unsupported subtitle format: {extension}")))?;

    let full_path = PathBuf::from(dir).join(&file);
    if !is_path_allowed(&full_path, &ctx.config.media.roots) {
        return Err(Error::not_found("subtitle", full_path.display()).into());
    }

    let raw = tokio::fs::read(&full_path)
        .await
        .map_err(|_| Error::not_found("subtitle", full_path.display()))?;

    let (mime, body) = match format {
        SubtitleFormat::Srt => {
            let text = String::from_utf8_lossy(&raw);
            (
                SubtitleFormat::Vtt.mime_type(),
                srt_to_vtt(&text).into_bytes(),
            )
        }
        other => (other.mime_type(), raw),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format!("{mime}; charset=UTF-8"))
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body.into())
        .map_err(|e| AppError::from(Error::Internal(format!("response build failed: {e}"))))
}
