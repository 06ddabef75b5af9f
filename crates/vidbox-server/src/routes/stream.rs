//! The stream dispatcher: token check, catalog lookup, then direct vs.
//! transcode delivery.
//!
//! A request moves through a fixed sequence of terminal rejections (400 on
//! missing params, 403 on a bad token, 404 on anything the catalog or
//! filesystem refuses to produce) before one of the two serving paths takes
//! over. Range and conditional headers are honored only on the direct path.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use serde::Deserialize;

use vidbox_core::paths::is_path_allowed;
use vidbox_core::token::HourBucket;
use vidbox_core::{Error, MediaFormat, MediaId};

use crate::context::AppContext;
use crate::error::AppError;
use crate::streaming::{direct, transcode};

/// Client's say in format selection. `auto` transcodes only non-native
/// containers, `force` always transcodes, `off` never does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscodeMode {
    #[default]
    Auto,
    Force,
    Off,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub id: Option<String>,
    pub token: Option<String>,
    #[serde(default)]
    pub transcode: TranscodeMode,
}

/// GET /api/stream?id=&token=&transcode=
pub async fn stream(
    State(ctx): State<AppContext>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id_raw = query
        .id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("id is required".into()))?;
    let token = query
        .token
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("token is required".into()))?;

    let id: MediaId = id_raw
        .parse()
        .map_err(|_| Error::Validation(format!("invalid media id: {id_raw}")))?;

    if !ctx.tokens.verify(id, &token, HourBucket::now()) {
        return Err(Error::Forbidden("invalid or expired token".into()).into());
    }

    let record = ctx
        .catalog
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("media", id))?;

    // Existence, readability, root containment, and size all collapse into
    // 404 so probing requests learn nothing about the filesystem.
    let metadata = tokio::fs::metadata(&record.file_path)
        .await
        .map_err(|_| Error::not_found("file", record.file_path.display()))?;

    if !is_path_allowed(&record.file_path, &ctx.config.media.roots) {
        tracing::warn!(
            media_id = %id,
            path = %record.file_path.display(),
            "Catalog path escapes every allowed root"
        );
        return Err(Error::not_found("file", record.file_path.display()).into());
    }

    if metadata.len() > ctx.config.media.max_file_size {
        tracing::debug!(
            media_id = %id,
            size = metadata.len(),
            "File exceeds max_file_size"
        );
        return Err(Error::not_found("file", record.file_path.display()).into());
    }

    // Play-recorded side effect for the catalog; never fatal to the stream.
    if let Err(e) = ctx.catalog.record_play(id).await {
        tracing::warn!(media_id = %id, "Failed to record play: {e}");
    }

    let wants_transcode = match query.transcode {
        TranscodeMode::Force => true,
        TranscodeMode::Off => false,
        TranscodeMode::Auto => {
            MediaFormat::from_extension(&record.extension) == MediaFormat::NeedsTranscode
        }
    };

    if wants_transcode && ctx.config.transcode.enabled {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok());
        Ok(transcode::serve(
            &ctx.config.transcode,
            &record.file_path,
            user_agent,
            ctx.config.stream.chunk_size,
        )?)
    } else {
        // Non-native container with transcoding disabled falls back to
        // direct delivery; the player may still cope.
        let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
        let if_none_match = headers
            .get(header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok());
        Ok(direct::serve(
            &ctx.config.stream,
            &record.file_path,
            &record.extension,
            range,
            if_none_match,
        )
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcode_mode_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Q {
            transcode: TranscodeMode,
        }
        let q: Q = serde_json::from_str(r#"{"transcode": "force"}"#).unwrap();
        assert_eq!(q.transcode, TranscodeMode::Force);
        let q: Q = serde_json::from_str(r#"{"transcode": "off"}"#).unwrap();
        assert_eq!(q.transcode, TranscodeMode::Off);
        assert!(serde_json::from_str::<Q>(r#"{"transcode": "maybe"}"#).is_err());
    }

    #[test]
    fn transcode_mode_defaults_to_auto() {
        assert_eq!(TranscodeMode::default(), TranscodeMode::Auto);
    }
}
