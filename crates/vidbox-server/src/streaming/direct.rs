//! Direct file streaming with range and conditional-cache support.
//!
//! Serves a catalog file's bytes as-is. Bodies are `ReaderStream`s with the
//! configured chunk capacity, so memory stays bounded and a client disconnect
//! simply drops the stream mid-loop without surfacing an error.

use std::io::SeekFrom;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use vidbox_core::config::StreamConfig;
use vidbox_core::{media, Error, Result};

use super::range::{parse_range_header, ByteRange};

/// Strong validator derived from `(path, size, mtime)`.
///
/// Stable across requests while the file is unchanged; any size or mtime
/// change produces a different value. Rendered quoted, ready for the header.
pub fn compute_etag(path: &Path, file_size: u64, mtime: SystemTime) -> String {
    let mtime_secs = mtime
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(file_size.to_string().as_bytes());
    hasher.update(mtime_secs.to_string().as_bytes());
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Format a modification time as an RFC 7231 HTTP date.
fn http_date(mtime: SystemTime) -> String {
    let dt: DateTime<Utc> = mtime.into();
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Serve `path` directly, honoring `Range` and `If-None-Match`.
///
/// The file was already existence- and root-checked by the dispatcher, so an
/// open failure here is a genuine server error (500), not a 404.
pub async fn serve(
    cfg: &StreamConfig,
    path: &Path,
    extension: &str,
    range_header: Option<&str>,
    if_none_match: Option<&str>,
) -> Result<Response> {
    let metadata = tokio::fs::metadata(path).await?;
    let file_size = metadata.len();
    let mtime = metadata.modified().unwrap_or(UNIX_EPOCH);
    let etag = compute_etag(path, file_size, mtime);

    if if_none_match == Some(etag.as_str()) {
        return Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, &etag)
            .body(Body::empty())
            .map_err(|e| Error::Internal(format!("response build failed: {e}")));
    }

    let range = if cfg.range_requests {
        range_header.and_then(|h| parse_range_header(h, file_size))
    } else {
        None
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().replace('"', ""))
        .unwrap_or_default();

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, media::mime_type(extension))
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{file_name}\""),
        );

    if cfg.cache_headers {
        builder = builder
            .header(header::CACHE_CONTROL, "public, max-age=31536000")
            .header(header::ETAG, &etag)
            .header(header::LAST_MODIFIED, http_date(mtime));
    }

    let mut file = tokio::fs::File::open(path).await?;

    match range {
        Some(ByteRange { start, end }) => {
            let length = end - start + 1;
            file.seek(SeekFrom::Start(start)).await?;

            let stream = ReaderStream::with_capacity(file.take(length), cfg.chunk_size);
            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{file_size}"),
                )
                .body(Body::from_stream(stream))
                .map_err(|e| Error::Internal(format!("response build failed: {e}")))
        }
        None => {
            let stream = ReaderStream::with_capacity(file, cfg.chunk_size);
            builder
                .status(StatusCode::OK)
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .body(Body::from_stream(stream))
                .map_err(|e| Error::Internal(format!("response build failed: {e}")))
        }
    }
}
