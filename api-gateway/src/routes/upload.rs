//! Multipart upload handling.
//!
//! Uploads are never buffered whole. The handler walks the fields with
//! [`next_field`] until [`is_file_field`] accepts one. [`pump_field`] then
//! forwards the body chunk by chunk into a [`ChannelReader`] that the
//! blocking workflow fingerprints in a single pass. A client-side stream
//! fault reaches the workflow as a read error.

use std::io::{self, Read};

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use tokio::sync::mpsc;

use crate::error::ApiError;

/// Name of the multipart field carrying the content.
pub const FILE_FIELD: &str = "file";

/// Chunks buffered between the request body and the workflow.
const CHANNEL_CHUNKS: usize = 8;

const ACCEPTED_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-msvideo",
    "video/mpeg",
];

/// Returns `true` if `content_type` (parameters allowed) is an accepted
/// image or video type.
pub fn is_accepted_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ACCEPTED_MEDIA_TYPES.contains(&essence.as_str())
}

/// Turns an extractor rejection (wrong content type, bad boundary) into a 400.
pub fn accept(multipart: Result<Multipart, MultipartRejection>) -> Result<Multipart, ApiError> {
    multipart.map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Fetches the next multipart field, if any.
pub async fn next_field(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<Option<Field<'_>>, ApiError> {
    multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))
}

/// Returns `Ok(true)` for the `file` field and `Ok(false)` for fields to
/// skip. A `file` field with a media type outside the allowlist is an error.
pub fn is_file_field(field: &Field<'_>) -> Result<bool, ApiError> {
    if field.name() != Some(FILE_FIELD) {
        return Ok(false);
    }
    let media_type = field.content_type().unwrap_or_default();
    if !is_accepted_media_type(media_type) {
        tracing::debug!(%media_type, "rejecting upload");
        return Err(ApiError::UnsupportedMediaType);
    }
    Ok(true)
}

/// Error for a multipart body without a `file` field.
pub fn missing_file_field() -> ApiError {
    ApiError::BadRequest(format!("missing multipart field `{FILE_FIELD}`"))
}

/// Creates the channel connecting [`pump_field`] to a blocking reader.
pub fn channel() -> (mpsc::Sender<io::Result<Bytes>>, ChannelReader) {
    let (tx, rx) = mpsc::channel(CHANNEL_CHUNKS);
    (
        tx,
        ChannelReader {
            rx,
            chunk: Bytes::new(),
        },
    )
}

/// Blocking [`Read`] over chunks sent from the async side.
///
/// Must only be read from a blocking thread. EOF is reported once the
/// sender is dropped; an error chunk is surfaced as a read error.
pub struct ChannelReader {
    rx: mpsc::Receiver<io::Result<Bytes>>,
    chunk: Bytes,
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.chunk.is_empty() {
            match self.rx.blocking_recv() {
                None => return Ok(0),
                Some(Ok(chunk)) => self.chunk = chunk,
                Some(Err(e)) => return Err(e),
            }
        }
        let n = buf.len().min(self.chunk.len());
        buf[..n].copy_from_slice(&self.chunk.split_to(n));
        Ok(n)
    }
}

/// Forwards the body of `field` into `tx` and returns the number of bytes
/// forwarded.
///
/// A body read failure is passed on to the reader as an I/O error. Only an
/// exceeded size limit is also reported to the caller, as a 413.
pub async fn pump_field(
    mut field: Field<'_>,
    tx: mpsc::Sender<io::Result<Bytes>>,
    limit: usize,
) -> Result<u64, ApiError> {
    let mut forwarded = 0u64;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                forwarded += chunk.len() as u64;
                if tx.send(Ok(chunk)).await.is_err() {
                    // Reader stopped early (cancelled or failed).
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let too_large = e.status() == StatusCode::PAYLOAD_TOO_LARGE;
                tracing::debug!(error = %e.body_text(), forwarded, "upload stream failed");
                let _ = tx.send(Err(io::Error::other(e.body_text()))).await;
                if too_large {
                    return Err(ApiError::PayloadTooLarge { limit });
                }
                break;
            }
        }
    }
    Ok(forwarded)
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
