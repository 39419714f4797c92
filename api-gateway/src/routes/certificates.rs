//! Certification and verification handlers.
//!
//! The workflows are synchronous and may block on disk, so every call runs
//! on the blocking pool. If the client goes away or the request timeout
//! elapses, the workflow's cancellation flag is raised and it stops at its
//! next checkpoint.

use std::io;

use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use notary::{CancellationFlag, VerificationResult, VerifyQuery, WorkflowError};

use super::upload::{self, ChannelReader};
use crate::dto::{CertificateDto, VerifyResponse};
use crate::error::ApiError;
use crate::state::{AppState, SharedState};

/// Header naming the party requesting certification.
pub const REGISTRANT_HEADER: &str = "x-registrant";

/// Query string of `GET /certificates/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub hash: Option<String>,
}

/// `POST /certificates`
///
/// Certifies the uploaded `file`. The registrant is taken verbatim from the
/// `X-Registrant` header and defaults to the empty string.
pub async fn certify(
    State(state): State<SharedState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CertificateDto>), ApiError> {
    let registrant = headers
        .get(REGISTRANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let outcome = stream_upload(&state, multipart, move |app, content, cancel| {
        app.certify
            .certify_cancellable(content, &registrant, cancel)
    })
    .await?;

    let metrics = &state.metrics.notary;
    match outcome {
        Ok(cert) => {
            metrics.certifications_total.inc();
            Ok((StatusCode::CREATED, Json(CertificateDto::from(&cert))))
        }
        Err(err) => {
            if matches!(err, WorkflowError::AlreadyCertified { .. }) {
                metrics.certifications_rejected_duplicate.inc();
            }
            Err(ApiError::Certify(err))
        }
    }
}

/// `GET /certificates/verify?hash=<hex>`
pub async fn verify_by_hash(
    State(state): State<SharedState>,
    Query(params): Query<VerifyParams>,
) -> Result<(StatusCode, Json<VerifyResponse>), ApiError> {
    let query = VerifyQuery::<io::Empty> {
        content: None,
        hash: params.hash,
    };
    let outcome =
        run_blocking(&state, move |app, cancel| app.verify.verify_cancellable(query, cancel))
            .await?;
    respond_verified(&state, outcome)
}

/// `POST /certificates/verify`
///
/// Fingerprints the uploaded `file` and looks it up.
pub async fn verify_by_file(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<VerifyResponse>), ApiError> {
    let outcome = stream_upload(&state, multipart, |app, content, cancel| {
        app.verify
            .verify_cancellable(VerifyQuery::by_content(content), cancel)
    })
    .await?;
    respond_verified(&state, outcome)
}

fn respond_verified(
    state: &AppState,
    outcome: Result<VerificationResult, WorkflowError>,
) -> Result<(StatusCode, Json<VerifyResponse>), ApiError> {
    let result = outcome.map_err(ApiError::Verify)?;
    let metrics = &state.metrics.notary;

    let status = if result.certified {
        metrics.verifications_certified.inc();
        StatusCode::OK
    } else {
        metrics.verifications_unknown.inc();
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(VerifyResponse::from(&result))))
}

/// Finds the `file` field and runs `work` over its body while the body is
/// still arriving.
async fn stream_upload<T, F>(
    state: &SharedState,
    multipart: Result<Multipart, MultipartRejection>,
    work: F,
) -> Result<T, ApiError>
where
    F: FnOnce(&AppState, ChannelReader, &CancellationFlag) -> T + Send + 'static,
    T: Send + 'static,
{
    let limit = state.max_upload_bytes;
    let mut multipart = upload::accept(multipart)?;

    let field = loop {
        let Some(field) = upload::next_field(&mut multipart, limit).await? else {
            return Err(upload::missing_file_field());
        };
        if upload::is_file_field(&field)? {
            break field;
        }
    };
    tracing::debug!(
        file_name = ?field.file_name(),
        media_type = ?field.content_type(),
        "streaming upload"
    );

    let (tx, content) = upload::channel();
    let (forwarded, outcome) = tokio::join!(
        upload::pump_field(field, tx, limit),
        run_blocking(state, move |app, cancel| work(app, content, cancel)),
    );

    let forwarded = forwarded?;
    tracing::debug!(bytes = forwarded, "upload consumed");
    outcome
}

/// Raises the flag when the owning request future is dropped.
struct CancelOnDrop(CancellationFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Runs `work` on the blocking pool, bounded by the request timeout.
async fn run_blocking<T, F>(state: &SharedState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState, &CancellationFlag) -> T + Send + 'static,
    T: Send + 'static,
{
    let guard = CancelOnDrop(CancellationFlag::new());
    let cancel = guard.0.clone();
    let worker_state = state.clone();

    let handle = tokio::task::spawn_blocking(move || work(&worker_state, &cancel));

    match tokio::time::timeout(state.request_timeout, handle).await {
        Ok(Ok(out)) => Ok(out),
        Ok(Err(join_err)) => Err(ApiError::Internal(join_err.to_string())),
        Err(_) => {
            tracing::warn!(
                timeout_ms = state.request_timeout.as_millis() as u64,
                "workflow timed out; cancelling"
            );
            Err(ApiError::Timeout)
        }
    }
}
