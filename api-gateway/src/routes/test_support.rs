//! Shared fixtures for the route tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, header};

use notary::{
    Certificate, CertificateId, CertificateStore, ContentHash, InMemoryCertificateStore,
    MetricsRegistry, SharedStore, StoreError,
};

use crate::config::ApiConfig;
use crate::state::{AppState, SharedState};

pub const BOUNDARY: &str = "notary-test-boundary";

/// In-memory store with injectable latency and failures.
#[derive(Default)]
pub struct ScriptedStore {
    inner: InMemoryCertificateStore,
    lookup_delay: Duration,
    fail: bool,
    lookups: AtomicUsize,
    saves: AtomicUsize,
}

impl ScriptedStore {
    /// Every lookup sleeps for `delay` before answering.
    pub fn slow(delay: Duration) -> Self {
        Self {
            lookup_delay: delay,
            ..Self::default()
        }
    }

    /// Every call fails with a backend error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CertificateStore for ScriptedStore {
    fn save(&self, cert: &Certificate) -> Result<CertificateId, StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Backend("disk unavailable".to_string()));
        }
        self.inner.save(cert)
    }

    fn find_by_content_hash(&self, hash: &ContentHash) -> Result<Option<Certificate>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.lookup_delay);
        if self.fail {
            return Err(StoreError::Backend("disk unavailable".to_string()));
        }
        self.inner.find_by_content_hash(hash)
    }
}

/// Builds gateway state over `store` with the given upload cap and timeout.
pub fn state_over<S>(store: S, max_upload_bytes: usize, request_timeout: Duration) -> SharedState
where
    S: CertificateStore + 'static,
{
    let store: SharedStore = Arc::new(store);
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let api = ApiConfig {
        max_upload_bytes,
        request_timeout,
        ..ApiConfig::default()
    };
    Arc::new(AppState::new(store, metrics, &api))
}

/// A complete multipart body carrying one field.
pub fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = multipart_head(field, content_type);
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Part headers for one field, with no body and no closing boundary.
pub fn multipart_head(field: &str, content_type: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes()
}

pub fn upload(uri: &str, registrant: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(r) = registrant {
        builder = builder.header("x-registrant", r);
    }
    builder.body(Body::from(body)).unwrap()
}
