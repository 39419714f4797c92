//! Prometheus-backed metrics and HTTP exporter.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and a set of strongly-typed notary metrics, and an async HTTP
//! exporter that serves `/metrics` using `hyper`.

use std::{convert::Infallible, future::Future, net::SocketAddr, pin::pin, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Request, Response, StatusCode, header, server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{
    Histogram, HistogramOpts, IntCounter, Opts, Registry, TEXT_FORMAT, TextEncoder,
};

/// Certification and verification metrics.
///
/// These are registered into a [`Registry`] and updated by the gateway and
/// by [`crate::attestation::InstrumentedLedger`].
#[derive(Clone)]
pub struct NotaryMetrics {
    /// Certificates successfully issued.
    pub certifications_total: IntCounter,
    /// Certification attempts rejected because the content was already certified.
    pub certifications_rejected_duplicate: IntCounter,
    /// Latency of attestation ledger registrations, in seconds.
    pub attestation_seconds: Histogram,
    /// Attestation ledger registrations that failed.
    pub attestation_failures: IntCounter,
    /// Verification queries that found a certificate.
    pub verifications_certified: IntCounter,
    /// Verification queries for unknown content.
    pub verifications_unknown: IntCounter,
}

impl NotaryMetrics {
    /// Registers notary metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let certifications_total = IntCounter::with_opts(Opts::new(
            "certifications_total",
            "Total number of certificates issued",
        ))?;
        registry.register(Box::new(certifications_total.clone()))?;

        let certifications_rejected_duplicate = IntCounter::with_opts(Opts::new(
            "certifications_rejected_duplicate",
            "Total number of certification attempts for already certified content",
        ))?;
        registry.register(Box::new(certifications_rejected_duplicate.clone()))?;

        let attestation_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "attestation_seconds",
                "Time spent registering a content hash on the attestation ledger in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;
        registry.register(Box::new(attestation_seconds.clone()))?;

        let attestation_failures = IntCounter::with_opts(Opts::new(
            "attestation_failures",
            "Total number of failed attestation ledger registrations",
        ))?;
        registry.register(Box::new(attestation_failures.clone()))?;

        let verifications_certified = IntCounter::with_opts(Opts::new(
            "verifications_certified",
            "Total number of verification queries that matched a certificate",
        ))?;
        registry.register(Box::new(verifications_certified.clone()))?;

        let verifications_unknown = IntCounter::with_opts(Opts::new(
            "verifications_unknown",
            "Total number of verification queries for uncertified content",
        ))?;
        registry.register(Box::new(verifications_unknown.clone()))?;

        Ok(Self {
            certifications_total,
            certifications_rejected_duplicate,
            attestation_seconds,
            attestation_failures,
            verifications_certified,
            verifications_unknown,
        })
    }
}

/// Wrapper around a Prometheus registry and the notary metrics.
///
/// This is the main handle you pass around in the service. It can be
/// wrapped in an [`Arc`] and shared across threads/tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub notary: NotaryMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh underlying `Registry`
    /// and registers the notary metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("notary".to_string()), None)?;
        let notary = NotaryMetrics::register(&registry)?;
        Ok(Self { registry, notary })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .unwrap_or_else(|e| {
                tracing::warn!("failed to encode Prometheus metrics: {e}");
                String::new()
            })
    }
}

/// Binds `addr` and serves `GET /metrics` until `shutdown` resolves.
///
/// See [`serve_metrics`] for the request handling.
pub async fn run_prometheus_http_server<F>(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("metrics exporter listening on http://{addr}/metrics");
    serve_metrics(listener, metrics, shutdown).await
}

/// Serves the Prometheus text exposition on `GET /metrics` from an already
/// bound listener. Every other request gets a 404.
///
/// Stops accepting once `shutdown` resolves; connections already accepted
/// run to completion on their own tasks.
pub async fn serve_metrics<F>(
    listener: TcpListener,
    metrics: Arc<MetricsRegistry>,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()>,
{
    let mut shutdown = pin!(shutdown);

    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => accepted?.0,
            () = &mut shutdown => {
                tracing::info!("metrics exporter stopped");
                return Ok(());
            }
        };

        let metrics = metrics.clone();
        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                async move { Ok::<_, Infallible>(metrics_response(&req, &metrics)) }
            });

            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                tracing::warn!("metrics connection error: {err}");
            }
        });
    }
}

fn metrics_response<B>(req: &Request<B>, metrics: &MetricsRegistry) -> Response<Full<Bytes>> {
    if req.method() != Method::GET || req.uri().path() != "/metrics" {
        let mut missing = Response::new(Full::new(Bytes::from_static(b"not found")));
        *missing.status_mut() = StatusCode::NOT_FOUND;
        return missing;
    }

    let mut ok = Response::new(Full::new(Bytes::from(metrics.gather_text())));
    ok.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(TEXT_FORMAT),
    );
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notary_metrics_register_and_record() {
        let registry = Registry::new();
        let metrics = NotaryMetrics::register(&registry).expect("register metrics");

        metrics.certifications_total.inc();
        metrics.certifications_rejected_duplicate.inc();
        metrics.attestation_seconds.observe(0.045);
        metrics.attestation_failures.inc();
        metrics.verifications_certified.inc();
        metrics.verifications_unknown.inc();

        let metric_families = registry.gather();
        assert_eq!(metric_families.len(), 6);
    }

    #[test]
    fn metrics_registry_gather_text_works() {
        let registry = MetricsRegistry::new().expect("create metrics registry");
        registry.notary.certifications_total.inc();
        let text = registry.gather_text();
        assert!(text.contains("notary_certifications_total 1"));
    }

    #[tokio::test]
    async fn exporter_serves_metrics_until_shutdown() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpStream;
        use tokio::sync::oneshot;

        let registry = Arc::new(MetricsRegistry::new().unwrap());
        registry.notary.verifications_unknown.inc();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_metrics(listener, registry, async move {
            let _ = stop_rx.await;
        }));

        let mut conn = TcpStream::connect(addr).await.unwrap();
        conn.write_all(b"GET /metrics HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut reply = String::new();
        conn.read_to_string(&mut reply).await.unwrap();

        assert!(reply.starts_with("HTTP/1.1 200"), "{reply}");
        assert!(reply.contains("notary_verifications_unknown 1"));

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let registry = MetricsRegistry::new().unwrap();
        let req = Request::get("/other").body(()).unwrap();
        assert_eq!(
            metrics_response(&req, &registry).status(),
            StatusCode::NOT_FOUND
        );

        let req = Request::get("/metrics").body(()).unwrap();
        let ok = metrics_response(&req, &registry);
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers()[header::CONTENT_TYPE], TEXT_FORMAT);
    }
}
