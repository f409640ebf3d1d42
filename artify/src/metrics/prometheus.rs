//! Prometheus-backed metrics and HTTP exporter.
//!
//! Defines a [`MetricsRegistry`] owning a Prometheus registry and the
//! strongly-typed workflow metrics, plus an async HTTP exporter serving
//! `/metrics` over `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    body::Incoming, header, server::conn::http1, service::service_fn, Method, Request, Response,
    StatusCode,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

/// Upload and mint workflow metrics.
///
/// Registered into a [`Registry`]; updated from the gateway handlers and
/// the demo binary around workflow calls.
#[derive(Clone)]
pub struct WorkflowMetrics {
    /// End-to-end duration of one mint attempt, in seconds.
    pub mint_seconds: Histogram,
    /// Mint attempts that ended in `Success`.
    pub mints_completed: IntCounter,
    /// Mint attempts that ended in `Failed`.
    pub mints_failed: IntCounter,
    /// Duration of one upload/inference round trip, in seconds.
    pub inference_seconds: Histogram,
    /// Upload/inference calls that returned an error.
    pub uploads_failed: IntCounter,
}

impl WorkflowMetrics {
    /// Registers the workflow metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        // Mint attempts spend most of their time in the confirmation wait,
        // so the buckets stretch well past typical block times.
        let mint_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "mint_attempt_seconds",
                "End-to-end duration of one mint attempt in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;
        registry.register(Box::new(mint_seconds.clone()))?;

        let mints_completed = IntCounter::with_opts(Opts::new(
            "mints_completed",
            "Total number of mint attempts that confirmed successfully",
        ))?;
        registry.register(Box::new(mints_completed.clone()))?;

        let mints_failed = IntCounter::with_opts(Opts::new(
            "mints_failed",
            "Total number of mint attempts that ended in failure",
        ))?;
        registry.register(Box::new(mints_failed.clone()))?;

        let inference_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "inference_upload_seconds",
                "Duration of one upload/inference round trip in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(inference_seconds.clone()))?;

        let uploads_failed = IntCounter::with_opts(Opts::new(
            "uploads_failed",
            "Total number of upload/inference calls that returned an error",
        ))?;
        registry.register(Box::new(uploads_failed.clone()))?;

        Ok(Self {
            mint_seconds,
            mints_completed,
            mints_failed,
            inference_seconds,
            uploads_failed,
        })
    }
}

/// Wrapper around a Prometheus registry and the workflow metrics.
///
/// The main metrics handle passed around in binaries; wrap it in an [`Arc`]
/// to share across threads/tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub workflow: WorkflowMetrics,
}

impl MetricsRegistry {
    /// Creates a `MetricsRegistry` with a fresh underlying `Registry` and
    /// registers the workflow metrics under the `artify` namespace.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("artify".to_string()), None)?;
        let workflow = WorkflowMetrics::register(&registry)?;
        Ok(Self { registry, workflow })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            eprintln!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics.
///
/// Listens on `addr` and serves `GET /metrics` with the Prometheus text
/// exposition format; all other paths return 404. Intended to be spawned
/// onto a Tokio runtime:
///
/// ```ignore
/// let registry = Arc::new(MetricsRegistry::new()?);
/// let addr: SocketAddr = "127.0.0.1:9890".parse()?;
/// tokio::spawn(run_prometheus_http_server(registry.clone(), addr));
/// ```
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                eprintln!("prometheus HTTP server error: {err}");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => {
            let body = metrics.gather_text();
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
                .body(Full::new(Bytes::from(body)))
                .unwrap())
        }
        _ => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from("not found")))
            .unwrap()),
    }
}
