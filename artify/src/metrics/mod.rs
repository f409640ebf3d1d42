//! Metrics and instrumentation for the mint core.
//!
//! Prometheus-compatible metrics covering upload/inference round trips and
//! mint attempts, plus a small HTTP exporter serving `/metrics` in the
//! Prometheus text format.
//!
//! Typical usage in a binary:
//!
//! ```ignore
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//! use artify::metrics::{MetricsRegistry, run_prometheus_http_server};
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//! let addr: SocketAddr = "127.0.0.1:9890".parse()?;
//!
//! // Spawn the HTTP exporter in the background:
//! tokio::spawn(run_prometheus_http_server(registry.clone(), addr));
//!
//! // Elsewhere in the code:
//! registry.workflow.mint_seconds.observe(duration_secs);
//! ```

pub mod prometheus;

pub use prometheus::{run_prometheus_http_server, MetricsRegistry, WorkflowMetrics};
