// src/main.rs
//
// Minimal demo CLI that wires up the artify library:
//
// - uploads an image to the inference backend and prints the report,
// - optionally mints the analysed artwork (set ARTIFY_MINT=1),
// - Prometheus metrics exporter on /metrics.
//
// The library clients are blocking, so main stays synchronous and the
// metrics exporter runs on its own Tokio runtime thread.

use std::{
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use artify::{
    report, ArtifyConfig, DefaultMintWorkflow, HttpInferenceClient, HttpWalletProvider,
    InferenceApi, MetricsRegistry, MintProgress, ProgressObserver, WalletConnector,
    run_prometheus_http_server,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let image_path = std::env::args()
        .nth(1)
        .ok_or_else(|| "usage: artify <image-path>".to_string())?;

    let cfg = ArtifyConfig::default().overlay_env()?;

    // ---------------------------
    // Metrics registry + exporter
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    if cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = cfg.metrics.listen_addr;
        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    eprintln!("failed to start metrics runtime: {e}");
                    return;
                }
            };
            if let Err(e) = runtime.block_on(run_prometheus_http_server(metrics_clone, addr)) {
                eprintln!("metrics HTTP server error: {e}");
            }
        });
        eprintln!("metrics exporter listening on http://{addr}/metrics");
    }

    // ---------------------------
    // Upload + authenticity report
    // ---------------------------

    let image = std::fs::read(&image_path)
        .map_err(|e| format!("failed to read image {image_path}: {e}"))?;
    let file_name = std::path::Path::new(&image_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artwork")
        .to_string();

    let inference = HttpInferenceClient::new(cfg.inference.base_url.clone(), cfg.inference.timeout)
        .map_err(|e| format!("failed to create inference client: {e}"))?;

    let start = Instant::now();
    let upload = match inference.analyze(&image, &file_name) {
        Ok(upload) => {
            metrics
                .workflow
                .inference_seconds
                .observe(start.elapsed().as_secs_f64());
            upload
        }
        Err(e) => {
            metrics.workflow.uploads_failed.inc();
            return Err(format!("analysis failed: {e}"));
        }
    };

    println!("{}", report::render_summary(&upload));
    println!(
        "view: {}",
        report::gateway_url(&cfg.storage_gateway.base_url, upload.cid.as_str())
    );
    for similar in &upload.similar_works {
        println!("  similar: {} ({:.0}%)", similar.path, similar.similarity * 100.0);
    }

    // ---------------------------
    // Optional mint
    // ---------------------------

    if std::env::var("ARTIFY_MINT").as_deref() != Ok("1") {
        return Ok(());
    }

    let provider = HttpWalletProvider::new(cfg.wallet_rpc.endpoint.clone(), cfg.wallet_rpc.timeout)
        .map_err(|e| format!("failed to create wallet provider: {e}"))?;
    let mut workflow = DefaultMintWorkflow::new(
        WalletConnector::new(provider),
        cfg.contract.clone(),
        cfg.policy.clone(),
    );

    struct StderrObserver;

    impl ProgressObserver for StderrObserver {
        fn on_progress(&mut self, progress: &MintProgress) {
            eprintln!("[{}/5] {}", progress.step_index(), progress.label());
        }
    }

    let start = Instant::now();
    match workflow.mint_with_observer(&upload, &mut StderrObserver) {
        Ok(outcome) => {
            metrics
                .workflow
                .mint_seconds
                .observe(start.elapsed().as_secs_f64());
            metrics.workflow.mints_completed.inc();
            println!(
                "minted at {} tx={:#x} token_id={:?}",
                current_unix_timestamp(),
                outcome.transaction_hash,
                outcome.token_id,
            );
            Ok(())
        }
        Err(e) => {
            metrics.workflow.mints_failed.inc();
            Err(format!("mint failed: {e}"))
        }
    }
}

/// Returns the current wall-clock time as seconds since Unix epoch.
///
/// On error (system clock before epoch) this falls back to 0.
fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
