use std::sync::PoisonError;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use ethers_core::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use artify::{
    contract::clamp_score, report, Cid, MintError, MintRecord, Prediction, SimilarWork,
    UploadResult,
};

use crate::state::SharedState;

/// Response body for `POST /artworks/analyze`.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub cid: String,
    pub score: f64,
    pub confidence: &'static str,
    pub prediction: Option<String>,
    pub signature: Option<String>,
    pub view_url: String,
    pub similar_works: Vec<SimilarWork>,
}

/// `POST /artworks/analyze`
///
/// Accepts a multipart upload with a single `file` field, forwards it to
/// the inference backend and returns the normalised authenticity report.
pub async fn analyze(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AnalyzeResponse>), (StatusCode, String)> {
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("artwork").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("failed to read upload: {e}")))?;
        image = Some((bytes.to_vec(), file_name));
        break;
    }

    let (bytes, file_name) =
        image.ok_or((StatusCode::BAD_REQUEST, "missing `file` field".to_string()))?;
    if bytes.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "uploaded file is empty".to_string()));
    }

    // The inference client is blocking; keep it off the async runtime.
    let worker_state = state.clone();
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(move || {
        use artify::InferenceApi;
        worker_state.inference.analyze(&bytes, &file_name)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("analysis task failed: {e}")))?;

    let upload = match result {
        Ok(upload) => {
            state
                .metrics
                .workflow
                .inference_seconds
                .observe(start.elapsed().as_secs_f64());
            upload
        }
        Err(e) => {
            state.metrics.workflow.uploads_failed.inc();
            tracing::warn!(error = %e, "artwork analysis failed");
            return Err((StatusCode::BAD_GATEWAY, e.to_string()));
        }
    };

    let response = AnalyzeResponse {
        cid: upload.cid.as_str().to_string(),
        score: upload.score,
        confidence: report::ConfidenceLevel::from_score(upload.score).label(),
        prediction: upload.prediction.as_ref().map(|p| p.label().to_string()),
        signature: upload.signature.clone(),
        view_url: report::gateway_url(&state.gateway_base, upload.cid.as_str()),
        similar_works: upload.similar_works,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Request body for `POST /artworks/mint`.
///
/// Carries the report fields from a previous `analyze` call; the gateway
/// does not persist reports between requests.
#[derive(Debug, Deserialize)]
pub struct MintArtworkRequest {
    pub cid: String,
    pub score: f64,
    pub prediction: Option<String>,
    pub signature: Option<String>,
}

/// Response body for `POST /artworks/mint`.
#[derive(Debug, Serialize)]
pub struct MintArtworkResponse {
    pub transaction_hash: H256,
    pub token_id: Option<U256>,
}

/// `POST /artworks/mint`
///
/// Runs one mint attempt for the given report. Concurrent requests
/// serialize on the workflow lock; invalid input is 400, a rejection in
/// the wallet is 409, a missing wallet endpoint is 503.
pub async fn mint(
    State(state): State<SharedState>,
    Json(body): Json<MintArtworkRequest>,
) -> Result<(StatusCode, Json<MintArtworkResponse>), (StatusCode, String)> {
    let upload = UploadResult {
        cid: Cid::from(body.cid.as_str()),
        score: body.score,
        prediction: body.prediction.as_deref().map(Prediction::from_label),
        signature: body.signature,
        similar_works: Vec::new(),
    };

    let worker_state = state.clone();
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(move || {
        let mut workflow = worker_state
            .workflow
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let outcome = workflow.mint(&upload)?;
        let minted_by = workflow
            .connector_mut()
            .session()
            .map(|s| s.address)
            .unwrap_or_default();
        Ok::<_, MintError>((outcome, minted_by, upload))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("mint task failed: {e}")))?;

    match result {
        Ok((outcome, minted_by, upload)) => {
            state
                .metrics
                .workflow
                .mint_seconds
                .observe(start.elapsed().as_secs_f64());
            state.metrics.workflow.mints_completed.inc();

            let record = MintRecord {
                cid: upload.cid.as_str().to_string(),
                score: clamp_score(upload.score),
                transaction_hash: outcome.transaction_hash,
                token_id: outcome.token_id,
                minted_by,
                minted_at: current_unix_timestamp(),
            };
            state
                .history
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(record);

            Ok((
                StatusCode::OK,
                Json(MintArtworkResponse {
                    transaction_hash: outcome.transaction_hash,
                    token_id: outcome.token_id,
                }),
            ))
        }
        Err(e) => {
            state.metrics.workflow.mints_failed.inc();
            tracing::warn!(error = %e, "mint request failed");
            Err((mint_error_status(&e), e.to_string()))
        }
    }
}

/// Query parameters for `GET /artworks/mints`.
#[derive(Debug, Deserialize)]
pub struct ListMintsQuery {
    /// When set, only mints to this wallet address are returned.
    pub minted_by: Option<Address>,
}

/// `GET /artworks/mints`
///
/// Lists the mints confirmed by this process, oldest first, optionally
/// filtered to one wallet address via `?minted_by=0x…`.
pub async fn list_mints(
    State(state): State<SharedState>,
    Query(query): Query<ListMintsQuery>,
) -> Json<Vec<MintRecord>> {
    let history = state
        .history
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let records = match query.minted_by {
        Some(address) => history.for_address(address).into_iter().cloned().collect(),
        None => history.all().to_vec(),
    };
    Json(records)
}

/// Maps workflow failures onto HTTP status codes.
fn mint_error_status(e: &MintError) -> StatusCode {
    match e {
        MintError::Validation(_) => StatusCode::BAD_REQUEST,
        MintError::AttemptInProgress | MintError::UserRejected => StatusCode::CONFLICT,
        MintError::WalletUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        MintError::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
        MintError::ContractRevert(_) | MintError::Network(_) => StatusCode::BAD_GATEWAY,
        MintError::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

/// Returns the current wall-clock time as seconds since Unix epoch.
fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
