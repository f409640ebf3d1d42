//! HTTP upload/inference client.
//!
//! This implementation of [`crate::inference::InferenceApi`] posts the image
//! as a single multipart request (field name `file`) to `{base}/upload` and
//! parses the JSON response. Two response shapes have been observed from the
//! backend across revisions:
//!
//! ```json
//! {"cid": "Qm...", "report": {"score": 87, "signature": "0x...",
//!  "similar": [{"cid": "Qm...", "similarity": 0.91}]}}
//! ```
//!
//! and the flat form:
//!
//! ```json
//! {"cid": "Qm...", "prediction": "authentic", "confidence": 0.95}
//! ```
//!
//! Both are reconciled here into one canonical [`UploadResult`]: an explicit
//! `score` (0–100) wins, otherwise `confidence` in `[0, 1]` is scaled with
//! `round(confidence * 100)`. A response missing `cid`, or missing both
//! fields, is malformed.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::UploadError;
use crate::types::{Cid, Prediction, SimilarWork, UploadResult};

use super::InferenceApi;

/// Blocking HTTP client for the inference backend.
///
/// Thread-safe (`Send + Sync`) and cheap to clone; async layers should wrap
/// calls in `spawn_blocking`.
#[derive(Clone)]
pub struct HttpInferenceClient {
    base_url: String,
    client: Client,
}

impl HttpInferenceClient {
    /// Constructs a new client pointing at `base_url`.
    ///
    /// `base_url` should be the root of the backend, e.g.
    /// `"http://127.0.0.1:8000"` (without a trailing slash).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        // Avoid accidental double slashes.
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl InferenceApi for HttpInferenceClient {
    fn analyze(&self, image: &[u8], file_name: &str) -> Result<UploadResult, UploadError> {
        let url = self.endpoint("/upload");

        let part = Part::bytes(image.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| UploadError::Network(format!("HTTP POST {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Server(status.as_u16()));
        }

        let body: RawResponse = response
            .json()
            .map_err(|e| UploadError::Malformed(format!("failed to parse JSON response: {e}")))?;

        normalize_response(body)
    }
}

/// Superset of both observed response shapes.
#[derive(Debug, Deserialize)]
struct RawResponse {
    cid: Option<String>,
    report: Option<RawReport>,
    prediction: Option<String>,
    confidence: Option<f64>,
    score: Option<f64>,
    signature: Option<String>,
    similar_works: Option<Vec<RawSimilar>>,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    score: Option<f64>,
    confidence: Option<f64>,
    prediction: Option<String>,
    signature: Option<String>,
    similar: Option<Vec<RawSimilar>>,
}

#[derive(Debug, Deserialize)]
struct RawSimilar {
    path: Option<String>,
    cid: Option<String>,
    similarity: f64,
}

impl From<RawSimilar> for SimilarWork {
    fn from(raw: RawSimilar) -> Self {
        SimilarWork {
            path: raw.path.or(raw.cid).unwrap_or_default(),
            similarity: raw.similarity,
        }
    }
}

/// Reconciles a raw response into the canonical [`UploadResult`].
fn normalize_response(raw: RawResponse) -> Result<UploadResult, UploadError> {
    let cid = raw
        .cid
        .filter(|c| !c.is_empty())
        .ok_or_else(|| UploadError::Malformed("response is missing the cid".to_string()))?;

    let report = raw.report;

    let score = report.as_ref().and_then(|r| r.score).or(raw.score);
    let confidence = report.as_ref().and_then(|r| r.confidence).or(raw.confidence);
    let score = match (score, confidence) {
        (Some(score), _) => score,
        (None, Some(confidence)) => (confidence * 100.0).round(),
        (None, None) => {
            return Err(UploadError::Malformed(
                "response carries neither score nor confidence".to_string(),
            ));
        }
    };

    let prediction = report
        .as_ref()
        .and_then(|r| r.prediction.clone())
        .or(raw.prediction)
        .map(|label| Prediction::from_label(&label));

    let signature = report
        .as_ref()
        .and_then(|r| r.signature.clone())
        .or(raw.signature);

    let similar_works = report
        .and_then(|r| r.similar)
        .or(raw.similar_works)
        .unwrap_or_default()
        .into_iter()
        .map(SimilarWork::from)
        .collect();

    Ok(UploadResult {
        cid: Cid(cid),
        score,
        prediction,
        signature,
        similar_works,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<UploadResult, UploadError> {
        let raw: RawResponse = serde_json::from_str(json).expect("raw response should parse");
        normalize_response(raw)
    }

    #[test]
    fn endpoint_joining_avoids_double_slashes() {
        let client = HttpInferenceClient::new("http://127.0.0.1:8000/", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(
            client.endpoint("/upload"),
            "http://127.0.0.1:8000/upload"
        );
    }

    #[test]
    fn server_error_status_is_reported_as_upload_error_server() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend addr");

        // One-shot stub backend: drain the multipart request, answer 500.
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept upload");

            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let mut header_end = None;
            while header_end.is_none() {
                let n = stream.read(&mut chunk).expect("read request head");
                buf.extend_from_slice(&chunk[..n]);
                header_end = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4);
            }
            let header_end = header_end.expect("request head is complete");

            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length: usize = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0);

            let mut body_read = buf.len() - header_end;
            while body_read < content_length {
                let n = stream.read(&mut chunk).expect("read request body");
                if n == 0 {
                    break;
                }
                body_read += n;
            }

            stream
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\n\
                      content-length: 0\r\nconnection: close\r\n\r\n",
                )
                .expect("write response");
        });

        let client = HttpInferenceClient::new(format!("http://{addr}"), Duration::from_secs(5))
            .expect("client should build");
        let err = client.analyze(b"not-a-real-image", "artwork.png").unwrap_err();

        assert!(matches!(err, UploadError::Server(500)), "unexpected error: {err:?}");
        server.join().expect("stub backend thread");
    }

    #[test]
    fn nested_report_shape_is_normalized() {
        let result = parse(
            r#"{
              "cid": "QmNested",
              "report": {
                "score": 87,
                "signature": "0xabcd",
                "similar": [{"cid": "QmOther", "similarity": 0.91}]
              }
            }"#,
        )
        .expect("nested shape should normalize");

        assert_eq!(result.cid.as_str(), "QmNested");
        assert_eq!(result.score, 87.0);
        assert_eq!(result.signature.as_deref(), Some("0xabcd"));
        assert_eq!(result.similar_works.len(), 1);
        assert_eq!(result.similar_works[0].path, "QmOther");
    }

    #[test]
    fn flat_confidence_shape_is_scaled_to_a_score() {
        let result = parse(
            r#"{"cid": "QmFlat", "prediction": "authentic", "confidence": 0.95}"#,
        )
        .expect("flat shape should normalize");

        assert_eq!(result.cid.as_str(), "QmFlat");
        assert_eq!(result.score, 95.0);
        assert_eq!(result.prediction, Some(Prediction::Authentic));
    }

    #[test]
    fn explicit_score_wins_over_confidence() {
        let result = parse(r#"{"cid": "Qm", "score": 40, "confidence": 0.99}"#)
            .expect("shape should normalize");
        assert_eq!(result.score, 40.0);
    }

    #[test]
    fn confidence_rounding_matches_the_displayed_score() {
        for (confidence, expected) in [(0.0, 0.0), (0.5, 50.0), (0.955, 96.0), (1.0, 100.0)] {
            let json = format!(r#"{{"cid": "Qm", "confidence": {confidence}}}"#);
            let result = parse(&json).expect("shape should normalize");
            assert_eq!(result.score, expected, "confidence {confidence}");
        }
    }

    #[test]
    fn missing_cid_is_malformed() {
        let err = parse(r#"{"confidence": 0.9}"#).unwrap_err();
        assert!(matches!(err, UploadError::Malformed(_)));

        let err = parse(r#"{"cid": "", "confidence": 0.9}"#).unwrap_err();
        assert!(matches!(err, UploadError::Malformed(_)));
    }

    #[test]
    fn missing_score_and_confidence_is_malformed() {
        let err = parse(r#"{"cid": "Qm123"}"#).unwrap_err();
        match err {
            UploadError::Malformed(msg) => {
                assert!(msg.contains("score"), "unexpected message: {msg}");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
