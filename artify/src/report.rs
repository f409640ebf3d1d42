//! Presentation helpers for authenticity reports.
//!
//! Pure functions that turn an [`UploadResult`] into user-facing values:
//! the qualitative confidence bucket, the 0–100 score derived from a raw
//! model confidence, and the gateway link for viewing the pinned artwork.

use std::fmt;

use crate::types::UploadResult;

/// Qualitative bucket for a 0–100 authenticity score.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfidenceLevel {
    Exceptional,
    High,
    Moderate,
    Low,
}

impl ConfidenceLevel {
    /// Buckets a score: `>= 90` exceptional, `>= 75` high, `>= 50` moderate,
    /// anything below is low.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            ConfidenceLevel::Exceptional
        } else if score >= 75.0 {
            ConfidenceLevel::High
        } else if score >= 50.0 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::Exceptional => "Exceptional",
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Moderate => "Moderate",
            ConfidenceLevel::Low => "Low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scales a raw model confidence in `[0, 1]` to the displayed 0–100 score.
pub fn score_from_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round()
}

/// Builds the gateway URL for viewing a pinned artwork.
pub fn gateway_url(base: &str, cid: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), cid)
}

/// Renders a one-line summary of the report for logs and CLI output.
pub fn render_summary(upload: &UploadResult) -> String {
    let level = ConfidenceLevel::from_score(upload.score);
    match &upload.prediction {
        Some(prediction) => format!(
            "{}: {} ({:.0}/100, {} confidence)",
            upload.cid,
            prediction.label(),
            upload.score,
            level
        ),
        None => format!("{}: {:.0}/100, {} confidence", upload.cid, upload.score, level),
    }
}
