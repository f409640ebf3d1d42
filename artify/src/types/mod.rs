//! Core domain types for the mint workflow.
//!
//! This module defines the strongly-typed values that flow between the
//! inference client, the wallet connector and the mint workflow. The goal is
//! to avoid "naked" strings and numbers in public APIs and instead use
//! domain-specific newtypes.
//!
//! Ethereum-flavoured scalars (`Address`, `H256`, `U256`, `Bytes`) are taken
//! from `ethers-core` rather than re-invented here.

use std::fmt;

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};

/// Mint progress states and the final mint outcome.
pub mod progress;

pub use progress::{MintOutcome, MintProgress};

/// Content identifier of an uploaded artwork in content-addressed storage.
///
/// The backend produces the CID when it pins the image (e.g. to IPFS); the
/// mint workflow treats it as an opaque string. An empty CID is never valid
/// input to a mint.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(pub String);

impl Cid {
    /// Returns the CID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the CID is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cid {
    fn from(s: &str) -> Self {
        Cid(s.to_string())
    }
}

/// Verdict of the authenticity model for an uploaded artwork.
///
/// The backend reports this as free text; anything outside the three known
/// labels is preserved verbatim in [`Prediction::Other`] instead of being
/// dropped.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Prediction {
    Authentic,
    Fake,
    Inconclusive,
    Other(String),
}

impl Prediction {
    /// Parses a backend label, case-insensitively.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "authentic" => Prediction::Authentic,
            "fake" => Prediction::Fake,
            "inconclusive" => Prediction::Inconclusive,
            _ => Prediction::Other(label.trim().to_string()),
        }
    }

    /// Returns the canonical lowercase label.
    pub fn label(&self) -> &str {
        match self {
            Prediction::Authentic => "authentic",
            Prediction::Fake => "fake",
            Prediction::Inconclusive => "inconclusive",
            Prediction::Other(s) => s,
        }
    }
}

impl From<String> for Prediction {
    fn from(s: String) -> Self {
        Prediction::from_label(&s)
    }
}

impl From<Prediction> for String {
    fn from(p: Prediction) -> Self {
        p.label().to_string()
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One visually similar work reported alongside the authenticity verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarWork {
    /// Path or CID of the similar work, as reported by the backend.
    pub path: String,
    /// Cosine similarity in `[0, 1]`.
    pub similarity: f64,
}

/// Canonical result of one upload/inference round trip.
///
/// This is the reconciled form of the two backend response shapes that have
/// been observed in the wild (`score` on a 0–100 scale vs. `confidence` in
/// `[0, 1]`); see [`crate::inference`] for the normalisation rules. The value
/// is immutable once produced and is superseded wholesale by a new upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Content identifier of the pinned artwork.
    pub cid: Cid,
    /// Authenticity score on a 0–100 scale.
    pub score: f64,
    /// Model verdict, when the backend reports one.
    pub prediction: Option<Prediction>,
    /// Hex-encoded (`0x…`) report signature from the backend's trusted signer.
    pub signature: Option<String>,
    /// Similar works found by the embedding index.
    #[serde(default)]
    pub similar_works: Vec<SimilarWork>,
}

/// Live wallet session as seen by the connector.
///
/// Created on a successful connect, updated in place when the provider
/// reports an account change, destroyed when the provider reports an empty
/// account list or on explicit disconnect. Readers must treat this value as
/// externally owned and re-subscribe to change notifications rather than
/// caching addresses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WalletSession {
    /// Active account address authorised by the user.
    pub address: Address,
    /// Whether a wallet provider is present at all.
    pub is_installed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_parses_known_labels_case_insensitively() {
        assert_eq!(Prediction::from_label("Authentic"), Prediction::Authentic);
        assert_eq!(Prediction::from_label("FAKE"), Prediction::Fake);
        assert_eq!(
            Prediction::from_label(" inconclusive "),
            Prediction::Inconclusive
        );
    }

    #[test]
    fn prediction_preserves_unknown_labels() {
        let p = Prediction::from_label("probably-genuine");
        assert_eq!(p, Prediction::Other("probably-genuine".to_string()));
        assert_eq!(p.label(), "probably-genuine");
    }

    #[test]
    fn prediction_serde_round_trips_as_label() {
        let json = serde_json::to_string(&Prediction::Authentic).expect("serialize");
        assert_eq!(json, "\"authentic\"");

        let back: Prediction = serde_json::from_str("\"fake\"").expect("deserialize");
        assert_eq!(back, Prediction::Fake);
    }

    #[test]
    fn cid_emptiness_and_display() {
        let empty = Cid(String::new());
        assert!(empty.is_empty());

        let cid = Cid::from("QmTestCid123");
        assert!(!cid.is_empty());
        assert_eq!(cid.to_string(), "QmTestCid123");
    }

    #[test]
    fn upload_result_deserializes_with_missing_similar_works() {
        let json = r#"{"cid":"Qm123","score":95.0,"prediction":"authentic","signature":null}"#;
        let result: UploadResult = serde_json::from_str(json).expect("UploadResult should parse");
        assert_eq!(result.cid.as_str(), "Qm123");
        assert!(result.similar_works.is_empty());
    }
}
