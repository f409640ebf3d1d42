//! Mint-call construction for the deployed NFT contract.
//!
//! The contract itself is an external collaborator; this module only knows
//! how to build a correctly encoded call against whichever of the two
//! observed entry points is deployed:
//!
//! - `mint(string cid)`, or
//! - `mintWithReport(address to, string cid, uint8 score, bytes signature)`.
//!
//! Which one is active is a configuration constant ([`MintAbi`]), not a
//! design choice of the workflow. Receipt inspection for the ERC-721
//! `Transfer` event also lives here.

use ethers_core::abi::{encode as abi_encode, Token};
use ethers_core::types::{
    Address, Bytes, NameOrAddress, TransactionReceipt, TransactionRequest, H256, U256,
};
use ethers_core::utils;

use crate::error::MintError;
use crate::types::UploadResult;

/// The mint entry point exposed by the deployed contract.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MintAbi {
    /// `mint(string cid)`
    Mint,
    /// `mintWithReport(address to, string cid, uint8 score, bytes signature)`
    MintWithReport,
}

impl MintAbi {
    /// Canonical Solidity signature of the entry point.
    pub fn signature(&self) -> &'static str {
        match self {
            MintAbi::Mint => "mint(string)",
            MintAbi::MintWithReport => "mintWithReport(address,string,uint8,bytes)",
        }
    }
}

/// Fully resolved parameters of one mint call.
///
/// Derived deterministically from an [`UploadResult`] and the connected
/// wallet address at mint time; constructed fresh per attempt and never
/// persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct MintRequest {
    /// Recipient of the minted token (the connected wallet address).
    pub recipient: Address,
    /// Content identifier baked into the token.
    pub cid: String,
    /// Authenticity score clamped into the contract's single-byte range.
    pub score: u8,
    /// Report signature; empty bytes encode as `0x` when absent.
    pub signature: Bytes,
}

impl MintRequest {
    /// Builds a mint request from an upload result and the recipient address.
    ///
    /// The score is rounded and clamped into `[0, 255]`; a missing signature
    /// defaults to empty bytes. Invalid signature hex is a validation error
    /// so it surfaces before any wallet interaction.
    pub fn from_upload(upload: &UploadResult, recipient: Address) -> Result<Self, MintError> {
        let signature = parse_signature_hex(upload.signature.as_deref())?;
        Ok(Self {
            recipient,
            cid: upload.cid.as_str().to_string(),
            score: clamp_score(upload.score),
            signature,
        })
    }

    /// Encodes this request as calldata for the given entry point.
    pub fn encode_call(&self, abi: MintAbi) -> Bytes {
        let selector = utils::id(abi.signature());
        let encoded_args = match abi {
            MintAbi::Mint => abi_encode(&[Token::String(self.cid.clone())]),
            MintAbi::MintWithReport => abi_encode(&[
                Token::Address(self.recipient),
                Token::String(self.cid.clone()),
                Token::Uint(U256::from(self.score)),
                Token::Bytes(self.signature.to_vec()),
            ]),
        };

        let mut calldata = Vec::with_capacity(4 + encoded_args.len());
        calldata.extend_from_slice(&selector);
        calldata.extend_from_slice(&encoded_args);
        Bytes::from(calldata)
    }

    /// Assembles the zero-value transaction submitting this request.
    pub fn to_transaction(&self, contract: Address, abi: MintAbi) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.recipient),
            to: Some(NameOrAddress::Address(contract)),
            value: Some(U256::zero()),
            data: Some(self.encode_call(abi)),
            ..Default::default()
        }
    }
}

/// Rounds and clamps a raw score into the contract's `uint8` range.
///
/// Non-finite inputs collapse to 0 rather than poisoning the cast.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_finite() {
        raw.round().clamp(0.0, 255.0) as u8
    } else {
        0
    }
}

/// Parses an optional `0x…` signature string into raw bytes.
///
/// `None`, `""` and `"0x"` all mean "no signature". Odd-length hex is
/// accepted by left-padding a zero nibble, matching the lenient handling of
/// backend-produced signatures.
fn parse_signature_hex(signature: Option<&str>) -> Result<Bytes, MintError> {
    let raw = match signature {
        None => return Ok(Bytes::default()),
        Some(s) => s.trim(),
    };

    let stripped = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if stripped.is_empty() {
        return Ok(Bytes::default());
    }

    let padded;
    let hex_str = if stripped.len() % 2 == 1 {
        padded = format!("0{stripped}");
        &padded
    } else {
        stripped
    };

    let bytes = hex::decode(hex_str).map_err(|_| MintError::Validation("signature"))?;
    Ok(Bytes::from(bytes))
}

/// Topic hash of the ERC-721 `Transfer(address,address,uint256)` event.
pub fn transfer_topic() -> H256 {
    H256::from(utils::keccak256("Transfer(address,address,uint256)".as_bytes()))
}

/// Best-effort extraction of the minted token id from a receipt.
///
/// Scans for a `Transfer` event with `from == 0x0` (the ERC-721 mint
/// convention) and reads the token id from the fourth topic. A receipt
/// without such an event yields `None`; it can never fail the mint.
pub fn parse_token_id(receipt: &TransactionReceipt) -> Option<U256> {
    let topic = transfer_topic();

    for log in &receipt.logs {
        if log.topics.first() != Some(&topic) {
            continue;
        }
        if log.topics.len() != 4 {
            // ERC-20 Transfer shares the topic hash but carries the amount
            // in the data field instead of a third indexed argument.
            tracing::debug!(
                topics = log.topics.len(),
                "skipping Transfer log without an indexed token id"
            );
            continue;
        }
        if log.topics[1] != H256::zero() {
            continue;
        }
        return Some(U256::from_big_endian(log.topics[3].as_bytes()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi::{decode as abi_decode, ParamType};
    use ethers_core::types::Log;

    use crate::types::{Cid, UploadResult};

    fn upload(cid: &str, score: f64, signature: Option<&str>) -> UploadResult {
        UploadResult {
            cid: Cid::from(cid),
            score,
            prediction: None,
            signature: signature.map(|s| s.to_string()),
            similar_works: Vec::new(),
        }
    }

    fn recipient() -> Address {
        "0xDEAD00000000000000000000000000000000BEEF"
            .parse()
            .expect("fixed test address should parse")
    }

    #[test]
    fn score_is_rounded_and_clamped_to_a_byte() {
        let cases = [
            (-10.0, 0u8),
            (-0.4, 0),
            (0.0, 0),
            (94.5, 95),
            (95.0, 95),
            (254.4, 254),
            (255.0, 255),
            (255.6, 255),
            (300.0, 255),
            (1e9, 255),
        ];
        for (raw, expected) in cases {
            assert_eq!(clamp_score(raw), expected, "raw score {raw}");
        }
        assert_eq!(clamp_score(f64::NAN), 0);
        assert_eq!(clamp_score(f64::INFINITY), 0);
    }

    #[test]
    fn request_matches_upload_and_recipient() {
        let request = MintRequest::from_upload(&upload("Qm123", 95.0, Some("0xabc")), recipient())
            .expect("request should build");

        assert_eq!(request.recipient, recipient());
        assert_eq!(request.cid, "Qm123");
        assert_eq!(request.score, 95);
        // Odd-length hex is left-padded with a zero nibble.
        assert_eq!(request.signature.to_vec(), vec![0x0a, 0xbc]);
    }

    #[test]
    fn missing_signature_defaults_to_empty_bytes() {
        let request = MintRequest::from_upload(&upload("Qm123", 50.0, None), recipient())
            .expect("request should build");
        assert!(request.signature.is_empty());

        let request = MintRequest::from_upload(&upload("Qm123", 50.0, Some("0x")), recipient())
            .expect("request should build");
        assert!(request.signature.is_empty());
    }

    #[test]
    fn invalid_signature_hex_is_a_validation_error() {
        let err = MintRequest::from_upload(&upload("Qm123", 50.0, Some("0xzz")), recipient())
            .unwrap_err();
        assert!(matches!(err, MintError::Validation("signature")));
    }

    #[test]
    fn encoded_call_starts_with_the_selector() {
        let request = MintRequest::from_upload(&upload("Qm123", 95.0, Some("0xabcd")), recipient())
            .expect("request should build");

        for abi in [MintAbi::Mint, MintAbi::MintWithReport] {
            let calldata = request.encode_call(abi);
            assert_eq!(&calldata[..4], &utils::id(abi.signature())[..]);
            // Word-aligned ABI payload after the selector.
            assert_eq!((calldata.len() - 4) % 32, 0);
        }

        assert_ne!(
            &request.encode_call(MintAbi::Mint)[..4],
            &request.encode_call(MintAbi::MintWithReport)[..4],
        );
    }

    #[test]
    fn mint_with_report_calldata_decodes_back() {
        let request = MintRequest::from_upload(&upload("Qm123", 95.0, Some("0xabcd")), recipient())
            .expect("request should build");
        let calldata = request.encode_call(MintAbi::MintWithReport);

        let tokens = abi_decode(
            &[
                ParamType::Address,
                ParamType::String,
                ParamType::Uint(8),
                ParamType::Bytes,
            ],
            &calldata[4..],
        )
        .expect("calldata args should decode");

        assert_eq!(tokens[0], Token::Address(recipient()));
        assert_eq!(tokens[1], Token::String("Qm123".to_string()));
        assert_eq!(tokens[2], Token::Uint(U256::from(95u8)));
        assert_eq!(tokens[3], Token::Bytes(vec![0xab, 0xcd]));
    }

    #[test]
    fn transaction_targets_the_contract_with_zero_value() {
        let contract: Address = "0x1111111111111111111111111111111111111111"
            .parse()
            .expect("fixed test address should parse");
        let request = MintRequest::from_upload(&upload("Qm123", 95.0, None), recipient())
            .expect("request should build");

        let tx = request.to_transaction(contract, MintAbi::MintWithReport);
        assert_eq!(tx.from, Some(recipient()));
        assert_eq!(tx.to, Some(NameOrAddress::Address(contract)));
        assert_eq!(tx.value, Some(U256::zero()));
        assert!(tx.data.is_some());
    }

    fn transfer_log(from: H256, token_id: u64) -> Log {
        let mut id_bytes = [0u8; 32];
        U256::from(token_id).to_big_endian(&mut id_bytes);
        Log {
            topics: vec![
                transfer_topic(),
                from,
                H256::from_low_u64_be(0xBEEF),
                H256::from(id_bytes),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn token_id_is_read_from_a_mint_transfer() {
        let receipt = TransactionReceipt {
            logs: vec![transfer_log(H256::zero(), 42)],
            ..Default::default()
        };
        assert_eq!(parse_token_id(&receipt), Some(U256::from(42u64)));
    }

    #[test]
    fn receipt_without_transfer_yields_no_token_id() {
        let receipt = TransactionReceipt::default();
        assert_eq!(parse_token_id(&receipt), None);
    }

    #[test]
    fn non_mint_transfers_are_ignored() {
        // from != 0x0 means this was a regular transfer, not a mint.
        let receipt = TransactionReceipt {
            logs: vec![transfer_log(H256::from_low_u64_be(7), 42)],
            ..Default::default()
        };
        assert_eq!(parse_token_id(&receipt), None);
    }

    #[test]
    fn erc20_style_transfers_are_ignored() {
        let receipt = TransactionReceipt {
            logs: vec![Log {
                topics: vec![transfer_topic(), H256::zero(), H256::from_low_u64_be(1)],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(parse_token_id(&receipt), None);
    }
}
