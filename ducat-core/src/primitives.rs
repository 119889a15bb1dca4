//! This module contains all the request and response objects that are used for interacting
//! between the mint and the wallet. All of these structs are serializable and deserializable
//! using serde.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::blind::{BlindedMessage, BlindedSignature};
use crate::proof::{Proof, Proofs};

/// Reply to requesting a new mint: a bolt11 invoice to pay and the hash
/// that ties the later mint call to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub pr: String,
    pub hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMintRequest {
    pub outputs: Vec<BlindedMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMintResponse {
    pub promises: Vec<BlindedSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSplitRequest {
    pub proofs: Proofs,
    /// Value of the second output bundle. The first bundle carries the rest.
    pub amount: u64,
    pub outputs: Vec<BlindedMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSplitResponse {
    pub fst: Vec<BlindedSignature>,
    pub snd: Vec<BlindedSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMeltRequest {
    pub pr: String,
    pub proofs: Proofs,
    /// Zero-amount outputs the mint may use to return overpaid fees.
    pub outputs: Vec<BlindedMessage>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMeltResponse {
    #[serde(default)]
    pub paid: bool,
    pub preimage: Option<String>,
    pub change: Option<Vec<BlindedSignature>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFeesRequest {
    pub pr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFeesResponse {
    /// Worst-case Lightning fee in satoshis
    pub fee: u64,
}

/// A proof stripped down to its secret. Spend checks must not leak the
/// signature or the amount to the mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSecret {
    pub secret: String,
}

impl From<&Proof> for ProofSecret {
    fn from(proof: &Proof) -> Self {
        Self {
            secret: proof.secret.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSpendableRequest {
    pub proofs: Vec<ProofSecret>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSpendableResponse {
    pub spendable: Vec<bool>,
}

/// Application-level error body returned by the mint.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashuErrorResponse {
    pub code: Option<u64>,
    pub error: Option<String>,
    pub detail: Option<String>,
}

impl CashuErrorResponse {
    pub fn message(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown mint error".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{CashuErrorResponse, CheckSpendableRequest, ProofSecret};

    #[test]
    fn test_check_request_carries_secrets_only() -> anyhow::Result<()> {
        let request = CheckSpendableRequest {
            proofs: vec![
                ProofSecret {
                    secret: "first".to_owned(),
                },
                ProofSecret {
                    secret: "second".to_owned(),
                },
            ],
        };
        let value = serde_json::to_value(&request)?;
        assert_eq!(
            value,
            json!({"proofs": [{"secret": "first"}, {"secret": "second"}]})
        );
        for entry in value["proofs"].as_array().expect("proofs is an array") {
            let keys: Vec<&String> =
                entry.as_object().expect("proof is an object").keys().collect();
            assert_eq!(keys, vec!["secret"]);
        }
        Ok(())
    }

    #[test]
    fn test_error_response_prefers_detail() -> anyhow::Result<()> {
        let err: CashuErrorResponse = serde_json::from_value(json!({
            "code": 11,
            "error": "split failed",
            "detail": "proofs already spent"
        }))?;
        assert_eq!(err.message(), "proofs already spent");

        let err: CashuErrorResponse =
            serde_json::from_value(json!({"error": "invoice not paid"}))?;
        assert_eq!(err.message(), "invoice not paid");
        Ok(())
    }

    #[test]
    fn test_melt_response_defaults_to_unpaid() -> anyhow::Result<()> {
        let response: super::PostMeltResponse = serde_json::from_value(json!({}))?;
        assert!(!response.paid);
        assert!(response.preimage.is_none());
        assert!(response.change.is_none());
        Ok(())
    }
}
