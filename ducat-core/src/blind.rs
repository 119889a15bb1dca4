//! This module defines the `BlindedMessage` and `BlindedSignature` structs, which are the two
//! halves of the blind issuance protocol.
//!
//! The `BlindedMessage` struct represents a blinded output produced by the wallet, with an
//! `amount` field for the denomination and a `b_` field for the blinded point `B_`.
//!
//! The `BlindedSignature` struct represents the mint's reply, with an `amount` field, a `c_`
//! field for the blinded signature point `C_` and the `id` of the keyset that signed it.
//!
//! Both structs are serializable and deserializable using serde.
//!
//! The `TotalAmount` trait provides a `total_amount` method for summing a vector of either.

use rand::{CryptoRng, Rng};
use secp256k1::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};

use crate::error::DucatCoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedMessage {
    pub amount: u64,

    /// Blinded point `B_ = hash_to_curve(secret) + r*G`
    #[serde(rename = "B_")]
    pub b_: PublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedSignature {
    pub amount: u64,

    /// Blinded signature `C_ = k*B_` on the output of [BlindedMessage]
    #[serde(rename = "C_")]
    pub c_: PublicKey,

    /// ID of the mint keys that signed the output
    pub id: String,
}

/// The secret scalar `r` a wallet adds to an output before it goes to the
/// mint, and subtracts again from the returned signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlindingFactor(SecretKey);

impl From<SecretKey> for BlindingFactor {
    fn from(sk: SecretKey) -> Self {
        BlindingFactor(sk)
    }
}

impl TryFrom<&str> for BlindingFactor {
    type Error = DucatCoreError;

    fn try_from(hex: &str) -> Result<Self, Self::Error> {
        use std::str::FromStr;
        Ok(secp256k1::SecretKey::from_str(hex)?.into())
    }
}

impl BlindingFactor {
    /// Samples a uniformly random non-zero scalar. Factors must never be
    /// reused across outputs.
    pub fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        BlindingFactor(SecretKey::new(rng))
    }

    pub fn as_hex(&self) -> String {
        hex::encode(&self.0[..])
    }

    pub fn to_secret_key(&self) -> SecretKey {
        self.0
    }
}

pub trait TotalAmount {
    fn total_amount(&self) -> u64;
}

impl TotalAmount for Vec<BlindedSignature> {
    fn total_amount(&self) -> u64 {
        self.iter().fold(0, |acc, x| acc + x.amount)
    }
}

impl TotalAmount for Vec<BlindedMessage> {
    fn total_amount(&self) -> u64 {
        self.iter().fold(0, |acc, x| acc + x.amount)
    }
}
