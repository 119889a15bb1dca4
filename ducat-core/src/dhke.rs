//! Blind Diffie-Hellman key exchange over secp256k1.
//!
//! The wallet blinds a secret (`step1_alice`), the mint signs the blinded point
//! (`step2_bob`), and the wallet strips the blinding off the reply
//! (`step3_alice`), leaving a signature the mint can later `verify` without
//! ever having seen the secret.

use bitcoin_hashes::{sha256, Hash};
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};

use crate::blind::BlindingFactor;
use crate::error::DucatCoreError;

/// About half of all X coordinates lie on the curve, so this bound is
/// unreachable with an intact SHA-256.
const MAX_HASH_TO_CURVE_ROUNDS: usize = 128;

#[derive(Clone, Debug)]
pub struct Dhke {
    secp: Secp256k1<All>,
}

impl Default for Dhke {
    fn default() -> Self {
        Self::new()
    }
}

impl Dhke {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Deterministically maps a message to a curve point with unknown
    /// discrete log.
    ///
    /// Interprets `sha256(message)` as the X coordinate of an even-Y
    /// compressed point and re-hashes until the candidate lies on the curve.
    pub fn hash_to_curve(message: &[u8]) -> Result<PublicKey, DucatCoreError> {
        let mut msg_to_hash = message.to_vec();
        for _ in 0..MAX_HASH_TO_CURVE_ROUNDS {
            let hash = sha256::Hash::hash(&msg_to_hash).to_byte_array();
            let mut candidate = [0u8; 33];
            candidate[0] = 0x02;
            candidate[1..].copy_from_slice(&hash);
            match PublicKey::from_slice(&candidate) {
                Ok(point) => return Ok(point),
                Err(_) => msg_to_hash = hash.to_vec(),
            }
        }
        Err(DucatCoreError::NoCurvePoint)
    }

    /// Computes `B_ = hash_to_curve(secret) + r*G`
    pub fn step1_alice(
        &self,
        secret_msg: impl AsRef<str>,
        blinding_factor: &BlindingFactor,
    ) -> Result<PublicKey, DucatCoreError> {
        let y = Self::hash_to_curve(secret_msg.as_ref().as_bytes())?;
        let b_ = y.combine(&blinding_factor.to_secret_key().public_key(&self.secp))?;
        Ok(b_)
    }

    /// Computes `C_ = k*B_`. This is the mint's half of the exchange; the
    /// wallet only needs it to stand in for a mint in tests.
    pub fn step2_bob(&self, b_: PublicKey, a: &SecretKey) -> Result<PublicKey, DucatCoreError> {
        Ok(b_.mul_tweak(&self.secp, &Scalar::from(*a))?)
    }

    /// Computes `C = C_ - r*K`, the unblinded signature over the secret.
    pub fn step3_alice(
        &self,
        c_: PublicKey,
        blinding_factor: BlindingFactor,
        mint_pubkey: PublicKey,
    ) -> Result<PublicKey, DucatCoreError> {
        let r_times_k = mint_pubkey
            .mul_tweak(&self.secp, &Scalar::from(blinding_factor.to_secret_key()))?;
        Ok(c_.combine(&r_times_k.negate(&self.secp))?)
    }

    /// Checks `C == k*hash_to_curve(secret)` with the mint's private key.
    pub fn verify(
        &self,
        a: SecretKey,
        c: PublicKey,
        secret_msg: impl AsRef<str>,
    ) -> Result<bool, DucatCoreError> {
        let y = Self::hash_to_curve(secret_msg.as_ref().as_bytes())?;
        Ok(y.mul_tweak(&self.secp, &Scalar::from(a))? == c)
    }
}
