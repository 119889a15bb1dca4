use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use crate::error::DucatCoreError;

/// A bearer token. Whoever holds a valid proof can spend it, and the mint
/// accepts `(secret, c)` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub amount: u64,
    pub secret: String,

    /// Unblinded signature `C = k*hash_to_curve(secret)`
    #[serde(rename = "C")]
    pub c: PublicKey,

    /// ID of the keyset that signed the proof
    pub id: String,
}

impl Proof {
    pub fn new(amount: u64, secret: String, c: PublicKey, id: String) -> Self {
        Self {
            amount,
            secret,
            c,
            id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proofs(Vec<Proof>);

impl Proofs {
    pub fn new(proofs: Vec<Proof>) -> Self {
        Self(proofs)
    }

    pub fn empty() -> Self {
        Self(vec![])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Proof> {
        self.0.iter()
    }

    pub fn total_amount(&self) -> u64 {
        self.0.iter().map(|proof| proof.amount).sum()
    }

    pub fn secrets(&self) -> Vec<String> {
        self.0.iter().map(|proof| proof.secret.clone()).collect()
    }

    pub fn extend(&mut self, other: Proofs) {
        self.0.extend(other.0);
    }

    /// Picks proofs covering `amount`, walking the list from the end so a
    /// freshly appended exact denomination is preferred over accumulating
    /// smaller ones. Both returned halves keep their original order.
    pub fn select_for_amount(&self, amount: u64) -> Result<(Proofs, Proofs), DucatCoreError> {
        let mut selected = vec![false; self.0.len()];
        let mut sum = 0;
        for (i, proof) in self.0.iter().enumerate().rev() {
            if sum >= amount {
                break;
            }
            sum += proof.amount;
            selected[i] = true;
        }
        if sum < amount {
            return Err(DucatCoreError::NotEnoughTokens);
        }

        let (picked, rest): (Vec<_>, Vec<_>) = self
            .0
            .iter()
            .cloned()
            .zip(selected)
            .partition(|(_, is_selected)| *is_selected);
        Ok((
            picked.into_iter().map(|(proof, _)| proof).collect::<Vec<_>>().into(),
            rest.into_iter().map(|(proof, _)| proof).collect::<Vec<_>>().into(),
        ))
    }
}

impl From<Vec<Proof>> for Proofs {
    fn from(proofs: Vec<Proof>) -> Self {
        Self(proofs)
    }
}

impl From<Proof> for Proofs {
    fn from(proof: Proof) -> Self {
        Self(vec![proof])
    }
}

impl IntoIterator for Proofs {
    type Item = Proof;
    type IntoIter = std::vec::IntoIter<Proof>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
