use std::collections::HashMap;

use base64::engine::general_purpose;
use base64::Engine;
use bitcoin_hashes::{sha256, Hash};
use itertools::Itertools;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

/// Denominations run from 2^0 up to 2^31.
pub const MAX_ORDER: u64 = 32;

/// Derives the short identifier a mint tags its keys with: the first 12
/// base64 chars of the hash over all pubkeys, concatenated in amount order.
pub fn derive_keyset_id(keys: &HashMap<u64, PublicKey>) -> String {
    let pubkeys = keys
        .iter()
        .sorted_by(|(amount_a, _), (amount_b, _)| amount_a.cmp(amount_b))
        .map(|(_, pubkey)| pubkey.to_string())
        .join("");
    let hashed_pubkeys = sha256::Hash::hash(pubkeys.as_bytes()).to_byte_array();
    general_purpose::STANDARD.encode(hashed_pubkeys)[..12].to_string()
}

/// A full signing keyset, one keypair per denomination.
///
/// This is the mint's side of the protocol. The wallet only ever sees
/// `public_keys`, but tests use the private half to stand up a signing mint.
#[derive(Debug, Clone)]
pub struct MintKeyset {
    pub private_keys: HashMap<u64, SecretKey>,
    pub public_keys: HashMap<u64, PublicKey>,
    pub keyset_id: String,
}

impl MintKeyset {
    pub fn new(seed: &str, derivation_path: &str) -> Self {
        let priv_keys = derive_keys(seed, derivation_path);
        let pub_keys = derive_pubkeys(&priv_keys);
        Self {
            keyset_id: derive_keyset_id(&pub_keys),
            private_keys: priv_keys,
            public_keys: pub_keys,
        }
    }
}

fn derive_keys(master_key: &str, derivation_path: &str) -> HashMap<u64, SecretKey> {
    (0..MAX_ORDER)
        .map(|i| {
            let hash =
                sha256::Hash::hash(format!("{master_key}{derivation_path}{i}").as_bytes());
            let key = SecretKey::from_slice(&hash.to_byte_array())
                .expect("derived hash is not a valid secret key");
            (2u64.pow(i as u32), key)
        })
        .collect()
}

fn derive_pubkeys(keys: &HashMap<u64, SecretKey>) -> HashMap<u64, PublicKey> {
    let secp = Secp256k1::new();
    keys.iter()
        .map(|(amount, secret_key)| (*amount, secret_key.public_key(&secp)))
        .collect()
}
