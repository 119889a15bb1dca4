//! Text encoding for transporting proofs between wallets.
//!
//! A token is a group of proofs per mint, JSON-serialized, base64url-encoded
//! without padding and tagged with a `cashuA` version prefix. Decoding accepts
//! untagged input for backwards compatibility and normalizes the result:
//! empty entries are dropped, entries for the same mint are merged and
//! duplicate proofs are removed.

use std::collections::HashSet;

use base64::engine::general_purpose;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use url::Url;

use crate::error::DucatCoreError;
use crate::proof::Proofs;

const TOKEN_PREFIX_V3: &str = "cashuA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub mint: Url,
    pub proofs: Proofs,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenV3 {
    #[serde(rename = "token")]
    pub tokens: Vec<TokenEntry>,
    pub memo: Option<String>,
}

impl TokenV3 {
    pub fn new(tokens: Vec<TokenEntry>) -> Self {
        Self { tokens, memo: None }
    }

    pub fn empty() -> Self {
        Self {
            tokens: vec![],
            memo: None,
        }
    }

    pub fn total_amount(&self) -> u64 {
        self.tokens
            .iter()
            .map(|entry| entry.proofs.total_amount())
            .sum()
    }

    pub fn proofs(&self) -> Proofs {
        let mut proofs = Proofs::empty();
        for entry in &self.tokens {
            proofs.extend(entry.proofs.clone());
        }
        proofs
    }

    pub fn serialize(&self) -> Result<String, DucatCoreError> {
        let json = serde_json::to_string(self)?;
        Ok(format!(
            "{}{}",
            TOKEN_PREFIX_V3,
            general_purpose::URL_SAFE_NO_PAD.encode(json.as_bytes())
        ))
    }

    pub fn deserialize(data: impl AsRef<str>) -> Result<TokenV3, DucatCoreError> {
        let data = data.as_ref();
        let encoded = data.strip_prefix(TOKEN_PREFIX_V3).unwrap_or(data);
        let json = general_purpose::STANDARD.decode(base64url_to_base64(encoded))?;
        let token: TokenV3 = serde_json::from_str(&String::from_utf8(json)?)?;
        Ok(token.clean())
    }

    /// Drops empty entries, merges entries for the same mint (first-seen
    /// order wins) and removes duplicate proofs within each entry.
    pub fn clean(self) -> TokenV3 {
        let mut tokens: Vec<TokenEntry> = Vec::new();
        for entry in self.tokens {
            if entry.proofs.is_empty() {
                continue;
            }
            match tokens.iter_mut().find(|known| known.mint == entry.mint) {
                Some(known) => known.proofs.extend(entry.proofs),
                None => tokens.push(entry),
            }
        }
        for entry in &mut tokens {
            entry.proofs = dedupe_proofs(std::mem::take(&mut entry.proofs));
        }
        Self {
            tokens,
            memo: self.memo,
        }
    }
}

fn dedupe_proofs(proofs: Proofs) -> Proofs {
    let mut seen = HashSet::new();
    proofs
        .into_iter()
        .filter(|proof| seen.insert((proof.secret.clone(), proof.c)))
        .collect::<Vec<_>>()
        .into()
}

impl From<(Url, Proofs)> for TokenV3 {
    fn from((mint, proofs): (Url, Proofs)) -> Self {
        Self {
            tokens: vec![TokenEntry { mint, proofs }],
            memo: None,
        }
    }
}

impl TryFrom<&str> for TokenV3 {
    type Error = DucatCoreError;

    fn try_from(data: &str) -> Result<Self, Self::Error> {
        Self::deserialize(data)
    }
}

impl TryFrom<TokenV3> for String {
    type Error = DucatCoreError;

    fn try_from(token: TokenV3) -> Result<Self, Self::Error> {
        token.serialize()
    }
}

pub fn base64url_to_base64(data: &str) -> String {
    let mut converted = data.replace('-', "+").replace('_', "/");
    while converted.len() % 4 != 0 {
        converted.push('=');
    }
    converted
}

pub fn base64_to_base64url(data: &str) -> String {
    data.replace('+', "-")
        .replace('/', "_")
        .trim_end_matches('=')
        .to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use secp256k1::PublicKey;
    use url::Url;

    use super::{base64_to_base64url, base64url_to_base64, TokenEntry, TokenV3};
    use crate::proof::{Proof, Proofs};

    fn proof(amount: u64, secret: &str, c: &str) -> Proof {
        Proof::new(
            amount,
            secret.to_owned(),
            c.parse::<PublicKey>().expect("invalid test point"),
            "DSAl9nvvyfva".to_owned(),
        )
    }

    fn fixture_token() -> TokenV3 {
        let mint = Url::parse("https://mint.ducat.cash").expect("invalid url");
        let proofs = Proofs::new(vec![
            proof(
                2,
                "XbhZvfAO0E0SFYaJ36DC4Cy1eOa54-8k0wVHqKCApD4",
                "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
            ),
            proof(
                8,
                "J3tK3iqVPkAxMaivvzWRAYgBJLbbDHPXBWsHZzsbakk",
                "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
            ),
        ]);
        TokenV3::new(vec![TokenEntry { mint, proofs }])
    }

    const ENCODED_FIXTURE: &str = "cashuAeyJ0b2tlbiI6W3sibWludCI6Imh0dHBzOi8vbWludC5kdWNhdC5jYXNoLyIsInByb29mcyI6W3siYW1vdW50IjoyLCJzZWNyZXQiOiJYYmhadmZBTzBFMFNGWWFKMzZEQzRDeTFlT2E1NC04azB3VkhxS0NBcEQ0IiwiQyI6IjAyNzliZTY2N2VmOWRjYmJhYzU1YTA2Mjk1Y2U4NzBiMDcwMjliZmNkYjJkY2UyOGQ5NTlmMjgxNWIxNmY4MTc5OCIsImlkIjoiRFNBbDludnZ5ZnZhIn0seyJhbW91bnQiOjgsInNlY3JldCI6IkozdEszaXFWUGtBeE1haXZ2eldSQVlnQkpMYmJESFBYQldzSFp6c2Jha2siLCJDIjoiMDJjNjA0N2Y5NDQxZWQ3ZDZkMzA0NTQwNmU5NWMwN2NkODVjNzc4ZTRiOGNlZjNjYTdhYmFjMDliOTVjNzA5ZWU1IiwiaWQiOiJEU0FsOW52dnlmdmEifV19XX0";

    #[test]
    fn test_serialize_matches_wire_format() -> anyhow::Result<()> {
        let serialized = fixture_token().serialize()?;
        assert_eq!(serialized, ENCODED_FIXTURE);
        Ok(())
    }

    #[test]
    fn test_deserialize_known_token() -> anyhow::Result<()> {
        assert_eq!(TokenV3::deserialize(ENCODED_FIXTURE)?, fixture_token());
        Ok(())
    }

    #[test]
    fn test_roundtrip() -> anyhow::Result<()> {
        let token = fixture_token();
        let decoded = TokenV3::deserialize(token.serialize()?)?;
        assert_eq!(decoded, token);
        Ok(())
    }

    #[test]
    fn test_deserialize_without_prefix() -> anyhow::Result<()> {
        let token = fixture_token();
        let serialized = token.serialize()?;
        let bare = serialized.trim_start_matches("cashuA");
        assert_eq!(TokenV3::deserialize(bare)?, token);
        Ok(())
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        assert!(TokenV3::deserialize("cashuAnot-base64!!").is_err());
        assert!(TokenV3::deserialize("cashuAaGVsbG8").is_err()); // "hello" is not json
    }

    #[test]
    fn test_clean_drops_empty_entries() {
        let mint = Url::parse("https://mint.ducat.cash").expect("invalid url");
        let token = TokenV3::new(vec![TokenEntry {
            mint,
            proofs: Proofs::empty(),
        }]);
        assert!(token.clean().tokens.is_empty());
    }

    #[test]
    fn test_clean_merges_same_mint_and_dedupes() -> anyhow::Result<()> {
        let mint = Url::parse("https://mint.ducat.cash")?;
        let other = Url::parse("https://other.ducat.cash")?;
        let p1 = proof(
            2,
            "XbhZvfAO0E0SFYaJ36DC4Cy1eOa54-8k0wVHqKCApD4",
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        );
        let p2 = proof(
            8,
            "J3tK3iqVPkAxMaivvzWRAYgBJLbbDHPXBWsHZzsbakk",
            "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
        );

        let token = TokenV3::new(vec![
            TokenEntry {
                mint: mint.clone(),
                proofs: Proofs::new(vec![p1.clone()]),
            },
            TokenEntry {
                mint: other.clone(),
                proofs: Proofs::new(vec![p2.clone()]),
            },
            // same mint again, with one duplicate proof
            TokenEntry {
                mint: mint.clone(),
                proofs: Proofs::new(vec![p1.clone(), p2.clone()]),
            },
        ]);

        let cleaned = token.clean();
        assert_eq!(cleaned.tokens.len(), 2);
        assert_eq!(cleaned.tokens[0].mint, mint);
        assert_eq!(
            cleaned.tokens[0].proofs,
            Proofs::new(vec![p1, p2.clone()])
        );
        assert_eq!(cleaned.tokens[1].mint, other);
        assert_eq!(cleaned.tokens[1].proofs, Proofs::new(vec![p2]));
        Ok(())
    }

    #[test]
    fn test_roundtrip_normalizes() -> anyhow::Result<()> {
        // duplicate mints and empty entries disappear on decode
        let mint = Url::parse("https://mint.ducat.cash")?;
        let p1 = proof(
            2,
            "XbhZvfAO0E0SFYaJ36DC4Cy1eOa54-8k0wVHqKCApD4",
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
        );
        let p2 = proof(
            8,
            "J3tK3iqVPkAxMaivvzWRAYgBJLbbDHPXBWsHZzsbakk",
            "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
        );
        let dirty = TokenV3::new(vec![
            TokenEntry {
                mint: mint.clone(),
                proofs: Proofs::new(vec![p1.clone()]),
            },
            TokenEntry {
                mint: mint.clone(),
                proofs: Proofs::new(vec![p1, p2]),
            },
            TokenEntry {
                mint,
                proofs: Proofs::empty(),
            },
        ]);

        let decoded = TokenV3::deserialize(dirty.serialize()?)?;
        assert_eq!(decoded, dirty.clone().clean());
        assert_eq!(decoded.tokens.len(), 1);
        assert_eq!(decoded.total_amount(), 10);
        Ok(())
    }

    #[test]
    fn test_base64url_mapping_is_inverse() {
        for data in ["", "ab", "abc", "a+b/c", "messageswithpadding=="] {
            let url_safe = base64_to_base64url(data);
            assert!(!url_safe.contains('+'));
            assert!(!url_safe.contains('/'));
            assert!(!url_safe.contains('='));
            let back = base64url_to_base64(&url_safe);
            assert_eq!(back.trim_end_matches('='), data.trim_end_matches('='));
        }
    }

    #[test]
    fn test_total_amount() {
        assert_eq!(fixture_token().total_amount(), 10);
    }
}
