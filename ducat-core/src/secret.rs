use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{CryptoRng, Rng};

pub const SECRET_LENGTH: usize = 32;

/// Generates a fresh random secret for a blinded output.
///
/// The 32 raw bytes are encoded as unpadded url-safe base64. The mint signs
/// the encoded string, not the raw bytes, so both sides must agree on this
/// exact representation.
pub fn generate_secret<R: Rng + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; SECRET_LENGTH];
    rng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    #[test]
    fn test_generate_secret() {
        let secret = super::generate_secret(&mut OsRng);
        // 32 bytes come out as 43 base64 chars with the padding dropped
        assert_eq!(secret.len(), 43);
        assert!(!secret.contains('='));
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generate_secret_is_unique() {
        let first = super::generate_secret(&mut OsRng);
        let second = super::generate_secret(&mut OsRng);
        assert_ne!(first, second);
    }
}
