use thiserror::Error;

#[derive(Error, Debug)]
pub enum DucatCoreError {
    #[error("Secp256k1 error {0}")]
    Secp256k1(#[from] secp256k1::Error),

    #[error("Base64 decode error {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Json error {0}")]
    Json(#[from] serde_json::Error),

    #[error("Utf8 error {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("No curve point found for message")]
    NoCurvePoint,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Not enough tokens")]
    NotEnoughTokens,
}
