use thiserror::Error;

#[derive(Error, Debug)]
pub enum DucatWalletError {
    #[error("Network error {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid header value {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Json error {0}")]
    Json(#[from] serde_json::Error),

    #[error("Url error {0}")]
    Url(#[from] url::ParseError),

    #[error("Mint error: {0}")]
    Mint(String),

    #[error("Unexpected response from mint: {0}")]
    UnexpectedResponse(String),

    #[error("Not enough tokens")]
    NotEnoughTokens,

    #[error("No mint public key for amount {0}")]
    PubkeyNotFound(u64),

    #[error("Invalid proofs")]
    InvalidProofs,

    #[error("Mint returned more signatures than outputs")]
    TooManySignatures,

    #[error("DucatCoreError: {0}")]
    Core(#[from] ducat_core::error::DucatCoreError),
}
