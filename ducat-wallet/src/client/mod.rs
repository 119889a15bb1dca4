pub mod http;

use std::collections::HashMap;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use secp256k1::PublicKey;
use url::Url;

use ducat_core::blind::BlindedMessage;
use ducat_core::primitives::{
    CheckFeesResponse, CheckSpendableResponse, PaymentRequest, PostMeltResponse, PostMintResponse,
    PostSplitResponse,
};
use ducat_core::proof::Proofs;

use crate::error::DucatWalletError;

/// The capability the wallet engine drives the mint through. Everything the
/// engine does suspends only at these calls, so the transport stays
/// pluggable and mockable.
#[cfg_attr(test, automock)]
#[async_trait(?Send)]
pub trait MintClient {
    async fn get_keys(&self, mint_url: &Url)
        -> Result<HashMap<u64, PublicKey>, DucatWalletError>;

    /// Asks the mint for a Lightning invoice over `amount`.
    async fn request_mint(
        &self,
        mint_url: &Url,
        amount: u64,
    ) -> Result<PaymentRequest, DucatWalletError>;

    /// Trades a paid invoice, identified by `hash`, for signatures over
    /// `outputs`.
    async fn post_mint(
        &self,
        mint_url: &Url,
        hash: String,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostMintResponse, DucatWalletError>;

    /// Re-issues `proofs` as two bundles, the second one worth `amount`.
    /// The mint splits `outputs` at the matching boundary.
    async fn post_split(
        &self,
        mint_url: &Url,
        proofs: Proofs,
        amount: u64,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostSplitResponse, DucatWalletError>;

    /// Pays invoice `pr` with `proofs`, returning change for overpaid fees
    /// through the zero-amount `outputs`.
    async fn post_melt(
        &self,
        mint_url: &Url,
        pr: String,
        proofs: Proofs,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostMeltResponse, DucatWalletError>;

    async fn post_check_fees(
        &self,
        mint_url: &Url,
        pr: String,
    ) -> Result<CheckFeesResponse, DucatWalletError>;

    /// Asks which secrets are still spendable. Only the secrets cross the
    /// wire, never the signatures.
    async fn post_check_spendable(
        &self,
        mint_url: &Url,
        secrets: Vec<String>,
    ) -> Result<CheckSpendableResponse, DucatWalletError>;
}
