use std::collections::HashMap;

use async_trait::async_trait;
use secp256k1::PublicKey;
use url::Url;

use ducat_core::blind::BlindedMessage;
use ducat_core::primitives::{
    CheckFeesRequest, CheckFeesResponse, CheckSpendableRequest, CheckSpendableResponse,
    PaymentRequest, PostMeltRequest, PostMeltResponse, PostMintRequest, PostMintResponse,
    PostSplitRequest, PostSplitResponse, ProofSecret,
};
use ducat_core::proof::Proofs;

use crate::error::DucatWalletError;
use crate::http::HttpClient;

use super::MintClient;

#[async_trait(?Send)]
impl MintClient for HttpClient {
    async fn get_keys(
        &self,
        mint_url: &Url,
    ) -> Result<HashMap<u64, PublicKey>, DucatWalletError> {
        self.do_get(&mint_url.join("keys")?).await
    }

    async fn request_mint(
        &self,
        mint_url: &Url,
        amount: u64,
    ) -> Result<PaymentRequest, DucatWalletError> {
        let mut url = mint_url.join("mint")?;
        url.query_pairs_mut()
            .append_pair("amount", &amount.to_string());
        self.do_get(&url).await
    }

    async fn post_mint(
        &self,
        mint_url: &Url,
        hash: String,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostMintResponse, DucatWalletError> {
        let mut url = mint_url.join("mint")?;
        url.query_pairs_mut().append_pair("hash", &hash);
        let body = PostMintRequest { outputs };
        self.do_post(&url, &body).await
    }

    async fn post_split(
        &self,
        mint_url: &Url,
        proofs: Proofs,
        amount: u64,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostSplitResponse, DucatWalletError> {
        let body = PostSplitRequest {
            proofs,
            amount,
            outputs,
        };
        self.do_post(&mint_url.join("split")?, &body).await
    }

    async fn post_melt(
        &self,
        mint_url: &Url,
        pr: String,
        proofs: Proofs,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostMeltResponse, DucatWalletError> {
        let body = PostMeltRequest {
            pr,
            proofs,
            outputs,
        };
        self.do_post(&mint_url.join("melt")?, &body).await
    }

    async fn post_check_fees(
        &self,
        mint_url: &Url,
        pr: String,
    ) -> Result<CheckFeesResponse, DucatWalletError> {
        let body = CheckFeesRequest { pr };
        self.do_post(&mint_url.join("checkfees")?, &body).await
    }

    async fn post_check_spendable(
        &self,
        mint_url: &Url,
        secrets: Vec<String>,
    ) -> Result<CheckSpendableResponse, DucatWalletError> {
        let body = CheckSpendableRequest {
            proofs: secrets
                .into_iter()
                .map(|secret| ProofSecret { secret })
                .collect(),
        };
        self.do_post(&mint_url.join("check")?, &body).await
    }
}
