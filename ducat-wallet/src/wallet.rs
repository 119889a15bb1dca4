//! The wallet engine.
//!
//! A wallet is scoped to one mint and its pinned keyset. Every public
//! operation is one logical transaction against the mint: outputs are
//! blinded locally, handed to the [MintClient], and the returned signatures
//! are unblinded into fresh proofs. Proofs are bearer objects; callers must
//! not feed the same proofs into two concurrent operations, the mint rejects
//! the second use.

use std::collections::HashMap;

use rand::rngs::OsRng;
use secp256k1::PublicKey;
use tracing::{instrument, warn};
use url::Url;

use ducat_core::amount::{blank_output_count, Amount};
use ducat_core::blind::{BlindedMessage, BlindedSignature, BlindingFactor, TotalAmount};
use ducat_core::dhke::Dhke;
use ducat_core::keyset::derive_keyset_id;
use ducat_core::primitives::PaymentRequest;
use ducat_core::proof::{Proof, Proofs};
use ducat_core::secret::generate_secret;
use ducat_core::token::{TokenEntry, TokenV3};

use crate::client::MintClient;
use crate::error::DucatWalletError;
use crate::http::HttpClient;
use crate::pending::{MemoryPendingStore, PendingOutputs, PendingStore};

/// A blinded output together with the material needed to unblind the
/// mint's reply to it.
type Output = (BlindedMessage, String, BlindingFactor);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTokensResult {
    pub send: Proofs,
    pub change: Proofs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveTokensResult {
    pub token: TokenV3,
    /// Entries that could not be redeemed, verbatim, so the caller can
    /// retry them later. A failing entry never aborts its siblings.
    pub tokens_with_errors: Option<TokenV3>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayInvoiceResult {
    pub paid: bool,
    pub preimage: Option<String>,
    pub change: Proofs,
}

#[derive(Clone)]
pub struct Wallet<C, P>
where
    C: MintClient,
    P: PendingStore,
{
    client: C,
    dhke: Dhke,
    mint_url: Url,
    keys: HashMap<u64, PublicKey>,
    keyset_id: String,
    pending: P,
}

pub struct WalletBuilder<C = HttpClient, P = MemoryPendingStore>
where
    C: MintClient + Default,
    P: PendingStore + Default,
{
    client: Option<C>,
    mint_url: Option<Url>,
    keys: Option<HashMap<u64, PublicKey>>,
    pending: Option<P>,
}

impl<C, P> WalletBuilder<C, P>
where
    C: MintClient + Default,
    P: PendingStore + Default,
{
    fn new() -> Self {
        Self {
            client: None,
            mint_url: None,
            keys: None,
            pending: None,
        }
    }

    pub fn with_client(mut self, client: C) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_mint_url(mut self, mint_url: Url) -> Self {
        self.mint_url = Some(mint_url);
        self
    }

    /// Pins a keyset. When not supplied, the keys are fetched from the mint
    /// on build. Pinning is the caller's defense against a key swap.
    pub fn with_keys(mut self, keys: HashMap<u64, PublicKey>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_pending_store(mut self, pending: P) -> Self {
        self.pending = Some(pending);
        self
    }

    pub async fn build(self) -> Result<Wallet<C, P>, DucatWalletError> {
        let client = self.client.unwrap_or_default();
        let pending = self.pending.unwrap_or_default();
        let mint_url = self.mint_url.expect("mint_url is required");
        let keys = match self.keys {
            Some(keys) => keys,
            None => client.get_keys(&mint_url).await?,
        };
        Ok(Wallet::new(client, mint_url, keys, pending))
    }
}

impl<C, P> Default for WalletBuilder<C, P>
where
    C: MintClient + Default,
    P: PendingStore + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, P> Wallet<C, P>
where
    C: MintClient,
    P: PendingStore,
{
    fn new(client: C, mint_url: Url, keys: HashMap<u64, PublicKey>, pending: P) -> Self {
        Self {
            client,
            dhke: Dhke::new(),
            keyset_id: derive_keyset_id(&keys),
            mint_url,
            keys,
            pending,
        }
    }

    pub fn builder() -> WalletBuilder<C, P>
    where
        C: Default,
        P: Default,
    {
        WalletBuilder::default()
    }

    pub fn mint_url(&self) -> &Url {
        &self.mint_url
    }

    pub fn keys(&self) -> &HashMap<u64, PublicKey> {
        &self.keys
    }

    pub fn keyset_id(&self) -> &str {
        &self.keyset_id
    }

    /// Asks the mint for an invoice over `amount`. Once it is paid,
    /// [Wallet::mint_tokens] redeems the returned hash for proofs.
    pub async fn get_mint_payment_request(
        &self,
        amount: u64,
    ) -> Result<PaymentRequest, DucatWalletError> {
        self.client.request_mint(&self.mint_url, amount).await
    }

    /// Issues fresh proofs worth `amount` against a paid mint request.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn mint_tokens(
        &self,
        amount: Amount,
        hash: String,
    ) -> Result<Proofs, DucatWalletError> {
        let outputs = self.create_outputs(amount)?;
        let (messages, secrets, factors) = unzip_outputs(outputs);

        let pending = PendingOutputs::new(messages.clone(), secrets.clone(), factors.clone());
        self.pending.add_pending(&pending).await?;

        let response = self
            .client
            .post_mint(&self.mint_url, hash, messages)
            .await?;
        let proofs = self.create_proofs_from_blinded_signatures(
            response.promises,
            secrets,
            factors,
            &self.keys,
        )?;

        self.pending.remove_pending(&pending.operation_id).await?;
        Ok(proofs)
    }

    /// Splits `proofs` into a bundle worth exactly `amount` and change.
    ///
    /// When the selected proofs already sum to `amount` they are handed out
    /// as is, without a mint round trip. Otherwise the mint re-issues them
    /// as two bundles and the unselected proofs ride along as extra change.
    #[instrument(level = "debug", skip(self, proofs), err)]
    pub async fn send_tokens(
        &self,
        amount: u64,
        proofs: Proofs,
    ) -> Result<SendTokensResult, DucatWalletError> {
        let (selected, rest) = proofs
            .select_for_amount(amount)
            .map_err(|_| DucatWalletError::NotEnoughTokens)?;

        if selected.total_amount() == amount {
            return Ok(SendTokensResult {
                send: selected,
                change: rest,
            });
        }

        let (kept, sent) = self
            .split(&self.mint_url, &self.keys, selected, amount)
            .await?;

        let mut change = kept;
        change.extend(rest);
        Ok(SendTokensResult { send: sent, change })
    }

    /// Redeems an encoded token, re-issuing every entry under fresh
    /// blinding so the sender can no longer spend it.
    ///
    /// Entries from foreign mints are redeemed at those mints with lazily
    /// fetched keys. Failures are collected per entry.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn receive_tokens(
        &self,
        encoded_token: &str,
    ) -> Result<ReceiveTokensResult, DucatWalletError> {
        let token = TokenV3::deserialize(encoded_token)?;

        let mut keysets: HashMap<Url, HashMap<u64, PublicKey>> = HashMap::new();
        keysets.insert(self.mint_url.clone(), self.keys.clone());

        let mut received = Vec::new();
        let mut failed = Vec::new();
        for entry in token.tokens {
            let keys = match keysets.get(&entry.mint) {
                Some(keys) => keys.clone(),
                None => match self.client.get_keys(&entry.mint).await {
                    Ok(keys) => {
                        keysets.insert(entry.mint.clone(), keys.clone());
                        keys
                    }
                    Err(err) => {
                        warn!("fetching keys from {} failed: {err}", entry.mint);
                        failed.push(entry);
                        continue;
                    }
                },
            };

            match self.receive_token_entry(&entry, &keys).await {
                Ok(proofs) => received.push(TokenEntry {
                    mint: entry.mint.clone(),
                    proofs,
                }),
                Err(err) => {
                    warn!("receiving entry from {} failed: {err}", entry.mint);
                    failed.push(entry);
                }
            }
        }

        Ok(ReceiveTokensResult {
            token: TokenV3::new(received),
            tokens_with_errors: if failed.is_empty() {
                None
            } else {
                Some(TokenV3::new(failed))
            },
        })
    }

    /// Pays a Lightning invoice with `proofs`.
    ///
    /// The proofs must cover the invoice amount plus the fee reserve; the
    /// reserve is fetched from the mint when not supplied. Zero-amount
    /// outputs accompany the request so the mint can return change when the
    /// actual routing fee comes in under the reserve.
    #[instrument(level = "debug", skip(self, invoice, proofs), err)]
    pub async fn pay_invoice(
        &self,
        invoice: String,
        proofs: Proofs,
        fee_reserve: Option<u64>,
    ) -> Result<PayInvoiceResult, DucatWalletError> {
        let fee_reserve = match fee_reserve {
            Some(fee) => fee,
            None => {
                self.client
                    .post_check_fees(&self.mint_url, invoice.clone())
                    .await?
                    .fee
            }
        };

        let blank_outputs = self.create_blank_outputs(fee_reserve)?;
        let (messages, secrets, factors) = unzip_outputs(blank_outputs);

        let pending = PendingOutputs::new(messages.clone(), secrets.clone(), factors.clone());
        self.pending.add_pending(&pending).await?;

        let response = self
            .client
            .post_melt(&self.mint_url, invoice, proofs, messages)
            .await?;

        let change = match response.change {
            Some(signatures) => self.create_proofs_from_blinded_signatures(
                signatures,
                secrets,
                factors,
                &self.keys,
            )?,
            None => Proofs::empty(),
        };

        self.pending.remove_pending(&pending.operation_id).await?;
        Ok(PayInvoiceResult {
            paid: response.paid,
            preimage: response.preimage,
            change,
        })
    }

    /// Returns the subset of `proofs` the mint reports as already spent.
    /// Only the secrets are sent, the wallet state is the caller's to
    /// update.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn check_spent_proofs(&self, proofs: &Proofs) -> Result<Proofs, DucatWalletError> {
        let response = self
            .client
            .post_check_spendable(&self.mint_url, proofs.secrets())
            .await?;
        if response.spendable.len() != proofs.len() {
            return Err(DucatWalletError::UnexpectedResponse(
                "spendable flags do not match the submitted proofs".to_owned(),
            ));
        }
        Ok(proofs
            .iter()
            .cloned()
            .zip(response.spendable)
            .filter_map(|(proof, spendable)| (!spendable).then_some(proof))
            .collect::<Vec<_>>()
            .into())
    }

    /// Re-issues one token entry by splitting everything into the sent
    /// side. The kept side of 0 produces no outputs at all, the mint
    /// accepts the one-sided split.
    async fn receive_token_entry(
        &self,
        entry: &TokenEntry,
        keys: &HashMap<u64, PublicKey>,
    ) -> Result<Proofs, DucatWalletError> {
        let amount = entry.proofs.total_amount();
        let (_, reissued) = self
            .split(&entry.mint, keys, entry.proofs.clone(), amount)
            .await?;
        Ok(reissued)
    }

    /// Exchanges `proofs` for two freshly blinded bundles, the second worth
    /// `send_amount` and the first the remainder.
    ///
    /// The outputs for the kept bundle go first, then the ones for the sent
    /// bundle. The mint's `fst`/`snd` reply is positional over that exact
    /// boundary, so each half is unblinded with its own secrets.
    async fn split(
        &self,
        mint_url: &Url,
        keys: &HashMap<u64, PublicKey>,
        proofs: Proofs,
        send_amount: u64,
    ) -> Result<(Proofs, Proofs), DucatWalletError> {
        let total = proofs.total_amount();
        let keep_amount = total
            .checked_sub(send_amount)
            .ok_or(DucatWalletError::InvalidProofs)?;

        let (keep_messages, keep_secrets, keep_factors) =
            unzip_outputs(self.create_outputs(Amount(keep_amount))?);
        let (send_messages, send_secrets, send_factors) =
            unzip_outputs(self.create_outputs(Amount(send_amount))?);

        let mut outputs = Vec::with_capacity(keep_messages.len() + send_messages.len());
        outputs.extend(keep_messages);
        outputs.extend(send_messages);

        if outputs.total_amount() != total {
            return Err(DucatWalletError::InvalidProofs);
        }

        let pending = PendingOutputs::new(
            outputs.clone(),
            [keep_secrets.clone(), send_secrets.clone()].concat(),
            [keep_factors.clone(), send_factors.clone()].concat(),
        );
        self.pending.add_pending(&pending).await?;

        let response = self
            .client
            .post_split(mint_url, proofs, send_amount, outputs)
            .await?;

        let kept = self.create_proofs_from_blinded_signatures(
            response.fst,
            keep_secrets,
            keep_factors,
            keys,
        )?;
        let sent = self.create_proofs_from_blinded_signatures(
            response.snd,
            send_secrets,
            send_factors,
            keys,
        )?;

        if kept.total_amount() + sent.total_amount() != total {
            warn!(
                "split sum mismatch: input {} != kept {} + sent {}",
                total,
                kept.total_amount(),
                sent.total_amount()
            );
        }

        self.pending.remove_pending(&pending.operation_id).await?;
        Ok((kept, sent))
    }

    /// One blinded output per denomination of `amount`, smallest first.
    fn create_outputs(&self, amount: Amount) -> Result<Vec<Output>, DucatWalletError> {
        amount
            .split()
            .into_iter()
            .map(|denomination| self.create_output(denomination))
            .collect()
    }

    /// Zero-amount outputs that carry melt change. Their count only bounds
    /// how many distinct denominations the mint may hand back.
    fn create_blank_outputs(&self, fee_reserve: u64) -> Result<Vec<Output>, DucatWalletError> {
        (0..blank_output_count(fee_reserve))
            .map(|_| self.create_output(0))
            .collect()
    }

    fn create_output(&self, amount: u64) -> Result<Output, DucatWalletError> {
        let secret = generate_secret(&mut OsRng);
        let blinding_factor = BlindingFactor::random(&mut OsRng);
        let b_ = self.dhke.step1_alice(&secret, &blinding_factor)?;
        Ok((BlindedMessage { amount, b_ }, secret, blinding_factor))
    }

    /// Unblinds the mint's signatures into proofs, positionally.
    ///
    /// The mint may answer with fewer signatures than outputs (melt change
    /// uses only as many blanks as it needs), never with more. The key for
    /// each signature is looked up by the signature's own amount.
    fn create_proofs_from_blinded_signatures(
        &self,
        signatures: Vec<BlindedSignature>,
        secrets: Vec<String>,
        blinding_factors: Vec<BlindingFactor>,
        keys: &HashMap<u64, PublicKey>,
    ) -> Result<Proofs, DucatWalletError> {
        if signatures.len() > secrets.len() || signatures.len() > blinding_factors.len() {
            return Err(DucatWalletError::TooManySignatures);
        }

        signatures
            .into_iter()
            .zip(secrets)
            .zip(blinding_factors)
            .map(|((promise, secret), blinding_factor)| {
                let key = keys
                    .get(&promise.amount)
                    .ok_or(DucatWalletError::PubkeyNotFound(promise.amount))?;
                let c = self.dhke.step3_alice(promise.c_, blinding_factor, *key)?;
                Ok(Proof::new(promise.amount, secret, c, promise.id))
            })
            .collect::<Result<Vec<Proof>, DucatWalletError>>()
            .map(Proofs::from)
    }
}

fn unzip_outputs(
    outputs: Vec<Output>,
) -> (Vec<BlindedMessage>, Vec<String>, Vec<BlindingFactor>) {
    let mut messages = Vec::with_capacity(outputs.len());
    let mut secrets = Vec::with_capacity(outputs.len());
    let mut factors = Vec::with_capacity(outputs.len());
    for (message, secret, factor) in outputs {
        messages.push(message);
        secrets.push(secret);
        factors.push(factor);
    }
    (messages, secrets, factors)
}
