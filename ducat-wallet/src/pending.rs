//! Persistence hook for outputs that are in flight to the mint.
//!
//! If the mint commits a `mint`, `split` or `melt` but the reply is lost,
//! the proofs can only be reconstructed from the blinding material the
//! wallet held at dispatch time plus a replay of the request. The engine
//! therefore stores that material through this trait before every such
//! call, removes it after a reply arrives and leaves it in place on
//! failure so a recovery pass can decide what to do with it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use ducat_core::blind::{BlindedMessage, BlindingFactor};

use crate::error::DucatWalletError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOutputs {
    pub operation_id: Uuid,
    pub outputs: Vec<BlindedMessage>,
    pub secrets: Vec<String>,
    pub blinding_factors: Vec<BlindingFactor>,
}

impl PendingOutputs {
    pub fn new(
        outputs: Vec<BlindedMessage>,
        secrets: Vec<String>,
        blinding_factors: Vec<BlindingFactor>,
    ) -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            outputs,
            secrets,
            blinding_factors,
        }
    }
}

#[async_trait(?Send)]
pub trait PendingStore {
    async fn add_pending(&self, pending: &PendingOutputs) -> Result<(), DucatWalletError>;

    async fn remove_pending(&self, operation_id: &Uuid) -> Result<(), DucatWalletError>;

    async fn get_pending(&self) -> Result<Vec<PendingOutputs>, DucatWalletError>;
}

/// Keeps pending outputs for the lifetime of the process only. Wallets that
/// must survive a crash plug in a durable store instead.
#[derive(Debug, Clone, Default)]
pub struct MemoryPendingStore {
    entries: Arc<Mutex<HashMap<Uuid, PendingOutputs>>>,
}

impl MemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl PendingStore for MemoryPendingStore {
    async fn add_pending(&self, pending: &PendingOutputs) -> Result<(), DucatWalletError> {
        self.entries
            .lock()
            .await
            .insert(pending.operation_id, pending.clone());
        Ok(())
    }

    async fn remove_pending(&self, operation_id: &Uuid) -> Result<(), DucatWalletError> {
        self.entries.lock().await.remove(operation_id);
        Ok(())
    }

    async fn get_pending(&self) -> Result<Vec<PendingOutputs>, DucatWalletError> {
        Ok(self.entries.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryPendingStore, PendingOutputs, PendingStore};

    #[tokio::test]
    async fn test_add_and_remove() -> anyhow::Result<()> {
        let store = MemoryPendingStore::new();
        let pending = PendingOutputs::new(vec![], vec!["secret".to_owned()], vec![]);
        let id = pending.operation_id;

        store.add_pending(&pending).await?;
        assert_eq!(store.get_pending().await?.len(), 1);

        store.remove_pending(&id).await?;
        assert!(store.get_pending().await?.is_empty());
        Ok(())
    }
}
