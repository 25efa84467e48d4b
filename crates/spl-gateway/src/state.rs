use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info_span};
use uuid::Uuid;

use spl_chaincode::{ChaincodeResult, ProfileChaincode};
use spl_store::{InMemoryLedgerStore, LedgerStore, WalLedgerStore, WalStoreConfig};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};

/// Shared gateway state: the chaincode, the world state it runs against, and
/// the lock that orders transactions.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    chaincode: ProfileChaincode,
    store: Arc<dyn LedgerStore>,
    ordering: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(chaincode: ProfileChaincode, store: Arc<dyn LedgerStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                chaincode,
                store,
                ordering: Arc::new(Mutex::new(())),
            }),
        }
    }

    /// Build the chaincode and open the configured world state.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let chaincode = ProfileChaincode::new(config.codec.clone())?;
        let store: Arc<dyn LedgerStore> = match &config.state_path {
            Some(path) => Arc::new(WalLedgerStore::open(
                path,
                WalStoreConfig {
                    sync_every_write: config.sync_every_write,
                },
            )?),
            None => Arc::new(InMemoryLedgerStore::new()),
        };
        Ok(Self::new(chaincode, store))
    }

    pub fn chaincode(&self) -> &ProfileChaincode {
        &self.inner.chaincode
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.inner.store
    }

    /// Run `f` as one transaction.
    ///
    /// Transactions are applied one at a time, so the chaincode's
    /// read-then-write sequences never interleave. Each gets a fresh id.
    ///
    /// The ordering guard travels into the blocking task: if the caller's
    /// future is dropped, the turn is still held until `f` returns.
    pub async fn transact<T, F>(&self, label: &'static str, f: F) -> GatewayResult<(Uuid, T)>
    where
        F: FnOnce(&ProfileChaincode, &dyn LedgerStore) -> ChaincodeResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let turn = Arc::clone(&self.inner.ordering).lock_owned().await;
        let tx_id = Uuid::now_v7();
        let state = self.clone();

        let value = tokio::task::spawn_blocking(move || {
            let _turn = turn;
            let span = info_span!("tx", %tx_id, op = label);
            let _entered = span.enter();
            debug!("transaction started");
            f(&state.inner.chaincode, state.inner.store.as_ref())
        })
        .await
        .map_err(|e| GatewayError::Internal(format!("transaction task failed: {e}")))??;

        Ok((tx_id, value))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("chaincode", &self.inner.chaincode)
            .finish_non_exhaustive()
    }
}
