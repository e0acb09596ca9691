use std::sync::Arc;

use ledger::{Ledger, SessionCoordinator};
use tokio::sync::Mutex;

pub(crate) struct BotState {
    pub ledger: Ledger,
    pub sessions: SessionCoordinator,
}

/// Shared handle over the ledger and the session coordinator. One lock
/// around both, so a flow event reads and mutates them as a unit.
#[derive(Clone)]
pub(crate) struct StateStore {
    inner: Arc<Mutex<BotState>>,
}

impl StateStore {
    pub(crate) fn new(ledger: Ledger, sessions: SessionCoordinator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BotState { ledger, sessions })),
        }
    }

    pub(crate) async fn with<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut BotState) -> T,
    {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}
