use tracing::{debug, info};

use crate::nodes::{RpcError, RpcHandle};

/// Open ledger index and how many transactions it currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub current_index: u32,
    pub pending_transaction_count: usize,
}

impl LedgerSnapshot {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pending_transaction_count == 0
    }
}

/// Closes ledgers on a standalone node through the admin handle.
#[derive(Clone)]
pub struct LedgerController {
    admin: RpcHandle,
}

impl LedgerController {
    #[must_use]
    pub fn new(admin: RpcHandle) -> Self {
        Self { admin }
    }

    pub async fn snapshot(&self) -> Result<LedgerSnapshot, RpcError> {
        let current_index = self.admin.ledger_current().await?;
        let transactions = self.admin.ledger_transactions(current_index).await?;
        let snapshot = LedgerSnapshot {
            current_index,
            pending_transaction_count: transactions.len(),
        };
        debug!(node = self.admin.label(), ?snapshot, "ledger snapshot");
        Ok(snapshot)
    }

    /// Closes the open ledger and returns how many transactions it settled.
    ///
    /// An empty open ledger is left alone unless `force` is set, so polling
    /// callers do not mint empty ledgers. Failures are returned as-is; the
    /// admin channel is not retried.
    pub async fn advance(&self, force: bool) -> Result<usize, RpcError> {
        let snapshot = self.snapshot().await?;

        if snapshot.is_empty() && !force {
            info!(ledger = snapshot.current_index, "ledger advance skipped (no new tx)");
            return Ok(0);
        }

        let new_index = self.admin.ledger_accept().await?;
        info!(
            closed = snapshot.current_index,
            txs = snapshot.pending_transaction_count,
            "-> new ledger #{new_index} with {} tx",
            snapshot.pending_transaction_count
        );

        Ok(snapshot.pending_transaction_count)
    }
}
