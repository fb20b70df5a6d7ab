use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::tx::{Amount, Drops, SubmitOptions, SubmitResult, Transaction};

/// Error code the node reports for an address with no account root.
pub const ACCOUNT_NOT_FOUND: &str = "actNotFound";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("`{command}` failed on node: {error} {}", .message.as_deref().unwrap_or_default())]
    Node {
        command: String,
        error: String,
        code: Option<i64>,
        message: Option<String>,
    },
    #[error("malformed `{command}` response: {source}")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    #[must_use]
    pub fn node(command: &str, error: &str, message: Option<String>) -> Self {
        Self::Node {
            command: command.to_owned(),
            error: error.to_owned(),
            code: None,
            message,
        }
    }

    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Error token reported by the node, e.g. `actNotFound`.
    #[must_use]
    pub fn node_error(&self) -> Option<&str> {
        match self {
            Self::Node { error, .. } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_account_not_found(&self) -> bool {
        self.node_error() == Some(ACCOUNT_NOT_FOUND)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountRoot {
    pub account: String,
    pub balance: Drops,
    pub sequence: u32,
    #[serde(default)]
    pub owner_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    pub account_data: AccountRoot,
    #[serde(default)]
    pub ledger_current_index: Option<u32>,
    #[serde(default)]
    pub validated: bool,
}

impl AccountInfo {
    #[must_use]
    pub const fn balance(&self) -> Drops {
        self.account_data.balance
    }
}

/// Live offer as listed by `account_offers`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccountOffer {
    pub seq: u32,
    #[serde(default)]
    pub flags: u32,
    pub taker_gets: Amount,
    pub taker_pays: Amount,
    #[serde(default)]
    pub quality: String,
}

/// Shared handle to one RPC role.
pub type RpcHandle = Arc<dyn LedgerRpc>;

/// Commands the fixtures issue against a ledger node.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Role label used in logs.
    fn label(&self) -> &str;

    /// Index of the open, in-progress ledger.
    async fn ledger_current(&self) -> Result<u32, RpcError>;

    /// Transaction hashes included in the given ledger.
    async fn ledger_transactions(&self, ledger_index: u32) -> Result<Vec<String>, RpcError>;

    /// Closes the open ledger and returns the index of the new open ledger.
    async fn ledger_accept(&self) -> Result<u32, RpcError>;

    async fn account_info(&self, address: &str) -> Result<AccountInfo, RpcError>;

    async fn account_offers(&self, address: &str) -> Result<Vec<AccountOffer>, RpcError>;

    async fn submit(
        &self,
        tx: Transaction,
        options: SubmitOptions<'_>,
    ) -> Result<SubmitResult, RpcError>;
}
