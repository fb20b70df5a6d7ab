use std::{sync::Arc, time::Duration};

use reqwest::Url;

use crate::nodes::{ClientRole, RpcClient, RpcError, RpcHandle};

/// The two long-lived RPC handles shared by every fixture component of a run.
#[derive(Clone)]
pub struct NodeClients {
    user: RpcHandle,
    admin: RpcHandle,
}

impl NodeClients {
    #[must_use]
    /// Build from preconstructed handles (test doubles included).
    pub fn new(user: RpcHandle, admin: RpcHandle) -> Self {
        Self { user, admin }
    }

    /// Connect both roles, user first. Either endpoint failing to answer is
    /// fatal for the run.
    pub async fn connect(user_url: Url, admin_url: Url, timeout: Duration) -> Result<Self, RpcError> {
        let user = RpcClient::connect(user_url, ClientRole::User, timeout).await?;
        let admin = RpcClient::connect(admin_url, ClientRole::Admin, timeout).await?;
        Ok(Self::new(Arc::new(user), Arc::new(admin)))
    }

    #[must_use]
    /// Regular-privilege handle: account and offer queries.
    pub const fn user(&self) -> &RpcHandle {
        &self.user
    }

    #[must_use]
    /// Admin handle: ledger control, genesis funding and sign-and-submit.
    pub const fn admin(&self) -> &RpcHandle {
        &self.admin
    }
}
