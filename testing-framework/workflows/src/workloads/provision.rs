use std::{num::NonZeroUsize, time::Duration};

use ledger_fixture_core::{
    constants::DEFAULT_FUNDING_DROPS,
    nodes::{RpcError, RpcHandle},
    tx::{Drops, SubmitOptions, Transaction},
    wallet::{Wallet, WalletDerivation, WalletError},
};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("deriving test wallet #{index} failed: {source}")]
    Derivation {
        index: u64,
        #[source]
        source: WalletError,
    },
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("funding test wallet #{index} from genesis was rejected: {engine_result} ({message})")]
    FundingRejected {
        index: u64,
        engine_result: String,
        message: String,
    },
    #[error("test wallet #{index} still unreadable after {attempts} funding attempts")]
    FundingExhausted { index: u64, attempts: usize },
}

/// Bounds on the funding loop.
///
/// The default keeps retrying for as long as the account stays unreadable,
/// without pausing. A bound is opt-in and changes the outcome of a stuck
/// wallet from "hangs" to [`ProvisionError::FundingExhausted`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FundingPolicy {
    max_attempts: Option<NonZeroUsize>,
    retry_delay: Duration,
}

impl FundingPolicy {
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_attempts: None,
            retry_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn bounded(max_attempts: NonZeroUsize, retry_delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            retry_delay,
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> Option<NonZeroUsize> {
        self.max_attempts
    }

    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    const fn exhausted(&self, attempts: usize) -> bool {
        match self.max_attempts {
            Some(max) => attempts >= max.get(),
            None => false,
        }
    }
}

/// Accounts are numbered from 1 in progress output.
const fn account_number(index: u64) -> u64 {
    index.saturating_add(1)
}

/// Turns wallet indices into funded accounts, paying from genesis.
pub struct WalletProvisioner {
    admin: RpcHandle,
    genesis: Wallet,
    derivation: WalletDerivation,
    funding: Drops,
    policy: FundingPolicy,
}

impl WalletProvisioner {
    #[must_use]
    pub fn new(admin: RpcHandle, genesis: Wallet) -> Self {
        Self {
            admin,
            genesis,
            derivation: WalletDerivation::default(),
            funding: Drops::new(DEFAULT_FUNDING_DROPS),
            policy: FundingPolicy::unbounded(),
        }
    }

    #[must_use]
    pub fn with_derivation(mut self, derivation: WalletDerivation) -> Self {
        self.derivation = derivation;
        self
    }

    #[must_use]
    pub fn with_funding(mut self, funding: Drops) -> Self {
        self.funding = funding;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FundingPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn genesis(&self) -> &Wallet {
        &self.genesis
    }

    #[must_use]
    pub const fn funding(&self) -> Drops {
        self.funding
    }

    pub fn derive(&self, index: u64) -> Result<Wallet, ProvisionError> {
        self.derivation
            .derive(index)
            .map_err(|source| ProvisionError::Derivation { index, source })
    }

    /// Returns the wallet for `index` once `account_info` on it succeeds,
    /// funding it from genesis after every failed read.
    ///
    /// Every read failure counts as "not funded yet", whatever the node
    /// reported. A rejected funding payment is fatal.
    pub async fn provision(&self, index: u64) -> Result<Wallet, ProvisionError> {
        let wallet = self.derive(index)?;
        let mut attempts = 0usize;

        loop {
            match self.admin.account_info(wallet.address()).await {
                Ok(info) => {
                    info!(
                        index,
                        address = wallet.address(),
                        funding_attempts = attempts,
                        "test account #{} ({}) has {} XRP",
                        account_number(index),
                        wallet.address(),
                        info.balance().to_xrp_string()
                    );
                    return Ok(wallet);
                }
                Err(err) => {
                    debug!(index, address = wallet.address(), error = %err, "account unreadable, funding");

                    if self.policy.exhausted(attempts) {
                        return Err(ProvisionError::FundingExhausted { index, attempts });
                    }
                    if attempts > 0 && !self.policy.retry_delay.is_zero() {
                        sleep(self.policy.retry_delay).await;
                    }

                    self.fund(index, &wallet).await?;
                    attempts += 1;
                }
            }
        }
    }

    /// Provisions each index in order, one at a time.
    pub async fn provision_many<I>(&self, indices: I) -> Result<Vec<Wallet>, ProvisionError>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut wallets = Vec::new();
        for index in indices {
            wallets.push(self.provision(index).await?);
        }
        Ok(wallets)
    }

    async fn fund(&self, index: u64, wallet: &Wallet) -> Result<(), ProvisionError> {
        let payment = Transaction::payment(&self.genesis, wallet.address(), self.funding);
        let result = self
            .admin
            .submit(payment, SubmitOptions::autofill(&self.genesis))
            .await?;

        if !result.is_success() {
            return Err(ProvisionError::FundingRejected {
                index,
                engine_result: result.engine_result,
                message: result.engine_result_message,
            });
        }

        debug!(
            node = self.admin.label(),
            index,
            address = wallet.address(),
            drops = self.funding.get(),
            "funding payment applied"
        );
        Ok(())
    }
}
