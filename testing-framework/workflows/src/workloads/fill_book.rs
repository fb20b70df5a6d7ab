use ledger_fixture_core::{
    nodes::RpcError,
    scenario::LedgerController,
    wallet::Wallet,
};
use rand::Rng;
use thiserror::Error;
use tracing::info;

use super::{
    book::{BookError, BookPopulator, BookReport},
    provision::{ProvisionError, WalletProvisioner},
};

/// Wallet index reserved for the currency issuer.
pub const ISSUER_INDEX: u64 = 0;

#[derive(Debug, Error)]
pub enum FillBookError {
    #[error("wallet provisioning failed: {0}")]
    Provision(#[from] ProvisionError),
    #[error("order book population failed: {0}")]
    Book(#[from] BookError),
    #[error("closing the ledger failed: {0}")]
    Ledger(#[source] RpcError),
    #[error("no trader holds an offer: all {rejected} submissions were refused")]
    EmptyBook { rejected: usize },
}

/// What one fixture run left on the ledger.
#[derive(Debug)]
pub struct FillBookSummary {
    pub issuer: Wallet,
    pub traders: Vec<Wallet>,
    /// Transactions settled by the close after funding.
    pub settled_funding: usize,
    pub book: BookReport,
    /// Transactions settled by the close after the offers.
    pub settled_offers: usize,
}

/// Funds an issuer plus `traders` wallets and gives each trader one offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillBook {
    traders: usize,
}

impl FillBook {
    #[must_use]
    pub const fn new(traders: usize) -> Self {
        Self { traders }
    }

    #[must_use]
    pub const fn traders(&self) -> usize {
        self.traders
    }

    pub async fn run<R: Rng + Send>(
        &self,
        ledger: &LedgerController,
        provisioner: &WalletProvisioner,
        populator: &mut BookPopulator<R>,
    ) -> Result<FillBookSummary, FillBookError> {
        info!("will create {} wallets", self.traders);

        let issuer = provisioner.provision(ISSUER_INDEX).await?;
        let traders = provisioner
            .provision_many(1..=self.traders as u64)
            .await?;
        let settled_funding = ledger.advance(false).await.map_err(FillBookError::Ledger)?;

        info!("will create {} offers", traders.len());

        let book = populator.populate(&traders, &issuer).await?;
        if !traders.is_empty() && book.created + book.existing == 0 {
            return Err(FillBookError::EmptyBook {
                rejected: book.rejected,
            });
        }
        let settled_offers = ledger.advance(false).await.map_err(FillBookError::Ledger)?;

        Ok(FillBookSummary {
            issuer,
            traders,
            settled_funding,
            book,
            settled_offers,
        })
    }
}
