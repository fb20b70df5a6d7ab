use std::process;

use anyhow::{Context as _, Result};
use ledger_fixture_core::{
    adjust_timeout,
    scenario::{LedgerController, NodeClients},
};
use ledger_fixture_runner::{FixtureConfig, defaults::init_tracing};
use ledger_fixture_workflows::{BookPopulator, FillBook, WalletProvisioner};
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        warn!("fill_book failed: {err:#}");
        process::exit(1);
    }

    info!("all done");
    process::exit(0);
}

async fn run() -> Result<()> {
    let config = FixtureConfig::from_env().context("invalid fixture configuration")?;
    info!(
        user = %config.user_rpc_url,
        admin = %config.admin_rpc_url,
        wallets = config.wallets,
        currency = %config.currency,
        derivation = ?config.derivation,
        "starting order book fixture"
    );

    let clients = NodeClients::connect(
        config.user_rpc_url,
        config.admin_rpc_url,
        adjust_timeout(config.rpc_timeout),
    )
    .await
    .context("connecting to the ledger node failed")?;

    let controller = LedgerController::new(clients.admin().clone());
    let provisioner = WalletProvisioner::new(clients.admin().clone(), config.genesis)
        .with_derivation(config.derivation)
        .with_funding(config.funding);
    let mut populator = BookPopulator::new(
        clients.user().clone(),
        clients.admin().clone(),
        config.currency,
    );

    let summary = FillBook::new(config.wallets)
        .run(&controller, &provisioner, &mut populator)
        .await?;

    info!(
        issuer = summary.issuer.address(),
        traders = summary.traders.len(),
        settled_funding = summary.settled_funding,
        offers_created = summary.book.created,
        offers_existing = summary.book.existing,
        offers_rejected = summary.book.rejected,
        settled_offers = summary.settled_offers,
        "order book filled"
    );
    Ok(())
}
