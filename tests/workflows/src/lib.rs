//! Shared setup for the tests that need a running standalone node.

use anyhow::{Context as _, Result};
use ledger_fixture_core::{
    adjust_timeout,
    scenario::{LedgerController, NodeClients},
};
use ledger_fixture_runner::FixtureConfig;
use ledger_fixture_workflows::WalletProvisioner;

/// Everything a live test needs, built from the `FIXTURE_*` environment.
pub struct LiveFixture {
    pub config: FixtureConfig,
    pub clients: NodeClients,
    pub controller: LedgerController,
    pub provisioner: WalletProvisioner,
}

pub async fn live_fixture() -> Result<LiveFixture> {
    let _ = tracing_subscriber::fmt::try_init();

    let config = FixtureConfig::from_env()?;
    let clients = NodeClients::connect(
        config.user_rpc_url.clone(),
        config.admin_rpc_url.clone(),
        adjust_timeout(config.rpc_timeout),
    )
    .await
    .context("standalone node not reachable")?;

    let controller = LedgerController::new(clients.admin().clone());
    let provisioner = WalletProvisioner::new(clients.admin().clone(), config.genesis.clone())
        .with_derivation(config.derivation.clone())
        .with_funding(config.funding);

    Ok(LiveFixture {
        config,
        clients,
        controller,
        provisioner,
    })
}
