use anyhow::Result;
use ledger_fixture_core::tx::Drops;
use ledger_fixture_workflows::{BookPopulator, FillBook};
use serial_test::serial;
use tests_workflows::live_fixture;

// Required env (defaults target a local `rippled --standalone`):
// - `FIXTURE_USER_RPC_URL` / `FIXTURE_ADMIN_RPC_URL`
// - `FIXTURE_WALLET_KEY` (optional, isolates runs from other fixtures)

const SMALL_BOOK: usize = 3;

#[tokio::test]
#[serial]
#[ignore = "requires a standalone rippled node"]
async fn advance_without_pending_transactions_keeps_the_ledger() -> Result<()> {
    let fx = live_fixture().await?;
    fx.controller.advance(true).await?;
    let before = fx.controller.snapshot().await?;

    let settled = fx.controller.advance(false).await?;

    assert_eq!(settled, 0);
    assert_eq!(fx.controller.snapshot().await?.current_index, before.current_index);
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a standalone rippled node"]
async fn provisioned_wallet_is_funded_and_stable() -> Result<()> {
    let fx = live_fixture().await?;

    let first = fx.provisioner.provision(1).await?;
    fx.controller.advance(false).await?;
    let second = fx.provisioner.provision(1).await?;

    assert_eq!(first.address(), second.address());
    let info = fx.clients.admin().account_info(first.address()).await?;
    assert!(info.balance() >= Drops::new(fx.config.funding.get() / 2));
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a standalone rippled node"]
async fn small_book_fills_once() -> Result<()> {
    let fx = live_fixture().await?;
    let mut populator = BookPopulator::new(
        fx.clients.user().clone(),
        fx.clients.admin().clone(),
        fx.config.currency.clone(),
    );
    let job = FillBook::new(SMALL_BOOK);

    let first = job.run(&fx.controller, &fx.provisioner, &mut populator).await?;
    for trader in &first.traders {
        let offers = fx.clients.user().account_offers(trader.address()).await?;
        assert_eq!(offers.len(), 1, "trader {} has no single offer", trader.address());
    }

    let second = job.run(&fx.controller, &fx.provisioner, &mut populator).await?;
    assert_eq!(second.book.created, 0);
    assert_eq!(second.book.existing, SMALL_BOOK);
    assert_eq!(second.settled_offers, 0);
    Ok(())
}
