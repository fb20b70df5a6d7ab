use std::ops::RangeInclusive;

use ledger_fixture_core::{
    nodes::{RpcError, RpcHandle},
    tx::{Drops, IssuedAmount, SubmitOptions, Transaction},
    wallet::Wallet,
};
use rand::{Rng, SeedableRng as _, rngs::StdRng};
use thiserror::Error;
use tracing::{info, warn};

/// Bounds (whole units) for both sides of every generated offer.
pub const OFFER_AMOUNT_RANGE: RangeInclusive<u64> = 100..=1000;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("listing offers of trader #{position} ({address}) failed: {source}")]
    ListOffers {
        position: usize,
        address: String,
        #[source]
        source: RpcError,
    },
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Outcome of one pass over the wallets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BookReport {
    /// Offers accepted with `tesSUCCESS` during this pass.
    pub created: usize,
    /// Wallets skipped because they already had a live offer.
    pub existing: usize,
    /// Submissions the node refused.
    pub rejected: usize,
}

/// Places one resting XRP-for-issued-currency offer per wallet.
///
/// Offers are listed through `reader` (the regular-privilege port) and
/// submitted through `signer`. A node only signs on behalf of a seed over an
/// admin connection unless `signing_support` is enabled, so `signer` is
/// normally the admin handle.
pub struct BookPopulator<R = StdRng> {
    reader: RpcHandle,
    signer: RpcHandle,
    currency: String,
    rng: R,
}

impl BookPopulator<StdRng> {
    #[must_use]
    pub fn new(reader: RpcHandle, signer: RpcHandle, currency: impl Into<String>) -> Self {
        Self::with_rng(reader, signer, currency, StdRng::from_entropy())
    }
}

impl<R: Rng + Send> BookPopulator<R> {
    #[must_use]
    pub fn with_rng(reader: RpcHandle, signer: RpcHandle, currency: impl Into<String>, rng: R) -> Self {
        Self {
            reader,
            signer,
            currency: currency.into(),
            rng,
        }
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Creates an offer for every wallet that has none yet.
    ///
    /// A refused submission is logged and skipped; the remaining wallets are
    /// still attempted. Transport failures abort the pass.
    pub async fn populate(&mut self, wallets: &[Wallet], issuer: &Wallet) -> Result<BookReport, BookError> {
        let mut report = BookReport::default();

        for (position, wallet) in wallets.iter().enumerate() {
            let offers = self
                .reader
                .account_offers(wallet.address())
                .await
                .map_err(|source| BookError::ListOffers {
                    position,
                    address: wallet.address().to_owned(),
                    source,
                })?;

            if !offers.is_empty() {
                info!(
                    position,
                    offers = offers.len(),
                    "trader #{position} ({}) created offer already",
                    wallet.address()
                );
                report.existing += 1;
                continue;
            }

            let sell = self.rng.gen_range(OFFER_AMOUNT_RANGE);
            let buy = self.rng.gen_range(OFFER_AMOUNT_RANGE);
            let offer = Transaction::offer_create(
                wallet,
                Drops::from_xrp(sell),
                IssuedAmount::new(&self.currency, issuer.address(), buy),
            );

            match self.signer.submit(offer, SubmitOptions::autofill(wallet)).await {
                Ok(result) if result.is_success() => {
                    info!(
                        position,
                        "trader #{position} ({}) created offer ({sell} XRP for {buy} {})",
                        wallet.address(),
                        self.currency
                    );
                    report.created += 1;
                }
                Ok(result) => {
                    warn!(
                        position,
                        address = wallet.address(),
                        engine_result = %result.engine_result,
                        message = %result.engine_result_message,
                        "offer not accepted, skipping trader"
                    );
                    report.rejected += 1;
                }
                Err(err) if err.node_error().is_some() => {
                    warn!(position, address = wallet.address(), error = %err, "offer submission refused, skipping trader");
                    report.rejected += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            created = report.created,
            existing = report.existing,
            rejected = report.rejected,
            "order book pass finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger_fixture_core::{
        constants::DEFAULT_GENESIS_SEED,
        nodes::{
            LedgerRpc as _,
            fake::{FakeLedger, SIGNING_NOT_SUPPORTED},
        },
        tx::Amount,
        wallet::WalletDerivation,
    };

    use super::*;

    async fn funded_ledger(wallets: &[Wallet]) -> Arc<FakeLedger> {
        let genesis = Wallet::from_family_seed(DEFAULT_GENESIS_SEED).expect("genesis");
        let ledger = Arc::new(FakeLedger::with_genesis(&genesis, Drops::from_xrp(1_000_000)));
        for wallet in wallets {
            let payment = Transaction::payment(&genesis, wallet.address(), Drops::from_xrp(100_000));
            let result = ledger
                .submit(payment, SubmitOptions::autofill(&genesis))
                .await
                .expect("funding payment");
            assert!(result.is_success(), "funding {} failed", wallet.address());
        }
        ledger
    }

    fn wallets(range: std::ops::Range<u64>) -> Vec<Wallet> {
        range
            .map(|index| WalletDerivation::Labelled.derive(index).expect("derive"))
            .collect()
    }

    fn populator(ledger: &Arc<FakeLedger>) -> BookPopulator {
        BookPopulator::with_rng(
            FakeLedger::user_port(ledger),
            ledger.clone(),
            "XAU",
            StdRng::seed_from_u64(7),
        )
    }

    #[tokio::test]
    async fn creates_one_offer_per_wallet_within_range() {
        let all = wallets(0..4);
        let (issuer, traders) = all.split_first().expect("issuer");
        let ledger = funded_ledger(&all).await;

        let report = populator(&ledger).populate(traders, issuer).await.expect("populate");

        assert_eq!(report.created, 3);
        for trader in traders {
            let offers = ledger.offers(trader.address());
            assert_eq!(offers.len(), 1);
            let sell = offers[0].taker_gets.as_drops().expect("xrp side").get();
            assert_eq!(sell % 1_000_000, 0);
            assert!(OFFER_AMOUNT_RANGE.contains(&(sell / 1_000_000)));

            let Amount::Issued(buy) = &offers[0].taker_pays else {
                panic!("issued side expected");
            };
            assert_eq!(buy.currency, "XAU");
            assert_eq!(buy.issuer, issuer.address());
            let value: u64 = buy.value.parse().expect("integer value");
            assert!(OFFER_AMOUNT_RANGE.contains(&value));
        }
    }

    #[tokio::test]
    async fn second_pass_creates_nothing() {
        let all = wallets(0..3);
        let (issuer, traders) = all.split_first().expect("issuer");
        let ledger = funded_ledger(&all).await;
        let mut populator = populator(&ledger);

        let first = populator.populate(traders, issuer).await.expect("first pass");
        let second = populator.populate(traders, issuer).await.expect("second pass");

        assert_eq!(first.created, 2);
        assert_eq!(second.created, 0);
        assert_eq!(second.existing, 2);
        assert_eq!(ledger.submissions_of("OfferCreate"), 2);
    }

    #[tokio::test]
    async fn rejected_offer_does_not_stop_the_batch() {
        let all = wallets(0..5);
        let (issuer, traders) = all.split_first().expect("issuer");
        let ledger = funded_ledger(&all).await;
        ledger.reject_offers_from(traders[1].address(), "tecUNFUNDED_OFFER");
        ledger.fail_submit_from(traders[2].address(), "invalidTransaction");

        let report = populator(&ledger).populate(traders, issuer).await.expect("populate");

        assert_eq!(report.created, 2);
        assert_eq!(report.rejected, 2);
        assert!(ledger.offers(traders[1].address()).is_empty());
        assert!(ledger.offers(traders[2].address()).is_empty());
        assert_eq!(ledger.offers(traders[3].address()).len(), 1);
    }

    #[tokio::test]
    async fn failing_offer_listing_is_fatal() {
        let all = wallets(0..3);
        let (issuer, traders) = all.split_first().expect("issuer");
        let ledger = funded_ledger(&all).await;
        ledger.fail_account_offers(traders[0].address(), "noNetwork");

        let err = populator(&ledger)
            .populate(traders, issuer)
            .await
            .expect_err("listing failure");

        assert!(matches!(err, BookError::ListOffers { position: 0, .. }));
        assert_eq!(ledger.submissions_of("OfferCreate"), 0);
    }

    #[tokio::test]
    async fn offers_are_signed_through_the_admin_port() {
        let all = wallets(0..3);
        let (issuer, traders) = all.split_first().expect("issuer");
        let ledger = funded_ledger(&all).await;
        let user = FakeLedger::user_port(&ledger);
        assert_eq!(user.label(), "fake-user");

        let refused = user
            .submit(
                Transaction::offer_create(&traders[0], Drops::from_xrp(100), IssuedAmount::new("XAU", issuer.address(), 100)),
                SubmitOptions::autofill(&traders[0]),
            )
            .await
            .expect_err("user port does not sign");
        assert_eq!(refused.node_error(), Some(SIGNING_NOT_SUPPORTED));

        let report = populator(&ledger).populate(traders, issuer).await.expect("populate");

        assert_eq!(report.created, 2);
        assert_eq!(report.rejected, 0);
    }

    #[tokio::test]
    async fn signing_on_the_user_port_rejects_every_offer() {
        let all = wallets(0..4);
        let (issuer, traders) = all.split_first().expect("issuer");
        let ledger = funded_ledger(&all).await;
        let user = FakeLedger::user_port(&ledger);
        let mut populator = BookPopulator::with_rng(user.clone(), user, "XAU", StdRng::seed_from_u64(7));

        let report = populator.populate(traders, issuer).await.expect("populate");

        assert_eq!(report.created, 0);
        assert_eq!(report.rejected, 3);
        assert!(traders.iter().all(|t| ledger.offers(t.address()).is_empty()));
    }
}
