use std::{fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context as _, Result, anyhow, bail, ensure};
use ledger_fixture_core::{
    constants::{
        DEFAULT_ADMIN_RPC_URL, DEFAULT_BOOK_CURRENCY, DEFAULT_FUNDING_DROPS, DEFAULT_GENESIS_SEED,
        DEFAULT_RPC_TIMEOUT, DEFAULT_TRADER_WALLETS, DEFAULT_USER_RPC_URL,
    },
    tx::Drops,
    wallet::{Wallet, WalletDerivation},
};
use ledger_fixture_env as tf_env;
use reqwest::Url;

/// Raw knobs as read from the environment, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureSettings {
    pub user_rpc_url: String,
    pub admin_rpc_url: String,
    pub genesis_seed: String,
    pub wallets: usize,
    pub funding_drops: u64,
    pub currency: String,
    pub wallet_key: Option<String>,
    pub rpc_timeout: Duration,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            user_rpc_url: DEFAULT_USER_RPC_URL.to_owned(),
            admin_rpc_url: DEFAULT_ADMIN_RPC_URL.to_owned(),
            genesis_seed: DEFAULT_GENESIS_SEED.to_owned(),
            wallets: DEFAULT_TRADER_WALLETS,
            funding_drops: DEFAULT_FUNDING_DROPS,
            currency: DEFAULT_BOOK_CURRENCY.to_owned(),
            wallet_key: None,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl FixtureSettings {
    /// Reads `FIXTURE_*` variables, keeping defaults for unset ones. A set
    /// but unparseable numeric variable is an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let timeout_secs = parse_setting(
            "FIXTURE_RPC_TIMEOUT_SECS",
            tf_env::fixture_rpc_timeout_secs(),
            defaults.rpc_timeout.as_secs(),
        )?;

        Ok(Self {
            user_rpc_url: tf_env::fixture_user_rpc_url().unwrap_or(defaults.user_rpc_url),
            admin_rpc_url: tf_env::fixture_admin_rpc_url().unwrap_or(defaults.admin_rpc_url),
            genesis_seed: tf_env::fixture_genesis_seed().unwrap_or(defaults.genesis_seed),
            wallets: parse_setting("FIXTURE_WALLETS", tf_env::fixture_wallets(), defaults.wallets)?,
            funding_drops: parse_setting(
                "FIXTURE_FUNDING_DROPS",
                tf_env::fixture_funding_drops(),
                defaults.funding_drops,
            )?,
            currency: tf_env::fixture_book_currency().unwrap_or(defaults.currency),
            wallet_key: tf_env::fixture_wallet_key(),
            rpc_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Checks every knob without touching the network.
    pub fn validate(self) -> Result<FixtureConfig> {
        let user_rpc_url = parse_url("FIXTURE_USER_RPC_URL", &self.user_rpc_url)?;
        let admin_rpc_url = parse_url("FIXTURE_ADMIN_RPC_URL", &self.admin_rpc_url)?;

        ensure!(self.wallets > 0, "FIXTURE_WALLETS must be at least 1");
        ensure!(self.funding_drops > 0, "FIXTURE_FUNDING_DROPS must be positive");
        ensure!(
            is_currency_code(&self.currency),
            "FIXTURE_BOOK_CURRENCY must be a three character code other than XRP, got {:?}",
            self.currency
        );
        ensure!(!self.rpc_timeout.is_zero(), "FIXTURE_RPC_TIMEOUT_SECS must be positive");

        let genesis = Wallet::from_family_seed(self.genesis_seed.trim())
            .context("FIXTURE_GENESIS_SEED is not a valid family seed")?;

        let derivation = match self.wallet_key.as_deref().map(str::trim) {
            None | Some("") => WalletDerivation::Labelled,
            Some(key) => {
                let key = hex::decode(key).context("FIXTURE_WALLET_KEY must be hex")?;
                if key.is_empty() {
                    bail!("FIXTURE_WALLET_KEY decodes to an empty key");
                }
                WalletDerivation::keyed(key)
            }
        };

        Ok(FixtureConfig {
            user_rpc_url,
            admin_rpc_url,
            genesis,
            wallets: self.wallets,
            funding: Drops::new(self.funding_drops),
            currency: self.currency,
            derivation,
            rpc_timeout: self.rpc_timeout,
        })
    }
}

/// Validated run configuration.
#[derive(Debug)]
pub struct FixtureConfig {
    pub user_rpc_url: Url,
    pub admin_rpc_url: Url,
    pub genesis: Wallet,
    pub wallets: usize,
    pub funding: Drops,
    pub currency: String,
    pub derivation: WalletDerivation,
    pub rpc_timeout: Duration,
}

impl FixtureConfig {
    pub fn from_env() -> Result<Self> {
        FixtureSettings::from_env()?.validate()
    }
}

/// Parses `raw` when the variable is set, otherwise returns `default`.
fn parse_setting<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("{name} is not a valid number: {raw:?} ({err})")),
    }
}

// The HTTP client is built without TLS support.
fn parse_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("{name} is not a valid URL: {raw:?}"))?;
    ensure!(url.scheme() == "http", "{name} must use http, got {}", url.scheme());
    Ok(url)
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphanumeric()) && !code.eq_ignore_ascii_case("XRP")
}
