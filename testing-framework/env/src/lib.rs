use std::env;

#[must_use]
pub fn slow_test_env() -> bool {
    env::var("SLOW_TEST_ENV").is_ok_and(|s| s == "true")
}

#[must_use]
pub fn fixture_user_rpc_url() -> Option<String> {
    env::var("FIXTURE_USER_RPC_URL").ok()
}

#[must_use]
pub fn fixture_admin_rpc_url() -> Option<String> {
    env::var("FIXTURE_ADMIN_RPC_URL").ok()
}

#[must_use]
pub fn fixture_genesis_seed() -> Option<String> {
    env::var("FIXTURE_GENESIS_SEED").ok()
}

#[must_use]
pub fn fixture_wallet_key() -> Option<String> {
    env::var("FIXTURE_WALLET_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

#[must_use]
pub fn fixture_book_currency() -> Option<String> {
    env::var("FIXTURE_BOOK_CURRENCY").ok()
}

/// Raw value; parsed and validated by the runner config.
#[must_use]
pub fn fixture_wallets() -> Option<String> {
    env::var("FIXTURE_WALLETS").ok()
}

#[must_use]
pub fn fixture_funding_drops() -> Option<String> {
    env::var("FIXTURE_FUNDING_DROPS").ok()
}

#[must_use]
pub fn fixture_rpc_timeout_secs() -> Option<String> {
    env::var("FIXTURE_RPC_TIMEOUT_SECS").ok()
}
