use std::time::Duration;

/// Default JSON-RPC endpoint for the regular-privilege role.
pub const DEFAULT_USER_RPC_URL: &str = "http://127.0.0.1:51234";

/// Default JSON-RPC endpoint for the admin role.
pub const DEFAULT_ADMIN_RPC_URL: &str = "http://127.0.0.1:5005";

/// Family seed of the genesis account of a freshly started standalone node.
pub const DEFAULT_GENESIS_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";

/// Default number of trader wallets created by the book fixture.
pub const DEFAULT_TRADER_WALLETS: usize = 1000;

/// Amount moved from genesis to every new test wallet (100,000 XRP).
pub const DEFAULT_FUNDING_DROPS: u64 = 100_000_000_000;

/// Issued currency the book fixture asks for in exchange for XRP.
pub const DEFAULT_BOOK_CURRENCY: &str = "XAU";

/// Default per-request RPC timeout.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Ledgers added to the current index when autofilling `LastLedgerSequence`.
pub const LAST_LEDGER_OFFSET: u32 = 20;

