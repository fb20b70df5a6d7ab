mod api_client;
#[cfg(any(test, feature = "testing"))]
pub mod fake;
mod rpc;

pub use api_client::{ClientRole, FeeDrops, FeeInfo, RpcClient};
pub use rpc::{
    ACCOUNT_NOT_FOUND, AccountInfo, AccountOffer, AccountRoot, LedgerRpc, RpcError, RpcHandle,
};
