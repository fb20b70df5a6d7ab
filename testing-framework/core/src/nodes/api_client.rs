use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::rpc::{AccountInfo, AccountOffer, LedgerRpc, RpcError};
use crate::{
    constants::LAST_LEDGER_OFFSET,
    tx::{Drops, SubmitOptions, SubmitResult, Transaction},
};

/// Privilege level of an RPC endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClientRole {
    User,
    Admin,
}

impl ClientRole {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "regular",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for ClientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    result: Value,
}

#[derive(Debug, Deserialize)]
struct LedgerCurrent {
    ledger_current_index: u32,
}

#[derive(Debug, Deserialize)]
struct LedgerResult {
    ledger: LedgerBody,
}

#[derive(Debug, Deserialize)]
struct LedgerBody {
    #[serde(default)]
    transactions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AccountOffers {
    #[serde(default)]
    offers: Vec<AccountOffer>,
}

/// Result of the `fee` command.
#[derive(Clone, Debug, Deserialize)]
pub struct FeeInfo {
    pub drops: FeeDrops,
    pub ledger_current_index: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FeeDrops {
    pub base_fee: Drops,
    pub open_ledger_fee: Drops,
}

#[derive(Serialize)]
struct SubmitParams<'a> {
    tx_json: &'a Transaction,
    seed_hex: String,
    key_type: &'static str,
    offline: bool,
}

/// Thin async JSON-RPC client for one node endpoint.
#[derive(Clone)]
pub struct RpcClient {
    url: Url,
    role: ClientRole,
    client: Client,
}

impl RpcClient {
    pub fn with_timeout(url: Url, role: ClientRole, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, role, client })
    }

    /// Construct and verify the endpoint answers `ping`.
    pub async fn connect(url: Url, role: ClientRole, timeout: Duration) -> Result<Self, RpcError> {
        let client = Self::with_timeout(url, role, timeout)?;
        client.ping().await?;
        info!("connected to {} ({role})", client.url);
        Ok(client)
    }

    pub async fn ping(&self) -> Result<(), RpcError> {
        self.request::<_, Value>("ping", &json!({})).await.map(|_| ())
    }

    /// Open-ledger fee and current ledger index.
    pub async fn fee(&self) -> Result<FeeInfo, RpcError> {
        self.request("fee", &json!({})).await
    }

    /// Issue `command` and decode its `result` object.
    pub async fn request<P, R>(&self, command: &str, params: &P) -> Result<R, RpcError>
    where
        P: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        debug!(role = self.role.label(), command, "rpc request");
        let envelope: RpcEnvelope = self
            .client
            .post(self.url.clone())
            .json(&json!({ "method": command, "params": [params] }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_result(command, envelope.result)
    }

    async fn autofill(&self, tx: &mut Transaction) -> Result<(), RpcError> {
        if tx.sequence.is_none() {
            let info = self.account_info(&tx.account).await?;
            tx.sequence = Some(info.account_data.sequence);
        }

        if tx.fee.is_none() || tx.last_ledger_sequence.is_none() {
            let fee = self.fee().await?;
            if tx.fee.is_none() {
                tx.fee = Some(fee.drops.open_ledger_fee.max(fee.drops.base_fee));
            }
            if tx.last_ledger_sequence.is_none() {
                tx.last_ledger_sequence = Some(fee.ledger_current_index + LAST_LEDGER_OFFSET);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl LedgerRpc for RpcClient {
    fn label(&self) -> &str {
        self.role.label()
    }

    async fn ledger_current(&self) -> Result<u32, RpcError> {
        let current: LedgerCurrent = self.request("ledger_current", &json!({})).await?;
        Ok(current.ledger_current_index)
    }

    async fn ledger_transactions(&self, ledger_index: u32) -> Result<Vec<String>, RpcError> {
        let params = json!({ "ledger_index": ledger_index, "transactions": true });
        let result: LedgerResult = self.request("ledger", &params).await?;
        Ok(result.ledger.transactions)
    }

    async fn ledger_accept(&self) -> Result<u32, RpcError> {
        let accepted: LedgerCurrent = self.request("ledger_accept", &json!({})).await?;
        Ok(accepted.ledger_current_index)
    }

    async fn account_info(&self, address: &str) -> Result<AccountInfo, RpcError> {
        let params = json!({ "account": address, "ledger_index": "current" });
        self.request("account_info", &params).await
    }

    async fn account_offers(&self, address: &str) -> Result<Vec<AccountOffer>, RpcError> {
        let params = json!({ "account": address, "ledger_index": "current" });
        let result: AccountOffers = self.request("account_offers", &params).await?;
        Ok(result.offers)
    }

    async fn submit(
        &self,
        mut tx: Transaction,
        options: SubmitOptions<'_>,
    ) -> Result<SubmitResult, RpcError> {
        if options.autofill {
            self.autofill(&mut tx).await?;
        }

        debug!(
            role = self.role.label(),
            tx_type = tx.type_name(),
            account = %tx.account,
            sequence = ?tx.sequence,
            "submitting transaction"
        );

        let seed = options.wallet.seed();
        let params = SubmitParams {
            tx_json: &tx,
            seed_hex: seed.to_hex(),
            key_type: seed.key_type().as_str(),
            offline: false,
        };
        self.request("submit", &params).await
    }
}

fn decode_result<R: DeserializeOwned>(command: &str, result: Value) -> Result<R, RpcError> {
    if result.get("status").and_then(Value::as_str) == Some("error") {
        let field = |name: &str| result.get(name).and_then(Value::as_str).map(str::to_owned);
        return Err(RpcError::Node {
            command: command.to_owned(),
            error: field("error").unwrap_or_else(|| "unknown".to_owned()),
            code: result.get("error_code").and_then(Value::as_i64),
            message: field("error_message"),
        });
    }

    serde_json::from_value(result).map_err(|source| RpcError::Decode {
        command: command.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tx::Amount;

    #[test]
    fn error_status_becomes_node_error() {
        let result = json!({
            "status": "error",
            "error": "actNotFound",
            "error_code": 19,
            "error_message": "Account not found.",
            "request": { "command": "account_info" },
        });

        let err = decode_result::<AccountInfo>("account_info", result).expect_err("error status");
        assert!(err.is_account_not_found());
        assert!(!err.is_transport());
        match err {
            RpcError::Node { code, message, .. } => {
                assert_eq!(code, Some(19));
                assert_eq!(message.as_deref(), Some("Account not found."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn account_info_decodes_balance() {
        let result = json!({
            "status": "success",
            "ledger_current_index": 7,
            "validated": false,
            "account_data": {
                "Account": "rAccount",
                "Balance": "100000000000",
                "Flags": 0,
                "LedgerEntryType": "AccountRoot",
                "OwnerCount": 1,
                "Sequence": 6,
            },
        });

        let info: AccountInfo = decode_result("account_info", result).expect("decode");
        assert_eq!(info.balance(), Drops::from_xrp(100_000));
        assert_eq!(info.account_data.sequence, 6);
        assert_eq!(info.ledger_current_index, Some(7));
    }

    #[test]
    fn account_offers_decode_mixed_amounts() {
        let result = json!({
            "status": "success",
            "account": "rTrader",
            "offers": [{
                "flags": 0,
                "seq": 5,
                "taker_gets": "420000000",
                "taker_pays": { "currency": "XAU", "issuer": "rIssuer", "value": "512" },
                "quality": "0.000001219047619047619",
            }],
        });

        let offers: AccountOffers = decode_result("account_offers", result).expect("decode");
        let offer = &offers.offers[0];
        assert_eq!(offer.seq, 5);
        assert_eq!(offer.taker_gets, Amount::Drops(Drops::from_xrp(420)));
        assert!(offer.taker_pays.as_issued().is_some());
    }

    #[test]
    fn submit_result_keeps_engine_verdict() {
        let result = json!({
            "status": "success",
            "engine_result": "tecUNFUNDED_OFFER",
            "engine_result_code": 103,
            "engine_result_message": "Insufficient balance to fund created offer.",
            "tx_blob": "1200...",
        });

        let submitted: SubmitResult = decode_result("submit", result).expect("decode");
        assert!(!submitted.is_success());
        assert_eq!(submitted.engine_result_code, 103);
    }

    #[test]
    fn unexpected_shape_is_a_decode_error() {
        let err = decode_result::<LedgerCurrent>("ledger_current", json!({ "status": "success" }))
            .expect_err("missing field");
        assert!(matches!(err, RpcError::Decode { .. }));
    }
}
