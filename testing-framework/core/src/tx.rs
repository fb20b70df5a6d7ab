use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::wallet::Wallet;

/// The only engine result treated as a successful submission.
pub const TES_SUCCESS: &str = "tesSUCCESS";

/// Drops in one XRP.
pub const DROPS_PER_XRP: u64 = 1_000_000;

/// Integer amount of the native asset, serialized as a decimal string.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Drops(#[serde_as(as = "DisplayFromStr")] u64);

impl Drops {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(drops: u64) -> Self {
        Self(drops)
    }

    #[must_use]
    pub const fn from_xrp(xrp: u64) -> Self {
        Self(xrp * DROPS_PER_XRP)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Balance in XRP, trailing zeros of the fractional part trimmed.
    #[must_use]
    pub fn to_xrp_string(self) -> String {
        let whole = self.0 / DROPS_PER_XRP;
        let frac = self.0 % DROPS_PER_XRP;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:06}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl fmt::Display for Drops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount denominated in a non-native asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedAmount {
    pub currency: String,
    pub issuer: String,
    pub value: String,
}

impl IssuedAmount {
    #[must_use]
    pub fn new(currency: impl Into<String>, issuer: impl Into<String>, value: impl ToString) -> Self {
        Self {
            currency: currency.into(),
            issuer: issuer.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Drops(Drops),
    Issued(IssuedAmount),
}

impl Amount {
    #[must_use]
    pub const fn as_drops(&self) -> Option<Drops> {
        match self {
            Self::Drops(drops) => Some(*drops),
            Self::Issued(_) => None,
        }
    }

    #[must_use]
    pub const fn as_issued(&self) -> Option<&IssuedAmount> {
        match self {
            Self::Drops(_) => None,
            Self::Issued(issued) => Some(issued),
        }
    }
}

impl From<Drops> for Amount {
    fn from(drops: Drops) -> Self {
        Self::Drops(drops)
    }
}

impl From<IssuedAmount> for Amount {
    fn from(issued: IssuedAmount) -> Self {
        Self::Issued(issued)
    }
}

/// Transaction-type specific fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "TransactionType", rename_all_fields = "PascalCase")]
pub enum TxKind {
    Payment { destination: String, amount: Amount },
    OfferCreate { taker_gets: Amount, taker_pays: Amount },
}

impl TxKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Payment { .. } => "Payment",
            Self::OfferCreate { .. } => "OfferCreate",
        }
    }
}

/// Unsigned transaction as sent in `tx_json`.
///
/// `fee`, `sequence` and `last_ledger_sequence` are left empty when the
/// submission asks for autofill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub account: String,
    #[serde(flatten)]
    pub kind: TxKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Drops>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ledger_sequence: Option<u32>,
}

impl Transaction {
    #[must_use]
    pub fn new(account: impl Into<String>, kind: TxKind) -> Self {
        Self {
            account: account.into(),
            kind,
            fee: None,
            sequence: None,
            last_ledger_sequence: None,
        }
    }

    #[must_use]
    pub fn payment(from: &Wallet, destination: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self::new(
            from.address(),
            TxKind::Payment {
                destination: destination.into(),
                amount: amount.into(),
            },
        )
    }

    #[must_use]
    pub fn offer_create(owner: &Wallet, taker_gets: impl Into<Amount>, taker_pays: impl Into<Amount>) -> Self {
        Self::new(
            owner.address(),
            TxKind::OfferCreate {
                taker_gets: taker_gets.into(),
                taker_pays: taker_pays.into(),
            },
        )
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    #[must_use]
    pub const fn is_filled(&self) -> bool {
        self.fee.is_some() && self.sequence.is_some() && self.last_ledger_sequence.is_some()
    }
}

/// How a transaction is prepared and signed on submission.
#[derive(Clone, Copy, Debug)]
pub struct SubmitOptions<'a> {
    /// Let the client layer fill sequence, fee and last ledger sequence.
    pub autofill: bool,
    pub wallet: &'a Wallet,
}

impl<'a> SubmitOptions<'a> {
    #[must_use]
    pub const fn autofill(wallet: &'a Wallet) -> Self {
        Self {
            autofill: true,
            wallet,
        }
    }
}

/// Synchronous verdict returned by the node for a submission.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SubmitResult {
    pub engine_result: String,
    #[serde(default)]
    pub engine_result_code: i32,
    #[serde(default)]
    pub engine_result_message: String,
}

impl SubmitResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.engine_result == TES_SUCCESS
    }
}
