pub mod workloads;

pub use workloads::{
    book::{BookError, BookPopulator, BookReport, OFFER_AMOUNT_RANGE},
    fill_book::{FillBook, FillBookError, FillBookSummary, ISSUER_INDEX},
    provision::{FundingPolicy, ProvisionError, WalletProvisioner},
};
