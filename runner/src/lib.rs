pub mod config;
pub mod defaults;

pub use config::{FixtureConfig, FixtureSettings};
