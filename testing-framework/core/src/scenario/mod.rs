mod control;
mod node_clients;

pub use control::{LedgerController, LedgerSnapshot};
pub use node_clients::NodeClients;
