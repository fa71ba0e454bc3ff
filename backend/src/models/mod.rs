//! Domain models for the Terminal Network

pub mod colony;
pub mod ledger;
pub mod resource;
pub mod thresholds;
pub mod tier;

// Re-exports
pub use colony::{Colony, ColonyId, Terminal};
pub use ledger::TransferLedger;
pub use resource::{Resource, ResourceClass, RESOURCE_EXCHANGE_ORDER};
pub use thresholds::{ThresholdPolicy, ThresholdTable, Thresholds, LAB_CAP};
pub use tier::Tier;
