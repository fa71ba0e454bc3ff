//! Orchestrator: owns the colony roster, threshold overrides, and
//! persistent ledger/stats, and drives the per-tick run pipeline.
//!
//! See `engine.rs` for the full implementation.

pub mod checkpoint;
pub mod engine;

pub use checkpoint::NetworkCheckpoint;
pub use engine::{NetworkConfig, TerminalNetwork, TickReport};
