//! Terminal Network Core - Rust Engine
//!
//! Deterministic simulation of resource balancing across a network of
//! colonies, run one tick at a time.
//!
//! # Architecture
//!
//! - **core**: Tick management
//! - **models**: Domain types (Colony, Resource, Thresholds, Tier)
//! - **classifier**: Per-tick state classification and tier bucketing
//! - **handlers**: Requestor/provider matching and transfer execution
//! - **orchestrator**: Owns the network, drives the run pipeline
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All resource amounts are i64
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Errors never cross the tick boundary; `run_tick` only fails for
//!    configuration-class problems (e.g. an empty network)

// Module declarations
pub mod classifier;
pub mod core;
pub mod error;
pub mod events;
pub mod handlers;
pub mod market;
pub mod models;
pub mod orchestrator;
pub mod partner;
pub mod rng;
pub mod stats;
pub mod transfer;

// Re-exports for convenience
pub use classifier::{assign_colony_states, SpaceCaps, TierBuckets};
pub use error::{NetworkError, TransferError};
pub use events::{ConsoleNotifier, EventLog, InMemoryNotifier, NetworkEvent, Notifier};
pub use market::{MarketAdapter, MarketGate, NullMarket, SellOptions};
pub use models::{
    colony::{Colony, ColonyId, Terminal},
    resource::{Resource, ResourceClass, RESOURCE_EXCHANGE_ORDER},
    thresholds::{ThresholdPolicy, ThresholdTable, Thresholds},
    tier::Tier,
};
pub use orchestrator::{NetworkCheckpoint, NetworkConfig, TerminalNetwork, TickReport};
pub use rng::RngManager;
pub use stats::{NotificationThrottle, TerminalStats};
