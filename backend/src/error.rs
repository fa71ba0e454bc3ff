//! Error types for the Terminal Network.
//!
//! No error here crosses the tick boundary (spec §7): `TransferError` is
//! folded into overload flags and notifications by the transfer executor
//! and the handlers; `NetworkError` is reserved for configuration-class
//! failures raised outside of `tick()`.

use thiserror::Error;

/// Terminal-level failure returned by a send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("terminal does not have enough of the resource to send")]
    NotEnoughResources,
    #[error("terminal is still on cooldown")]
    Tired,
    #[error("transfer failed: {0}")]
    Other(String),
}

/// Configuration-class failure raised by the network's registration and
/// override API, outside of the per-tick pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("colony {0} is not eligible: requires an owned terminal and level >= 6")]
    IneligibleColony(String),
    #[error("colony {0} is already registered")]
    DuplicateColony(String),
    #[error("unknown colony {0}")]
    UnknownColony(String),
    #[error("requestResource({colony}, {resource}): colony already holds at least {amount}")]
    RequestAlreadySatisfied {
        colony: String,
        resource: String,
        amount: i64,
    },
    #[error("run() called with no registered colonies")]
    EmptyNetwork,
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}
