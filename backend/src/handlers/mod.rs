//! Request Handler and Provide Handler: the pipeline stages that turn a
//! tier bucket into actual transfers, divvying, and market fallthrough.
//!
//! Grounded on `policy::liquidity_aware`'s multi-branch decision
//! procedure shape (tiered candidate search, then a fallback, then
//! another fallback).

pub mod provide;
pub mod request;

use std::collections::HashSet;

use crate::classifier::SpaceCaps;
use crate::events::EventLog;
use crate::market::MarketGate;
use crate::models::colony::{Colony, ColonyId};
use crate::models::ledger::TransferLedger;
use crate::models::thresholds::ThresholdTable;
use crate::stats::{NotificationThrottle, TerminalStats};

pub use provide::{handle_providers, ProvideOptions};
pub use request::{handle_requestors, RequestOptions};

/// Bundles the mutable/shared state both handlers need, so neither
/// function grows an unwieldy parameter list.
pub struct HandlerContext<'a> {
    pub colonies: &'a mut [Colony],
    pub thresholds: &'a ThresholdTable,
    pub ledger: &'a mut TransferLedger,
    pub overload: &'a mut HashSet<ColonyId>,
    pub events: &'a mut EventLog,
    pub notify_throttle: &'a mut NotificationThrottle,
    pub terminal_stats: &'a TerminalStats,
    pub current_tick: usize,
    pub space_caps: SpaceCaps,
    /// Credits available for market buys, gated per-resource by `market_gate`.
    pub credits: i64,
    pub market_gate: MarketGate,
}
