//! Stats & Notifications: exponential moving averages of cooldown and
//! overload, a tiered-state snapshot for UI, and rate-limited textual
//! notifications.
//!
//! Grounded on `orchestrator::engine`'s `DailyMetrics`/`CostAccumulator`
//! running-aggregate style, reworked as persistent per-colony EMAs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classifier::TierBuckets;
use crate::models::colony::{Colony, ColonyId};
use crate::models::resource::{Resource, RESOURCE_EXCHANGE_ORDER};
use crate::models::tier::Tier;

/// Window (in ticks) over which `avgCooldown` is averaged.
pub const AVG_COOLDOWN_WINDOW: f64 = 1_000.0;
/// Window (in ticks) over which `overload` is averaged — a creep
/// lifetime, the domain's standard "long enough to smooth noise" span.
pub const CREEP_LIFE_TIME: f64 = 1_500.0;
/// Notifications for an unfulfillable request/provide are rate-limited to
/// once every 5 ticks.
pub const NOTIFICATION_THROTTLE_TICKS: usize = 5;

/// A single exponential moving average with a fixed window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ema {
    value: f64,
    alpha: f64,
}

impl Ema {
    pub fn new(window: f64) -> Self {
        Self {
            value: 0.0,
            alpha: 2.0 / (window + 1.0),
        }
    }

    pub fn update(&mut self, sample: f64) {
        self.value += self.alpha * (sample - self.value);
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Persistent per-terminal EMAs, updated once per tick in `record_stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalStats {
    avg_cooldown: HashMap<ColonyId, Ema>,
    overload_ema: HashMap<ColonyId, Ema>,
}

impl TerminalStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn avg_cooldown(&self, colony: ColonyId) -> f64 {
        self.avg_cooldown.get(&colony).map(|e| e.value()).unwrap_or(0.0)
    }

    pub fn overload(&self, colony: ColonyId) -> f64 {
        self.overload_ema.get(&colony).map(|e| e.value()).unwrap_or(0.0)
    }

    /// Update every colony's cooldown EMA from its live terminal state,
    /// and every colony's overload EMA from whether it was flagged this
    /// tick. Idempotent when inputs repeat (P7): re-running with the same
    /// cooldown/overload set converges rather than oscillates.
    pub fn record_tick(&mut self, colonies: &[Colony], overloaded: &std::collections::HashSet<ColonyId>) {
        for (index, colony) in colonies.iter().enumerate() {
            let id = ColonyId::from_index(index);
            let cooldown = colony.terminal().map(|t| t.cooldown() as f64).unwrap_or(0.0);
            self.avg_cooldown
                .entry(id)
                .or_insert_with(|| Ema::new(AVG_COOLDOWN_WINDOW))
                .update(cooldown);

            let overload_signal = if overloaded.contains(&id) { 1.0 } else { 0.0 };
            self.overload_ema
                .entry(id)
                .or_insert_with(|| Ema::new(CREEP_LIFE_TIME))
                .update(overload_signal);
        }
    }
}

/// Per-colony, per-tier resource lists for the UI / persisted state
/// layout (`states: { activeProviders | ...: { <colony>: [resource, ...] } }`).
#[derive(Debug, Clone, Default)]
pub struct TierSnapshot {
    by_tier: HashMap<Tier, HashMap<ColonyId, Vec<Resource>>>,
}

impl TierSnapshot {
    pub fn from_buckets(buckets: &TierBuckets) -> Self {
        let mut snapshot = TierSnapshot::default();
        for tier in [
            Tier::ActiveProvider,
            Tier::PassiveProvider,
            Tier::Equilibrium,
            Tier::PassiveRequestor,
            Tier::ActiveRequestor,
        ] {
            let mut per_colony: HashMap<ColonyId, Vec<Resource>> = HashMap::new();
            for &resource in RESOURCE_EXCHANGE_ORDER {
                for &colony in buckets.for_resource(tier, resource) {
                    per_colony.entry(colony).or_default().push(resource);
                }
            }
            snapshot.by_tier.insert(tier, per_colony);
        }
        snapshot
    }

    pub fn colonies_in(&self, tier: Tier) -> impl Iterator<Item = (&ColonyId, &Vec<Resource>)> {
        self.by_tier.get(&tier).into_iter().flat_map(|m| m.iter())
    }
}

/// Tracks the last tick an unfulfillable-request notification fired for a
/// `(colony, resource)` pair, so repeats are suppressed within the
/// throttle window.
#[derive(Debug, Clone, Default)]
pub struct NotificationThrottle {
    last_notified: HashMap<(ColonyId, Resource), usize>,
}

impl NotificationThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` (and records the tick) iff this pair hasn't fired a
    /// notification within the last `NOTIFICATION_THROTTLE_TICKS` ticks.
    pub fn should_notify(&mut self, colony: ColonyId, resource: Resource, tick: usize) -> bool {
        let key = (colony, resource);
        let ready = match self.last_notified.get(&key) {
            Some(last) => tick.saturating_sub(*last) >= NOTIFICATION_THROTTLE_TICKS,
            None => true,
        };
        if ready {
            self.last_notified.insert(key, tick);
        }
        ready
    }
}
