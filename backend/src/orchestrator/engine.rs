//! Terminal Network orchestrator.
//!
//! Owns every per-tick and persistent piece of state and drives the run
//! pipeline. Grounded on `Orchestrator`: a single struct behind `&mut
//! self`, constructed from a config struct, validated up front, exposing
//! a handful of accessors plus one mutating entry point per tick.
//!
//! # Example
//!
//! ```rust,ignore
//! use terminal_network_core::{NetworkConfig, TerminalNetwork};
//! use terminal_network_core::models::colony::Colony;
//!
//! let mut network = TerminalNetwork::new(NetworkConfig::default());
//! network.add_colony(Colony::new("W1N1", 8, "W1N1")).unwrap();
//! network.begin_tick();
//! network.end_overrides();
//! let report = network.run_tick().unwrap();
//! println!("{}", network.summarize());
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::classifier::{self, SpaceCaps, TierBuckets};
use crate::core::TickCounter;
use crate::error::NetworkError;
use crate::events::{EventLog, NetworkEvent};
use crate::handlers::{handle_providers, handle_requestors, HandlerContext, ProvideOptions, RequestOptions};
use crate::market::{MarketAdapter, MarketGate, NullMarket};
use crate::models::colony::{Colony, ColonyId};
use crate::models::ledger::TransferLedger;
use crate::models::resource::Resource;
use crate::models::thresholds::{Thresholds, ThresholdTable};
use crate::models::tier::Tier;
use crate::rng::RngManager;
use crate::stats::{NotificationThrottle, TerminalStats, TierSnapshot};

/// Construction-time configuration for a [`TerminalNetwork`].
///
/// Generalizes the teacher's `OrchestratorConfig`/`AgentConfig`/`CostRates`
/// split: colonies join one at a time through [`TerminalNetwork::add_colony`]
/// (mirroring spec.md §6's `addColony` registration call) rather than being
/// listed up front, since network membership can grow at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Seed for the deterministic tier-shuffle PRNG.
    pub rng_seed: u64,
    /// Per-structure capacities used by `remainingSpace`.
    pub space_caps: SpaceCaps,
    /// Credit thresholds gating market buy orders.
    pub market_gate: MarketGate,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rng_seed: 1,
            space_caps: SpaceCaps::default(),
            market_gate: MarketGate::default(),
        }
    }
}

/// Summary of one `run_tick()` invocation, returned to the caller.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: usize,
    pub transfers_executed: usize,
    pub notifications_emitted: usize,
    pub overloaded: Vec<String>,
}

/// Owns the colony roster, the threshold table and overrides, the
/// persistent ledger and stats, and the per-tick classification buckets.
///
/// `run_tick()` is the sole mutating entry point for the pipeline proper
/// (mirroring `Orchestrator::tick()`); `&mut self` makes the
/// single-threaded, non-reentrant contract in spec.md §5 a compile-time
/// guarantee rather than a documented convention.
pub struct TerminalNetwork {
    colonies: Vec<Colony>,
    names: HashMap<String, ColonyId>,

    thresholds: ThresholdTable,
    colony_states: HashMap<ColonyId, HashMap<Resource, Tier>>,
    buckets: TierBuckets,

    ledger: TransferLedger,
    terminal_stats: TerminalStats,
    notify_throttle: NotificationThrottle,
    tier_snapshot: TierSnapshot,

    overload: HashSet<ColonyId>,
    events: EventLog,

    rng: RngManager,
    tick_counter: TickCounter,

    space_caps: SpaceCaps,
    market_gate: MarketGate,
    /// Credits available for market buys this tick, gated per-resource by
    /// `market_gate` (spec.md §4.5's `canBuyAbove`/`canBuyEnergyAbove`/
    /// `canBuyBoostsAbove`). Set via [`Self::set_credits`]; defaults to 0,
    /// which fails every gate unless the thresholds are themselves negative.
    credits: i64,

    /// `true` between `begin_tick()` and `end_overrides()`; guards
    /// `request_resource`/`export_resource` against being called outside
    /// the override window spec.md §9 calls out as a sequencing contract.
    overrides_open: bool,
}

impl TerminalNetwork {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            colonies: Vec::new(),
            names: HashMap::new(),
            thresholds: ThresholdTable::new(),
            colony_states: HashMap::new(),
            buckets: TierBuckets::default(),
            ledger: TransferLedger::new(),
            terminal_stats: TerminalStats::new(),
            notify_throttle: NotificationThrottle::new(),
            tier_snapshot: TierSnapshot::default(),
            overload: HashSet::new(),
            events: EventLog::new(),
            rng: RngManager::new(config.rng_seed),
            tick_counter: TickCounter::new(),
            space_caps: config.space_caps,
            market_gate: config.market_gate,
            credits: 0,
            overrides_open: false,
        }
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a colony. Requires an owned terminal and `level >= 6`
    /// (spec.md §6); rejects a duplicate name.
    pub fn add_colony(&mut self, colony: Colony) -> Result<ColonyId, NetworkError> {
        if !colony.is_eligible() {
            return Err(NetworkError::IneligibleColony(colony.name().to_string()));
        }
        if self.names.contains_key(colony.name()) {
            return Err(NetworkError::DuplicateColony(colony.name().to_string()));
        }
        let id = ColonyId::from_index(self.colonies.len());
        self.names.insert(colony.name().to_string(), id);
        self.colonies.push(colony);
        Ok(id)
    }

    pub fn colony_id(&self, name: &str) -> Option<ColonyId> {
        self.names.get(name).copied()
    }

    /// As [`Self::colony_id`], but fails with [`NetworkError::UnknownColony`]
    /// instead of returning `None` — for callers (checkpoint restore, named
    /// lookups from outside the process) that need an error to propagate
    /// rather than a silently absent colony.
    pub fn colony_id_checked(&self, name: &str) -> Result<ColonyId, NetworkError> {
        self.colony_id(name).ok_or_else(|| NetworkError::UnknownColony(name.to_string()))
    }

    pub fn colony(&self, id: ColonyId) -> &Colony {
        &self.colonies[id.index()]
    }

    pub fn thresholds(&self, colony: ColonyId, resource: Resource) -> Thresholds {
        self.thresholds.thresholds(colony, resource)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn terminal_stats(&self) -> &TerminalStats {
        &self.terminal_stats
    }

    pub fn ledger(&self) -> &TransferLedger {
        &self.ledger
    }

    pub fn current_tick(&self) -> usize {
        self.tick_counter.current()
    }

    pub fn colony_names(&self) -> &HashMap<String, ColonyId> {
        &self.names
    }

    pub fn tier_snapshot(&self) -> &TierSnapshot {
        &self.tier_snapshot
    }

    pub fn credits(&self) -> i64 {
        self.credits
    }

    /// Set the credits available for this and future ticks' market buys.
    pub fn set_credits(&mut self, credits: i64) {
        self.credits = credits;
    }

    // ------------------------------------------------------------------
    // Two-phase tick API (spec.md §9 redesign flag)
    // ------------------------------------------------------------------

    /// `refresh()` + `init()`: discards last tick's per-tick state,
    /// re-derives the dynamic energy threshold from current holdings,
    /// and opens the override window.
    pub fn begin_tick(&mut self) {
        self.colony_states.clear();
        self.buckets = TierBuckets::default();
        self.overload.clear();
        self.events.clear();
        self.thresholds.clear_overrides();

        for colony in &mut self.colonies {
            if let Some(terminal) = colony.terminal_mut() {
                terminal.reset_tick_flags();
            }
        }

        let snapshot: Vec<(ColonyId, i64, bool)> = self
            .colonies
            .iter()
            .enumerate()
            .map(|(i, c)| (ColonyId::from_index(i), c.assets(Resource::Energy), c.has_storage()))
            .collect();
        self.thresholds.refresh_energy(snapshot.into_iter());

        self.overrides_open = true;
    }

    /// `requestResource(colony, resource, amount, tolerance)`: sets the
    /// threshold override to `(target=amount, surplus=None, tolerance)`
    /// and forces the colony into `ActiveRequestor` for this tick.
    ///
    /// Fails silently with an error log if the colony already holds at
    /// least `amount`; logs a warning and accepts if a prior override for
    /// this `(colony, resource)` already exists this tick.
    pub fn request_resource(&mut self, colony: ColonyId, resource: Resource, amount: i64, tolerance: i64) {
        debug_assert!(self.overrides_open, "request_resource called outside the override window");

        let current = self.colonies[colony.index()].assets(resource);
        if current >= amount {
            let name = self.colonies[colony.index()].name().to_string();
            let reason = NetworkError::RequestAlreadySatisfied {
                colony: name.clone(),
                resource: format!("{:?}", resource),
                amount: current,
            }
            .to_string();
            self.events.log(NetworkEvent::OverrideRejected { colony: name, resource, reason });
            return;
        }

        if self.thresholds.override_for(colony, resource).is_some() {
            self.events.log(NetworkEvent::OverrideAccepted {
                colony: self.colonies[colony.index()].name().to_string(),
                resource,
            });
        }

        self.thresholds.set_override(colony, resource, Thresholds::new(amount, None, tolerance));
        self.colony_states.entry(colony).or_default().insert(resource, Tier::ActiveRequestor);
    }

    /// `exportResource(colony, resource, thresholds)`: sets the threshold
    /// override and leaves the state to classification. Defaults to
    /// `Thresholds::dont_want()` when no explicit band is supplied.
    pub fn export_resource(&mut self, colony: ColonyId, resource: Resource, thresholds: Option<Thresholds>) {
        debug_assert!(self.overrides_open, "export_resource called outside the override window");

        let thresholds = thresholds.unwrap_or_else(Thresholds::dont_want);
        self.thresholds.set_override(colony, resource, thresholds);
        self.events.log(NetworkEvent::OverrideAccepted {
            colony: self.colonies[colony.index()].name().to_string(),
            resource,
        });
    }

    /// Closes the override window. Overrides issued after this point are
    /// rejected by the `debug_assert!`s in `request_resource`/
    /// `export_resource`.
    pub fn end_overrides(&mut self) {
        self.overrides_open = false;
    }

    /// Runs `assignColonyStates → handleRequestors(active) →
    /// handleProviders(active) → handleRequestors(passive, no-market) →
    /// recordStats` (spec.md §4.7), with no market adapter wired in.
    pub fn run_tick(&mut self) -> Result<TickReport, NetworkError> {
        let mut market = NullMarket;
        self.run_tick_with_market(&mut market)
    }

    /// As [`Self::run_tick`], delegating market buy/sell to `market`.
    pub fn run_tick_with_market(&mut self, market: &mut dyn MarketAdapter) -> Result<TickReport, NetworkError> {
        if self.colonies.is_empty() {
            return Err(NetworkError::EmptyNetwork);
        }

        let events_before = self.events.len();

        self.buckets = classifier::assign_colony_states(
            &self.colonies,
            &self.thresholds,
            &mut self.colony_states,
            self.space_caps,
            &mut self.rng,
        );

        {
            let mut ctx = HandlerContext {
                colonies: &mut self.colonies,
                thresholds: &self.thresholds,
                ledger: &mut self.ledger,
                overload: &mut self.overload,
                events: &mut self.events,
                notify_throttle: &mut self.notify_throttle,
                terminal_stats: &self.terminal_stats,
                current_tick: self.tick_counter.current(),
                space_caps: self.space_caps,
                credits: self.credits,
                market_gate: self.market_gate,
            };

            handle_requestors(
                &mut ctx,
                &self.buckets,
                Tier::ActiveRequestor,
                &[Tier::ActiveProvider, Tier::PassiveProvider, Tier::Equilibrium, Tier::PassiveRequestor],
                market,
                RequestOptions::default(),
            );

            handle_providers(
                &mut ctx,
                &self.buckets,
                Tier::ActiveProvider,
                &[Tier::ActiveRequestor, Tier::PassiveRequestor],
                market,
                ProvideOptions::default(),
            );

            handle_requestors(
                &mut ctx,
                &self.buckets,
                Tier::PassiveRequestor,
                &[Tier::ActiveProvider, Tier::PassiveProvider],
                market,
                RequestOptions {
                    allow_market_buy: false,
                    ..RequestOptions::default()
                },
            );
        }

        self.terminal_stats.record_tick(&self.colonies, &self.overload);
        self.tier_snapshot = TierSnapshot::from_buckets(&self.buckets);

        for colony in &mut self.colonies {
            if let Some(terminal) = colony.terminal_mut() {
                terminal.decay_cooldown();
            }
        }

        let report = TickReport {
            tick: self.tick_counter.current(),
            transfers_executed: self
                .events
                .events()
                .iter()
                .skip(events_before)
                .filter(|e| matches!(e, NetworkEvent::TransferSent { .. }))
                .count(),
            notifications_emitted: self
                .events
                .events()
                .iter()
                .skip(events_before)
                .filter(|e| matches!(e, NetworkEvent::NotificationEmitted { .. }))
                .count(),
            overloaded: self.overload.iter().map(|&id| self.colonies[id.index()].name().to_string()).collect(),
        };

        self.tick_counter.advance();
        Ok(report)
    }

    // ------------------------------------------------------------------
    // CLI/UI surface (spec.md §6)
    // ------------------------------------------------------------------

    /// Console dump grouping colonies under each tier heading.
    pub fn summarize(&self) -> String {
        let mut out = String::new();
        for tier in [
            Tier::ActiveProvider,
            Tier::PassiveProvider,
            Tier::Equilibrium,
            Tier::PassiveRequestor,
            Tier::ActiveRequestor,
        ] {
            out.push_str(tier.heading());
            out.push_str(":\n");
            let mut colonies: Vec<_> = self.tier_snapshot.colonies_in(tier).collect();
            colonies.sort_by_key(|(id, _)| self.colonies[id.index()].name().to_string());
            for (id, resources) in colonies {
                out.push_str(&format!("  {}: {:?}\n", self.colonies[id.index()].name(), resources));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resource::Resource;
    use std::collections::HashMap;

    fn colony_with(name: &str, room: &str, resource: Resource, store: i64, assets: i64) -> Colony {
        Colony::new(name, 8, room)
            .with_terminal(HashMap::from([(resource, store)]))
            .with_storage()
            .with_assets(HashMap::from([(resource, assets)]))
    }

    #[test]
    fn add_colony_rejects_ineligible_and_duplicate() {
        let mut network = TerminalNetwork::new(NetworkConfig::default());
        let low_level = Colony::new("A", 3, "W1N1").with_terminal(HashMap::new());
        assert!(matches!(network.add_colony(low_level), Err(NetworkError::IneligibleColony(_))));

        let ok = Colony::new("A", 8, "W1N1").with_terminal(HashMap::new());
        network.add_colony(ok).unwrap();

        let dup = Colony::new("A", 8, "W1N2").with_terminal(HashMap::new());
        assert!(matches!(network.add_colony(dup), Err(NetworkError::DuplicateColony(_))));
    }

    #[test]
    fn run_tick_on_empty_network_errors() {
        let mut network = TerminalNetwork::new(NetworkConfig::default());
        network.begin_tick();
        network.end_overrides();
        assert!(matches!(network.run_tick(), Err(NetworkError::EmptyNetwork)));
    }

    #[test]
    fn full_tick_moves_surplus_to_requestor() {
        let mut network = TerminalNetwork::new(NetworkConfig::default());
        network
            .add_colony(colony_with("Provider", "W1N1", Resource::Hydrogen, 50_000, 50_000))
            .unwrap();
        network
            .add_colony(colony_with("Requestor", "W1N2", Resource::Hydrogen, 0, 0))
            .unwrap();

        network.begin_tick();
        network.end_overrides();
        let report = network.run_tick().unwrap();

        assert_eq!(report.tick, 0);
        assert!(report.transfers_executed > 0);
        assert!(network.colony(ColonyId::from_index(1)).assets(Resource::Hydrogen) > 0);
        assert_eq!(network.current_tick(), 1);
    }

    #[test]
    fn request_resource_forces_active_requestor_and_is_satisfied_first() {
        let mut network = TerminalNetwork::new(NetworkConfig::default());
        let provider = network
            .add_colony(colony_with("Provider", "W1N1", Resource::Ops, 10_000, 10_000))
            .unwrap();
        let requestor = network
            .add_colony(colony_with("Requestor", "W1N2", Resource::Ops, 0, 100))
            .unwrap();

        network.begin_tick();
        network.request_resource(requestor, Resource::Ops, 5_000, 0);
        network.end_overrides();
        network.run_tick().unwrap();

        assert!(network.colony(requestor).assets(Resource::Ops) > 100);
        let _ = provider;
    }

    #[test]
    fn request_resource_already_satisfied_is_rejected() {
        let mut network = TerminalNetwork::new(NetworkConfig::default());
        let requestor = network
            .add_colony(colony_with("Requestor", "W1N1", Resource::Ops, 0, 5_000))
            .unwrap();

        network.begin_tick();
        network.request_resource(requestor, Resource::Ops, 1_000, 0);
        assert!(network
            .events()
            .events()
            .iter()
            .any(|e| matches!(e, NetworkEvent::OverrideRejected { .. })));
    }

    #[test]
    fn summarize_lists_every_tier_heading() {
        let mut network = TerminalNetwork::new(NetworkConfig::default());
        network
            .add_colony(colony_with("Solo", "W1N1", Resource::Hydrogen, 0, 0))
            .unwrap();
        network.begin_tick();
        network.end_overrides();
        network.run_tick().unwrap();

        let summary = network.summarize();
        for heading in ["active providers", "passive providers", "equilibrium", "passive requestors", "active requestors"] {
            assert!(summary.contains(heading));
        }
    }
}
