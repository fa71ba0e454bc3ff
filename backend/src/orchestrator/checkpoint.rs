//! Checkpoint: serializable snapshot of the network's persistent state.
//!
//! Grounded on `orchestrator::checkpoint`'s `StateSnapshot`/
//! `compute_config_hash`/`validate_snapshot` trio: a flat, `serde`-backed
//! record plus a canonical-JSON SHA256 hash of the config it was taken
//! under, so a restore can refuse to load a checkpoint against a
//! different configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::NetworkError;
use crate::models::resource::Resource;
use crate::models::tier::Tier;
use crate::orchestrator::engine::{NetworkConfig, TerminalNetwork};

/// Snapshot of everything in spec.md §6's persisted-state layout:
/// transfer ledger, cooldown/overload EMAs, and the per-tier colony
/// listing. Keyed by colony/resource *name* rather than `ColonyId`, since
/// the arena index is only stable within one process's `Vec<Colony>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkCheckpoint {
    pub tick: usize,
    /// `transfers[resource][origin][destination] -> cumulative units`.
    pub transfers: BTreeMap<String, BTreeMap<String, BTreeMap<String, i64>>>,
    /// `costs[origin][destination] -> cumulative transaction cost`.
    pub costs: BTreeMap<String, BTreeMap<String, i64>>,
    pub avg_cooldown: BTreeMap<String, f64>,
    pub overload: BTreeMap<String, f64>,
    /// `states[tier heading][colony] -> sorted resource list`.
    pub states: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// SHA256 of the canonicalized `NetworkConfig` this checkpoint was
    /// captured under.
    pub config_hash: String,
}

impl NetworkCheckpoint {
    /// Capture the network's current persistent state.
    pub fn capture(network: &TerminalNetwork, config: &NetworkConfig) -> Result<Self, NetworkError> {
        let config_hash = compute_config_hash(config)?;

        let mut transfers: BTreeMap<String, BTreeMap<String, BTreeMap<String, i64>>> = BTreeMap::new();
        for (&resource, origins) in network.ledger().units_table() {
            let resource_name = format!("{:?}", resource);
            for (&origin, dests) in origins {
                let origin_name = network.colony(origin).name().to_string();
                for (&dest, &units) in dests {
                    let dest_name = network.colony(dest).name().to_string();
                    transfers
                        .entry(resource_name.clone())
                        .or_default()
                        .entry(origin_name.clone())
                        .or_default()
                        .insert(dest_name, units);
                }
            }
        }

        let mut costs: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
        for (&origin, dests) in network.ledger().costs_table() {
            let origin_name = network.colony(origin).name().to_string();
            for (&dest, &cost) in dests {
                let dest_name = network.colony(dest).name().to_string();
                costs.entry(origin_name.clone()).or_default().insert(dest_name, cost);
            }
        }

        let mut avg_cooldown = BTreeMap::new();
        let mut overload = BTreeMap::new();
        for (name, &id) in network.colony_names() {
            avg_cooldown.insert(name.clone(), network.terminal_stats().avg_cooldown(id));
            overload.insert(name.clone(), network.terminal_stats().overload(id));
        }

        let mut states: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for tier in [
            Tier::ActiveProvider,
            Tier::PassiveProvider,
            Tier::Equilibrium,
            Tier::PassiveRequestor,
            Tier::ActiveRequestor,
        ] {
            let mut per_colony: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for (&id, resources) in network.tier_snapshot().colonies_in(tier) {
                let mut names: Vec<String> = resources.iter().map(|r: &Resource| format!("{:?}", r)).collect();
                names.sort();
                per_colony.insert(network.colony(id).name().to_string(), names);
            }
            states.insert(tier.heading().to_string(), per_colony);
        }

        Ok(Self {
            tick: network.current_tick(),
            transfers,
            costs,
            avg_cooldown,
            overload,
            states,
            config_hash,
        })
    }

    /// Refuse a checkpoint captured under a different configuration, or one
    /// that names a colony `network` no longer has registered.
    pub fn validate_against(&self, config: &NetworkConfig, network: &TerminalNetwork) -> Result<(), NetworkError> {
        let expected = compute_config_hash(config)?;
        if expected != self.config_hash {
            return Err(NetworkError::Checkpoint(format!(
                "config hash mismatch: checkpoint={}, current={}",
                self.config_hash, expected
            )));
        }
        for name in self.avg_cooldown.keys() {
            network.colony_id_checked(name)?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, NetworkError> {
        serde_json::to_string_pretty(self).map_err(|e| NetworkError::Checkpoint(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, NetworkError> {
        serde_json::from_str(json).map_err(|e| NetworkError::Checkpoint(e.to_string()))
    }
}

/// SHA256 of a canonicalized (sorted-key) JSON serialization of `config`,
/// so field-reordering never changes the hash.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, NetworkError> {
    let value = serde_json::to_value(config).map_err(|e| NetworkError::Checkpoint(e.to_string()))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> = map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = canonicalize(value);
    let bytes = serde_json::to_vec(&canonical).map_err(|e| NetworkError::Checkpoint(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::colony::Colony;
    use std::collections::HashMap;

    #[test]
    fn config_hash_is_deterministic_and_order_independent() {
        let a = NetworkConfig::default();
        let b = NetworkConfig::default();
        assert_eq!(compute_config_hash(&a).unwrap(), compute_config_hash(&b).unwrap());
    }

    #[test]
    fn config_hash_differs_for_different_seeds() {
        let mut a = NetworkConfig::default();
        a.rng_seed = 1;
        let mut b = NetworkConfig::default();
        b.rng_seed = 2;
        assert_ne!(compute_config_hash(&a).unwrap(), compute_config_hash(&b).unwrap());
    }

    #[test]
    fn capture_round_trips_through_json() {
        let config = NetworkConfig::default();
        let mut network = TerminalNetwork::new(config.clone());
        network
            .add_colony(
                Colony::new("A", 8, "W1N1")
                    .with_terminal(HashMap::from([(Resource::Hydrogen, 50_000)]))
                    .with_storage()
                    .with_assets(HashMap::from([(Resource::Hydrogen, 50_000)])),
            )
            .unwrap();
        network
            .add_colony(
                Colony::new("B", 8, "W1N2")
                    .with_terminal(HashMap::from([(Resource::Hydrogen, 0)]))
                    .with_storage()
                    .with_assets(HashMap::new()),
            )
            .unwrap();

        network.begin_tick();
        network.end_overrides();
        network.run_tick().unwrap();

        let checkpoint = NetworkCheckpoint::capture(&network, &config).unwrap();
        let json = checkpoint.to_json().unwrap();
        let restored = NetworkCheckpoint::from_json(&json).unwrap();

        assert_eq!(checkpoint.tick, restored.tick);
        restored.validate_against(&config, &network).unwrap();
    }

    #[test]
    fn validate_against_rejects_a_checkpoint_naming_an_unknown_colony() {
        let config = NetworkConfig::default();
        let mut network = TerminalNetwork::new(config.clone());
        network
            .add_colony(
                Colony::new("A", 8, "W1N1")
                    .with_terminal(HashMap::from([(Resource::Hydrogen, 50_000)]))
                    .with_storage()
                    .with_assets(HashMap::from([(Resource::Hydrogen, 50_000)])),
            )
            .unwrap();
        network.begin_tick();
        network.end_overrides();
        network.run_tick().unwrap();
        let checkpoint = NetworkCheckpoint::capture(&network, &config).unwrap();

        let empty_network = TerminalNetwork::new(config.clone());
        assert!(matches!(
            checkpoint.validate_against(&config, &empty_network),
            Err(NetworkError::UnknownColony(_))
        ));
    }
}
