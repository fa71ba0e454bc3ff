//! Transfer ledger: persists across ticks, recording cumulative units
//! moved and transaction costs paid between every origin/destination pair.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::colony::ColonyId;
use crate::models::resource::Resource;

/// `ledger[resource][origin][destination] -> cumulative units sent`.
///
/// `BTreeMap` throughout for deterministic iteration order, independent
/// of insertion order or hashing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferLedger {
    units: BTreeMap<Resource, BTreeMap<ColonyId, BTreeMap<ColonyId, i64>>>,
    costs: BTreeMap<ColonyId, BTreeMap<ColonyId, i64>>,
}

impl TransferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful transfer of `amount` units of `resource` from
    /// `origin` to `destination`, costing `cost` to send.
    pub fn record(
        &mut self,
        resource: Resource,
        origin: ColonyId,
        destination: ColonyId,
        amount: i64,
        cost: i64,
    ) {
        *self
            .units
            .entry(resource)
            .or_default()
            .entry(origin)
            .or_default()
            .entry(destination)
            .or_insert(0) += amount;

        *self
            .costs
            .entry(origin)
            .or_default()
            .entry(destination)
            .or_insert(0) += cost;
    }

    pub fn units(&self, resource: Resource, origin: ColonyId, destination: ColonyId) -> i64 {
        self.units
            .get(&resource)
            .and_then(|m| m.get(&origin))
            .and_then(|m| m.get(&destination))
            .copied()
            .unwrap_or(0)
    }

    pub fn cost(&self, origin: ColonyId, destination: ColonyId) -> i64 {
        self.costs
            .get(&origin)
            .and_then(|m| m.get(&destination))
            .copied()
            .unwrap_or(0)
    }

    pub fn units_table(&self) -> &BTreeMap<Resource, BTreeMap<ColonyId, BTreeMap<ColonyId, i64>>> {
        &self.units
    }

    pub fn costs_table(&self) -> &BTreeMap<ColonyId, BTreeMap<ColonyId, i64>> {
        &self.costs
    }
}
