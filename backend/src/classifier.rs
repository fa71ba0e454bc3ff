//! State Classifier: assigns each `(colony, resource)` pair to one of
//! five demand tiers, once per tick.

use std::collections::HashMap;

use crate::models::colony::{Colony, ColonyId};
use crate::models::resource::{Resource, RESOURCE_EXCHANGE_ORDER};
use crate::models::thresholds::{Thresholds, ThresholdTable};
use crate::models::tier::Tier;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// `remainingSpace(colony) < MIN_COLONY_SPACE` forces an over-target
/// colony into `ActiveProvider` rather than `PassiveProvider`.
pub const MIN_COLONY_SPACE: i64 = 20_000;

/// Static space caps standing in for the per-structure capacities the
/// source reads off the live `storage`/`terminal`/`factory` objects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpaceCaps {
    pub terminal_cap: i64,
    pub storage_cap: i64,
    pub factory_cap: i64,
    pub include_factory: bool,
}

impl Default for SpaceCaps {
    fn default() -> Self {
        Self {
            terminal_cap: 300_000,
            storage_cap: 1_000_000,
            factory_cap: 50_000,
            include_factory: true,
        }
    }
}

/// Classify a single `(colony, resource)` pair. Never produces
/// `ActiveRequestor` — that tier is only set via an explicit
/// `requestResource` override, applied by the caller before this runs.
pub fn classify_one(colony: &Colony, resource: Resource, t: Thresholds, caps: SpaceCaps) -> Tier {
    let amount = colony.assets(resource);

    if let Some(surplus) = t.surplus {
        if amount > surplus {
            return Tier::ActiveProvider;
        }
    }

    if amount > t.target + t.tolerance {
        let space = colony.remaining_space(
            caps.terminal_cap,
            caps.storage_cap,
            caps.factory_cap,
            caps.include_factory,
        );
        return if space < MIN_COLONY_SPACE {
            Tier::ActiveProvider
        } else {
            Tier::PassiveProvider
        };
    }

    let lower = (t.target - t.tolerance).max(0);
    if amount >= lower {
        return Tier::Equilibrium;
    }
    if amount < lower {
        return Tier::PassiveRequestor;
    }

    Tier::Error
}

/// Per-resource lists of colonies in each tier, shuffled for fairness.
#[derive(Debug, Clone, Default)]
pub struct TierBuckets {
    active_providers: HashMap<Resource, Vec<ColonyId>>,
    passive_providers: HashMap<Resource, Vec<ColonyId>>,
    equilibrium: HashMap<Resource, Vec<ColonyId>>,
    passive_requestors: HashMap<Resource, Vec<ColonyId>>,
    active_requestors: HashMap<Resource, Vec<ColonyId>>,
}

impl TierBuckets {
    pub fn bucket(&self, tier: Tier) -> &HashMap<Resource, Vec<ColonyId>> {
        match tier {
            Tier::ActiveProvider => &self.active_providers,
            Tier::PassiveProvider => &self.passive_providers,
            Tier::Equilibrium => &self.equilibrium,
            Tier::PassiveRequestor => &self.passive_requestors,
            Tier::ActiveRequestor => &self.active_requestors,
            Tier::Error => panic!("Error tier is never bucketed"),
        }
    }

    fn bucket_mut(&mut self, tier: Tier) -> &mut HashMap<Resource, Vec<ColonyId>> {
        match tier {
            Tier::ActiveProvider => &mut self.active_providers,
            Tier::PassiveProvider => &mut self.passive_providers,
            Tier::Equilibrium => &mut self.equilibrium,
            Tier::PassiveRequestor => &mut self.passive_requestors,
            Tier::ActiveRequestor => &mut self.active_requestors,
            Tier::Error => panic!("Error tier is never bucketed"),
        }
    }

    pub fn for_resource(&self, tier: Tier, resource: Resource) -> &[ColonyId] {
        self.bucket(tier).get(&resource).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Run the classifier over every eligible colony and resource, honoring
/// pre-existing `ActiveRequestor` overrides (L2: override precedence).
///
/// `colony_states` is pre-seeded by `requestResource` overrides before
/// this runs; the classifier fills in every remaining `(colony,
/// resource)` pair and leaves overrides untouched.
pub fn assign_colony_states(
    colonies: &[Colony],
    thresholds: &ThresholdTable,
    colony_states: &mut HashMap<ColonyId, HashMap<Resource, Tier>>,
    caps: SpaceCaps,
    rng: &mut RngManager,
) -> TierBuckets {
    let mut buckets = TierBuckets::default();

    for &resource in RESOURCE_EXCHANGE_ORDER {
        for (index, colony) in colonies.iter().enumerate() {
            if !colony.is_eligible() {
                continue;
            }
            let id = ColonyId::from_index(index);

            let tier = colony_states
                .get(&id)
                .and_then(|m| m.get(&resource))
                .copied()
                .filter(|t| *t == Tier::ActiveRequestor)
                .unwrap_or_else(|| {
                    let t = classify_one(colony, resource, thresholds.thresholds(id, resource), caps);
                    colony_states.entry(id).or_default().insert(resource, t);
                    t
                });

            if tier == Tier::Error {
                continue;
            }
            buckets.bucket_mut(tier).entry(resource).or_default().push(id);
        }
    }

    for resource in RESOURCE_EXCHANGE_ORDER {
        for tier in [
            Tier::ActiveProvider,
            Tier::PassiveProvider,
            Tier::Equilibrium,
            Tier::PassiveRequestor,
            Tier::ActiveRequestor,
        ] {
            if let Some(list) = buckets.bucket_mut(tier).get_mut(resource) {
                shuffle(list, rng);
            }
        }
    }

    buckets
}

/// Fisher-Yates shuffle driven by the network's seeded PRNG, so runs
/// replay identically given the same seed (L3: fairness without
/// sacrificing determinism).
fn shuffle<T>(items: &mut [T], rng: &mut RngManager) {
    if items.len() < 2 {
        return;
    }
    for i in (1..items.len()).rev() {
        let j = rng.range(0, (i + 1) as i64) as usize;
        items.swap(i, j);
    }
}
