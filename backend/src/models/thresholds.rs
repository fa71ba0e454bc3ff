//! Per-resource inventory thresholds and the table that resolves them.
//!
//! Re-architecture point: the source's single threshold-record lookup
//! becomes a tagged `ThresholdPolicy` per resource class, so the
//! classifier and the table builder both exhaustively pattern-match
//! instead of branching on ad-hoc flags.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::colony::ColonyId;
use crate::models::resource::{Resource, ResourceClass};

/// Nominal capacity of a single lab's mineral store; the unit the default
/// threshold triples are derived from.
pub const LAB_CAP: i64 = 3_000;

/// A colony's desired inventory band for one resource.
///
/// Invariant: `tolerance <= target`, and when `surplus` is `Some`,
/// `surplus >= target + tolerance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub target: i64,
    /// `None` means unbounded surplus allowed — never force-export.
    pub surplus: Option<i64>,
    pub tolerance: i64,
}

impl Thresholds {
    pub fn new(target: i64, surplus: Option<i64>, tolerance: i64) -> Self {
        debug_assert!(tolerance <= target, "tolerance must not exceed target");
        if let Some(s) = surplus {
            debug_assert!(
                s >= target + tolerance,
                "surplus must be at least target + tolerance"
            );
        }
        Self {
            target,
            surplus,
            tolerance,
        }
    }

    fn default_standard() -> Self {
        Self::new(2 * LAB_CAP + 1_000, Some(15 * LAB_CAP), LAB_CAP / 3)
    }

    fn heal_boost() -> Self {
        let default = Self::default_standard();
        Self::new(
            (default.target as f64 * 1.5).round() as i64,
            default.surplus,
            default.tolerance,
        )
    }

    fn power_or_ops() -> Self {
        Self::new(2_500, None, 2_500)
    }

    fn dont_care() -> Self {
        Self::new(0, None, 0)
    }

    /// The default used by `exportResource` when the caller supplies no
    /// explicit threshold: never held, never bought.
    pub fn dont_want() -> Self {
        Self::new(0, Some(0), 0)
    }
}

/// Tagged dispatch for "which default band applies to this resource".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPolicy {
    Standard,
    HealBoost,
    Power,
    Ops,
    DontCare,
    /// Recomputed once per tick from the network's live energy holdings.
    EnergyDynamic,
}

impl ThresholdPolicy {
    pub fn for_resource(resource: &Resource) -> Self {
        if resource.is_energy() {
            return ThresholdPolicy::EnergyDynamic;
        }
        match resource.class() {
            ResourceClass::Standard => ThresholdPolicy::Standard,
            ResourceClass::HealBoost => ThresholdPolicy::HealBoost,
            ResourceClass::Power => ThresholdPolicy::Power,
            ResourceClass::Ops => ThresholdPolicy::Ops,
            ResourceClass::DontCare => ThresholdPolicy::DontCare,
        }
    }

    /// Static default triple for this policy. Panics for `EnergyDynamic`,
    /// which has no static default — callers must consult
    /// [`ThresholdTable::energy_thresholds`] instead.
    fn default_triple(&self) -> Thresholds {
        match self {
            ThresholdPolicy::Standard => Thresholds::default_standard(),
            ThresholdPolicy::HealBoost => Thresholds::heal_boost(),
            ThresholdPolicy::Power | ThresholdPolicy::Ops => Thresholds::power_or_ops(),
            ThresholdPolicy::DontCare => Thresholds::dont_care(),
            ThresholdPolicy::EnergyDynamic => {
                unreachable!("energy thresholds are computed dynamically, not looked up")
            }
        }
    }
}

/// Resolves the effective threshold for any (colony, resource) pair:
/// colony override, else the dynamic energy value, else the static
/// per-resource default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdTable {
    overrides: HashMap<ColonyId, HashMap<Resource, Thresholds>>,
    energy: Option<Thresholds>,
}

impl ThresholdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards per-tick overrides. Persistent across calls only insofar
    /// as the caller re-applies overrides before the next `run()`.
    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn set_override(&mut self, colony: ColonyId, resource: Resource, thresholds: Thresholds) {
        self.overrides.entry(colony).or_default().insert(resource, thresholds);
    }

    pub fn override_for(&self, colony: ColonyId, resource: Resource) -> Option<Thresholds> {
        self.overrides.get(&colony).and_then(|m| m.get(&resource)).copied()
    }

    /// Recompute the dynamic energy band from current network holdings.
    ///
    /// `target := mean(colony.assets[energy])` over colonies that have
    /// storage and no energy override; `surplus := 500_000`;
    /// `tolerance := target / 5`.
    pub fn refresh_energy<'a>(
        &mut self,
        colonies: impl Iterator<Item = (ColonyId, i64, bool)>,
    ) {
        let mut sum = 0i64;
        let mut count = 0i64;
        for (colony, energy, has_storage) in colonies {
            if !has_storage {
                continue;
            }
            if self.override_for(colony, Resource::Energy).is_some() {
                continue;
            }
            sum += energy;
            count += 1;
        }
        let target = if count > 0 { sum / count } else { 0 };
        self.energy = Some(Thresholds::new(target, Some(500_000), target / 5));
    }

    pub fn energy_thresholds(&self) -> Thresholds {
        self.energy.unwrap_or_else(|| Thresholds::new(0, Some(500_000), 0))
    }

    /// `thresholds(colony, resource)`: colony override, else the dynamic
    /// energy value, else the static per-resource default.
    pub fn thresholds(&self, colony: ColonyId, resource: Resource) -> Thresholds {
        if let Some(t) = self.override_for(colony, resource) {
            return t;
        }
        match ThresholdPolicy::for_resource(&resource) {
            ThresholdPolicy::EnergyDynamic => self.energy_thresholds(),
            policy => policy.default_triple(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_default_matches_lab_cap_formula() {
        let t = Thresholds::default_standard();
        assert_eq!(t.target, 2 * LAB_CAP + 1_000);
        assert_eq!(t.surplus, Some(15 * LAB_CAP));
        assert_eq!(t.tolerance, LAB_CAP / 3);
    }

    #[test]
    fn heal_boost_is_one_point_five_times_default_target() {
        let default = Thresholds::default_standard();
        let heal = Thresholds::heal_boost();
        assert_eq!(heal.target, (default.target as f64 * 1.5) as i64);
        assert_eq!(heal.surplus, default.surplus);
        assert_eq!(heal.tolerance, default.tolerance);
    }

    #[test]
    fn power_never_buys_actively_since_tolerance_equals_target() {
        let t = Thresholds::power_or_ops();
        assert_eq!(t.target, t.tolerance);
    }

    #[test]
    fn energy_thresholds_are_the_mean_of_storage_colonies() {
        let mut table = ThresholdTable::new();
        let colonies = vec![
            (ColonyId::from_index(0), 100_000, true),
            (ColonyId::from_index(1), 200_000, true),
            (ColonyId::from_index(2), 300_000, true),
        ];
        table.refresh_energy(colonies.into_iter());
        let t = table.energy_thresholds();
        assert_eq!(t.target, 200_000);
        assert_eq!(t.surplus, Some(500_000));
        assert_eq!(t.tolerance, 40_000);
    }

    #[test]
    fn override_takes_precedence_over_default() {
        let mut table = ThresholdTable::new();
        let colony = ColonyId::from_index(0);
        table.set_override(colony, Resource::Ops, Thresholds::new(9_999, None, 1));
        let resolved = table.thresholds(colony, Resource::Ops);
        assert_eq!(resolved.target, 9_999);
    }
}
