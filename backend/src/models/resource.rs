//! Resource identifiers and the fixed exchange ordering.
//!
//! Resources are drawn from a fixed finite set. Energy is distinguished
//! throughout the network (dynamic thresholds, larger per-send cap).

use serde::{Deserialize, Serialize};

/// A broad class of resource, used to pick a default threshold triple.
///
/// CRITICAL: `Energy` is handled separately (dynamic per-tick target) and
/// is never returned by [`Resource::class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    /// Base minerals, intermediate compounds, standard boosts, generic minerals.
    Standard,
    /// Heal-line boosts: 1.5x the standard target.
    HealBoost,
    /// Power: tight band, tolerance equals target (never bought actively).
    Power,
    /// Ops: tight band, same shape as power.
    Ops,
    /// Deposit-derived resources and commodities: don't-care band.
    DontCare,
}

/// Opaque resource identifier drawn from the network's fixed catalog `R`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    // High-tier (T3) catalyzed boosts — highest processing priority.
    CatalyzedUtriumAcid,
    CatalyzedUtriumAlkalide,
    CatalyzedKeaniumAcid,
    CatalyzedKeaniumAlkalide,
    CatalyzedLemergiumAcid,
    CatalyzedLemergiumAlkalide,
    CatalyzedZynthiumAcid,
    CatalyzedZynthiumAlkalide,
    CatalyzedGhodiumAcid,
    CatalyzedGhodiumAlkalide,

    // Ops: processed right after the T3 boosts.
    Ops,

    // Heal-line boosts.
    LemergiumAlkalide,
    LemergiumOxide,

    // Lower-tier (T1) boosts.
    UtriumHydride,
    KeaniumHydride,
    ZynthiumHydride,

    // Intermediate compounds.
    Hydroxide,
    ZynthiumKeanite,
    UtriumLemergite,
    GhodiumHydride,

    // Base minerals.
    Hydrogen,
    Oxygen,
    Utrium,
    Lemergium,
    Keanium,
    Zynthium,
    Catalyst,

    // Power: processed after base minerals.
    Power,

    // Energy: dynamic threshold, processed after power.
    Energy,

    // Everything else: deposit-derived resources and commodities.
    Mist,
    Biomass,
    Metal,
    Silicon,
    Composite,
    Crystal,
    Liquid,
}

impl Resource {
    /// Threshold class used to look up the static default triple.
    ///
    /// `Energy` has no class here; its threshold is computed dynamically
    /// by [`crate::thresholds::ThresholdTable::refresh_energy`].
    pub fn class(&self) -> ResourceClass {
        use Resource::*;
        match self {
            LemergiumAlkalide | LemergiumOxide => ResourceClass::HealBoost,
            Power => ResourceClass::Power,
            Ops => ResourceClass::Ops,
            Mist | Biomass | Metal | Silicon | Composite | Crystal | Liquid => {
                ResourceClass::DontCare
            }
            Energy => ResourceClass::Standard, // never consulted; guarded by caller
            _ => ResourceClass::Standard,
        }
    }

    /// `true` for the one resource with dynamic thresholds and a larger
    /// per-send cap.
    pub fn is_energy(&self) -> bool {
        matches!(self, Resource::Energy)
    }

    /// `true` for any boost compound: T3 catalyzed boosts, heal-line
    /// boosts, and T1 hydride boosts. Used to pick the market-buy credit
    /// gate (`canBuyBoostsAbove` vs the general gate).
    pub fn is_boost(&self) -> bool {
        use Resource::*;
        matches!(
            self,
            CatalyzedUtriumAcid
                | CatalyzedUtriumAlkalide
                | CatalyzedKeaniumAcid
                | CatalyzedKeaniumAlkalide
                | CatalyzedLemergiumAcid
                | CatalyzedLemergiumAlkalide
                | CatalyzedZynthiumAcid
                | CatalyzedZynthiumAlkalide
                | CatalyzedGhodiumAcid
                | CatalyzedGhodiumAlkalide
                | LemergiumAlkalide
                | LemergiumOxide
                | UtriumHydride
                | KeaniumHydride
                | ZynthiumHydride
        )
    }

    /// `true` for the seven base minerals mined directly from the ground.
    /// Used alongside `is_energy` to decide when a market sell prefers the
    /// direct (faster, worse-priced) order over the order book.
    pub fn is_base_mineral(&self) -> bool {
        use Resource::*;
        matches!(self, Hydrogen | Oxygen | Utrium | Lemergium | Keanium | Zynthium | Catalyst)
    }

    /// Position of this resource in [`RESOURCE_EXCHANGE_ORDER`]; used as
    /// the tie-break everywhere a deterministic resource order is needed.
    pub fn exchange_rank(&self) -> usize {
        RESOURCE_EXCHANGE_ORDER
            .iter()
            .position(|r| r == self)
            .expect("every Resource variant appears in RESOURCE_EXCHANGE_ORDER")
    }
}

/// Fixed total ordering over resources: high-tier boosts first, then ops,
/// heal/lower-tier boosts, intermediates, base minerals, power, energy,
/// then everything else. Stable; used as a tie-break everywhere.
pub const RESOURCE_EXCHANGE_ORDER: &[Resource] = &[
    Resource::CatalyzedUtriumAcid,
    Resource::CatalyzedUtriumAlkalide,
    Resource::CatalyzedKeaniumAcid,
    Resource::CatalyzedKeaniumAlkalide,
    Resource::CatalyzedLemergiumAcid,
    Resource::CatalyzedLemergiumAlkalide,
    Resource::CatalyzedZynthiumAcid,
    Resource::CatalyzedZynthiumAlkalide,
    Resource::CatalyzedGhodiumAcid,
    Resource::CatalyzedGhodiumAlkalide,
    Resource::Ops,
    Resource::LemergiumAlkalide,
    Resource::LemergiumOxide,
    Resource::UtriumHydride,
    Resource::KeaniumHydride,
    Resource::ZynthiumHydride,
    Resource::Hydroxide,
    Resource::ZynthiumKeanite,
    Resource::UtriumLemergite,
    Resource::GhodiumHydride,
    Resource::Hydrogen,
    Resource::Oxygen,
    Resource::Utrium,
    Resource::Lemergium,
    Resource::Keanium,
    Resource::Zynthium,
    Resource::Catalyst,
    Resource::Power,
    Resource::Energy,
    Resource::Mist,
    Resource::Biomass,
    Resource::Metal,
    Resource::Silicon,
    Resource::Composite,
    Resource::Crystal,
    Resource::Liquid,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_order_covers_every_variant_once() {
        let mut seen = std::collections::HashSet::new();
        for r in RESOURCE_EXCHANGE_ORDER {
            assert!(seen.insert(*r), "{:?} appears more than once", r);
        }
    }

    #[test]
    fn energy_sorts_after_power_before_dont_care() {
        assert!(Resource::Power.exchange_rank() < Resource::Energy.exchange_rank());
        assert!(Resource::Energy.exchange_rank() < Resource::Mist.exchange_rank());
    }

    #[test]
    fn heal_boosts_are_their_own_class() {
        assert_eq!(Resource::LemergiumAlkalide.class(), ResourceClass::HealBoost);
        assert_eq!(Resource::Hydroxide.class(), ResourceClass::Standard);
    }

    #[test]
    fn base_minerals_exclude_energy_and_compounds() {
        assert!(Resource::Hydrogen.is_base_mineral());
        assert!(Resource::Catalyst.is_base_mineral());
        assert!(!Resource::Energy.is_base_mineral());
        assert!(!Resource::Hydroxide.is_base_mineral());
    }
}
