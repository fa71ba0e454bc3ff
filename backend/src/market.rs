//! Market adapter: the one pluggable external collaborator spec.md names
//! explicitly (buy/sell delegate out of scope). Grounded on the
//! `Box<dyn CashManagerPolicy>` pattern the teacher uses for its own
//! pluggable decision layer.

use serde::{Deserialize, Serialize};

use crate::models::colony::ColonyId;
use crate::models::resource::Resource;

/// Options passed to `sell`, mirroring the source's `{preferDirect}` flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct SellOptions {
    /// For energy and base minerals, set when the provider is nearly out
    /// of space and a slower order-book sale isn't acceptable.
    pub prefer_direct: bool,
}

/// Credit thresholds gating market buy orders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketGate {
    pub can_buy_above: i64,
    pub can_buy_energy_above: i64,
    pub can_buy_boosts_above: i64,
}

impl Default for MarketGate {
    fn default() -> Self {
        Self {
            can_buy_above: 0,
            can_buy_energy_above: 0,
            can_buy_boosts_above: 0,
        }
    }
}

impl MarketGate {
    /// The credit threshold that gates a market buy of `resource`: energy
    /// and boosts get their own thresholds, everything else uses the
    /// general gate.
    pub fn threshold_for(&self, resource: Resource) -> i64 {
        if resource.is_energy() {
            self.can_buy_energy_above
        } else if resource.is_boost() {
            self.can_buy_boosts_above
        } else {
            self.can_buy_above
        }
    }

    /// `true` iff `credits` clears the gate for a market buy of `resource`.
    pub fn allows_buy(&self, resource: Resource, credits: i64) -> bool {
        credits >= self.threshold_for(resource)
    }
}

/// External market collaborator. `buy`/`sell` return the amount
/// transacted (`>= 0`) on success, or a negative value on failure — the
/// handlers treat any negative return as "this request instance failed".
pub trait MarketAdapter {
    fn buy(&mut self, colony: ColonyId, resource: Resource, amount: i64) -> i64;
    fn sell(&mut self, colony: ColonyId, resource: Resource, amount: i64, opts: SellOptions) -> i64;
}

/// A market that always fails; used as the default when no live market is
/// wired in, and in tests that only exercise the in-network paths.
#[derive(Debug, Default)]
pub struct NullMarket;

impl MarketAdapter for NullMarket {
    fn buy(&mut self, _colony: ColonyId, _resource: Resource, _amount: i64) -> i64 {
        -1
    }

    fn sell(&mut self, _colony: ColonyId, _resource: Resource, _amount: i64, _opts: SellOptions) -> i64 {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_market_always_fails() {
        let mut market = NullMarket;
        assert!(market.buy(ColonyId::from_index(0), Resource::Energy, 100) < 0);
        assert!(market.sell(ColonyId::from_index(0), Resource::Energy, 100, SellOptions::default()) < 0);
    }

    #[test]
    fn gate_picks_the_threshold_matching_resource_class() {
        let gate = MarketGate {
            can_buy_above: 1_000,
            can_buy_energy_above: 2_000,
            can_buy_boosts_above: 3_000,
        };
        assert_eq!(gate.threshold_for(Resource::Energy), 2_000);
        assert_eq!(gate.threshold_for(Resource::CatalyzedUtriumAcid), 3_000);
        assert_eq!(gate.threshold_for(Resource::Hydrogen), 1_000);

        assert!(gate.allows_buy(Resource::CatalyzedUtriumAcid, 3_000));
        assert!(!gate.allows_buy(Resource::CatalyzedUtriumAcid, 2_999));
    }
}
