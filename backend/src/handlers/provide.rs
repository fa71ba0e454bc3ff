//! Provide Handler: pushes a provider's surplus out to requestor tiers,
//! falling back to a market sell when no requestor can absorb it.
//!
//! Grounded on the same tiered-candidate-then-fallback shape as
//! `handlers::request`, mirrored for the provider's side of the match.

use crate::classifier::{MIN_COLONY_SPACE, TierBuckets};
use crate::handlers::HandlerContext;
use crate::market::{MarketAdapter, SellOptions};
use crate::models::colony::ColonyId;
use crate::models::resource::{Resource, RESOURCE_EXCHANGE_ORDER};
use crate::models::tier::Tier;
use crate::partner::{best_receiver, Candidate};
use crate::transfer::{execute_transfer, max_send};

/// Toggles for one `handle_providers` pass.
#[derive(Debug, Clone, Copy)]
pub struct ProvideOptions {
    /// Push surplus to any eligible requestor, not just ones in-room.
    /// Always `true` in this network: rooms never share a terminal.
    pub allow_push_to_other_rooms: bool,
    pub allow_market_sell: bool,
}

impl Default for ProvideOptions {
    fn default() -> Self {
        Self {
            allow_push_to_other_rooms: true,
            allow_market_sell: true,
        }
    }
}

/// Run the Provide Handler over one tier's provider bucket for every
/// resource, in `RESOURCE_EXCHANGE_ORDER`.
///
/// `requestor_tiers` is the priority-ordered list of tiers searched for a
/// receiver, supplied by the run pipeline.
pub fn handle_providers(
    ctx: &mut HandlerContext<'_>,
    buckets: &TierBuckets,
    tier: Tier,
    requestor_tiers: &[Tier],
    market: &mut dyn MarketAdapter,
    options: ProvideOptions,
) {
    for &resource in RESOURCE_EXCHANGE_ORDER {
        let providers = buckets.for_resource(tier, resource).to_vec();

        for provider in providers {
            let is_ready = ctx.colonies[provider.index()]
                .terminal()
                .map(|t| t.is_ready())
                .unwrap_or(false);
            if !is_ready {
                continue;
            }

            let threshold = ctx.thresholds.thresholds(provider, resource);
            let amount = ctx.colonies[provider.index()].assets(resource);
            let excess = amount - threshold.target;
            if excess <= 0 {
                continue;
            }

            // `send_amount` is the fixed bound for this provider's single
            // push attempt this tick; it is never reassigned to track a
            // shrinking remainder across fallback steps.
            let send_amount = excess.min(max_send(resource));
            if send_amount <= 0 {
                continue;
            }

            let provider_room = ctx.colonies[provider.index()].room_name().to_string();
            let store = ctx.colonies[provider.index()]
                .terminal()
                .map(|t| t.store_of(resource))
                .unwrap_or(0);
            if store <= 0 {
                continue;
            }

            let mut handled = false;
            let mut success = false;

            if options.allow_push_to_other_rooms {
                for &requestor_tier in requestor_tiers {
                    let requestors = buckets.for_resource(requestor_tier, resource);
                    let candidates = push_candidates(ctx, requestors, provider, resource, excess);
                    if candidates.is_empty() {
                        continue;
                    }

                    if let Some(receiver) = best_receiver(&provider_room, send_amount, &candidates) {
                        let capped = send_amount.min(store);
                        if capped > 0 {
                            success = execute_transfer(
                                ctx.colonies,
                                ctx.ledger,
                                ctx.overload,
                                ctx.events,
                                provider,
                                receiver,
                                resource,
                                capped,
                            )
                            .is_ok();
                        }
                    }
                    handled = true;
                    break;
                }
            }

            if !handled && options.allow_market_sell {
                success = try_market_sell(ctx, market, provider, resource, send_amount);
            }

            let _ = success;
        }
    }
}

/// Three-tier cascade over `requestors` for a provider's `excess`: the
/// first non-empty set wins, same shape as the request side's
/// strict/relaxed fallback but with a third, looser step.
fn push_candidates(
    ctx: &HandlerContext<'_>,
    requestors: &[ColonyId],
    provider: ColonyId,
    resource: Resource,
    excess: i64,
) -> Vec<Candidate> {
    let preferred = preferred_candidates(ctx, requestors, provider, resource, excess);
    if !preferred.is_empty() {
        return preferred;
    }
    let relaxed = relaxed_candidates(ctx, requestors, provider, resource, excess);
    if !relaxed.is_empty() {
        return relaxed;
    }
    loose_candidates(ctx, requestors, provider, resource, excess)
}

fn to_candidate(ctx: &HandlerContext<'_>, colony: ColonyId) -> Candidate {
    Candidate {
        colony,
        room_name: ctx.colonies[colony.index()].room_name().to_string(),
        avg_cooldown: ctx.terminal_stats.avg_cooldown(colony),
    }
}

fn partner_space(ctx: &HandlerContext<'_>, partner: ColonyId) -> i64 {
    ctx.colonies[partner.index()].remaining_space(
        ctx.space_caps.terminal_cap,
        ctx.space_caps.storage_cap,
        ctx.space_caps.factory_cap,
        ctx.space_caps.include_factory,
    )
}

/// Partners that absorb `excess` without exceeding their own target, with
/// room to spare: `assets[resource] + excess <= threshold(partner).target`
/// AND `remainingSpace(partner) - excess >= MIN_COLONY_SPACE`.
fn preferred_candidates(
    ctx: &HandlerContext<'_>,
    requestors: &[ColonyId],
    provider: ColonyId,
    resource: Resource,
    excess: i64,
) -> Vec<Candidate> {
    requestors
        .iter()
        .filter(|&&r| r != provider)
        .filter_map(|&r| {
            let t = ctx.thresholds.thresholds(r, resource);
            let assets = ctx.colonies[r.index()].assets(resource);
            let space = partner_space(ctx, r);
            if assets + excess <= t.target && space - excess >= MIN_COLONY_SPACE {
                Some(to_candidate(ctx, r))
            } else {
                None
            }
        })
        .collect()
}

/// Fallback when `preferred_candidates` is empty: tolerates landing up to
/// `target + tolerance` instead of `target`, same space requirement.
fn relaxed_candidates(
    ctx: &HandlerContext<'_>,
    requestors: &[ColonyId],
    provider: ColonyId,
    resource: Resource,
    excess: i64,
) -> Vec<Candidate> {
    requestors
        .iter()
        .filter(|&&r| r != provider)
        .filter_map(|&r| {
            let t = ctx.thresholds.thresholds(r, resource);
            let assets = ctx.colonies[r.index()].assets(resource);
            let space = partner_space(ctx, r);
            if assets + excess <= t.target + t.tolerance && space - excess >= MIN_COLONY_SPACE {
                Some(to_candidate(ctx, r))
            } else {
                None
            }
        })
        .collect()
}

/// Last-resort fallback: any partner with enough space to take `excess`
/// that wouldn't itself flip to ActiveProvider on receipt.
fn loose_candidates(
    ctx: &HandlerContext<'_>,
    requestors: &[ColonyId],
    provider: ColonyId,
    resource: Resource,
    excess: i64,
) -> Vec<Candidate> {
    requestors
        .iter()
        .filter(|&&r| r != provider)
        .filter_map(|&r| {
            let space = partner_space(ctx, r);
            if space - excess < MIN_COLONY_SPACE {
                return None;
            }
            let t = ctx.thresholds.thresholds(r, resource);
            let assets = ctx.colonies[r.index()].assets(resource);
            let wont_become_active = match t.surplus {
                Some(surplus) => assets + excess < surplus,
                None => assets + excess <= t.target + t.tolerance,
            };
            if wont_become_active {
                Some(to_candidate(ctx, r))
            } else {
                None
            }
        })
        .collect()
}

/// Sell `send_amount` on the market. Energy and base minerals sell direct
/// (`prefer_direct`) when the provider is nearly out of space; everything
/// else, and any resource with space to spare, uses the slower
/// order-book path.
fn try_market_sell(
    ctx: &mut HandlerContext<'_>,
    market: &mut dyn MarketAdapter,
    provider: ColonyId,
    resource: Resource,
    send_amount: i64,
) -> bool {
    let space = partner_space(ctx, provider);
    let opts = SellOptions {
        prefer_direct: (resource.is_energy() || resource.is_base_mineral()) && space < MIN_COLONY_SPACE,
    };
    let sold = market.sell(provider, resource, send_amount, opts);
    if sold < 0 {
        return false;
    }
    let current = ctx.colonies[provider.index()].assets(resource);
    ctx.colonies[provider.index()].set_assets(resource, current - sold);
    let name = ctx.colonies[provider.index()].name().to_string();
    ctx.events.log(crate::events::NetworkEvent::MarketFallthrough {
        colony: name,
        resource,
        amount: sold,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::SpaceCaps;
    use crate::events::EventLog;
    use crate::market::NullMarket;
    use crate::models::colony::Colony;
    use crate::models::ledger::TransferLedger;
    use crate::models::thresholds::ThresholdTable;
    use crate::stats::{NotificationThrottle, TerminalStats};
    use std::collections::{HashMap, HashSet};

    fn colony_with(name: &str, room: &str, resource: Resource, store: i64, assets: i64) -> Colony {
        Colony::new(name, 8, room)
            .with_terminal(HashMap::from([(resource, store)]))
            .with_storage()
            .with_assets(HashMap::from([(resource, assets)]))
    }

    #[test]
    fn surplus_is_pushed_to_passive_requestor() {
        let mut colonies = vec![
            colony_with("Provider", "W1N1", Resource::Hydrogen, 50_000, 50_000),
            colony_with("Requestor", "W1N2", Resource::Hydrogen, 0, 0),
        ];
        let thresholds = ThresholdTable::new();
        let mut ledger = TransferLedger::new();
        let mut overload = HashSet::new();
        let mut events = EventLog::new();
        let mut notify_throttle = NotificationThrottle::new();
        let terminal_stats = TerminalStats::new();

        let mut states: HashMap<ColonyId, HashMap<Resource, Tier>> = HashMap::new();
        let mut rng = crate::rng::RngManager::new(1);
        let buckets = crate::classifier::assign_colony_states(
            &colonies,
            &thresholds,
            &mut states,
            SpaceCaps::default(),
            &mut rng,
        );

        let mut ctx = HandlerContext {
            colonies: &mut colonies,
            thresholds: &thresholds,
            ledger: &mut ledger,
            overload: &mut overload,
            events: &mut events,
            notify_throttle: &mut notify_throttle,
            terminal_stats: &terminal_stats,
            current_tick: 0,
            space_caps: SpaceCaps::default(),
            credits: 0,
            market_gate: crate::market::MarketGate::default(),
        };

        let mut market = NullMarket;
        handle_providers(
            &mut ctx,
            &buckets,
            Tier::ActiveProvider,
            &[Tier::ActiveRequestor, Tier::PassiveRequestor],
            &mut market,
            ProvideOptions::default(),
        );

        assert!(ctx.colonies[1].assets(Resource::Hydrogen) > 0);
    }

    #[test]
    fn market_sell_used_when_no_requestor_available() {
        let mut colonies = vec![colony_with("Provider", "W1N1", Resource::Hydrogen, 50_000, 50_000)];
        let thresholds = ThresholdTable::new();
        let mut ledger = TransferLedger::new();
        let mut overload = HashSet::new();
        let mut events = EventLog::new();
        let mut notify_throttle = NotificationThrottle::new();
        let terminal_stats = TerminalStats::new();

        let mut states: HashMap<ColonyId, HashMap<Resource, Tier>> = HashMap::new();
        let mut rng = crate::rng::RngManager::new(1);
        let buckets = crate::classifier::assign_colony_states(
            &colonies,
            &thresholds,
            &mut states,
            SpaceCaps::default(),
            &mut rng,
        );

        let mut ctx = HandlerContext {
            colonies: &mut colonies,
            thresholds: &thresholds,
            ledger: &mut ledger,
            overload: &mut overload,
            events: &mut events,
            notify_throttle: &mut notify_throttle,
            terminal_stats: &terminal_stats,
            current_tick: 0,
            space_caps: SpaceCaps::default(),
            credits: 0,
            market_gate: crate::market::MarketGate::default(),
        };

        struct AlwaysSells;
        impl MarketAdapter for AlwaysSells {
            fn buy(&mut self, _colony: ColonyId, _resource: Resource, amount: i64) -> i64 {
                amount
            }
            fn sell(&mut self, _colony: ColonyId, _resource: Resource, amount: i64, _opts: SellOptions) -> i64 {
                amount
            }
        }
        let mut market = AlwaysSells;

        let before = ctx.colonies[0].assets(Resource::Hydrogen);
        handle_providers(
            &mut ctx,
            &buckets,
            Tier::ActiveProvider,
            &[Tier::ActiveRequestor, Tier::PassiveRequestor],
            &mut market,
            ProvideOptions::default(),
        );
        assert!(ctx.colonies[0].assets(Resource::Hydrogen) < before);
    }

    #[test]
    fn provider_on_cooldown_is_skipped_outright() {
        let mut colonies = vec![
            colony_with("Provider", "W1N1", Resource::Hydrogen, 50_000, 50_000),
            colony_with("Requestor", "W1N2", Resource::Hydrogen, 0, 0),
        ];
        colonies[0].terminal_mut().unwrap().send(Resource::Hydrogen, 1, 10).unwrap();
        assert!(!colonies[0].terminal().unwrap().is_ready());

        let thresholds = ThresholdTable::new();
        let mut ledger = TransferLedger::new();
        let mut overload = HashSet::new();
        let mut events = EventLog::new();
        let mut notify_throttle = NotificationThrottle::new();
        let terminal_stats = TerminalStats::new();

        let mut states: HashMap<ColonyId, HashMap<Resource, Tier>> = HashMap::new();
        let mut rng = crate::rng::RngManager::new(1);
        let buckets = crate::classifier::assign_colony_states(
            &colonies,
            &thresholds,
            &mut states,
            SpaceCaps::default(),
            &mut rng,
        );

        let mut ctx = HandlerContext {
            colonies: &mut colonies,
            thresholds: &thresholds,
            ledger: &mut ledger,
            overload: &mut overload,
            events: &mut events,
            notify_throttle: &mut notify_throttle,
            terminal_stats: &terminal_stats,
            current_tick: 0,
            space_caps: SpaceCaps::default(),
            credits: 0,
            market_gate: crate::market::MarketGate::default(),
        };

        let mut market = NullMarket;
        handle_providers(
            &mut ctx,
            &buckets,
            Tier::ActiveProvider,
            &[Tier::ActiveRequestor, Tier::PassiveRequestor],
            &mut market,
            ProvideOptions::default(),
        );

        assert_eq!(ctx.colonies[1].assets(Resource::Hydrogen), 0);
        assert!(ctx.overload.is_empty());
    }

    #[test]
    fn loose_tier_only_used_when_preferred_and_relaxed_are_empty() {
        let mut colonies = vec![
            colony_with("Provider", "W1N1", Resource::Hydrogen, 50_000, 50_000),
            colony_with("TightRequestor", "W1N2", Resource::Hydrogen, 0, 5_500),
        ];
        let thresholds = ThresholdTable::new();
        let mut ledger = TransferLedger::new();
        let mut overload = HashSet::new();
        let mut events = EventLog::new();
        let mut notify_throttle = NotificationThrottle::new();
        let terminal_stats = TerminalStats::new();

        let mut states: HashMap<ColonyId, HashMap<Resource, Tier>> = HashMap::new();
        let mut rng = crate::rng::RngManager::new(1);
        let buckets = crate::classifier::assign_colony_states(
            &colonies,
            &thresholds,
            &mut states,
            SpaceCaps::default(),
            &mut rng,
        );

        let requestor = ColonyId::from_index(1);
        // Target is 7_000: 5_500 + excess(3_000) blows past both target and
        // target+tolerance, so only the loose tier's surplus check can match.
        let t = thresholds.thresholds(requestor, Resource::Hydrogen);
        assert!(5_500 + 3_000 > t.target + t.tolerance);
        assert!(5_500 + 3_000 < t.surplus.unwrap());

        let mut ctx = HandlerContext {
            colonies: &mut colonies,
            thresholds: &thresholds,
            ledger: &mut ledger,
            overload: &mut overload,
            events: &mut events,
            notify_throttle: &mut notify_throttle,
            terminal_stats: &terminal_stats,
            current_tick: 0,
            space_caps: SpaceCaps::default(),
            credits: 0,
            market_gate: crate::market::MarketGate::default(),
        };

        let mut market = NullMarket;
        handle_providers(
            &mut ctx,
            &buckets,
            Tier::ActiveProvider,
            &[Tier::ActiveRequestor, Tier::PassiveRequestor],
            &mut market,
            ProvideOptions::default(),
        );

        assert!(ctx.colonies[1].assets(Resource::Hydrogen) > 5_500);
    }
}
