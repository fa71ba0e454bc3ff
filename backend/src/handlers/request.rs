//! Request Handler: satisfies `ActiveRequestor`/`PassiveRequestor` demand
//! from provider tiers, falling back to divvying and market buys.
//!
//! Grounded on `policy::liquidity_aware`'s tiered-candidate-then-fallback
//! shape: search partner priority tiers in order, accept the first
//! non-empty candidate set, and only fall through to divvying/market buy
//! when no tier produced a candidate at all.

use crate::classifier::TierBuckets;
use crate::handlers::HandlerContext;
use crate::market::MarketAdapter;
use crate::models::colony::ColonyId;
use crate::models::resource::{Resource, RESOURCE_EXCHANGE_ORDER};
use crate::models::tier::Tier;
use crate::partner::{best_sender, Candidate};
use crate::transfer::{execute_transfer, max_send};

/// Toggles for one `handle_requestors` pass; a passive-tier pass runs
/// with `allow_market_buy: false` (market fallback is reserved for
/// active requestors, per the run pipeline's second requestor pass).
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    pub allow_divvying: bool,
    pub send_target_plus_tolerance: bool,
    pub allow_market_buy: bool,
    pub receive_only_once_per_tick: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            allow_divvying: true,
            send_target_plus_tolerance: false,
            allow_market_buy: true,
            receive_only_once_per_tick: true,
        }
    }
}

/// Run the Request Handler over one tier's requestor bucket for every
/// resource, in `RESOURCE_EXCHANGE_ORDER`.
///
/// `partner_tiers` is the priority-ordered list of tiers searched for a
/// sender; the run pipeline passes a wider list for active requestors
/// than for the passive pass.
pub fn handle_requestors(
    ctx: &mut HandlerContext<'_>,
    buckets: &TierBuckets,
    tier: Tier,
    partner_tiers: &[Tier],
    market: &mut dyn MarketAdapter,
    options: RequestOptions,
) {
    for &resource in RESOURCE_EXCHANGE_ORDER {
        let requestors = buckets.for_resource(tier, resource).to_vec();

        for requestor in requestors {
            if options.receive_only_once_per_tick {
                if let Some(terminal) = ctx.colonies[requestor.index()].terminal() {
                    if terminal.has_received() {
                        continue;
                    }
                }
            }

            let threshold = ctx.thresholds.thresholds(requestor, resource);
            let amount = ctx.colonies[requestor.index()].assets(resource);
            let mut need = threshold.target - amount;
            if options.send_target_plus_tolerance {
                need += threshold.tolerance;
            }
            if need <= 0 {
                continue;
            }

            let requestor_room = ctx.colonies[requestor.index()].room_name().to_string();
            let requestor_tolerance = threshold.tolerance;

            let mut handled = false;
            let mut success = false;

            for &partner_tier in partner_tiers {
                let partners = buckets.for_resource(partner_tier, resource);
                let mut candidates = strict_candidates(ctx, partners, resource, requestor, need);
                if candidates.is_empty() {
                    candidates = relaxed_candidates(ctx, partners, resource, requestor, need, requestor_tolerance);
                }
                if candidates.is_empty() {
                    continue;
                }

                if let Some(sender) = best_sender(&requestor_room, need, &candidates) {
                    let store = ctx.colonies[sender.index()]
                        .terminal()
                        .map(|t| t.store_of(resource))
                        .unwrap_or(0);
                    let send_amount = need.min(store).min(max_send(resource));
                    if send_amount > 0 {
                        success = execute_transfer(
                            ctx.colonies,
                            ctx.ledger,
                            ctx.overload,
                            ctx.events,
                            sender,
                            requestor,
                            resource,
                            send_amount,
                        )
                        .is_ok();
                    }
                }
                handled = true;
                break;
            }

            if !handled {
                if options.allow_divvying {
                    success = divvy(ctx, resource, requestor, need, partner_tiers, buckets);
                }
                if !success && options.allow_market_buy {
                    success = try_market_buy(ctx, market, requestor, resource, need);
                }
            }

            if !success && ctx.notify_throttle.should_notify(requestor, resource, ctx.current_tick) {
                let name = ctx.colonies[requestor.index()].name().to_string();
                ctx.events.log(crate::events::NetworkEvent::NotificationEmitted {
                    text: format!("{} could not satisfy request for {} of {:?}", name, need, resource),
                });
            }
        }
    }
}

/// Partners that can fill `need` without dropping below their own
/// target: `assets[resource] - need >= threshold(partner).target`.
fn strict_candidates(
    ctx: &HandlerContext<'_>,
    partners: &[ColonyId],
    resource: Resource,
    requestor: ColonyId,
    need: i64,
) -> Vec<Candidate> {
    partners
        .iter()
        .filter(|&&p| p != requestor)
        .filter_map(|&p| {
            let t = ctx.thresholds.thresholds(p, resource);
            let assets = ctx.colonies[p.index()].assets(resource);
            if assets - need >= t.target {
                Some(to_candidate(ctx, p))
            } else {
                None
            }
        })
        .collect()
}

/// Fallback candidate set used when `strict_candidates` is empty:
/// tolerates dipping into the *requestor's own* tolerance band rather
/// than the partner's, which is asymmetric by design — a partner never
/// gets to decide how much slack a requestor's need is allowed.
fn relaxed_candidates(
    ctx: &HandlerContext<'_>,
    partners: &[ColonyId],
    resource: Resource,
    requestor: ColonyId,
    need: i64,
    requestor_tolerance: i64,
) -> Vec<Candidate> {
    partners
        .iter()
        .filter(|&&p| p != requestor)
        .filter_map(|&p| {
            let t = ctx.thresholds.thresholds(p, resource);
            let assets = ctx.colonies[p.index()].assets(resource);
            if assets - need >= t.target - requestor_tolerance {
                Some(to_candidate(ctx, p))
            } else {
                None
            }
        })
        .collect()
}

fn to_candidate(ctx: &HandlerContext<'_>, colony: ColonyId) -> Candidate {
    Candidate {
        colony,
        room_name: ctx.colonies[colony.index()].room_name().to_string(),
        avg_cooldown: ctx.terminal_stats.avg_cooldown(colony),
    }
}

/// Split `need` across up to 3 colonies sitting on the largest excess
/// above their own target, when no single partner tier produced a
/// candidate. Any successful partial send counts as overall success,
/// even if most of `need` is left unmet — this mirrors the handler's
/// greedy, non-optimizing character rather than chasing a perfect fill.
fn divvy(
    ctx: &mut HandlerContext<'_>,
    resource: Resource,
    requestor: ColonyId,
    need: i64,
    partner_tiers: &[Tier],
    buckets: &TierBuckets,
) -> bool {
    let mut candidates: Vec<(ColonyId, i64)> = partner_tiers
        .iter()
        .flat_map(|&tier| buckets.for_resource(tier, resource).iter().copied())
        .filter(|&p| p != requestor)
        .filter_map(|p| {
            let t = ctx.thresholds.thresholds(p, resource);
            let assets = ctx.colonies[p.index()].assets(resource);
            let excess = assets - t.target;
            if excess > 0 {
                Some((p, excess))
            } else {
                None
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    candidates.truncate(3);

    let mut remaining = need;
    let mut any_success = false;

    for (partner, excess) in candidates {
        if remaining <= 0 {
            break;
        }
        let draw = excess.min(remaining).min(max_send(resource));
        if draw <= 0 {
            continue;
        }
        if let Ok(sent) = execute_transfer(
            ctx.colonies,
            ctx.ledger,
            ctx.overload,
            ctx.events,
            partner,
            requestor,
            resource,
            draw,
        ) {
            remaining -= sent;
            if sent > 0 {
                any_success = true;
            }
        }
    }

    any_success
}

/// Buy `need` units on the market, gated by the credit threshold
/// appropriate to the resource's class.
fn try_market_buy(
    ctx: &mut HandlerContext<'_>,
    market: &mut dyn MarketAdapter,
    requestor: ColonyId,
    resource: Resource,
    need: i64,
) -> bool {
    if !ctx.market_gate.allows_buy(resource, ctx.credits) {
        return false;
    }

    let bought = market.buy(requestor, resource, need);
    if bought < 0 {
        return false;
    }
    ctx.colonies[requestor.index()].credit(resource, bought);
    let name = ctx.colonies[requestor.index()].name().to_string();
    ctx.events.log(crate::events::NetworkEvent::MarketFallthrough {
        colony: name,
        resource,
        amount: bought,
    });
    true
}
