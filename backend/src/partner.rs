//! Partner selection: transaction-cost-weighted scoring of sender and
//! receiver candidates.

use crate::models::colony::ColonyId;

/// Weight applied to `sendCost` in the sender scoring formula.
pub const K: f64 = 2.0;
/// Cost scale used to make the quadratic-ish term comparable across
/// request sizes.
pub const BIG_COST: f64 = 2000.0;

/// Canonical energy cost to send `amount` of any resource between two
/// room names: a function of linear distance only.
pub fn send_cost(amount: i64, room_a: &str, room_b: &str) -> i64 {
    let distance = room_distance(room_a, room_b);
    let cost = (amount as f64) * (1.0 - (-distance / 30.0).exp());
    cost.ceil().max(1.0) as i64
}

/// Linear distance between two room names of the form `[EW]<x>[NS]<y>`.
///
/// Unparseable names are treated as maximally distant (a conservative
/// default that never panics on malformed scenario input).
pub fn room_distance(room_a: &str, room_b: &str) -> f64 {
    match (parse_room(room_a), parse_room(room_b)) {
        (Some((ax, ay)), Some((bx, by))) => {
            ((ax - bx).abs() as f64).max((ay - by).abs() as f64)
        }
        _ => 50.0,
    }
}

fn parse_room(name: &str) -> Option<(i32, i32)> {
    let bytes = name.as_bytes();
    let mut i = 0;
    let we = *bytes.first()?;
    if we != b'W' && we != b'E' {
        return None;
    }
    i += 1;
    let x_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == x_start {
        return None;
    }
    let x: i32 = name[x_start..i].parse().ok()?;
    let ns = *bytes.get(i)?;
    if ns != b'N' && ns != b'S' {
        return None;
    }
    i += 1;
    let y_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == y_start || i != bytes.len() {
        return None;
    }
    let y: i32 = name[y_start..i].parse().ok()?;
    let signed_x = if we == b'W' { -(x + 1) } else { x };
    let signed_y = if ns == b'N' { -(y + 1) } else { y };
    Some((signed_x, signed_y))
}

/// One scoring candidate: its colony id, room name (for cost), and the
/// persistent cooldown EMA used to penalize recently-overloaded senders.
pub struct Candidate {
    pub colony: ColonyId,
    pub room_name: String,
    pub avg_cooldown: f64,
}

/// Best sender: maximize `score(p) = -sendCost * (K + sendCost/BIG_COST +
/// avgCooldown[p])`. Higher (less negative) is better.
pub fn best_sender(requestor_room: &str, amount: i64, candidates: &[Candidate]) -> Option<ColonyId> {
    candidates
        .iter()
        .map(|c| {
            let cost = send_cost(amount, &c.room_name, requestor_room) as f64;
            let score = -cost * (K + cost / BIG_COST + c.avg_cooldown);
            (c.colony, score)
        })
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(colony, _)| colony)
}

/// Best receiver: minimize `sendCost(provider, candidate, amount)`.
pub fn best_receiver(provider_room: &str, amount: i64, candidates: &[Candidate]) -> Option<ColonyId> {
    candidates
        .iter()
        .map(|c| (c.colony, send_cost(amount, provider_room, &c.room_name)))
        .min_by_key(|(_, cost)| *cost)
        .map(|(colony, _)| colony)
}
