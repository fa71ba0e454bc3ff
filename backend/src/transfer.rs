//! Transfer Executor: issues a terminal send, enforces size caps and
//! readiness, and records the ledger entry.
//!
//! Grounded on `settlement::rtgs::try_settle`: an atomic, all-or-nothing
//! balance-mutating operation returning a typed result with no partial
//! side effects on failure.

use std::collections::HashSet;

use crate::error::TransferError;
use crate::events::{EventLog, NetworkEvent};
use crate::models::colony::{Colony, ColonyId};
use crate::models::ledger::TransferLedger;
use crate::models::resource::Resource;
use crate::partner::{room_distance, send_cost};

/// `MAX_SEND = 25_000` for energy, `3_000` otherwise.
pub const MAX_SEND_ENERGY: i64 = 25_000;
pub const MAX_SEND_OTHER: i64 = 3_000;

pub fn max_send(resource: Resource) -> i64 {
    if resource.is_energy() {
        MAX_SEND_ENERGY
    } else {
        MAX_SEND_OTHER
    }
}

/// Issue `send(resource, amount, destination)` on the origin's terminal,
/// bounded by `max_send` and the terminal's own store.
///
/// On success: credits the destination, marks it as having received this
/// tick, records the ledger entry, and logs a `TransferSent` event. On
/// `NotEnoughResources`/`Tired`: flags the sender in `overload` (no
/// in-tick retry). Any other failure is logged and dropped.
pub fn execute_transfer(
    colonies: &mut [Colony],
    ledger: &mut TransferLedger,
    overload: &mut HashSet<ColonyId>,
    events: &mut EventLog,
    origin: ColonyId,
    destination: ColonyId,
    resource: Resource,
    amount: i64,
) -> Result<i64, TransferError> {
    let amount = amount.min(max_send(resource));
    if amount <= 0 {
        return Err(TransferError::Other("non-positive transfer amount".to_string()));
    }

    let (cost, cooldown_ticks) = {
        let origin_room = colonies[origin.index()].room_name();
        let dest_room = colonies[destination.index()].room_name();
        let cost = send_cost(amount, origin_room, dest_room);
        let cooldown = (room_distance(origin_room, dest_room) / 10.0).ceil().max(1.0) as u32;
        (cost, cooldown)
    };

    let send_result = colonies[origin.index()]
        .terminal_mut()
        .expect("transfer origin must own a terminal")
        .send(resource, amount, cooldown_ticks);

    match send_result {
        Ok(()) => {
            colonies[destination.index()].credit(resource, amount);
            if let Some(terminal) = colonies[destination.index()].terminal_mut() {
                terminal.mark_received();
            }
            ledger.record(resource, origin, destination, amount, cost);
            events.log(NetworkEvent::TransferSent {
                origin: colonies[origin.index()].name().to_string(),
                destination: colonies[destination.index()].name().to_string(),
                resource,
                amount,
            });
            Ok(amount)
        }
        Err(err @ TransferError::NotEnoughResources) | Err(err @ TransferError::Tired) => {
            overload.insert(origin);
            events.log(NetworkEvent::OverloadFlagged {
                colony: colonies[origin.index()].name().to_string(),
            });
            Err(err)
        }
        Err(TransferError::Other(reason)) => {
            events.log(NetworkEvent::TransferFailed {
                origin: colonies[origin.index()].name().to_string(),
                resource,
                reason: reason.clone(),
            });
            Err(TransferError::Other(reason))
        }
    }
}
