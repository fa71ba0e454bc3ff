//! Structured event log for the Terminal Network.
//!
//! Grounded on the teacher's `models::event::{Event, EventLog}`: an
//! append-only, queryable record of everything significant that happened
//! during a tick. The network has no `log`/`tracing` dependency of its
//! own — this log *is* its logging layer, in the teacher's own idiom.

use crate::models::resource::Resource;

/// A structured record of something that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Classified {
        colony: String,
        resource: Resource,
        tier: crate::models::tier::Tier,
    },
    TransferSent {
        origin: String,
        destination: String,
        resource: Resource,
        amount: i64,
    },
    TransferFailed {
        origin: String,
        resource: Resource,
        reason: String,
    },
    MarketFallthrough {
        colony: String,
        resource: Resource,
        amount: i64,
    },
    OverloadFlagged {
        colony: String,
    },
    NotificationEmitted {
        text: String,
    },
    OverrideAccepted {
        colony: String,
        resource: Resource,
    },
    OverrideRejected {
        colony: String,
        resource: Resource,
        reason: String,
    },
}

/// Append-only event log for one or more ticks.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<NetworkEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: NetworkEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[NetworkEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Sink for the textual-notification surface spec.md's CLI/UI section
/// describes: bullet-prefixed lines, plus a `summarize()` dump.
pub trait Notifier {
    fn notify(&mut self, text: String);
}

/// Prints bullet lines to stdout, as the source's console notifications do.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, text: String) {
        println!("\u{2022} {}", text);
    }
}

/// Collects notifications in memory; used by tests and embedding hosts
/// that want to inspect rather than print them.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    messages: Vec<String>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&mut self, text: String) {
        self.messages.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_notifier_collects_messages() {
        let mut notifier = InMemoryNotifier::new();
        notifier.notify("hello".to_string());
        notifier.notify("world".to_string());
        assert_eq!(notifier.messages(), &["hello".to_string(), "world".to_string()]);
    }

    #[test]
    fn event_log_accumulates() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        log.log(NetworkEvent::OverloadFlagged {
            colony: "A".to_string(),
        });
        assert_eq!(log.len(), 1);
    }
}
