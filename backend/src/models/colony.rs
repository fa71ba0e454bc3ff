//! Colony and terminal models.
//!
//! Re-architecture point: the source's string-keyed colony lookup becomes
//! a thin arena index (`ColonyId`) over an owned `Vec<Colony>`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::TransferError;
use crate::models::resource::Resource;

/// Arena index into the network's colony list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColonyId(u32);

impl ColonyId {
    pub fn from_index(index: usize) -> Self {
        ColonyId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bounded-throughput transport endpoint. At most one successful `send`
/// per tick (`isReady` guard).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terminal {
    cooldown: u32,
    /// Physically available balance at the terminal, which may be a
    /// subset of `Colony::assets` (the rest may sit in storage).
    store: HashMap<Resource, i64>,
    received_this_tick: bool,
}

impl Terminal {
    pub fn new(store: HashMap<Resource, i64>) -> Self {
        Self {
            cooldown: 0,
            store,
            received_this_tick: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown == 0
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn has_received(&self) -> bool {
        self.received_this_tick
    }

    pub fn store_of(&self, resource: Resource) -> i64 {
        *self.store.get(&resource).unwrap_or(&0)
    }

    /// Reset the once-per-tick receive flag. Called by `refresh()`.
    pub fn reset_tick_flags(&mut self) {
        self.received_this_tick = false;
    }

    /// Tick cooldown down by one, as the host clock advances.
    pub fn decay_cooldown(&mut self) {
        if self.cooldown > 0 {
            self.cooldown -= 1;
        }
    }

    /// Draw down the terminal's store and put it on cooldown.
    ///
    /// Mirrors the two terminal-level failure codes the executor must
    /// distinguish: insufficient store, or cooldown not yet elapsed.
    pub fn send(&mut self, resource: Resource, amount: i64, cooldown_ticks: u32) -> Result<(), TransferError> {
        if !self.is_ready() {
            return Err(TransferError::Tired);
        }
        let available = self.store_of(resource);
        if amount > available {
            return Err(TransferError::NotEnoughResources);
        }
        self.store.insert(resource, available - amount);
        self.cooldown = cooldown_ticks;
        Ok(())
    }

    pub fn mark_received(&mut self) {
        self.received_this_tick = true;
    }
}

/// A logical node holding storage and a terminal; the unit of state
/// classification. Eligible for network membership iff `terminal` is
/// owned and `level >= 6`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colony {
    name: String,
    level: u8,
    room_name: String,
    assets: HashMap<Resource, i64>,
    terminal: Option<Terminal>,
    has_storage: bool,
    has_factory: bool,
}

impl Colony {
    pub fn new(name: impl Into<String>, level: u8, room_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level,
            room_name: room_name.into(),
            assets: HashMap::new(),
            terminal: None,
            has_storage: false,
            has_factory: false,
        }
    }

    pub fn with_terminal(mut self, store: HashMap<Resource, i64>) -> Self {
        self.terminal = Some(Terminal::new(store));
        self
    }

    pub fn with_storage(mut self) -> Self {
        self.has_storage = true;
        self
    }

    pub fn with_factory(mut self) -> Self {
        self.has_factory = true;
        self
    }

    pub fn with_assets(mut self, assets: HashMap<Resource, i64>) -> Self {
        self.assets = assets;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    pub fn has_storage(&self) -> bool {
        self.has_storage
    }

    pub fn has_factory(&self) -> bool {
        self.has_factory
    }

    pub fn has_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Eligible for network membership iff it owns a terminal and is at
    /// least level 6.
    pub fn is_eligible(&self) -> bool {
        self.has_terminal() && self.level >= 6
    }

    pub fn assets(&self, resource: Resource) -> i64 {
        *self.assets.get(&resource).unwrap_or(&0)
    }

    pub fn set_assets(&mut self, resource: Resource, amount: i64) {
        self.assets.insert(resource, amount);
    }

    pub fn credit(&mut self, resource: Resource, amount: i64) {
        let current = self.assets(resource);
        self.assets.insert(resource, current + amount);
    }

    pub fn terminal(&self) -> Option<&Terminal> {
        self.terminal.as_ref()
    }

    pub fn terminal_mut(&mut self) -> Option<&mut Terminal> {
        self.terminal.as_mut()
    }

    /// `remainingSpace(colony) := terminalCap + storageCap + factoryCap -
    /// totalAssets`, clamping an overfilled storage to exactly full: a
    /// storage-holding colony never contributes more than `storage_cap`
    /// per resource toward `totalAssets`, no matter how far over it sits.
    pub fn remaining_space(
        &self,
        terminal_cap: i64,
        storage_cap: i64,
        factory_cap: i64,
        include_factory: bool,
    ) -> i64 {
        let total_assets: i64 = if self.has_storage {
            self.assets.values().map(|&a| a.min(storage_cap)).sum()
        } else {
            self.assets.values().sum()
        };
        let cap = (if self.has_terminal() { terminal_cap } else { 0 })
            + (if self.has_storage { storage_cap } else { 0 })
            + (if self.has_factory && include_factory { factory_cap } else { 0 });
        cap - total_assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ineligible_without_terminal_or_below_level_6() {
        let no_terminal = Colony::new("A", 8, "W1N1");
        assert!(!no_terminal.is_eligible());

        let low_level = Colony::new("B", 5, "W1N2").with_terminal(HashMap::new());
        assert!(!low_level.is_eligible());

        let ok = Colony::new("C", 6, "W1N3").with_terminal(HashMap::new());
        assert!(ok.is_eligible());
    }

    #[test]
    fn send_fails_when_not_ready() {
        let mut terminal = Terminal::new(HashMap::from([(Resource::Energy, 10_000)]));
        terminal.send(Resource::Energy, 1_000, 10).unwrap();
        assert!(!terminal.is_ready());
        let err = terminal.send(Resource::Energy, 1_000, 10).unwrap_err();
        assert_eq!(err, TransferError::Tired);
    }

    #[test]
    fn send_fails_when_insufficient_store() {
        let mut terminal = Terminal::new(HashMap::from([(Resource::Energy, 500)]));
        let err = terminal.send(Resource::Energy, 1_000, 10).unwrap_err();
        assert_eq!(err, TransferError::NotEnoughResources);
    }

    #[test]
    fn remaining_space_clamps_overfilled_storage_to_exactly_full() {
        let overfilled = Colony::new("A", 8, "W1N1")
            .with_storage()
            .with_assets(HashMap::from([(Resource::Hydrogen, 2_000_000)]));
        // Without the clamp this would be 1_000_000 - 2_000_000 = -1_000_000.
        assert_eq!(overfilled.remaining_space(300_000, 1_000_000, 50_000, true), 0);

        let not_overfilled = Colony::new("B", 8, "W1N2")
            .with_storage()
            .with_assets(HashMap::from([(Resource::Hydrogen, 500_000)]));
        assert_eq!(not_overfilled.remaining_space(300_000, 1_000_000, 50_000, true), 500_000);
    }
}
