//! Inventory collaborator boundary.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Consumable, Grant, PayloadKind, Tool};

/// Read and limited write access to the participants' shared inventory.
pub trait Inventory {
    /// Number of `item` currently held.
    fn count(&self, item: Consumable) -> u32;

    /// Reports whether `tool` is equipped.
    fn has_tool(&self, tool: Tool) -> bool;

    /// Reports whether `payload` ammunition is unlocked.
    fn has_payload(&self, payload: PayloadKind) -> bool;

    /// Spends one `item`, returning `false` when none is held.
    fn consume(&mut self, item: Consumable) -> bool;

    /// Hands an item to the inventory.
    fn grant(&mut self, grant: Grant);
}

/// In-memory inventory used by the engine's adapters and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventoryLedger {
    consumables: BTreeMap<Consumable, u32>,
    tools: BTreeSet<Tool>,
    payloads: BTreeSet<PayloadKind>,
}

impl InventoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` units of `item`.
    #[must_use]
    pub fn with_consumable(mut self, item: Consumable, count: u32) -> Self {
        *self.consumables.entry(item).or_default() += count;
        self
    }

    /// Equips `tool`.
    #[must_use]
    pub fn with_tool(mut self, tool: Tool) -> Self {
        let _ = self.tools.insert(tool);
        self
    }

    /// Unlocks `payload` ammunition.
    #[must_use]
    pub fn with_payload(mut self, payload: PayloadKind) -> Self {
        let _ = self.payloads.insert(payload);
        self
    }
}

impl Inventory for InventoryLedger {
    fn count(&self, item: Consumable) -> u32 {
        self.consumables.get(&item).copied().unwrap_or(0)
    }

    fn has_tool(&self, tool: Tool) -> bool {
        self.tools.contains(&tool)
    }

    fn has_payload(&self, payload: PayloadKind) -> bool {
        payload == PayloadKind::Normal || self.payloads.contains(&payload)
    }

    fn consume(&mut self, item: Consumable) -> bool {
        match self.consumables.get_mut(&item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    fn grant(&mut self, grant: Grant) {
        match grant {
            Grant::Consumable(item) => *self.consumables.entry(item).or_default() += 1,
            Grant::Tool(tool) => {
                let _ = self.tools.insert(tool);
            }
        }
    }
}
