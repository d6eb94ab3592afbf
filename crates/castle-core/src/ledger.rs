//! Resource ledger: the single mutable record of everything the player owns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{STARTING_MONSTER_COINS, STARTING_STONE};

/// A spendable or collectible resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Stone,
    Iron,
    Copper,
    /// Rare ore. Collected but not consumed by any current recipe.
    Thorium,
    MonsterCoins,
    /// Dropped by a defeated Force boss.
    ForceCore,
    /// Dropped by a defeated Spirit boss.
    SpiritCore,
    /// Dropped by a defeated Magic boss.
    MagicCore,
    /// Dropped by a defeated Void boss.
    VoidCore,
    /// Tower items live in the ledger until equipped.
    UnstoppableForceItem,
    SereneSpiritItem,
    MultitudationVortexItem,
}

/// A bundle of resource amounts, used for costs and rewards.
/// BTreeMap keys give deterministic iteration order.
pub type CostMap = BTreeMap<Resource, u64>;

/// Player resource balances.
///
/// Spending is atomic: [`Ledger::spend`] checks the full cost before
/// committing any part of it, so a rejected purchase changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: BTreeMap<Resource, u64>,
}

impl Default for Ledger {
    fn default() -> Self {
        let mut balances = BTreeMap::new();
        balances.insert(Resource::Stone, STARTING_STONE);
        balances.insert(Resource::MonsterCoins, STARTING_MONSTER_COINS);
        Self { balances }
    }
}

impl Ledger {
    /// An empty ledger with no starting resources.
    pub fn empty() -> Self {
        Self {
            balances: BTreeMap::new(),
        }
    }

    pub fn balance(&self, resource: Resource) -> u64 {
        self.balances.get(&resource).copied().unwrap_or(0)
    }

    pub fn deposit(&mut self, resource: Resource, amount: u64) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(resource).or_insert(0) += amount;
    }

    /// True if every line of `cost` is covered by the current balances.
    pub fn can_afford(&self, cost: &CostMap) -> bool {
        cost.iter().all(|(&resource, &amount)| self.balance(resource) >= amount)
    }

    /// Deduct `cost` if fully affordable. Returns false (and leaves the
    /// ledger untouched) otherwise.
    pub fn spend(&mut self, cost: &CostMap) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (&resource, &amount) in cost {
            if let Some(balance) = self.balances.get_mut(&resource) {
                *balance -= amount;
            }
        }
        true
    }

    /// Iterate over non-zero balances in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u64)> + '_ {
        self.balances
            .iter()
            .filter(|(_, &amount)| amount > 0)
            .map(|(&resource, &amount)| (resource, amount))
    }
}
