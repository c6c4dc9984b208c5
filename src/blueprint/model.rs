use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Electricity,
    Bricks,
    Chips,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Electricity, Resource::Bricks, Resource::Chips];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Electricity => "electricity",
            Resource::Bricks => "bricks",
            Resource::Chips => "chips",
        };
        write!(f, "{name}")
    }
}

/// Amounts of the three island currencies. Used both for team balances and
/// for blueprint costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub electricity: u32,
    #[serde(default)]
    pub bricks: u32,
    #[serde(default)]
    pub chips: u32,
}

impl Resources {
    pub fn new(electricity: u32, bricks: u32, chips: u32) -> Self {
        Self {
            electricity,
            bricks,
            chips,
        }
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Electricity => self.electricity,
            Resource::Bricks => self.bricks,
            Resource::Chips => self.chips,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Electricity => &mut self.electricity,
            Resource::Bricks => &mut self.bricks,
            Resource::Chips => &mut self.chips,
        }
    }

    /// True when every channel holds at least what `cost` asks for.
    pub fn covers(&self, cost: &Resources) -> bool {
        Resource::ALL
            .iter()
            .all(|r| self.get(*r) >= cost.get(*r))
    }

    /// Channels where the balance falls short of `cost`.
    pub fn shortfall(&self, cost: &Resources) -> Vec<Resource> {
        Resource::ALL
            .into_iter()
            .filter(|r| self.get(*r) < cost.get(*r))
            .collect()
    }

    pub fn checked_sub(&self, cost: &Resources) -> Option<Resources> {
        Some(Resources {
            electricity: self.electricity.checked_sub(cost.electricity)?,
            bricks: self.bricks.checked_sub(cost.bricks)?,
            chips: self.chips.checked_sub(cost.chips)?,
        })
    }

    pub fn credit(&self, resource: Resource, amount: u32) -> Resources {
        let mut next = *self;
        let slot = next.slot(resource);
        *slot = slot.saturating_add(amount);
        next
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost: Resources,
    #[serde(default)]
    pub icon: String,
}
