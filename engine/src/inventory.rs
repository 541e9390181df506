use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Key,
    Artifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemEffect {
    Heal,
    Energy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub rarity: Rarity,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub effect: Option<ItemEffect>,
    pub quantity: u32,
}

/// Ordered item stacks; one entry per item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Stack onto an existing entry with the same id, or append a new one.
    pub fn add(&mut self, item: Item) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    /// Remove up to `quantity`; returns how many were actually removed.
    pub fn remove(&mut self, id: &str, quantity: u32) -> u32 {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            return 0;
        };
        let held = self.items[pos].quantity;
        if held <= quantity {
            self.items.remove(pos);
            held
        } else {
            self.items[pos].quantity = held - quantity;
            quantity
        }
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| i.quantity as u64).sum()
    }

    /// Units held of a given type, counting stack quantities.
    pub fn count_kind(&self, kind: ItemType) -> u64 {
        self.items.iter().filter(|i| i.kind == kind).map(|i| i.quantity as u64).sum()
    }

    pub fn count_rarity(&self, rarity: Rarity) -> u64 {
        self.items.iter().filter(|i| i.rarity == rarity).map(|i| i.quantity as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
