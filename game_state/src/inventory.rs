//! The party inventory and the pending-gift queue.

use serde::{Deserialize, Serialize};

/// Identifier of a game object, as referenced by scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u16);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Items the party carries, plus gifts promised during dialogue but not
/// yet handed over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<ItemId>,
    pending_gifts: Vec<ItemId>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an item into the party's possession.
    pub fn add_item(&mut self, item: ItemId) {
        self.items.push(item);
    }

    /// Check whether the party carries an item.
    pub fn has_item(&self, item: ItemId) -> bool {
        self.items.contains(&item)
    }

    /// Remove one instance of an item. Returns `false` if not carried.
    pub fn drop_item(&mut self, item: ItemId) -> bool {
        match self.items.iter().position(|held| *held == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Queue an item to be handed over at the next transfer.
    pub fn queue_gift(&mut self, item: ItemId) {
        self.pending_gifts.push(item);
    }

    /// Move every pending gift into the carried items, returning how many
    /// were transferred.
    pub fn transfer_pending_gifts(&mut self) -> usize {
        let count = self.pending_gifts.len();
        self.items.append(&mut self.pending_gifts);
        count
    }

    /// Items currently carried, in acquisition order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Gifts waiting to be handed over.
    pub fn pending_gifts(&self) -> &[ItemId] {
        &self.pending_gifts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_pending_gifts() {
        let mut inventory = Inventory::new();
        inventory.queue_gift(ItemId(4));
        inventory.queue_gift(ItemId(9));

        assert!(!inventory.has_item(ItemId(4)));
        assert_eq!(inventory.transfer_pending_gifts(), 2);
        assert!(inventory.has_item(ItemId(4)));
        assert!(inventory.has_item(ItemId(9)));
        assert!(inventory.pending_gifts().is_empty());

        // Nothing left to transfer.
        assert_eq!(inventory.transfer_pending_gifts(), 0);
    }

    #[test]
    fn test_drop_item() {
        let mut inventory = Inventory::new();
        inventory.add_item(ItemId(1));
        inventory.add_item(ItemId(2));

        assert!(inventory.drop_item(ItemId(1)));
        assert!(!inventory.has_item(ItemId(1)));
        assert!(inventory.has_item(ItemId(2)));

        assert!(!inventory.drop_item(ItemId(1)));
    }
}
