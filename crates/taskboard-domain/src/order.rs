//! Ordered reference lists.
//!
//! Boards order their columns and columns order their cards through plain id
//! arrays. These helpers are the only way order arrays get mutated, so the
//! no-duplicates rule is enforced in one place.

use std::collections::HashSet;
use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};

/// An entity owning an ordered list of child ids.
pub trait OrderList {
    fn order_ids(&self) -> &[ObjectId];

    fn order_ids_mut(&mut self) -> &mut Vec<ObjectId>;

    fn touch(&mut self);

    fn contains_in_order(&self, id: ObjectId) -> bool {
        self.order_ids().contains(&id)
    }

    /// Append `id` unless it is already listed. Returns whether the list changed.
    fn append_to_order(&mut self, id: ObjectId) -> bool {
        if self.contains_in_order(id) {
            return false;
        }
        self.order_ids_mut().push(id);
        self.touch();
        true
    }

    /// Remove `id` if listed. Returns whether the list changed.
    fn remove_from_order(&mut self, id: ObjectId) -> bool {
        let ids = self.order_ids_mut();
        let before = ids.len();
        ids.retain(|existing| *existing != id);
        let changed = ids.len() != before;
        if changed {
            self.touch();
        }
        changed
    }

    /// Set the list verbatim. Rejects lists with duplicate ids.
    fn replace_order(&mut self, ids: Vec<ObjectId>) -> TaskboardResult<()> {
        ensure_unique(&ids)?;
        *self.order_ids_mut() = ids;
        self.touch();
        Ok(())
    }
}

pub fn ensure_unique(ids: &[ObjectId]) -> TaskboardResult<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(TaskboardError::Consistency(format!(
                "order list contains {} more than once",
                id
            )));
        }
    }
    Ok(())
}

/// Whether two duplicate-free lists hold the same ids, ignoring order.
pub fn same_members(left: &[ObjectId], right: &[ObjectId]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let right: HashSet<&ObjectId> = right.iter().collect();
    left.iter().all(|id| right.contains(id))
}
