//! Owned gift quantities.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::SYNTHESIS_PAIR;
use crate::gift::GiftKey;

/// Sparse map of gift key to owned quantity. A key at zero is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnedInventory {
    quantities: BTreeMap<GiftKey, u32>,
}

/// Result of converting synthesis gifts into choice boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisOutcome {
    /// Units consumed from the synthesis gifts, remainder included.
    pub converted: u32,
    pub boxes_created: u32,
    /// Gift that kept the odd unit, if any.
    pub remainder_kept: Option<GiftKey>,
}

impl OwnedInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn quantity(&self, key: GiftKey) -> u32 {
        self.quantities.get(&key).copied().unwrap_or(0)
    }

    /// Set the owned quantity. Zero removes the entry.
    pub fn set(&mut self, key: GiftKey, qty: u32) {
        if qty == 0 {
            self.quantities.remove(&key);
        } else {
            self.quantities.insert(key, qty);
        }
    }

    /// Add `qty` units. Returns the new quantity.
    pub fn add(&mut self, key: GiftKey, qty: u32) -> u32 {
        let next = self.quantity(key).saturating_add(qty);
        self.set(key, next);
        next
    }

    /// Remove up to `qty` units, never going below `floor`.
    /// Returns the new quantity.
    pub fn remove_down_to(&mut self, key: GiftKey, qty: u32, floor: u32) -> u32 {
        let current = self.quantity(key);
        let next = current.saturating_sub(qty).max(floor.min(current));
        self.set(key, next);
        next
    }

    pub fn increment(&mut self, key: GiftKey) -> u32 {
        self.add(key, 1)
    }

    pub fn decrement(&mut self, key: GiftKey) -> u32 {
        self.remove_down_to(key, 1, 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GiftKey, u32)> + '_ {
        self.quantities.iter().map(|(key, qty)| (*key, *qty))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Convert synthesis gifts into choice boxes, two units per box.
    ///
    /// `reserved` reports units of a key that must stay in place (already
    /// promised elsewhere); only the rest is converted. An odd leftover unit
    /// returns to the first listed gift that contributed units. Returns
    /// `None` when fewer than two units are convertible.
    pub fn convert_synthesis<F>(
        &mut self,
        synthesis: &[GiftKey],
        choice_box: GiftKey,
        reserved: F,
    ) -> Option<SynthesisOutcome>
    where
        F: Fn(GiftKey) -> u32,
    {
        let mut keys: Vec<GiftKey> = Vec::with_capacity(synthesis.len());
        for key in synthesis {
            if *key != choice_box && !keys.contains(key) {
                keys.push(*key);
            }
        }

        let convertible: Vec<(GiftKey, u32, u32)> = keys
            .iter()
            .map(|key| {
                let owned = self.quantity(*key);
                let kept = reserved(*key).min(owned);
                (*key, kept, owned - kept)
            })
            .collect();
        let total: u32 = convertible
            .iter()
            .fold(0u32, |sum, (_, _, free)| sum.saturating_add(*free));
        if total < SYNTHESIS_PAIR {
            return None;
        }

        let boxes = total / SYNTHESIS_PAIR;
        let remainder = total % SYNTHESIS_PAIR;
        let first_contributor = convertible
            .iter()
            .find(|(_, _, free)| *free > 0)
            .map(|(key, _, _)| *key);
        debug_assert!(
            first_contributor.is_some(),
            "synthesis total {total} with no contributing gift"
        );

        for (key, kept, _) in &convertible {
            self.set(*key, *kept);
        }
        self.add(choice_box, boxes);

        let remainder_kept = if remainder > 0 {
            let target = first_contributor.or_else(|| keys.first().copied());
            if let Some(target) = target {
                self.add(target, remainder);
            }
            target
        } else {
            None
        };

        Some(SynthesisOutcome {
            converted: total - remainder,
            boxes_created: boxes,
            remainder_kept,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantities_are_not_stored() {
        let mut inv = OwnedInventory::new();
        inv.set(GiftKey::sr(1), 2);
        inv.set(GiftKey::sr(2), 0);
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.decrement(GiftKey::sr(1)), 1);
        assert_eq!(inv.decrement(GiftKey::sr(1)), 0);
        assert!(inv.is_empty());
        assert_eq!(inv.decrement(GiftKey::sr(1)), 0);
    }

    #[test]
    fn remove_respects_floor() {
        let mut inv = OwnedInventory::new();
        inv.set(GiftKey::ssr(4), 5);
        assert_eq!(inv.remove_down_to(GiftKey::ssr(4), 10, 3), 3);
        assert_eq!(inv.remove_down_to(GiftKey::ssr(4), 1, 7), 3);
        assert_eq!(inv.increment(GiftKey::ssr(4)), 4);
    }

    #[test]
    fn synthesis_converts_pairs_and_keeps_remainder_on_first_contributor() {
        let mut inv = OwnedInventory::new();
        inv.set(GiftKey::sr(3), 2);
        inv.set(GiftKey::sr(4), 3);
        let outcome = inv
            .convert_synthesis(&[GiftKey::sr(2), GiftKey::sr(3), GiftKey::sr(4)], GiftKey::sr(35), |_| 0)
            .unwrap();
        assert_eq!(outcome.boxes_created, 2);
        assert_eq!(outcome.converted, 4);
        assert_eq!(outcome.remainder_kept, Some(GiftKey::sr(3)));
        assert_eq!(inv.quantity(GiftKey::sr(3)), 1);
        assert_eq!(inv.quantity(GiftKey::sr(4)), 0);
        assert_eq!(inv.quantity(GiftKey::sr(35)), 2);
    }

    #[test]
    fn synthesis_below_a_pair_is_noop() {
        let mut inv = OwnedInventory::new();
        inv.set(GiftKey::sr(2), 1);
        let before = inv.clone();
        assert!(inv.convert_synthesis(&[GiftKey::sr(2)], GiftKey::sr(35), |_| 0).is_none());
        assert_eq!(inv, before);
    }

    #[test]
    fn synthesis_leaves_reserved_units() {
        let mut inv = OwnedInventory::new();
        inv.set(GiftKey::sr(2), 4);
        let outcome = inv
            .convert_synthesis(&[GiftKey::sr(2)], GiftKey::sr(35), |key| {
                if key == GiftKey::sr(2) { 1 } else { 0 }
            })
            .unwrap();
        assert_eq!(outcome.boxes_created, 1);
        assert_eq!(inv.quantity(GiftKey::sr(2)), 2);
        assert_eq!(inv.quantity(GiftKey::sr(35)), 1);
    }

    #[test]
    fn serializes_as_plain_key_map() {
        let mut inv = OwnedInventory::new();
        inv.set(GiftKey::ssr(42), 2);
        assert_eq!(serde_json::to_string(&inv).unwrap(), r#"{"ssr-42":2}"#);
    }
}
