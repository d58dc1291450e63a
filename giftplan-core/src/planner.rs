//! Inventory and assignment ledger.
//!
//! The planner owns the owned-quantity inventory, the tentative assignment
//! table and every character's stored bond state. Assignments are clamped
//! so that, for every gift key, the total assigned across characters never
//! exceeds what is owned. Committing applies all previews and consumes the
//! assigned gifts as one state transition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bond::{BondPreview, BondState, simulate_bond};
use crate::data::ReferenceData;
use crate::gift::GiftKey;
use crate::inventory::{OwnedInventory, SynthesisOutcome};

/// Character id to (gift key to positive quantity). Empty rows are removed.
pub type AssignmentTable = BTreeMap<u32, BTreeMap<GiftKey, u32>>;

/// Summary of an applied commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub bonds: BTreeMap<u32, BondPreview>,
    pub consumed: BTreeMap<GiftKey, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitOutcome {
    Applied(CommitReport),
    /// No tentative assignments to apply.
    NothingToCommit,
    /// Reference data is incomplete; nothing was changed.
    Deferred,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftPlanner {
    #[serde(default)]
    inventory: OwnedInventory,
    #[serde(default)]
    assignments: AssignmentTable,
    #[serde(default)]
    bonds: BTreeMap<u32, BondState>,
}

impl GiftPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_parts(
        inventory: OwnedInventory,
        assignments: AssignmentTable,
        bonds: BTreeMap<u32, BondState>,
    ) -> Self {
        let mut planner = Self {
            inventory,
            assignments: AssignmentTable::new(),
            bonds: bonds
                .into_iter()
                .map(|(id, state)| (id, BondState::new(state.level, state.exp)))
                .collect(),
        };
        // Re-apply through the clamp so a stale snapshot cannot over-assign.
        for (character_id, row) in assignments {
            for (key, qty) in row {
                planner.set_assignment(character_id, key, qty);
            }
        }
        planner
    }

    #[must_use]
    pub const fn inventory(&self) -> &OwnedInventory {
        &self.inventory
    }

    #[must_use]
    pub const fn assignments(&self) -> &AssignmentTable {
        &self.assignments
    }

    #[must_use]
    pub const fn bonds(&self) -> &BTreeMap<u32, BondState> {
        &self.bonds
    }

    // Owned quantities -------------------------------------------------------

    #[must_use]
    pub fn owned(&self, key: GiftKey) -> u32 {
        self.inventory.quantity(key)
    }

    /// Set the owned quantity, never below what is currently assigned.
    /// Returns the stored quantity.
    pub fn set_owned_quantity(&mut self, key: GiftKey, qty: u32) -> u32 {
        let stored = qty.max(self.total_assigned(key));
        self.inventory.set(key, stored);
        stored
    }

    pub fn increment_owned(&mut self, key: GiftKey) -> u32 {
        self.inventory.increment(key)
    }

    /// Remove one unit unless every owned unit is already assigned.
    pub fn decrement_owned(&mut self, key: GiftKey) -> u32 {
        let floor = self.total_assigned(key);
        self.inventory.remove_down_to(key, 1, floor)
    }

    // Assignments ------------------------------------------------------------

    /// Sum of `key` assigned across all characters.
    #[must_use]
    pub fn total_assigned(&self, key: GiftKey) -> u32 {
        self.assignments
            .values()
            .filter_map(|row| row.get(&key))
            .fold(0u32, |sum, qty| sum.saturating_add(*qty))
    }

    /// Totals per gift key across all characters.
    #[must_use]
    pub fn assigned_totals(&self) -> BTreeMap<GiftKey, u32> {
        let mut totals: BTreeMap<GiftKey, u32> = BTreeMap::new();
        for row in self.assignments.values() {
            for (key, qty) in row {
                let entry = totals.entry(*key).or_insert(0);
                *entry = entry.saturating_add(*qty);
            }
        }
        totals
    }

    #[must_use]
    pub fn assignment(&self, character_id: u32, key: GiftKey) -> u32 {
        self.assignments
            .get(&character_id)
            .and_then(|row| row.get(&key))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn character_assignments(&self, character_id: u32) -> Option<&BTreeMap<GiftKey, u32>> {
        self.assignments.get(&character_id)
    }

    /// Owned units of `key` not promised to any character.
    #[must_use]
    pub fn available(&self, key: GiftKey) -> u32 {
        self.owned(key).saturating_sub(self.total_assigned(key))
    }

    /// Assign `qty` units of `key` to a character, silently clamped to what
    /// the other characters have left. Zero removes the entry. Returns the
    /// quantity actually assigned.
    pub fn set_assignment(&mut self, character_id: u32, key: GiftKey, qty: u32) -> u32 {
        let current = self.assignment(character_id, key);
        let others = self.total_assigned(key).saturating_sub(current);
        let available = self.owned(key).saturating_sub(others);
        let applied = qty.min(available);

        if applied > 0 {
            self.assignments
                .entry(character_id)
                .or_default()
                .insert(key, applied);
        } else if let Some(row) = self.assignments.get_mut(&character_id) {
            row.remove(&key);
            if row.is_empty() {
                self.assignments.remove(&character_id);
            }
        }
        applied
    }

    pub fn clear_assignments(&mut self) {
        self.assignments.clear();
    }

    pub fn clear_character_assignments(&mut self, character_id: u32) {
        self.assignments.remove(&character_id);
    }

    #[must_use]
    pub fn has_assignments(&self) -> bool {
        !self.assignments.is_empty()
    }

    // Bond state -------------------------------------------------------------

    /// Stored bond state, or the level 1 default when none exists yet.
    #[must_use]
    pub fn bond_state(&self, character_id: u32) -> BondState {
        self.bonds.get(&character_id).copied().unwrap_or_default()
    }

    /// Stored bond state, creating the default entry on first access.
    pub fn ensure_bond_state(&mut self, character_id: u32) -> BondState {
        *self.bonds.entry(character_id).or_default()
    }

    /// Overwrite a character's bond state (clamped into range).
    pub fn set_bond_state(&mut self, character_id: u32, level: u32, exp: u32) -> BondState {
        let state = BondState::new(level, exp);
        self.bonds.insert(character_id, state);
        state
    }

    /// Read-only bond outcome of the character's tentative assignments.
    #[must_use]
    pub fn preview(
        &self,
        character_id: u32,
        reference: &ReferenceData,
        choice_box: GiftKey,
    ) -> BondPreview {
        let state = self.bond_state(character_id);
        let (Some(character), Some(row)) = (
            reference.character(character_id),
            self.assignments.get(&character_id),
        ) else {
            return BondPreview::unchanged(state);
        };
        simulate_bond(
            state,
            character,
            row,
            reference.catalog(),
            reference.bond_exp_table.as_ref(),
            choice_box,
        )
    }

    /// Apply every tentative assignment: write each character's previewed
    /// bond state, consume the assigned gifts, then clear the table.
    ///
    /// All previews are computed before any state changes. When the exp
    /// table or an assigned character is missing from the reference data,
    /// nothing is touched and the assignments stay pending.
    pub fn commit(&mut self, reference: &ReferenceData, choice_box: GiftKey) -> CommitOutcome {
        if self.assignments.is_empty() {
            return CommitOutcome::NothingToCommit;
        }
        let ready = reference.bond_exp_table.is_some()
            && self
                .assignments
                .keys()
                .all(|id| reference.character(*id).is_some());
        if !ready {
            log::warn!("commit deferred: reference data incomplete");
            return CommitOutcome::Deferred;
        }

        let bonds: BTreeMap<u32, BondPreview> = self
            .assignments
            .keys()
            .map(|id| (*id, self.preview(*id, reference, choice_box)))
            .collect();
        let consumed = self.assigned_totals();

        for (id, preview) in &bonds {
            self.bonds.insert(*id, preview.new_state());
        }
        for (key, qty) in &consumed {
            self.inventory.remove_down_to(*key, *qty, 0);
        }
        self.assignments.clear();

        log::debug!(
            "committed assignments for {} characters consuming {} gift kinds",
            bonds.len(),
            consumed.len()
        );
        CommitOutcome::Applied(CommitReport { bonds, consumed })
    }

    /// Convert unassigned synthesis gifts into choice boxes.
    pub fn convert_synthesis_gifts(
        &mut self,
        synthesis: &[GiftKey],
        choice_box: GiftKey,
    ) -> Option<SynthesisOutcome> {
        let reserved = self.assigned_totals();
        let outcome = self.inventory.convert_synthesis(synthesis, choice_box, |key| {
            reserved.get(&key).copied().unwrap_or(0)
        });
        if let Some(outcome) = &outcome {
            log::debug!(
                "synthesized {} choice boxes from {} gifts",
                outcome.boxes_created,
                outcome.converted
            );
        }
        outcome
    }
}
