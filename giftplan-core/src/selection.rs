//! Selected characters.
use serde::{Deserialize, Serialize};

use crate::character::{Character, CharacterRoster};
use crate::planner::GiftPlanner;

/// Ids of the selected characters, ascending and unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: Vec<u32>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        let mut selection = Self::new();
        selection.replace(ids);
        selection
    }

    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Replace the whole selection.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = u32>) {
        self.ids = ids.into_iter().collect();
        self.ids.sort_unstable();
        self.ids.dedup();
    }

    /// Select or deselect a character. Deselecting drops the character's
    /// tentative assignments. Returns whether the character is now selected.
    pub fn toggle(&mut self, id: u32, planner: &mut GiftPlanner) -> bool {
        match self.ids.binary_search(&id) {
            Ok(index) => {
                self.ids.remove(index);
                planner.clear_character_assignments(id);
                false
            }
            Err(index) => {
                self.ids.insert(index, id);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.ids.clear();
    }

    /// Selected characters present in the roster, in selection order.
    #[must_use]
    pub fn resolve<'a>(&self, roster: &'a CharacterRoster) -> Vec<&'a Character> {
        self.ids
            .iter()
            .filter_map(|id| roster.get_by_id(*id))
            .collect()
    }
}
