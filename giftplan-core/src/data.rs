use serde::{Deserialize, Serialize};

use crate::bond::BondExpTable;
use crate::character::{Character, CharacterRoster};
use crate::gift::GiftCatalog;

static EMPTY_CATALOG: GiftCatalog = GiftCatalog::empty();

/// Reference tables the planner reads. Each part may still be loading;
/// consumers treat a missing part as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReferenceData {
    #[serde(default)]
    pub characters: Option<CharacterRoster>,
    #[serde(default)]
    pub gifts: Option<GiftCatalog>,
    #[serde(default)]
    pub bond_exp_table: Option<BondExpTable>,
    /// Locale the gift names were loaded for.
    #[serde(default)]
    pub locale: Option<String>,
}

impl ReferenceData {
    /// Fully loaded reference data.
    #[must_use]
    pub const fn new(
        characters: CharacterRoster,
        gifts: GiftCatalog,
        bond_exp_table: BondExpTable,
    ) -> Self {
        Self {
            characters: Some(characters),
            gifts: Some(gifts),
            bond_exp_table: Some(bond_exp_table),
            locale: None,
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    #[must_use]
    pub fn character(&self, id: u32) -> Option<&Character> {
        self.characters.as_ref().and_then(|roster| roster.get_by_id(id))
    }

    /// Gift catalog, or an empty one while gifts are not loaded.
    #[must_use]
    pub fn catalog(&self) -> &GiftCatalog {
        self.gifts.as_ref().unwrap_or(&EMPTY_CATALOG)
    }

    /// Known character ids, empty while the roster is not loaded.
    #[must_use]
    pub fn character_ids(&self) -> Vec<u32> {
        self.characters
            .as_ref()
            .map(CharacterRoster::ids)
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.characters.is_some() && self.gifts.is_some() && self.bond_exp_table.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Favor;

    #[test]
    fn missing_parts_degrade_to_empty() {
        let data = ReferenceData::default();
        assert!(!data.is_complete());
        assert!(data.catalog().is_empty());
        assert!(data.character(1).is_none());
        assert!(data.character_ids().is_empty());
    }

    #[test]
    fn loaded_parts_are_reachable() {
        let data = ReferenceData::new(
            CharacterRoster(vec![Character::new(3, Favor::default())]),
            GiftCatalog::empty(),
            BondExpTable::default(),
        )
        .with_locale("en");
        assert!(data.is_complete());
        assert_eq!(data.character_ids(), vec![3]);
        assert_eq!(data.locale.as_deref(), Some("en"));
    }
}
