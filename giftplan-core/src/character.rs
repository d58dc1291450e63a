use serde::{Deserialize, Serialize};

use crate::gift::Rarity;

/// Preference buckets for one gift rarity, strongest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FavorTiers {
    #[serde(default)]
    pub xl: Vec<u32>,
    #[serde(default)]
    pub l: Vec<u32>,
    #[serde(default)]
    pub m: Vec<u32>,
}

/// Tiered gift preferences per rarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Favor {
    #[serde(default)]
    pub sr: FavorTiers,
    #[serde(default)]
    pub ssr: FavorTiers,
}

impl Favor {
    #[must_use]
    pub const fn tiers(&self, rarity: Rarity) -> &FavorTiers {
        match rarity {
            Rarity::Sr => &self.sr,
            Rarity::Ssr => &self.ssr,
        }
    }
}

/// A giftable character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub favor: Favor,
}

impl Character {
    #[must_use]
    pub fn new(id: u32, favor: Favor) -> Self {
        Self {
            id,
            name: String::new(),
            favor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CharacterRoster(pub Vec<Character>);

impl CharacterRoster {
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Load the roster from the character asset file.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into character records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self)
    }

    #[must_use]
    pub fn get_by_id(&self, id: u32) -> Option<&Character> {
        self.0.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.get_by_id(id).is_some()
    }

    /// Every known character id, in roster order.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        self.0.iter().map(|c| c.id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Character> {
        self.0.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a CharacterRoster {
    type Item = &'a Character;
    type IntoIter = std::slice::Iter<'a, Character>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
