//! Gift reference data and the composite gift key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Gift rarity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Sr,
    Ssr,
}

impl Rarity {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Sr => "sr",
            Self::Ssr => "ssr",
        }
    }

    #[must_use]
    pub const fn is_ssr(self) -> bool {
        matches!(self, Self::Ssr)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unique handle for a gift across both rarities.
///
/// Persisted as `"<rarity>-<id>"` (for example `"ssr-42"`) so stored
/// inventories stay readable and stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GiftKey {
    pub rarity: Rarity,
    pub id: u32,
}

impl GiftKey {
    #[must_use]
    pub const fn new(rarity: Rarity, id: u32) -> Self {
        Self { rarity, id }
    }

    #[must_use]
    pub const fn sr(id: u32) -> Self {
        Self::new(Rarity::Sr, id)
    }

    #[must_use]
    pub const fn ssr(id: u32) -> Self {
        Self::new(Rarity::Ssr, id)
    }
}

impl fmt::Display for GiftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.rarity, self.id)
    }
}

/// Errors raised when parsing a persisted gift key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GiftKeyParseError {
    #[error("gift key {0:?} is missing the '-' separator")]
    MissingSeparator(String),
    #[error("unknown gift rarity {0:?}")]
    UnknownRarity(String),
    #[error("invalid gift id {0:?}")]
    InvalidId(String),
}

impl FromStr for GiftKey {
    type Err = GiftKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rarity, id) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| GiftKeyParseError::MissingSeparator(s.to_string()))?;
        let rarity = match rarity.to_ascii_lowercase().as_str() {
            "sr" => Rarity::Sr,
            "ssr" => Rarity::Ssr,
            _ => return Err(GiftKeyParseError::UnknownRarity(rarity.to_string())),
        };
        let id = id
            .parse::<u32>()
            .map_err(|_| GiftKeyParseError::InvalidId(id.to_string()))?;
        Ok(Self { rarity, id })
    }
}

impl TryFrom<String> for GiftKey {
    type Error = GiftKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GiftKey> for String {
    fn from(key: GiftKey) -> Self {
        key.to_string()
    }
}

/// Gift entry as shipped in the localized asset files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GiftRecord {
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_special: bool,
    #[serde(default)]
    exp: Option<u32>,
}

/// Immutable gift reference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gift {
    pub id: u32,
    pub rarity: Rarity,
    #[serde(default)]
    pub name: String,
    /// Generic convertible item rather than a character-specific gift.
    #[serde(default)]
    pub is_special: bool,
    /// Fixed exp granted by special gifts.
    #[serde(default)]
    pub exp: Option<u32>,
}

impl Gift {
    #[must_use]
    pub const fn key(&self) -> GiftKey {
        GiftKey::new(self.rarity, self.id)
    }

    #[must_use]
    pub const fn is_ssr(&self) -> bool {
        self.rarity.is_ssr()
    }

    fn from_record(rarity: Rarity, record: GiftRecord) -> Self {
        Self {
            id: record.id,
            rarity,
            name: record.name,
            is_special: record.is_special,
            exp: record.exp,
        }
    }
}

/// Both localized gift lists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GiftCatalog {
    #[serde(default)]
    pub sr: Vec<Gift>,
    #[serde(default)]
    pub ssr: Vec<Gift>,
}

impl GiftCatalog {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            sr: Vec::new(),
            ssr: Vec::new(),
        }
    }

    #[must_use]
    pub const fn new(sr: Vec<Gift>, ssr: Vec<Gift>) -> Self {
        Self { sr, ssr }
    }

    /// Parse one rarity's asset list (`[{id, isSpecial, exp?}, ...]`).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into gift records.
    pub fn parse_list(rarity: Rarity, json: &str) -> Result<Vec<Gift>, serde_json::Error> {
        let records: Vec<GiftRecord> = serde_json::from_str(json)?;
        Ok(records
            .into_iter()
            .map(|record| Gift::from_record(rarity, record))
            .collect())
    }

    /// Build a catalog from the SR and SSR asset files.
    ///
    /// # Errors
    ///
    /// Returns an error if either list fails to parse.
    pub fn from_json(sr_json: &str, ssr_json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            sr: Self::parse_list(Rarity::Sr, sr_json)?,
            ssr: Self::parse_list(Rarity::Ssr, ssr_json)?,
        })
    }

    #[must_use]
    pub fn list(&self, rarity: Rarity) -> &[Gift] {
        match rarity {
            Rarity::Sr => &self.sr,
            Rarity::Ssr => &self.ssr,
        }
    }

    #[must_use]
    pub fn find(&self, key: GiftKey) -> Option<&Gift> {
        self.list(key.rarity).iter().find(|gift| gift.id == key.id)
    }

    /// All gifts, SR first, in asset order.
    pub fn iter(&self) -> impl Iterator<Item = &Gift> {
        self.sr.iter().chain(self.ssr.iter())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sr.is_empty() && self.ssr.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sr.len() + self.ssr.len()
    }
}
