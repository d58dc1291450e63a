//! Bond progression: stored state, the exp table and the level-up preview.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::character::Character;
use crate::constants::{
    BOND_EXP_SENTINEL, MAX_BOND_LEVEL, MIN_BOND_LEVEL, SR_VALUE_DEFAULT, SR_VALUE_L, SR_VALUE_M,
    SR_VALUE_XL,
};
use crate::gift::{Gift, GiftCatalog, GiftKey};
use crate::preference::preference_value;

/// Per-character bond progress. `exp` is the residual inside `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondState {
    pub level: u32,
    pub exp: u32,
}

impl Default for BondState {
    fn default() -> Self {
        Self {
            level: MIN_BOND_LEVEL,
            exp: 0,
        }
    }
}

impl BondState {
    /// Build a state clamped into `[1, 100]`; max level never carries exp.
    #[must_use]
    pub fn new(level: u32, exp: u32) -> Self {
        let level = level.clamp(MIN_BOND_LEVEL, MAX_BOND_LEVEL);
        let exp = if level == MAX_BOND_LEVEL { 0 } else { exp };
        Self { level, exp }
    }

    #[must_use]
    pub const fn is_maxed(&self) -> bool {
        self.level >= MAX_BOND_LEVEL
    }
}

/// One row of the bond exp table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondExpRow {
    pub rank: u32,
    /// Exp needed to advance from `rank` to `rank + 1`.
    pub exp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BondExpTable(pub Vec<BondExpRow>);

impl BondExpTable {
    /// Load the table from its asset file (`[{rank, exp}, ...]`).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into table rows.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self)
    }

    /// Exp required to leave `level`, or `None` when no further data exists.
    #[must_use]
    pub fn exp_required(&self, level: u32) -> Option<u32> {
        self.0
            .iter()
            .find(|row| row.rank == level)
            .map(|row| row.exp)
            .filter(|exp| *exp != BOND_EXP_SENTINEL)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only outcome of applying a set of gifts to one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondPreview {
    pub level: u32,
    pub exp: u32,
    pub gained_exp: u32,
    pub new_level: u32,
    pub new_exp: u32,
}

impl BondPreview {
    #[must_use]
    pub const fn unchanged(state: BondState) -> Self {
        Self {
            level: state.level,
            exp: state.exp,
            gained_exp: 0,
            new_level: state.level,
            new_exp: state.exp,
        }
    }

    #[must_use]
    pub fn new_state(&self) -> BondState {
        BondState::new(self.new_level, self.new_exp)
    }

    #[must_use]
    pub const fn levels_gained(&self) -> u32 {
        self.new_level.saturating_sub(self.level)
    }
}

/// Exp a choice box grants: the character's strongest non-empty SR tier.
#[must_use]
pub fn choice_box_exp(character: &Character) -> u32 {
    let sr = &character.favor.sr;
    if !sr.xl.is_empty() {
        SR_VALUE_XL
    } else if !sr.l.is_empty() {
        SR_VALUE_L
    } else if !sr.m.is_empty() {
        SR_VALUE_M
    } else {
        SR_VALUE_DEFAULT
    }
}

/// Exp one unit of `gift` grants `character`.
#[must_use]
pub fn exp_per_unit(character: &Character, gift: &Gift, choice_box: GiftKey) -> u32 {
    if gift.key() == choice_box {
        choice_box_exp(character)
    } else if gift.is_special {
        gift.exp.unwrap_or(0)
    } else {
        preference_value(character, gift)
    }
}

/// Walk `(level, exp)` up the table until the residual no longer covers a
/// level, data runs out, or the cap is reached. Overflow past the cap is
/// discarded.
#[must_use]
pub fn apply_exp(table: &BondExpTable, level: u32, exp: u32) -> (u32, u32) {
    let mut level = level;
    let mut exp = exp;
    while level < MAX_BOND_LEVEL {
        let Some(required) = table.exp_required(level) else {
            break;
        };
        if exp < required {
            break;
        }
        exp -= required;
        level += 1;
    }
    if level >= MAX_BOND_LEVEL {
        (MAX_BOND_LEVEL, 0)
    } else {
        (level, exp)
    }
}

/// Preview the bond outcome of giving `gifts` to `character`.
///
/// Returns the unmodified state when the exp table is not loaded. Gift keys
/// missing from the catalog contribute nothing.
#[must_use]
pub fn simulate_bond(
    state: BondState,
    character: &Character,
    gifts: &BTreeMap<GiftKey, u32>,
    catalog: &GiftCatalog,
    table: Option<&BondExpTable>,
    choice_box: GiftKey,
) -> BondPreview {
    let Some(table) = table else {
        return BondPreview::unchanged(state);
    };
    if gifts.is_empty() {
        return BondPreview::unchanged(state);
    }

    let gained_exp = gifts
        .iter()
        .filter_map(|(key, qty)| catalog.find(*key).map(|gift| (gift, *qty)))
        .fold(0u32, |total, (gift, qty)| {
            total.saturating_add(exp_per_unit(character, gift, choice_box).saturating_mul(qty))
        });

    let (new_level, new_exp) = apply_exp(table, state.level, state.exp.saturating_add(gained_exp));
    BondPreview {
        level: state.level,
        exp: state.exp,
        gained_exp,
        new_level,
        new_exp,
    }
}
