//! Character/gift affinity lookup.

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::constants::{
    SR_INTERACTION_L_ABOVE, SR_INTERACTION_XL_ABOVE, SR_VALUE_DEFAULT, SR_VALUE_L, SR_VALUE_M,
    SR_VALUE_XL, SSR_INTERACTION_L_ABOVE, SSR_INTERACTION_XL_ABOVE, SSR_VALUE_DEFAULT,
    SSR_VALUE_L, SSR_VALUE_M, SSR_VALUE_XL,
};
use crate::gift::{Gift, Rarity};

/// Favor tier, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavorTier {
    Xl,
    L,
    M,
}

impl FavorTier {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Xl => "xl",
            Self::L => "l",
            Self::M => "m",
        }
    }
}

/// Tier the gift occupies in the character's favor list, if any.
#[must_use]
pub fn favor_tier(character: &Character, gift: &Gift) -> Option<FavorTier> {
    let tiers = character.favor.tiers(gift.rarity);
    if tiers.xl.contains(&gift.id) {
        Some(FavorTier::Xl)
    } else if tiers.l.contains(&gift.id) {
        Some(FavorTier::L)
    } else if tiers.m.contains(&gift.id) {
        Some(FavorTier::M)
    } else {
        None
    }
}

/// Affinity value of giving `gift` to `character`. Never fails: an unlisted
/// gift yields the rarity's default value.
#[must_use]
pub fn preference_value(character: &Character, gift: &Gift) -> u32 {
    match (gift.rarity, favor_tier(character, gift)) {
        (Rarity::Ssr, Some(FavorTier::Xl)) => SSR_VALUE_XL,
        (Rarity::Ssr, Some(FavorTier::L)) => SSR_VALUE_L,
        (Rarity::Ssr, Some(FavorTier::M)) => SSR_VALUE_M,
        (Rarity::Ssr, None) => SSR_VALUE_DEFAULT,
        (Rarity::Sr, Some(FavorTier::Xl)) => SR_VALUE_XL,
        (Rarity::Sr, Some(FavorTier::L)) => SR_VALUE_L,
        (Rarity::Sr, Some(FavorTier::M)) => SR_VALUE_M,
        (Rarity::Sr, None) => SR_VALUE_DEFAULT,
    }
}

/// Reaction tier displayed when the character receives the gift.
#[must_use]
pub fn interaction_level(character: &Character, gift: &Gift) -> FavorTier {
    let value = preference_value(character, gift);
    let (xl_above, l_above) = match gift.rarity {
        Rarity::Ssr => (SSR_INTERACTION_XL_ABOVE, SSR_INTERACTION_L_ABOVE),
        Rarity::Sr => (SR_INTERACTION_XL_ABOVE, SR_INTERACTION_L_ABOVE),
    };
    if value > xl_above {
        FavorTier::Xl
    } else if value > l_above {
        FavorTier::L
    } else {
        FavorTier::M
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Favor, FavorTiers};

    fn gift(rarity: Rarity, id: u32) -> Gift {
        Gift {
            id,
            rarity,
            name: String::new(),
            is_special: false,
            exp: None,
        }
    }

    fn character() -> Character {
        Character::new(
            1,
            Favor {
                sr: FavorTiers {
                    xl: vec![1],
                    l: vec![2],
                    m: vec![3],
                },
                ssr: FavorTiers {
                    xl: vec![1],
                    l: vec![2],
                    m: vec![3],
                },
            },
        )
    }

    #[test]
    fn values_follow_tier_and_rarity() {
        let c = character();
        assert_eq!(preference_value(&c, &gift(Rarity::Ssr, 1)), 240);
        assert_eq!(preference_value(&c, &gift(Rarity::Ssr, 2)), 180);
        assert_eq!(preference_value(&c, &gift(Rarity::Ssr, 3)), 40);
        assert_eq!(preference_value(&c, &gift(Rarity::Ssr, 99)), 120);
        assert_eq!(preference_value(&c, &gift(Rarity::Sr, 1)), 80);
        assert_eq!(preference_value(&c, &gift(Rarity::Sr, 2)), 60);
        assert_eq!(preference_value(&c, &gift(Rarity::Sr, 3)), 40);
        assert_eq!(preference_value(&c, &gift(Rarity::Sr, 99)), 20);
    }

    #[test]
    fn strongest_tier_wins_when_listed_twice() {
        let mut c = character();
        c.favor.sr.l.push(1);
        assert_eq!(favor_tier(&c, &gift(Rarity::Sr, 1)), Some(FavorTier::Xl));
    }

    #[test]
    fn interaction_levels_use_strict_boundaries() {
        let c = character();
        assert_eq!(interaction_level(&c, &gift(Rarity::Ssr, 1)), FavorTier::Xl);
        assert_eq!(interaction_level(&c, &gift(Rarity::Ssr, 2)), FavorTier::L);
        assert_eq!(interaction_level(&c, &gift(Rarity::Ssr, 99)), FavorTier::M);
        assert_eq!(interaction_level(&c, &gift(Rarity::Sr, 1)), FavorTier::Xl);
        assert_eq!(interaction_level(&c, &gift(Rarity::Sr, 2)), FavorTier::L);
        assert_eq!(interaction_level(&c, &gift(Rarity::Sr, 3)), FavorTier::M);
    }
}
