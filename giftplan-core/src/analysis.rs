//! Gift recommendation analysis for the current character selection.

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::constants::{
    SR_BASE_THRESHOLD, SR_BEST_THRESHOLD, SR_EXTRA_THRESHOLD, SSR_BASE_THRESHOLD,
    SSR_EXTRA_THRESHOLD,
};
use crate::gift::{Gift, GiftCatalog, GiftKey, Rarity};
use crate::preference::{FavorTier, interaction_level, preference_value};

/// Display tier of a recommended gift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    Extra,
    Best,
    Good,
}

impl RecommendationTier {
    /// CSS-style class name used by the presentation layer.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Extra => "rec-extra",
            Self::Best => "rec-best",
            Self::Good => "rec-good",
        }
    }

    #[must_use]
    pub const fn classify(rarity: Rarity, max_value: u32) -> Self {
        match rarity {
            Rarity::Ssr => {
                if max_value >= SSR_EXTRA_THRESHOLD {
                    Self::Extra
                } else {
                    Self::Best
                }
            }
            Rarity::Sr => {
                if max_value >= SR_EXTRA_THRESHOLD {
                    Self::Extra
                } else if max_value >= SR_BEST_THRESHOLD {
                    Self::Best
                } else {
                    Self::Good
                }
            }
        }
    }
}

/// A character the gift is recommended for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedCharacter {
    pub character_id: u32,
    #[serde(default)]
    pub name: String,
    pub value: u32,
    pub is_optimal: bool,
    /// Reaction shown when this character receives the gift.
    pub interaction: FavorTier,
}

/// Exactly one outcome per analyzed gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Recommended {
        tier: RecommendationTier,
        characters: Vec<RecommendedCharacter>,
    },
    /// SSR gift without a strong match: usable on anyone.
    Generic,
    /// SR gift without a strong match: better converted into a choice box.
    Synthesize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftAnalysis {
    pub max_value: u32,
    pub outcome: AnalysisOutcome,
}

impl GiftAnalysis {
    fn unmatched(rarity: Rarity, max_value: u32) -> Self {
        let outcome = if rarity.is_ssr() {
            AnalysisOutcome::Generic
        } else {
            AnalysisOutcome::Synthesize
        };
        Self { max_value, outcome }
    }

    #[must_use]
    pub const fn is_recommended(&self) -> bool {
        matches!(self.outcome, AnalysisOutcome::Recommended { .. })
    }

    #[must_use]
    pub const fn is_generic(&self) -> bool {
        matches!(self.outcome, AnalysisOutcome::Generic)
    }

    #[must_use]
    pub const fn should_synthesize(&self) -> bool {
        matches!(self.outcome, AnalysisOutcome::Synthesize)
    }

    #[must_use]
    pub const fn tier(&self) -> Option<RecommendationTier> {
        match &self.outcome {
            AnalysisOutcome::Recommended { tier, .. } => Some(*tier),
            _ => None,
        }
    }

    #[must_use]
    pub fn characters(&self) -> &[RecommendedCharacter] {
        match &self.outcome {
            AnalysisOutcome::Recommended { characters, .. } => characters,
            _ => &[],
        }
    }
}

/// Classify `gift` against the selected characters.
///
/// Selection order only affects the order of tied characters in the result.
#[must_use]
pub fn analyze_gift(gift: &Gift, show_only_optimal: bool, selected: &[&Character]) -> GiftAnalysis {
    let preferences: Vec<(&Character, u32)> = selected
        .iter()
        .map(|character| (*character, preference_value(character, gift)))
        .collect();
    let max_value = preferences
        .iter()
        .map(|(_, value)| *value)
        .max()
        .unwrap_or(0);

    let base_threshold = match gift.rarity {
        Rarity::Ssr => SSR_BASE_THRESHOLD,
        Rarity::Sr => SR_BASE_THRESHOLD,
    };
    if max_value < base_threshold {
        return GiftAnalysis::unmatched(gift.rarity, max_value);
    }

    let mut characters: Vec<RecommendedCharacter> = preferences
        .into_iter()
        .filter(|(_, value)| *value >= base_threshold)
        .map(|(character, value)| RecommendedCharacter {
            character_id: character.id,
            name: character.name.clone(),
            value,
            is_optimal: value == max_value,
            interaction: interaction_level(character, gift),
        })
        .collect();

    if show_only_optimal {
        characters.retain(|c| c.is_optimal);
    } else {
        characters.sort_by(|a, b| b.value.cmp(&a.value));
    }

    if characters.is_empty() {
        return GiftAnalysis::unmatched(gift.rarity, max_value);
    }

    GiftAnalysis {
        max_value,
        outcome: AnalysisOutcome::Recommended {
            tier: RecommendationTier::classify(gift.rarity, max_value),
            characters,
        },
    }
}

/// A catalog gift paired with its analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedGift {
    pub gift: Gift,
    pub analysis: GiftAnalysis,
}

/// Analyze every non-special gift in the catalog.
///
/// Empty when nothing is selected or the catalog has not been loaded yet.
#[must_use]
pub fn analyze_catalog(
    catalog: &GiftCatalog,
    selected: &[&Character],
    show_only_optimal: bool,
) -> Vec<AnalyzedGift> {
    if selected.is_empty() || catalog.is_empty() {
        return Vec::new();
    }
    catalog
        .iter()
        .filter(|gift| !gift.is_special)
        .map(|gift| AnalyzedGift {
            gift: gift.clone(),
            analysis: analyze_gift(gift, show_only_optimal, selected),
        })
        .collect()
}

/// Look up one gift's analysis in a previously computed list.
#[must_use]
pub fn analysis_for(analyzed: &[AnalyzedGift], key: GiftKey) -> Option<&GiftAnalysis> {
    analyzed
        .iter()
        .find(|entry| entry.gift.key() == key)
        .map(|entry| &entry.analysis)
}
