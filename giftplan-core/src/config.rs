use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{CHOICE_BOX_GIFT_ID, DEFAULT_LOCALE, DEFAULT_SYNTHESIS_GIFT_IDS};
use crate::gift::{GiftKey, Rarity};

/// Planner settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "PlannerConfig::default_locale")]
    pub locale: String,
    /// Only list the top-valued characters for each recommended gift.
    #[serde(default)]
    pub show_only_optimal: bool,
    #[serde(default = "PlannerConfig::default_choice_box")]
    pub choice_box: GiftKey,
    /// Gifts converted in pairs into a choice box, in priority order.
    #[serde(default = "PlannerConfig::default_synthesis_gifts")]
    pub synthesis_gifts: Vec<GiftKey>,
}

/// Errors raised when planner configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("choice box {0} must be an SR gift")]
    ChoiceBoxRarity(GiftKey),
    #[error("choice box {0} cannot also be a synthesis gift")]
    ChoiceBoxSynthesized(GiftKey),
    #[error("synthesis gift {0} is listed more than once")]
    DuplicateSynthesisGift(GiftKey),
    #[error("synthesis gift {0} must be an SR gift")]
    SynthesisRarity(GiftKey),
    #[error("locale must not be empty")]
    EmptyLocale,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            show_only_optimal: false,
            choice_box: Self::default_choice_box(),
            synthesis_gifts: Self::default_synthesis_gifts(),
        }
    }
}

impl PlannerConfig {
    fn default_locale() -> String {
        DEFAULT_LOCALE.to_string()
    }

    const fn default_choice_box() -> GiftKey {
        GiftKey::sr(CHOICE_BOX_GIFT_ID)
    }

    fn default_synthesis_gifts() -> Vec<GiftKey> {
        DEFAULT_SYNTHESIS_GIFT_IDS
            .iter()
            .map(|id| GiftKey::sr(*id))
            .collect()
    }

    /// Parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locale.trim().is_empty() {
            return Err(ConfigError::EmptyLocale);
        }
        if self.choice_box.rarity != Rarity::Sr {
            return Err(ConfigError::ChoiceBoxRarity(self.choice_box));
        }
        for (index, key) in self.synthesis_gifts.iter().enumerate() {
            if *key == self.choice_box {
                return Err(ConfigError::ChoiceBoxSynthesized(*key));
            }
            if key.rarity != Rarity::Sr {
                return Err(ConfigError::SynthesisRarity(*key));
            }
            if self.synthesis_gifts[..index].contains(key) {
                return Err(ConfigError::DuplicateSynthesisGift(*key));
            }
        }
        Ok(())
    }
}
