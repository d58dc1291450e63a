//! Gift Planner Core
//!
//! Platform-agnostic planning logic for the gift planner: preference lookup,
//! gift recommendations, bond simulation, the inventory/assignment ledger and
//! the shareable selection token. This crate has no UI or platform-specific
//! dependencies.

pub mod analysis;
pub mod bond;
pub mod character;
pub mod codec;
pub mod config;
pub mod constants;
pub mod data;
pub mod gift;
pub mod inventory;
pub mod planner;
pub mod preference;
pub mod selection;
pub mod session;
pub mod share;

// Re-export commonly used types
pub use analysis::{
    AnalysisOutcome, AnalyzedGift, GiftAnalysis, RecommendationTier, RecommendedCharacter,
    analysis_for, analyze_catalog, analyze_gift,
};
pub use bond::{
    BondExpRow, BondExpTable, BondPreview, BondState, apply_exp, choice_box_exp, exp_per_unit,
    simulate_bond,
};
pub use character::{Character, CharacterRoster, Favor, FavorTiers};
pub use codec::{CodecError, decode_selection, encode_selection, token_flag};
pub use config::{ConfigError, PlannerConfig};
pub use data::ReferenceData;
pub use gift::{Gift, GiftCatalog, GiftKey, GiftKeyParseError, Rarity};
pub use inventory::{OwnedInventory, SynthesisOutcome};
pub use planner::{AssignmentTable, CommitOutcome, CommitReport, GiftPlanner};
pub use preference::{FavorTier, favor_tier, interaction_level, preference_value};
pub use selection::Selection;
pub use session::{PlannerSession, PlannerSnapshot};
pub use share::ShareChannel;

/// Trait for abstracting reference data loading
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the character roster with favor lists for a locale
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded.
    fn load_characters(&self, locale: &str) -> Result<CharacterRoster, Self::Error>;

    /// Load one rarity's gift list for a locale
    ///
    /// # Errors
    ///
    /// Returns an error if the gift list cannot be loaded.
    fn load_gifts(&self, rarity: Rarity, locale: &str) -> Result<Vec<Gift>, Self::Error>;

    /// Load the bond exp table
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded.
    fn load_bond_exp_table(&self) -> Result<BondExpTable, Self::Error>;

    /// Load configuration data by name
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting planner persistence
/// Platform-specific implementations should provide this
pub trait PlannerStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save planner state
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save_snapshot(&self, slot: &str, snapshot: &PlannerSnapshot) -> Result<(), Self::Error>;

    /// Load planner state
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded.
    fn load_snapshot(&self, slot: &str) -> Result<Option<PlannerSnapshot>, Self::Error>;

    /// Delete saved planner state
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    fn delete_snapshot(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Composition root wiring a data loader and a storage backend
pub struct PlannerEngine<L, S>
where
    L: DataLoader,
    S: PlannerStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> PlannerEngine<L, S>
where
    L: DataLoader,
    S: PlannerStorage,
{
    /// Create a new engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Load every reference table for `locale`
    ///
    /// # Errors
    ///
    /// Returns an error if any table cannot be loaded.
    pub fn load_reference(&self, locale: &str) -> Result<ReferenceData, L::Error> {
        let characters = self.data_loader.load_characters(locale)?;
        let sr = self.data_loader.load_gifts(Rarity::Sr, locale)?;
        let ssr = self.data_loader.load_gifts(Rarity::Ssr, locale)?;
        let table = self.data_loader.load_bond_exp_table()?;
        Ok(ReferenceData::new(characters, GiftCatalog::new(sr, ssr), table).with_locale(locale))
    }

    /// Load the planner configuration, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is present but invalid.
    pub fn load_config(&self) -> Result<PlannerConfig, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let config: Option<PlannerConfig> = self
            .data_loader
            .load_config("planner")
            .map_err(Into::into)?;
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Open a planning session from a saved slot (or a fresh one)
    ///
    /// # Errors
    ///
    /// Returns an error if reference data or the saved snapshot cannot be
    /// loaded.
    pub fn open_session(
        &self,
        slot: &str,
        config: PlannerConfig,
    ) -> Result<PlannerSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let reference = self
            .load_reference(&config.locale)
            .map_err(Into::into)?;
        let snapshot = self
            .storage
            .load_snapshot(slot)
            .map_err(Into::into)?
            .unwrap_or_default();
        Ok(PlannerSession::new(config, reference, snapshot))
    }

    /// Reload reference data after the locale changed
    ///
    /// # Errors
    ///
    /// Returns an error if the tables for the new locale cannot be loaded;
    /// the session keeps its previous data in that case.
    pub fn change_locale(&self, session: &mut PlannerSession, locale: &str) -> Result<(), L::Error> {
        let reference = self.load_reference(locale)?;
        session.set_reference(reference);
        Ok(())
    }

    /// Persist a session
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn save_session(&self, slot: &str, session: &PlannerSession) -> Result<(), S::Error> {
        self.storage.save_snapshot(slot, &session.snapshot())
    }

    /// Remove a saved slot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    pub fn delete_slot(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete_snapshot(slot)
    }
}
