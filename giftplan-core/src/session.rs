//! A planning session: configuration, reference data and the mutable
//! planner state, owned together and passed explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{AnalyzedGift, GiftAnalysis, analysis_for, analyze_catalog};
use crate::bond::{BondPreview, BondState};
use crate::character::Character;
use crate::codec::CodecError;
use crate::config::PlannerConfig;
use crate::data::ReferenceData;
use crate::gift::GiftKey;
use crate::inventory::{OwnedInventory, SynthesisOutcome};
use crate::planner::{AssignmentTable, CommitOutcome, GiftPlanner};
use crate::selection::Selection;
use crate::share::ShareChannel;

/// Persisted planner state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerSnapshot {
    #[serde(default)]
    pub owned: OwnedInventory,
    #[serde(default)]
    pub bonds: BTreeMap<u32, BondState>,
    #[serde(default)]
    pub assignments: AssignmentTable,
    #[serde(default)]
    pub selected: Selection,
}

impl PlannerSnapshot {
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone)]
pub struct PlannerSession {
    config: PlannerConfig,
    reference: ReferenceData,
    planner: GiftPlanner,
    selection: Selection,
    share: ShareChannel,
}

impl PlannerSession {
    #[must_use]
    pub fn new(config: PlannerConfig, reference: ReferenceData, snapshot: PlannerSnapshot) -> Self {
        let planner = GiftPlanner::from_parts(snapshot.owned, snapshot.assignments, snapshot.bonds);
        Self {
            config,
            reference,
            planner,
            selection: snapshot.selected,
            share: ShareChannel::default(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PlannerSnapshot {
        PlannerSnapshot {
            owned: self.planner.inventory().clone(),
            bonds: self.planner.bonds().clone(),
            assignments: self.planner.assignments().clone(),
            selected: self.selection.clone(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    #[must_use]
    pub const fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Swap in freshly loaded reference data (after a locale change).
    pub fn set_reference(&mut self, reference: ReferenceData) {
        if let Some(locale) = &reference.locale {
            self.config.locale.clone_from(locale);
        }
        self.reference = reference;
    }

    pub fn set_show_only_optimal(&mut self, show_only_optimal: bool) {
        self.config.show_only_optimal = show_only_optimal;
    }

    #[must_use]
    pub const fn planner(&self) -> &GiftPlanner {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut GiftPlanner {
        &mut self.planner
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn share(&self) -> &ShareChannel {
        &self.share
    }

    // Analysis ---------------------------------------------------------------

    /// Selected characters known to the roster.
    #[must_use]
    pub fn selected_characters(&self) -> Vec<&Character> {
        self.reference
            .characters
            .as_ref()
            .map(|roster| self.selection.resolve(roster))
            .unwrap_or_default()
    }

    /// Recomputed on every call from the current selection and catalog.
    #[must_use]
    pub fn analyzed_gifts(&self) -> Vec<AnalyzedGift> {
        analyze_catalog(
            self.reference.catalog(),
            &self.selected_characters(),
            self.config.show_only_optimal,
        )
    }

    #[must_use]
    pub fn gift_analysis(&self, key: GiftKey) -> Option<GiftAnalysis> {
        analysis_for(&self.analyzed_gifts(), key).cloned()
    }

    // Ledger -----------------------------------------------------------------

    #[must_use]
    pub fn preview(&self, character_id: u32) -> BondPreview {
        self.planner
            .preview(character_id, &self.reference, self.config.choice_box)
    }

    /// Assign gifts to a selected character. Characters outside the
    /// selection receive nothing and 0 is returned.
    pub fn set_assignment(&mut self, character_id: u32, key: GiftKey, qty: u32) -> u32 {
        if !self.selection.contains(character_id) {
            log::debug!("ignoring assignment to unselected character {character_id}");
            return 0;
        }
        self.planner.set_assignment(character_id, key, qty)
    }

    pub fn commit(&mut self) -> CommitOutcome {
        self.planner.commit(&self.reference, self.config.choice_box)
    }

    pub fn convert_synthesis_gifts(&mut self) -> Option<SynthesisOutcome> {
        self.planner
            .convert_synthesis_gifts(&self.config.synthesis_gifts, self.config.choice_box)
    }

    // Selection and sharing --------------------------------------------------

    /// Toggle a character and refresh the share parameter.
    pub fn toggle_character(&mut self, character_id: u32) -> bool {
        let selected = self.selection.toggle(character_id, &mut self.planner);
        self.share
            .selection_changed(&self.selection, &self.reference.character_ids());
        selected
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset();
        self.share
            .selection_changed(&self.selection, &self.reference.character_ids());
    }

    /// Current share token, `None` for an empty selection.
    #[must_use]
    pub fn share_token(&self) -> Option<String> {
        ShareChannel::token_for(&self.selection, &self.reference.character_ids())
    }

    /// Load-time synchronization with the address bar's `s` parameter.
    ///
    /// # Errors
    ///
    /// Returns the decode error; the parameter has been cleared and the
    /// stored selection kept.
    pub fn open_share_param(&mut self, param: Option<String>) -> Result<(), CodecError> {
        self.share = ShareChannel::new(param);
        let known = self.reference.character_ids();
        self.share.initialize(&mut self.selection, &known)
    }

    /// History navigation changed the `s` parameter.
    ///
    /// # Errors
    ///
    /// Returns the decode error; the parameter has been cleared and the
    /// selection kept.
    pub fn share_param_changed(&mut self, param: Option<String>) -> Result<(), CodecError> {
        let known = self.reference.character_ids();
        self.share.param_changed(param, &mut self.selection, &known)
    }
}
