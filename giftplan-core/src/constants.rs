//! Centralized planning constants for the gift planner core.
//!
//! These values mirror the in-game affinity and bond rules. Keeping them
//! together means balance changes only ever happen through reviewed code,
//! never through the JSON assets loaded at runtime.

// Preference values ----------------------------------------------------------
pub(crate) const SSR_VALUE_XL: u32 = 240;
pub(crate) const SSR_VALUE_L: u32 = 180;
pub(crate) const SSR_VALUE_M: u32 = 40;
pub(crate) const SSR_VALUE_DEFAULT: u32 = 120;
pub(crate) const SR_VALUE_XL: u32 = 80;
pub(crate) const SR_VALUE_L: u32 = 60;
pub(crate) const SR_VALUE_M: u32 = 40;
pub(crate) const SR_VALUE_DEFAULT: u32 = 20;

// Analysis thresholds ----------------------------------------------------------
pub(crate) const SSR_BASE_THRESHOLD: u32 = 180;
pub(crate) const SR_BASE_THRESHOLD: u32 = 40;
pub(crate) const SSR_EXTRA_THRESHOLD: u32 = 240;
pub(crate) const SR_EXTRA_THRESHOLD: u32 = 80;
pub(crate) const SR_BEST_THRESHOLD: u32 = 60;

// Interaction level boundaries (strictly greater than) -------------------------
pub(crate) const SSR_INTERACTION_XL_ABOVE: u32 = 180;
pub(crate) const SSR_INTERACTION_L_ABOVE: u32 = 120;
pub(crate) const SR_INTERACTION_XL_ABOVE: u32 = 60;
pub(crate) const SR_INTERACTION_L_ABOVE: u32 = 40;

// Bond progression -------------------------------------------------------------
pub const MAX_BOND_LEVEL: u32 = 100;
pub const MIN_BOND_LEVEL: u32 = 1;
/// Exp requirement marking the end of usable leveling data.
pub const BOND_EXP_SENTINEL: u32 = 9999;

// Synthesis --------------------------------------------------------------------
/// SR gift id of the synthesized gift choice box.
pub const CHOICE_BOX_GIFT_ID: u32 = 35;
pub(crate) const SYNTHESIS_PAIR: u32 = 2;
/// SR gift ids that convert in pairs into a choice box.
pub const DEFAULT_SYNTHESIS_GIFT_IDS: [u32; 4] = [2, 3, 4, 5];

// Share token ------------------------------------------------------------------
/// URL query parameter carrying the shareable selection token.
pub const SHARE_QUERY_PARAM: &str = "s";
pub(crate) const SHARE_FLAG_SELECTED: u8 = 1;
pub(crate) const SHARE_FLAG_UNSELECTED: u8 = 2;
pub(crate) const SHARE_HEADER_LEN: usize = 3;

// Configuration defaults -------------------------------------------------------
pub const DEFAULT_LOCALE: &str = "zh-tw";
