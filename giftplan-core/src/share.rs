//! Keeps the selection mirrored in the shareable `s` query parameter.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, decode_selection, encode_selection};
use crate::selection::Selection;

/// Current value of the share parameter. `None` means the parameter is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareChannel {
    param: Option<String>,
}

impl ShareChannel {
    #[must_use]
    pub const fn new(param: Option<String>) -> Self {
        Self { param }
    }

    #[must_use]
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// Token for `selection` against the known ids, `None` when empty.
    #[must_use]
    pub fn token_for(selection: &Selection, known: &[u32]) -> Option<String> {
        match encode_selection(selection.ids(), known) {
            Ok(token) => token,
            Err(err) => {
                log::warn!("selection cannot be shared: {err}");
                None
            }
        }
    }

    /// Page load: a token in the address bar wins over the stored selection;
    /// otherwise a non-empty stored selection is written out.
    ///
    /// # Errors
    ///
    /// Returns the decode error after clearing the parameter; the stored
    /// selection is left untouched.
    pub fn initialize(&mut self, selection: &mut Selection, known: &[u32]) -> Result<(), CodecError> {
        if let Some(token) = self.param.clone() {
            self.apply_token(&token, selection, known)
        } else {
            if !selection.is_empty() {
                self.param = Self::token_for(selection, known);
            }
            Ok(())
        }
    }

    /// The selection changed locally: rewrite the parameter if needed.
    /// Returns whether the parameter changed.
    pub fn selection_changed(&mut self, selection: &Selection, known: &[u32]) -> bool {
        let token = Self::token_for(selection, known);
        if token == self.param {
            return false;
        }
        log::debug!("share token updated");
        self.param = token;
        true
    }

    /// The parameter changed externally (history navigation).
    ///
    /// # Errors
    ///
    /// Returns the decode error after clearing the parameter; the selection
    /// is left untouched.
    pub fn param_changed(
        &mut self,
        param: Option<String>,
        selection: &mut Selection,
        known: &[u32],
    ) -> Result<(), CodecError> {
        if param == Self::token_for(selection, known) {
            self.param = param;
            return Ok(());
        }
        match param {
            Some(token) => {
                self.param = Some(token.clone());
                self.apply_token(&token, selection, known)
            }
            None => {
                self.param = None;
                selection.reset();
                Ok(())
            }
        }
    }

    fn apply_token(
        &mut self,
        token: &str,
        selection: &mut Selection,
        known: &[u32],
    ) -> Result<(), CodecError> {
        match decode_selection(token) {
            Ok(ids) => {
                let ids = ids
                    .into_iter()
                    .filter(|id| known.is_empty() || known.contains(id));
                selection.replace(ids);
                Ok(())
            }
            Err(err) => {
                log::warn!("discarding unreadable share token: {err}");
                self.param = None;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<u32> {
        vec![1, 2, 3, 5, 8]
    }

    #[test]
    fn url_token_wins_on_initialize() {
        let shared = Selection::from_ids([2, 5]);
        let token = ShareChannel::token_for(&shared, &known());
        let mut channel = ShareChannel::new(token);
        let mut stored = Selection::from_ids([1]);
        channel.initialize(&mut stored, &known()).unwrap();
        assert_eq!(stored.ids(), &[2, 5]);
    }

    #[test]
    fn stored_selection_is_published_without_token() {
        let mut channel = ShareChannel::default();
        let mut stored = Selection::from_ids([3]);
        channel.initialize(&mut stored, &known()).unwrap();
        assert_eq!(
            channel.param(),
            ShareChannel::token_for(&stored, &known()).as_deref()
        );
    }

    #[test]
    fn bad_token_resets_param_and_keeps_selection() {
        let mut channel = ShareChannel::new(Some("not a token".to_string()));
        let mut stored = Selection::from_ids([1, 2]);
        assert!(channel.initialize(&mut stored, &known()).is_err());
        assert!(channel.param().is_none());
        assert_eq!(stored.ids(), &[1, 2]);
    }

    #[test]
    fn complement_tokens_drop_unknown_gaps() {
        let all_but_one = Selection::from_ids([1, 2, 3, 5]);
        let token = ShareChannel::token_for(&all_but_one, &known());
        let mut channel = ShareChannel::default();
        let mut selection = Selection::new();
        channel
            .param_changed(token, &mut selection, &known())
            .unwrap();
        assert_eq!(selection.ids(), &[1, 2, 3, 5]);
    }

    #[test]
    fn selection_changes_round_trip_through_param() {
        let mut channel = ShareChannel::default();
        let mut selection = Selection::from_ids([8]);
        assert!(channel.selection_changed(&selection, &known()));
        assert!(!channel.selection_changed(&selection, &known()));

        selection.reset();
        assert!(channel.selection_changed(&selection, &known()));
        assert!(channel.param().is_none());
    }

    #[test]
    fn cleared_param_empties_selection() {
        let mut selection = Selection::from_ids([1, 3]);
        let mut channel = ShareChannel::new(ShareChannel::token_for(&selection, &known()));
        channel.param_changed(None, &mut selection, &known()).unwrap();
        assert!(selection.is_empty());
        assert!(channel.param().is_none());
    }
}
