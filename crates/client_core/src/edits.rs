//! Unsaved in-table edits and the per-cell errors they produced.

use std::collections::BTreeMap;

use shared::domain::{WineField, WinePatch, WineServerId};

use crate::validation::{cell_key, validate_required, ValidationErrors};

pub const FIX_ERRORS_MESSAGE: &str = "Fix errors before submitting";

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    edits: BTreeMap<WineServerId, WinePatch>,
    errors: ValidationErrors,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `patch` into the row's pending edit. A touched name is checked
    /// and its cell error set or cleared.
    pub fn record_edit(&mut self, patch: WinePatch) {
        let row = patch.id;
        if let Some(name) = &patch.name {
            let key = cell_key(row, WineField::Name);
            if validate_required(name) {
                self.errors.resolve(&key);
            } else {
                self.errors.insert(key, WineField::Name.required_message());
            }
        }
        self.edits
            .entry(row)
            .and_modify(|existing| existing.merge(patch.clone()))
            .or_insert(patch);
    }

    pub fn pending(&self) -> impl Iterator<Item = &WinePatch> {
        self.edits.values()
    }

    pub fn pending_patches(&self) -> Vec<WinePatch> {
        self.edits
            .values()
            .filter(|patch| !patch.is_empty())
            .cloned()
            .collect()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn can_save(&self) -> bool {
        !self.is_empty() && !self.has_errors()
    }

    pub fn error_summary(&self) -> Option<&'static str> {
        self.has_errors().then_some(FIX_ERRORS_MESSAGE)
    }

    /// Drops the pending edits after a successful save. Errors stay with
    /// cells that are still being edited.
    pub fn clear(&mut self) {
        self.edits.clear();
    }

    pub fn cancel(&mut self) {
        self.edits.clear();
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rename(id: i64, name: &str) -> WinePatch {
        WinePatch {
            name: Some(name.into()),
            ..WinePatch::new(WineServerId(id))
        }
    }

    #[test]
    fn edits_to_the_same_row_merge() {
        let mut session = EditSession::new();
        session.record_edit(rename(1, "A"));
        session.record_edit(WinePatch {
            quantity: Some(3),
            ..WinePatch::new(WineServerId(1))
        });

        assert_eq!(session.len(), 1);
        let patch = session.pending().next().expect("patch");
        assert_eq!(patch.name.as_deref(), Some("A"));
        assert_eq!(patch.quantity, Some(3));
        assert!(session.can_save());
    }

    #[test]
    fn empty_name_blocks_saving_until_fixed() {
        let mut session = EditSession::new();
        session.record_edit(rename(4, ""));
        assert!(session.has_errors());
        assert!(!session.can_save());
        assert_eq!(session.errors().get("4_name"), Some("名字不能为空"));
        assert_eq!(session.error_summary(), Some(FIX_ERRORS_MESSAGE));

        session.record_edit(rename(4, "fixed"));
        assert!(!session.has_errors());
        assert!(session.can_save());
    }

    #[test]
    fn cancel_clears_edits_and_errors() {
        let mut session = EditSession::new();
        session.record_edit(rename(1, ""));
        session.record_edit(rename(2, "ok"));
        session.cancel();
        assert!(session.is_empty());
        assert!(!session.has_errors());
        assert!(!session.can_save());
    }

    #[test]
    fn empty_session_cannot_save() {
        assert!(!EditSession::new().can_save());
    }

    #[test]
    fn patches_without_changes_are_not_sent() {
        let mut session = EditSession::new();
        session.record_edit(WinePatch::new(WineServerId(9)));
        session.record_edit(rename(2, "x"));
        let patches = session.pending_patches();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].id, WineServerId(2));
    }
}
