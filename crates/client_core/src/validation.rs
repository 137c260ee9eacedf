//! Required-field checks for new and edited wines.

use std::{collections::BTreeMap, fmt};

use shared::domain::{NewWine, WineDraft, WineField, WineListId, WineServerId};

/// Field key -> message. Keys are a field's JSON key for new rows, or the
/// grid cell id (`{row}_{field}`) for in-table edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn resolve(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
        }
        Ok(())
    }
}

pub fn validate_required(value: &str) -> bool {
    !value.is_empty()
}

pub fn cell_key(row: WineServerId, field: WineField) -> String {
    format!("{}_{}", row.0, field.key())
}

/// Every empty field of the draft, keyed by field name.
pub fn validate_draft(draft: &WineDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for field in WineField::ALL {
        if !validate_required(&draft.field_text(field)) {
            errors.insert(field.key(), field.required_message());
        }
    }
    errors
}

pub fn prepare_new_wine(
    draft: WineDraft,
    winelist_id: WineListId,
) -> Result<NewWine, ValidationErrors> {
    let errors = validate_draft(&draft);
    if !errors.is_empty() {
        return Err(errors);
    }
    draft.into_new_wine(winelist_id).ok_or(errors)
}
