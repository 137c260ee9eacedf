use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(WineListId);
id_newtype!(WineServerId);

/// Locally generated identifier for a row the server has not assigned yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingToken(String);

impl PendingToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for PendingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row identity inside a cached collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WineId {
    Pending(PendingToken),
    Assigned(WineServerId),
}

impl WineId {
    pub fn is_pending(&self) -> bool {
        matches!(self, WineId::Pending(_))
    }
}

impl fmt::Display for WineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WineId::Pending(token) => write!(f, "pending:{token}"),
            WineId::Assigned(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineFields {
    pub name: String,
    pub vintage: i32,
    pub price: f64,
    pub quantity: i64,
    pub origin: String,
    pub winelist_id: WineListId,
}

/// A wine as the server returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wine {
    pub id: WineServerId,
    #[serde(flatten)]
    pub fields: WineFields,
}

/// Body of a create request.
pub type NewWine = WineFields;

/// A wine as held in the client cache, possibly not yet confirmed by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedWine {
    pub id: WineId,
    pub fields: WineFields,
}

impl CachedWine {
    pub fn pending(token: PendingToken, fields: WineFields) -> Self {
        Self {
            id: WineId::Pending(token),
            fields,
        }
    }
}

impl From<Wine> for CachedWine {
    fn from(wine: Wine) -> Self {
        Self {
            id: WineId::Assigned(wine.id),
            fields: wine.fields,
        }
    }
}

/// Partial update for one server row. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinePatch {
    pub id: WineServerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vintage: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl WinePatch {
    pub fn new(id: WineServerId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.vintage.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.origin.is_none()
    }

    /// Later values win field by field.
    pub fn merge(&mut self, other: WinePatch) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.vintage.is_some() {
            self.vintage = other.vintage;
        }
        if other.price.is_some() {
            self.price = other.price;
        }
        if other.quantity.is_some() {
            self.quantity = other.quantity;
        }
        if other.origin.is_some() {
            self.origin = other.origin;
        }
    }

    pub fn apply_to(&self, fields: &mut WineFields) {
        if let Some(name) = &self.name {
            fields.name = name.clone();
        }
        if let Some(vintage) = self.vintage {
            fields.vintage = vintage;
        }
        if let Some(price) = self.price {
            fields.price = price;
        }
        if let Some(quantity) = self.quantity {
            fields.quantity = quantity;
        }
        if let Some(origin) = &self.origin {
            fields.origin = origin.clone();
        }
    }
}

/// Values typed into a new row before they are submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WineDraft {
    pub name: String,
    pub vintage: Option<i32>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub origin: String,
}

impl WineDraft {
    /// Text form of a field as the grid would display it.
    pub fn field_text(&self, field: WineField) -> String {
        match field {
            WineField::Name => self.name.clone(),
            WineField::Vintage => self.vintage.map(|v| v.to_string()).unwrap_or_default(),
            WineField::Price => self.price.map(|v| v.to_string()).unwrap_or_default(),
            WineField::Quantity => self.quantity.map(|v| v.to_string()).unwrap_or_default(),
            WineField::Origin => self.origin.clone(),
        }
    }

    /// Returns `None` while any numeric field is missing.
    pub fn into_new_wine(self, winelist_id: WineListId) -> Option<NewWine> {
        Some(NewWine {
            name: self.name,
            vintage: self.vintage?,
            price: self.price?,
            quantity: self.quantity?,
            origin: self.origin,
            winelist_id,
        })
    }
}

/// Editable columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WineField {
    Name,
    Vintage,
    Price,
    Quantity,
    Origin,
}

impl WineField {
    pub const ALL: [WineField; 5] = [
        WineField::Name,
        WineField::Vintage,
        WineField::Price,
        WineField::Quantity,
        WineField::Origin,
    ];

    pub fn key(self) -> &'static str {
        match self {
            WineField::Name => "name",
            WineField::Vintage => "vintage",
            WineField::Price => "price",
            WineField::Quantity => "quantity",
            WineField::Origin => "origin",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            WineField::Name => "名字",
            WineField::Vintage => "年份",
            WineField::Price => "价格",
            WineField::Quantity => "数量/支",
            WineField::Origin => "产地",
        }
    }

    pub fn required_message(self) -> &'static str {
        match self {
            WineField::Name => "名字不能为空",
            WineField::Vintage => "年份不能为空",
            WineField::Price => "价格不能为空",
            WineField::Quantity => "数量不能为空",
            WineField::Origin => "产地不能为空",
        }
    }

    pub fn cell_text(self, fields: &WineFields) -> String {
        match self {
            WineField::Name => fields.name.clone(),
            WineField::Vintage => fields.vintage.to_string(),
            WineField::Price => fields.price.to_string(),
            WineField::Quantity => fields.quantity.to_string(),
            WineField::Origin => fields.origin.clone(),
        }
    }
}

impl fmt::Display for WineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> WineFields {
        WineFields {
            name: "Margaux".into(),
            vintage: 2015,
            price: 320.0,
            quantity: 6,
            origin: "Bordeaux".into(),
            winelist_id: WineListId(3),
        }
    }

    #[test]
    fn wine_json_is_flat_with_numeric_ids() {
        let wine = Wine {
            id: WineServerId(9),
            fields: fields(),
        };
        let value = serde_json::to_value(&wine).expect("serialize");
        assert_eq!(value["id"], 9);
        assert_eq!(value["winelist_id"], 3);
        assert_eq!(value["name"], "Margaux");

        let parsed: Wine = serde_json::from_value(value).expect("parse");
        assert_eq!(parsed, wine);
    }

    #[test]
    fn patch_omits_untouched_fields() {
        let mut patch = WinePatch::new(WineServerId(1));
        patch.name = Some("B".into());
        let value = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(value, serde_json::json!({ "id": 1, "name": "B" }));
    }

    #[test]
    fn merge_keeps_earlier_fields_and_overrides_repeated_ones() {
        let mut patch = WinePatch::new(WineServerId(1));
        patch.name = Some("first".into());
        patch.price = Some(10.0);

        let mut later = WinePatch::new(WineServerId(1));
        later.name = Some("second".into());
        patch.merge(later);

        assert_eq!(patch.name.as_deref(), Some("second"));
        assert_eq!(patch.price, Some(10.0));
    }

    #[test]
    fn missing_numbers_render_as_empty_text() {
        let draft = WineDraft {
            name: "x".into(),
            ..WineDraft::default()
        };
        assert_eq!(draft.field_text(WineField::Vintage), "");
        assert!(draft.into_new_wine(WineListId(1)).is_none());
    }

    #[test]
    fn pending_tokens_are_unique() {
        assert_ne!(PendingToken::generate(), PendingToken::generate());
    }
}
