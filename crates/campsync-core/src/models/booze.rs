use serde::{Deserialize, Serialize};

use super::id::{EntityId, Identified};
use super::lenient::{id_or_generate, null_as_default};

/// One line of the shared drinks inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct BoozeItem {
    #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
    pub id: EntityId,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Free text ("1", "a case", "half a handle")
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: String,
    /// Name of whoever is bringing it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl BoozeItem {
    pub fn new(kind: impl Into<String>, label: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            kind: kind.into(),
            label: label.into(),
            quantity: quantity.into(),
            assignee: None,
        }
    }

    pub fn assignee_display(&self) -> &str {
        self.assignee
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("unclaimed")
    }
}

impl Identified for BoozeItem {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// What a traveler prefers to drink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum DrinkPreference {
    Beer,
    Liquor,
    NonAlcoholic,
}

impl std::fmt::Display for DrinkPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrinkPreference::Beer => write!(f, "Beer"),
            DrinkPreference::Liquor => write!(f, "Liquor"),
            DrinkPreference::NonAlcoholic => write!(f, "Non-alcoholic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booze_item_wire_names() {
        let item: BoozeItem = serde_json::from_str(
            r#"{"id": "b1", "type": "Whiskey", "label": "Bulleit", "quantity": "1"}"#,
        )
        .expect("Failed to parse booze item");
        assert_eq!(item.id.as_str(), "b1");
        assert_eq!(item.kind, "Whiskey");
        assert_eq!(item.assignee_display(), "unclaimed");

        let json = serde_json::to_value(&item).expect("Failed to serialize booze item");
        assert_eq!(json["type"], "Whiskey");
        assert!(json.get("assignee").is_none());
    }

    #[test]
    fn test_drink_preference_wire_names() {
        let pref: DrinkPreference =
            serde_json::from_str(r#""non-alcoholic""#).expect("Failed to parse preference");
        assert_eq!(pref, DrinkPreference::NonAlcoholic);
        assert_eq!(
            serde_json::to_string(&DrinkPreference::Beer).expect("Failed to serialize"),
            r#""beer""#
        );
    }
}
