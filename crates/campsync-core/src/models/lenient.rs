//! Forgiving field deserializers.
//!
//! Stored documents are edited by hand and by older clients, so an explicit
//! `null` loads the same as a missing field instead of failing the whole
//! document.

use serde::{Deserialize, Deserializer};

use super::id::EntityId;

/// `null` becomes the type's default value
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` gets a fresh id, like a missing one
pub fn id_or_generate<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EntityId>::deserialize(deserializer)?.unwrap_or_else(EntityId::generate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
        #[serde(default, deserialize_with = "null_as_default")]
        tags: Vec<String>,
        #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
        id: EntityId,
    }

    #[test]
    fn test_nulls_load_as_missing() {
        let sample: Sample = serde_json::from_str(r#"{"name": null, "tags": null, "id": null}"#)
            .expect("Failed to parse sample");
        assert_eq!(sample.name, "");
        assert!(sample.tags.is_empty());
        assert!(!sample.id.as_str().is_empty());

        let sample: Sample = serde_json::from_str(r#"{"name": "x", "id": "a1"}"#).expect("Failed to parse sample");
        assert_eq!(sample.name, "x");
        assert_eq!(sample.id.as_str(), "a1");
    }

    #[test]
    fn test_wrong_type_still_fails() {
        assert!(serde_json::from_str::<Sample>(r#"{"name": 42}"#).is_err());
    }
}
