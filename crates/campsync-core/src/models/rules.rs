use serde::{Deserialize, Serialize};

use super::id::{EntityId, Identified};
use super::lenient::{id_or_generate, null_as_default};

/// A freeform house rule or note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RuleItem {
    #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl RuleItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            text: text.into(),
        }
    }
}

impl Identified for RuleItem {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
