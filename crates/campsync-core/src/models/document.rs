use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient::null_as_default;
use super::{BoozeItem, DrinkPreference, EntityId, EventInfo, FoodPlan, RuleItem, Timeline};

/// The whole camp plan, persisted as one JSON document.
///
/// Loading is best effort: absent fields default to empty and entries
/// without an id are given one. Top-level fields this version does not know
/// about are carried in `extra` so a save never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CampDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: EventInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Timeline,
    #[serde(default, deserialize_with = "null_as_default")]
    pub food: FoodPlan,
    #[serde(default, deserialize_with = "null_as_default")]
    pub booze: Vec<BoozeItem>,
    /// Keyed by traveler id
    #[serde(rename = "boozePreferences", default, skip_serializing_if = "Option::is_none")]
    pub booze_preferences: Option<BTreeMap<EntityId, DrinkPreference>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<RuleItem>,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl CampDocument {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON, the format used for backups
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Set or clear a traveler's drink preference.
    pub fn with_preference(mut self, traveler: EntityId, preference: Option<DrinkPreference>) -> Self {
        let prefs = self.booze_preferences.get_or_insert_with(BTreeMap::new);
        match preference {
            Some(p) => {
                prefs.insert(traveler, p);
            }
            None => {
                prefs.remove(&traveler);
            }
        }
        self
    }

    /// Count of entries across every list, used for status output
    pub fn entry_count(&self) -> usize {
        self.timeline.itinerary.len()
            + self.timeline.travel.len()
            + self.food.meals.len()
            + self.food.snacks.len()
            + self.booze.len()
            + self.rules.len()
    }
}
