use serde::{Deserialize, Deserializer, Serialize};

use super::id::{EntityId, Identified};
use super::lenient::{id_or_generate, null_as_default};
use crate::utils::cmp_ignore_case;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Timeline {
    #[serde(default, deserialize_with = "null_as_default")]
    pub itinerary: Vec<ItineraryEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub travel: Vec<TravelEntry>,
}

impl Timeline {
    /// Travel entries ordered by name, case-insensitive
    pub fn sorted_travel(&self) -> Vec<&TravelEntry> {
        let mut travel: Vec<&TravelEntry> = self.travel.iter().collect();
        travel.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
        travel
    }
}

/// One itinerary line: either a plain label or a day with timed activities.
///
/// Legacy documents stored the itinerary as bare strings; those load as
/// labels with a freshly generated id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(untagged)]
pub enum ItineraryEntry {
    Day(DayPlan),
    Label(ItineraryLabel),
}

impl ItineraryEntry {
    pub fn label(text: impl Into<String>) -> Self {
        ItineraryEntry::Label(ItineraryLabel {
            id: EntityId::generate(),
            text: text.into(),
        })
    }

    pub fn day(day: impl Into<String>) -> Self {
        ItineraryEntry::Day(DayPlan {
            id: EntityId::generate(),
            day: day.into(),
            activities: Vec::new(),
        })
    }

    /// Heading text shown for this entry
    pub fn title(&self) -> &str {
        match self {
            ItineraryEntry::Day(day) => &day.day,
            ItineraryEntry::Label(label) => &label.text,
        }
    }
}

impl Identified for ItineraryEntry {
    fn id(&self) -> &EntityId {
        match self {
            ItineraryEntry::Day(day) => &day.id,
            ItineraryEntry::Label(label) => &label.id,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawItineraryEntry {
    Text(String),
    Day(DayPlan),
    Label(ItineraryLabel),
}

impl<'de> Deserialize<'de> for ItineraryEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawItineraryEntry::deserialize(deserializer).map(Into::into)
    }
}

impl From<RawItineraryEntry> for ItineraryEntry {
    fn from(raw: RawItineraryEntry) -> Self {
        match raw {
            RawItineraryEntry::Text(text) => ItineraryEntry::label(text),
            RawItineraryEntry::Day(day) => ItineraryEntry::Day(day),
            RawItineraryEntry::Label(label) => ItineraryEntry::Label(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ItineraryLabel {
    #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
    pub id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DayPlan {
    #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
    pub id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub day: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Activity {
    #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
    pub id: EntityId,
    /// Free text ("7:30am", "after lunch")
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl Activity {
    pub fn new(time: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            time: time.into(),
            text: text.into(),
        }
    }
}

impl Identified for Activity {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Flight,
    Drive,
    /// Anything unrecognized loads as `other`
    #[default]
    #[serde(other)]
    Other,
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelMode::Flight => write!(f, "Flight"),
            TravelMode::Drive => write!(f, "Drive"),
            TravelMode::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TravelEntry {
    #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "method", alias = "mode", default, deserialize_with = "null_as_default")]
    pub mode: TravelMode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
}

impl TravelEntry {
    pub fn new(name: impl Into<String>, mode: TravelMode) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            mode,
            details: String::new(),
        }
    }
}

impl Identified for TravelEntry {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
