use serde::{Deserialize, Serialize};

use super::id::{EntityId, Identified};
use super::lenient::{id_or_generate, null_as_default};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct FoodPlan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub meals: Vec<MealPlan>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snacks: Vec<Snack>,
}

/// Meals for one day of the trip. Slots are free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MealPlan {
    #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub day: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub breakfast: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lunch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dinner: String,
}

impl MealPlan {
    pub fn new(day: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            day: day.into(),
            breakfast: String::new(),
            lunch: String::new(),
            dinner: String::new(),
        }
    }

    /// Number of meal slots that have something planned
    pub fn planned_count(&self) -> usize {
        [&self.breakfast, &self.lunch, &self.dinner]
            .iter()
            .filter(|slot| !slot.trim().is_empty())
            .count()
    }
}

impl Identified for MealPlan {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Snack {
    // Older documents stored snacks positionally; they get an id on load
    #[serde(default = "EntityId::generate", deserialize_with = "id_or_generate")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Snack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            notes: None,
        }
    }
}

impl Identified for Snack {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snacks_without_id_get_distinct_ids() {
        let plan: FoodPlan = serde_json::from_str(
            r#"{"meals": [], "snacks": [{"name": "Chips"}, {"name": "Jerky", "notes": "spicy"}]}"#,
        )
        .expect("Failed to parse food plan");

        assert_eq!(plan.snacks.len(), 2);
        assert_ne!(plan.snacks[0].id, plan.snacks[1].id);
        assert_eq!(plan.snacks[1].notes.as_deref(), Some("spicy"));
    }

    #[test]
    fn test_planned_count() {
        let mut meal = MealPlan::new("Friday");
        assert_eq!(meal.planned_count(), 0);
        meal.dinner = "Brisket".to_string();
        meal.lunch = "   ".to_string();
        assert_eq!(meal.planned_count(), 1);
    }
}
