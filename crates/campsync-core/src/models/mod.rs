//! Data models for the camp planning document.
//!
//! The whole planning state lives in one aggregate, [`CampDocument`], which
//! is loaded wholesale from the document endpoint and written back
//! wholesale on save. Its parts:
//!
//! - `EventInfo`: title, location, dates, hero image
//! - `Timeline`: itinerary entries and travel plans
//! - `FoodPlan`: per-day meals and snacks
//! - `BoozeItem`, `DrinkPreference`: inventory and per-traveler preferences
//! - `RuleItem`: freeform notes
//!
//! Every deletable or reorderable entry carries a stable [`EntityId`].

pub mod booze;
pub mod document;
pub mod event;
pub mod food;
pub mod id;
mod lenient;
pub mod rules;
pub mod timeline;

pub use booze::{BoozeItem, DrinkPreference};
pub use document::CampDocument;
pub use event::EventInfo;
pub use food::{FoodPlan, MealPlan, Snack};
pub use id::{EntityId, EntityList, Identified};
pub use rules::RuleItem;
pub use timeline::{Activity, DayPlan, ItineraryEntry, ItineraryLabel, Timeline, TravelEntry, TravelMode};
