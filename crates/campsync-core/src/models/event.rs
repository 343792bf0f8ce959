use serde::{Deserialize, Serialize};

use super::lenient::null_as_default;

/// Descriptive header of the planned event. All fields are free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct EventInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dates: String,
    #[serde(rename = "heroImageUrl", default, deserialize_with = "null_as_default")]
    pub hero_image_url: String,
}

impl EventInfo {
    /// Title for headers, falling back when the event has not been named yet
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled camp"
        } else {
            self.title.as_str()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let info: EventInfo = serde_json::from_str(r#"{"title": "Fat Man Camp"}"#)
            .expect("Failed to parse event info");
        assert_eq!(info.title, "Fat Man Camp");
        assert_eq!(info.location, "");
        assert_eq!(info.hero_image_url, "");
    }

    #[test]
    fn test_display_title_fallback() {
        assert_eq!(EventInfo::default().display_title(), "Untitled camp");
        let info = EventInfo {
            title: "Lake Week".to_string(),
            ..Default::default()
        };
        assert_eq!(info.display_title(), "Lake Week");
    }
}
