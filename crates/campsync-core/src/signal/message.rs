use serde::{Deserialize, Serialize};

/// Messages sent from the background context to page clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceMessage {
    NewVersion,
}

impl ServiceMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_version_wire_shape() {
        let json = ServiceMessage::NewVersion.to_json().expect("Failed to serialize message");
        assert_eq!(json, r#"{"type":"NEW_VERSION"}"#);

        let parsed: ServiceMessage = serde_json::from_str(r#"{ "type": "NEW_VERSION" }"#)
            .expect("Failed to parse message");
        assert_eq!(parsed, ServiceMessage::NewVersion);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<ServiceMessage>(r#"{"type":"PING"}"#).is_err());
    }
}
