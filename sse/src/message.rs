use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// The kinds of events the hub knows how to route. The wire name is what the
/// client sees on the `event:` line of each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    // Circle membership (group-scoped)
    MemberJoined,
    MemberLeft,
    MemberUpdated,
    CircleUpdated,

    // Reminders (user-scoped)
    ReminderDue,

    // System events
    ForceLogout,
    Heartbeat,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::MemberJoined => "member_joined",
            Kind::MemberLeft => "member_left",
            Kind::MemberUpdated => "member_updated",
            Kind::CircleUpdated => "circle_updated",
            Kind::ReminderDue => "reminder_due",
            Kind::ForceLogout => "force_logout",
            Kind::Heartbeat => "heartbeat",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable event ready for fan-out.
///
/// `group_key` is routing metadata only and is skipped when the event is
/// serialized for a client. Directed events (sent to a user) carry no group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    kind: Kind,
    #[serde(rename = "data")]
    payload: Value,
    #[serde(skip)]
    group_key: Option<String>,
}

impl Event {
    /// An event addressed to every listener of `group_key`.
    pub fn group(kind: Kind, group_key: impl Into<String>, payload: Value) -> Self {
        let group_key = group_key.into();
        Self {
            kind,
            payload,
            group_key: (!group_key.is_empty()).then_some(group_key),
        }
    }

    /// An event with no group key, used with `Hub::send_to_user` and `Hub::broadcast`.
    pub fn direct(kind: Kind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            group_key: None,
        }
    }

    /// Keep-alive event carrying only the time it was generated.
    pub fn heartbeat(group_key: Option<&str>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: Kind::Heartbeat,
            payload: json!({
                "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
            }),
            group_key: group_key.map(str::to_owned),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    /// The payload serialized as compact JSON, as sent on the `data:` line.
    pub fn data(&self) -> String {
        // Serializing a `Value` cannot fail: all map keys are already strings.
        self.payload.to_string()
    }
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        self.kind.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_wire_names_match_serde_names() {
        for kind in [
            Kind::MemberJoined,
            Kind::MemberLeft,
            Kind::MemberUpdated,
            Kind::CircleUpdated,
            Kind::ReminderDue,
            Kind::ForceLogout,
            Kind::Heartbeat,
        ] {
            let serialized = serde_json::to_value(kind).unwrap();
            assert_eq!(serialized, Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_group_key_is_not_serialized() {
        let event = Event::group(Kind::MemberJoined, "circle-42", json!({"userId": "U9"}));
        let serialized = serde_json::to_value(&event).unwrap();

        assert_eq!(
            serialized,
            json!({"type": "member_joined", "data": {"userId": "U9"}})
        );
        assert_eq!(event.group_key(), Some("circle-42"));
    }

    #[test]
    fn test_empty_group_key_is_treated_as_directed() {
        let event = Event::group(Kind::ReminderDue, "", json!({}));
        assert_eq!(event.group_key(), None);
    }

    #[test]
    fn test_heartbeat_carries_timestamp_only() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = Event::heartbeat(Some("circle-1"), at);

        assert_eq!(event.event_type(), "heartbeat");
        assert_eq!(event.payload(), &json!({"timestamp": "2024-05-01T12:00:00.000Z"}));
        assert_eq!(event.group_key(), Some("circle-1"));
    }

    #[test]
    fn test_data_is_compact_json() {
        let event = Event::direct(Kind::ForceLogout, json!({"reason": "maintenance"}));
        assert_eq!(event.data(), r#"{"reason":"maintenance"}"#);
    }
}
