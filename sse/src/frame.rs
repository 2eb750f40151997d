//! Text framing for delivered events.
//!
//! Each event becomes one self-delimiting block:
//!
//! ```text
//! event: member_joined
//! data: {"userId":"U9"}
//!
//! ```
//!
//! The payload is serialized as compact JSON so it always fits on a single
//! `data:` line and a client can parse the stream incrementally.

use crate::message::{Event, EventType};

/// Render an event as an SSE text block terminated by a blank line.
pub fn frame(event: &Event) -> String {
    format!("event: {}\ndata: {}\n\n", event.event_type(), event.data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Kind;
    use serde_json::json;

    #[test]
    fn test_frame_has_type_line_data_line_and_blank_line() {
        let event = Event::group(Kind::MemberJoined, "circle-42", json!({"userId": "U9"}));

        assert_eq!(
            frame(&event),
            "event: member_joined\ndata: {\"userId\":\"U9\"}\n\n"
        );
    }

    #[test]
    fn test_frame_keeps_multiline_strings_on_one_data_line() {
        let event = Event::direct(Kind::ReminderDue, json!({"note": "line one\nline two"}));
        let framed = frame(&event);

        assert_eq!(framed.matches('\n').count(), 3);
        assert!(framed.ends_with("\n\n"));
    }

    #[test]
    fn test_frame_does_not_leak_group_key() {
        let event = Event::group(Kind::CircleUpdated, "secret-circle", json!({}));
        assert!(!frame(&event).contains("secret-circle"));
    }
}
