//! Wire format of the push-notification channel
//!
//! The first outbound frame after the transport opens is the auth frame; the
//! server validates it out-of-band. Every inbound frame is a [`PushFrame`]
//! with a `type` discriminator and a human readable `message`.

use serde::{Deserialize, Serialize};

use crate::token::AuthToken;

pub const AUTH_FRAME_TYPE: &str = "auth";

/// Severity tag of an inbound push frame
///
/// The server is free to send domain specific types (for example `goal`),
/// those are preserved in `Other` so the UI layer can style them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
    Notification,
    #[serde(untagged)]
    Other(String),
}

impl Default for NoticeKind {
    fn default() -> Self {
        Self::Info
    }
}

impl std::fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
            NoticeKind::Notification => "notification",
            NoticeKind::Other(other) => other,
        };
        write!(f, "{text}")
    }
}

/// Inbound frame as sent by the server's connection manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushFrame {
    #[serde(rename = "type", default)]
    pub kind: NoticeKind,
    pub message: String,
}

/// Builds the single authentication frame sent after the transport opens
pub fn auth_frame(token: &AuthToken) -> ewebsock::WsMessage {
    let payload = serde_json::json!({
        "type": AUTH_FRAME_TYPE,
        "token": token.as_str(),
    });
    ewebsock::WsMessage::Text(payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::explicit_info(r#"{"type":"info","message":"hello"}"#, NoticeKind::Info)]
    #[case::broadcast(
        r#"{"type":"notification","message":"hello"}"#,
        NoticeKind::Notification
    )]
    #[case::domain_specific(
        r#"{"type":"goal","message":"hello"}"#,
        NoticeKind::Other("goal".to_string())
    )]
    #[case::type_absent_defaults_to_info(r#"{"message":"hello"}"#, NoticeKind::Info)]
    fn inbound_frame_classification(#[case] raw: &str, #[case] expected: NoticeKind) {
        let frame: PushFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.kind, expected);
        assert_eq!(frame.message, "hello");
    }

    #[test]
    fn auth_frame_carries_the_token() {
        let token: AuthToken = "tok-123".into();
        let ewebsock::WsMessage::Text(text) = auth_frame(&token) else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], AUTH_FRAME_TYPE);
        assert_eq!(value["token"], "tok-123");
    }
}
