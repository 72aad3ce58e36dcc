//! Inbound interaction payloads.
//!
//! Only the fields Hookcord acts on are modelled; everything else in the
//! platform's payload is ignored during deserialization.

use serde::{Deserialize, Serialize};

use super::message::Message;

/// Kind of an inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InteractionType {
    /// Liveness probe sent by the platform when the endpoint is configured.
    Ping,
    /// A user invoked a slash command.
    ApplicationCommand,
    /// A user clicked a button attached to a previous reply.
    MessageComponent,
    /// Any interaction type Hookcord does not handle.
    Unknown(u8),
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            other => Self::Unknown(other),
        }
    }
}

impl From<InteractionType> for u8 {
    fn from(value: InteractionType) -> Self {
        match value {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::Unknown(other) => other,
        }
    }
}

/// A signed event describing a user action on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Interaction kind.
    #[serde(rename = "type")]
    pub kind: InteractionType,

    /// Platform-assigned interaction id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Command or component payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionData>,

    /// Guild member that triggered the interaction (guild context).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,

    /// User that triggered the interaction (direct-message context).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Continuation token addressing every later edit of the reply.
    #[serde(default)]
    pub token: String,

    /// Locale of the invoking user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Preferred locale of the guild, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_locale: Option<String>,
}

impl Interaction {
    /// Returns the id of the invoking user, looking at the guild member first.
    pub fn user_id(&self) -> Option<&str> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.id.as_str())
    }

    /// Returns the invoked command name, if this is a command interaction.
    pub fn command_name(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.name.as_str())
            .filter(|n| !n.is_empty())
    }

    /// Returns the supplied options, or an empty slice.
    pub fn options(&self) -> &[CommandOptionValue] {
        self.data.as_ref().map(|d| d.options.as_slice()).unwrap_or(&[])
    }

    /// Returns the clicked component's custom id, if any.
    pub fn custom_id(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.custom_id.as_deref())
    }
}

/// Payload of a command or component interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionData {
    /// Invoked command name.
    #[serde(default)]
    pub name: String,

    /// Options the user filled in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionValue>,

    /// Custom id of the clicked component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

/// A single `{name, value}` option supplied with a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOptionValue {
    /// Option name as declared in the command schema.
    pub name: String,

    /// Raw option value.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl CommandOptionValue {
    /// Creates a string-valued option.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: serde_json::Value::String(value.into()),
        }
    }

    /// Returns the value rendered as text.
    ///
    /// Strings are returned verbatim, `null` becomes the empty string, and any
    /// other JSON value is rendered with its JSON representation.
    pub fn value_string(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Guild member wrapper around a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Member {
    /// The member's user record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Platform user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// User id (snowflake string).
    pub id: String,

    /// Display name, if provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// =============================================================================
// Callback reply
// =============================================================================

/// Kind of the immediate reply to an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum CallbackType {
    /// Reply to a ping.
    Pong,
    /// Reply with a message right away.
    ChannelMessageWithSource,
    /// Acknowledge now, edit the reply later.
    DeferredChannelMessageWithSource,
    /// Acknowledge a component click, edit the clicked message later.
    DeferredUpdateMessage,
}

impl From<CallbackType> for u8 {
    fn from(value: CallbackType) -> Self {
        match value {
            CallbackType::Pong => 1,
            CallbackType::ChannelMessageWithSource => 4,
            CallbackType::DeferredChannelMessageWithSource => 5,
            CallbackType::DeferredUpdateMessage => 6,
        }
    }
}

/// Body of the synchronous HTTP reply to an interaction.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    /// Callback kind.
    #[serde(rename = "type")]
    pub kind: CallbackType,

    /// Initial message, if the callback carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Message>,
}

impl InteractionResponse {
    /// Reply to a ping.
    pub fn pong() -> Self {
        Self {
            kind: CallbackType::Pong,
            data: None,
        }
    }

    /// Acknowledge a command with a placeholder message that is edited later.
    pub fn deferred_channel_message(placeholder: Message) -> Self {
        Self {
            kind: CallbackType::DeferredChannelMessageWithSource,
            data: Some(placeholder),
        }
    }

    /// Acknowledge a component click without changing the message yet.
    pub fn deferred_update_message() -> Self {
        Self {
            kind: CallbackType::DeferredUpdateMessage,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_command_interaction() {
        let raw = json!({
            "type": 2,
            "token": "tok",
            "locale": "en-US",
            "guild_locale": "de",
            "member": { "user": { "id": "42" } },
            "data": {
                "name": "hello",
                "options": [
                    { "name": "age", "value": "9", "type": 3 },
                    { "name": "name", "value": "Ann", "type": 3 }
                ]
            }
        });

        let interaction: Interaction = serde_json::from_value(raw).unwrap();
        assert_eq!(interaction.kind, InteractionType::ApplicationCommand);
        assert_eq!(interaction.command_name(), Some("hello"));
        assert_eq!(interaction.user_id(), Some("42"));
        assert_eq!(interaction.guild_locale.as_deref(), Some("de"));
        assert_eq!(interaction.options().len(), 2);
        assert_eq!(interaction.options()[1].value_string(), "Ann");
    }

    #[test]
    fn test_unknown_interaction_type_is_preserved() {
        let interaction: Interaction =
            serde_json::from_value(json!({ "type": 9, "token": "t" })).unwrap();
        assert_eq!(interaction.kind, InteractionType::Unknown(9));
        assert!(interaction.command_name().is_none());
    }

    #[test]
    fn test_user_id_falls_back_to_user() {
        let interaction: Interaction =
            serde_json::from_value(json!({ "type": 2, "user": { "id": "7" } })).unwrap();
        assert_eq!(interaction.user_id(), Some("7"));
    }

    #[test]
    fn test_non_string_option_value() {
        let option = CommandOptionValue {
            name: "n".into(),
            value: json!(12),
        };
        assert_eq!(option.value_string(), "12");
    }

    #[test]
    fn test_serialize_callbacks() {
        assert_eq!(
            serde_json::to_value(InteractionResponse::pong()).unwrap(),
            json!({ "type": 1 })
        );

        let ack = InteractionResponse::deferred_channel_message(Message::default());
        let value = serde_json::to_value(ack).unwrap();
        assert_eq!(value["type"], 5);
        assert_eq!(value["data"]["content"], "");
    }
}
