//! Outbound message bodies.
//!
//! A [`Message`] is both the placeholder sent with the acknowledgment and the
//! body of every later edit.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Maximum number of buttons the platform accepts in one action row.
pub const MAX_ROW_BUTTONS: usize = 5;

/// Reply or edit body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Text content.
    pub content: String,

    /// Rich embeds. Hookcord never produces embeds itself.
    #[serde(default)]
    pub embeds: Vec<serde_json::Value>,

    /// Interactive components (a single action row when derived from `Link`).
    #[serde(default)]
    pub components: Vec<Component>,

    /// Attachment descriptors; file data travels separately.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Creates a message with the given content.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Components
// =============================================================================

/// Component kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ComponentKind {
    /// Container for up to five buttons.
    ActionRow,
    /// Clickable button.
    Button,
    /// Any component kind Hookcord does not build.
    Other(u8),
}

impl From<u8> for ComponentKind {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::ActionRow,
            2 => Self::Button,
            other => Self::Other(other),
        }
    }
}

impl From<ComponentKind> for u8 {
    fn from(value: ComponentKind) -> Self {
        match value {
            ComponentKind::ActionRow => 1,
            ComponentKind::Button => 2,
            ComponentKind::Other(other) => other,
        }
    }
}

/// Visual style of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
    /// Opens an external URL instead of sending an interaction.
    Link,
}

impl From<u8> for ButtonStyle {
    fn from(value: u8) -> Self {
        match value {
            2 => Self::Secondary,
            3 => Self::Success,
            4 => Self::Danger,
            5 => Self::Link,
            _ => Self::Primary,
        }
    }
}

impl From<ButtonStyle> for u8 {
    fn from(value: ButtonStyle) -> Self {
        match value {
            ButtonStyle::Primary => 1,
            ButtonStyle::Secondary => 2,
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
            ButtonStyle::Link => 5,
        }
    }
}

/// An interactive message component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Component kind.
    #[serde(rename = "type")]
    pub kind: ComponentKind,

    /// Children of an action row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,

    /// Button style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,

    /// Button label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Id sent back when a non-link button is clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,

    /// Target of a link button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Whether the button is greyed out.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl Component {
    /// Creates an action row holding the given buttons.
    pub fn action_row(buttons: Vec<Component>) -> Self {
        Self {
            kind: ComponentKind::ActionRow,
            components: buttons,
            style: None,
            label: None,
            custom_id: None,
            url: None,
            disabled: false,
        }
    }

    /// Creates a button that sends `custom_id` back when clicked.
    pub fn custom_button(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: ComponentKind::Button,
            components: Vec::new(),
            style: Some(ButtonStyle::Primary),
            label: Some(label.into()),
            custom_id: Some(custom_id.into()),
            url: None,
            disabled: false,
        }
    }

    /// Creates a button that opens `url`.
    pub fn link_button(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: ComponentKind::Button,
            components: Vec::new(),
            style: Some(ButtonStyle::Link),
            label: Some(label.into()),
            custom_id: None,
            url: Some(url.into()),
            disabled: false,
        }
    }

    /// Sets the disabled flag.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

// =============================================================================
// Attachments
// =============================================================================

/// Attachment descriptor referenced from a message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Index of the uploaded file part (`files[{id}]`).
    pub id: u64,

    /// File name shown to users.
    pub filename: String,

    /// MIME type, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Size in bytes, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Whether the platform should treat the file as ephemeral.
    #[serde(default)]
    pub ephemeral: bool,
}

/// File data uploaded next to a message edit.
#[derive(Debug, Clone)]
pub struct AttachmentFile {
    /// Descriptor matching one entry of [`Message::attachments`].
    pub attachment: Attachment,
    /// Raw file bytes.
    pub data: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_empty_message() {
        let value = serde_json::to_value(Message::default()).unwrap();
        assert_eq!(
            value,
            json!({ "content": "", "embeds": [], "components": [], "attachments": [] })
        );
    }

    #[test]
    fn test_serialize_action_row() {
        let row = Component::action_row(vec![
            Component::custom_button("/next", "Next"),
            Component::link_button("https://example.com", "Docs").disabled(true),
        ]);

        let value = serde_json::to_value(row).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["components"][0]["type"], 2);
        assert_eq!(value["components"][0]["style"], 1);
        assert_eq!(value["components"][0]["custom_id"], "/next");
        assert!(value["components"][0].get("disabled").is_none());
        assert_eq!(value["components"][1]["style"], 5);
        assert_eq!(value["components"][1]["url"], "https://example.com");
        assert_eq!(value["components"][1]["disabled"], true);
    }
}
