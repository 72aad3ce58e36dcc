//! Command schemas pushed to the platform.

use serde::{Serialize, Serializer};

/// Value type of a command option.
///
/// Route patterns only ever produce string options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
}

impl Serialize for OptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String => serializer.serialize_u8(3),
        }
    }
}

/// A slash command as registered with the platform.
///
/// Required options always precede optional ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSchema {
    /// Command name, the first path segment of the route.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared options.
    pub options: Vec<CommandOptionSchema>,
}

/// One declared option of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOptionSchema {
    /// Option name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the platform requires a value.
    pub required: bool,
    /// Value type.
    #[serde(rename = "type")]
    pub kind: OptionKind,
}

impl CommandOptionSchema {
    /// Creates a string option described by its own name.
    pub fn string(name: impl Into<String>, required: bool) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            required,
            kind: OptionKind::String,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_schema() {
        let schema = CommandSchema {
            name: "hello".into(),
            description: "/hello/:name".into(),
            options: vec![CommandOptionSchema::string("name", true)],
        };

        assert_eq!(
            serde_json::to_value(schema).unwrap(),
            json!({
                "name": "hello",
                "description": "/hello/:name",
                "options": [
                    { "name": "name", "description": "name", "required": true, "type": 3 }
                ]
            })
        );
    }
}
