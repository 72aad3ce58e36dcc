//! Outbound calls to the remote platform.

use std::fmt;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::model::{AttachmentFile, CommandSchema, Message};

/// Pseudo message id addressing the original interaction reply.
pub const ORIGINAL_MESSAGE: &str = "@original";

/// Where a command set is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandScope {
    /// Visible in every guild and in direct messages.
    Global,
    /// Visible in one guild only.
    Guild(String),
}

impl CommandScope {
    /// Parses a comma-separated guild list; `None` or blank means global.
    pub fn parse_list(guild_ids: Option<&str>) -> Vec<CommandScope> {
        let guilds: Vec<CommandScope> = guild_ids
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CommandScope::Guild(id.to_string()))
            .collect();

        if guilds.is_empty() {
            vec![CommandScope::Global]
        } else {
            guilds
        }
    }
}

impl fmt::Display for CommandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Guild(id) => write!(f, "guild:{id}"),
        }
    }
}

/// The platform REST endpoints Hookcord consumes.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Replaces the whole command set registered for `scope`.
    async fn replace_commands(&self, scope: &CommandScope, commands: &[CommandSchema])
    -> ApiResult<()>;

    /// Edits a message previously sent in reply to the interaction `token`.
    ///
    /// `message_id` is usually [`ORIGINAL_MESSAGE`]. When `file` is set the
    /// body is sent as a multipart form. A vanished interaction is reported
    /// as [`ApiError::NotFound`](crate::error::ApiError::NotFound).
    async fn edit_message(
        &self,
        token: &str,
        message_id: &str,
        message: &Message,
        file: Option<AttachmentFile>,
    ) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scope_list() {
        assert_eq!(CommandScope::parse_list(None), vec![CommandScope::Global]);
        assert_eq!(CommandScope::parse_list(Some(" ")), vec![CommandScope::Global]);
        assert_eq!(
            CommandScope::parse_list(Some("1, 2,,3")),
            vec![
                CommandScope::Guild("1".into()),
                CommandScope::Guild("2".into()),
                CommandScope::Guild("3".into()),
            ]
        );
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(CommandScope::Global.to_string(), "global");
        assert_eq!(CommandScope::Guild("9".into()).to_string(), "guild:9");
    }
}
