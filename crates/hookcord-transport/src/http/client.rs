//! Platform REST client.

use std::time::Duration;

use async_trait::async_trait;
use hookcord_core::{
    ApiError, ApiResult, AttachmentFile, CommandSchema, CommandScope, Message, PlatformApi,
    TransportError, TransportResult,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use tracing::{debug, trace};

/// Settings for [`PlatformClient`].
#[derive(Debug, Clone)]
pub struct PlatformClientConfig {
    /// REST API root, without a trailing slash.
    pub api_base: String,
    /// Application the commands and webhooks belong to.
    pub application_id: String,
    /// Bot token.
    pub bot_token: String,
    /// Authorization scheme placed before the token.
    pub token_prefix: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// reqwest-backed [`PlatformApi`].
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    api_base: String,
    application_id: String,
    authorization: String,
}

impl PlatformClient {
    /// Creates a client.
    pub fn new(config: PlatformClientConfig) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;

        let authorization = if config.token_prefix.is_empty() {
            config.bot_token
        } else {
            format!("{} {}", config.token_prefix, config.bot_token)
        };

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            application_id: config.application_id,
            authorization,
        })
    }

    fn commands_url(&self, scope: &CommandScope) -> String {
        match scope {
            CommandScope::Global => {
                format!("{}/applications/{}/commands", self.api_base, self.application_id)
            }
            CommandScope::Guild(guild) => format!(
                "{}/applications/{}/guilds/{guild}/commands",
                self.api_base, self.application_id
            ),
        }
    }

    fn message_url(&self, token: &str, message_id: &str) -> String {
        format!(
            "{}/webhooks/{}/{token}/messages/{message_id}",
            self.api_base, self.application_id
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, &self.authorization)
    }
}

async fn check(response: Result<Response, reqwest::Error>) -> ApiResult<()> {
    let response = response.map_err(|e| ApiError::Request(e.to_string()))?;
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

#[async_trait]
impl PlatformApi for PlatformClient {
    async fn replace_commands(
        &self,
        scope: &CommandScope,
        commands: &[CommandSchema],
    ) -> ApiResult<()> {
        let url = self.commands_url(scope);
        debug!(scope = %scope, count = commands.len(), "Replacing commands");
        check(self.authorized(self.client.put(&url)).json(commands).send().await).await
    }

    async fn edit_message(
        &self,
        token: &str,
        message_id: &str,
        message: &Message,
        file: Option<AttachmentFile>,
    ) -> ApiResult<()> {
        let url = self.message_url(token, message_id);
        let request = self.authorized(self.client.patch(&url));

        let request = match file {
            None => request.json(message),
            Some(file) => {
                let payload = serde_json::to_string(message)?;
                let mut part = Part::bytes(file.data.to_vec()).file_name(file.attachment.filename);
                if let Some(content_type) = &file.attachment.content_type {
                    part = part
                        .mime_str(content_type)
                        .map_err(|e| ApiError::Request(e.to_string()))?;
                }
                let form = Form::new()
                    .text("payload_json", payload)
                    .part(format!("files[{}]", file.attachment.id), part);
                request.multipart(form)
            }
        };

        trace!(message_id, len = message.content.len(), "Editing message");
        check(request.send().await).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(prefix: &str) -> PlatformClient {
        PlatformClient::new(PlatformClientConfig {
            api_base: "https://api.example/v10/".into(),
            application_id: "42".into(),
            bot_token: "secret".into(),
            token_prefix: prefix.into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = client("Bot");
        assert_eq!(
            client.commands_url(&CommandScope::Global),
            "https://api.example/v10/applications/42/commands"
        );
        assert_eq!(
            client.commands_url(&CommandScope::Guild("7".into())),
            "https://api.example/v10/applications/42/guilds/7/commands"
        );
        assert_eq!(
            client.message_url("tok", "@original"),
            "https://api.example/v10/webhooks/42/tok/messages/@original"
        );
    }

    #[test]
    fn test_authorization_prefix() {
        assert_eq!(client("Bot").authorization, "Bot secret");
        assert_eq!(client("").authorization, "secret");
    }
}
