//! Streaming edit bridge.
//!
//! Turns a handler's response into a bounded series of edits of the
//! interaction's reply:
//!
//! ```text
//!  handler ──chunks──► buffer ──(rate limit)──► decode ──► control codes
//!                                                              │
//!        platform ◄── edit_message ◄── tail(character_limit) ◄─┘
//! ```
//!
//! - The first byte entering an empty buffer arms a timer of `rate_limit`.
//!   When it fires the whole buffer is flushed as one edit. Chunks arriving
//!   in between are merged into that flush.
//! - When the body ends, remaining bytes are flushed at once and the timer
//!   is dropped.
//! - Each flush appends the decoded text to the current content, applies
//!   the control codes to the result and keeps its last `character_limit`
//!   characters.
//! - A `404` from the platform cancels the interaction and ends the bridge.
//!
//! A response with `Content-Disposition: attachment` skips all of this: the
//! body is collected and uploaded in a single edit.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use hookcord_core::{
    ApiError, Attachment, AttachmentFile, Body, CancellationToken, Message, ORIGINAL_MESSAGE,
    PlatformApi, Response, Utf8Decoder, apply_control_codes, tail_chars,
};
use hookcord_framework::{attachment_from_headers, extract_buttons};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, trace, warn};

use crate::config::{EditFailurePolicy, StreamingConfig};

/// Settings of one bridge.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Minimum delay between the first buffered byte and its edit.
    pub rate_limit: Duration,
    /// Maximum content length in characters.
    pub character_limit: usize,
    /// Reaction to non-404 edit failures.
    pub edit_failure_policy: EditFailurePolicy,
}

impl From<&StreamingConfig> for BridgeSettings {
    fn from(config: &StreamingConfig) -> Self {
        Self {
            rate_limit: config.rate_limit(),
            character_limit: config.character_limit,
            edit_failure_policy: config.edit_failure_policy,
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from(&StreamingConfig::default())
    }
}

/// How a bridge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The body was consumed to the end.
    Completed {
        /// Edits attempted.
        edits: usize,
    },
    /// The stream was cancelled before its end.
    Aborted,
}

enum Flow {
    Continue,
    Stop,
}

/// Drives the edits of one interaction reply.
pub struct EditBridge {
    api: Arc<dyn PlatformApi>,
    settings: BridgeSettings,
    token: String,
    message_id: String,
    cancel: CancellationToken,
    message: Message,
    decoder: Utf8Decoder,
    carry: String,
    edits: usize,
}

impl EditBridge {
    /// Creates a bridge editing the original reply of interaction `token`.
    ///
    /// `cancel` is the token handed to the handler's request; it is
    /// cancelled when the bridge gives up.
    pub fn new(
        api: Arc<dyn PlatformApi>,
        settings: BridgeSettings,
        token: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            settings,
            token: token.into(),
            message_id: ORIGINAL_MESSAGE.to_string(),
            cancel,
            message: Message::default(),
            decoder: Utf8Decoder::new(),
            carry: String::new(),
            edits: 0,
        }
    }

    /// Edits `message_id` instead of the original reply.
    pub fn message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = message_id.into();
        self
    }

    /// Consumes `response` and edits the reply until its body ends.
    pub async fn run(mut self, response: Response) -> BridgeOutcome {
        if !response.status.is_success() {
            debug!(status = %response.status, "Handler returned a non-success status");
        }

        if let Some(row) = extract_buttons(&response.headers) {
            self.message.components = vec![row];
        }

        match attachment_from_headers(&response.headers) {
            Some(attachment) => self.upload(attachment, response.body).await,
            None => self.stream(response.body).await,
        }
    }

    async fn upload(mut self, mut attachment: Attachment, body: Body) -> BridgeOutcome {
        let data = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return BridgeOutcome::Aborted,
            data = body.collect() => data,
        };
        let data = match data {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Attachment body failed, nothing uploaded");
                return BridgeOutcome::Aborted;
            }
        };

        attachment.size.get_or_insert(data.len() as u64);
        debug!(filename = %attachment.filename, size = data.len(), "Uploading attachment");
        self.message.attachments = vec![attachment.clone()];

        match self.edit(Some(AttachmentFile { attachment, data })).await {
            Flow::Continue => BridgeOutcome::Completed { edits: self.edits },
            Flow::Stop => BridgeOutcome::Aborted,
        }
    }

    async fn stream(mut self, body: Body) -> BridgeOutcome {
        let mut body = body.into_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("Interaction cancelled, stopping edits");
                    return BridgeOutcome::Aborted;
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    let text = self.decoder.decode(&std::mem::take(&mut buffer));
                    if let Flow::Stop = self.append(text, false).await {
                        return BridgeOutcome::Aborted;
                    }
                }
                next = body.next() => match next {
                    Some(Ok(chunk)) => {
                        if chunk.is_empty() {
                            continue;
                        }
                        buffer.extend_from_slice(&chunk);
                        if deadline.is_none() {
                            deadline = Some(Instant::now() + self.settings.rate_limit);
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Response body failed, sending what was received");
                        break;
                    }
                    None => break,
                },
            }
        }

        let mut text = self.decoder.decode(&buffer);
        text.push_str(&self.decoder.finish());
        if let Flow::Stop = self.append(text, true).await {
            return BridgeOutcome::Aborted;
        }

        BridgeOutcome::Completed { edits: self.edits }
    }

    /// Applies `text` to the content and sends the edit.
    ///
    /// A trailing `\r` is held back until the next flush, since it may be
    /// the first half of a CRLF. The last flush always edits when nothing
    /// has been sent yet.
    async fn append(&mut self, text: String, last: bool) -> Flow {
        let mut text = std::mem::take(&mut self.carry) + &text;
        if !last && text.ends_with('\r') {
            text.pop();
            self.carry.push('\r');
        }
        if text.is_empty() && !(last && self.edits == 0) {
            return Flow::Continue;
        }

        let mut combined = std::mem::take(&mut self.message.content);
        combined.push_str(&text);
        let processed = apply_control_codes(&combined);
        self.message.content = tail_chars(&processed, self.settings.character_limit).to_string();
        self.edit(None).await
    }

    async fn edit(&mut self, file: Option<AttachmentFile>) -> Flow {
        self.edits += 1;
        trace!(
            edit = self.edits,
            chars = self.message.content.chars().count(),
            "Editing reply"
        );

        let result = self
            .api
            .edit_message(&self.token, &self.message_id, &self.message, file)
            .await;

        match result {
            Ok(()) => Flow::Continue,
            Err(ApiError::NotFound) => {
                info!("Interaction no longer exists, aborting stream");
                self.cancel.cancel();
                Flow::Stop
            }
            Err(e) => match self.settings.edit_failure_policy {
                EditFailurePolicy::Continue => {
                    warn!(error = %e, "Edit failed, continuing");
                    Flow::Continue
                }
                EditFailurePolicy::Abort => {
                    warn!(error = %e, "Edit failed, aborting stream");
                    self.cancel.cancel();
                    Flow::Stop
                }
            },
        }
    }
}
