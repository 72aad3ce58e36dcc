//! In-memory platform double shared by the runtime tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use hookcord_core::{
    ApiError, ApiResult, AttachmentFile, CommandSchema, CommandScope, Message, PlatformApi,
};
use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub(crate) struct RecordedEdit {
    pub token: String,
    pub message_id: String,
    pub message: Message,
    pub file: Option<AttachmentFile>,
    pub at: Duration,
}

pub(crate) struct MockApi {
    started: Instant,
    pub edits: Mutex<Vec<RecordedEdit>>,
    pub registrations: Mutex<Vec<(CommandScope, Vec<CommandSchema>)>>,
    failures: Mutex<VecDeque<ApiError>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            edits: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Makes the next edit fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.failures.lock().push_back(error);
    }

    pub fn edits(&self) -> Vec<RecordedEdit> {
        self.edits.lock().clone()
    }

    pub fn contents(&self) -> Vec<String> {
        self.edits.lock().iter().map(|e| e.message.content.clone()).collect()
    }
}

#[async_trait]
impl PlatformApi for MockApi {
    async fn replace_commands(
        &self,
        scope: &CommandScope,
        commands: &[CommandSchema],
    ) -> ApiResult<()> {
        self.registrations
            .lock()
            .push((scope.clone(), commands.to_vec()));
        Ok(())
    }

    async fn edit_message(
        &self,
        token: &str,
        message_id: &str,
        message: &Message,
        file: Option<AttachmentFile>,
    ) -> ApiResult<()> {
        self.edits.lock().push(RecordedEdit {
            token: token.to_string(),
            message_id: message_id.to_string(),
            message: message.clone(),
            file,
            at: self.started.elapsed(),
        });
        match self.failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
