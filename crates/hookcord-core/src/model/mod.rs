//! Wire data model shared by every layer.
//!
//! - [`interaction`]: inbound interaction payloads and the immediate callback reply
//! - [`message`]: outbound message bodies, components and attachments
//! - [`command`]: command schemas pushed to the platform at startup

pub mod command;
pub mod interaction;
pub mod message;

pub use command::{CommandOptionSchema, CommandSchema, OptionKind};
pub use interaction::{
    CallbackType, CommandOptionValue, Interaction, InteractionData, InteractionResponse,
    InteractionType, Member, User,
};
pub use message::{
    Attachment, AttachmentFile, ButtonStyle, Component, ComponentKind, MAX_ROW_BUTTONS, Message,
};
