//! Shared types for the chat client.
//!
//! Error definitions, request payloads, and listing options that are used
//! across the operation modules.

pub mod errors;
pub mod requests;

pub use errors::{ChatError, ChatResult};
pub use requests::{
    ListChatMessagesOptions, ListChatParticipantsOptions, ListChatThreadsOptions,
    SendChatMessageRequest, SendChatMessageResult, UpdateChatMessageRequest,
};
