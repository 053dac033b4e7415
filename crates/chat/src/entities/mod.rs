//! Wire entities of the chat service.
//!
//! These mirror the service's JSON shapes and are immutable snapshots of
//! server state at fetch time.

pub mod message;
pub mod paging;
pub mod participant;
pub mod thread;

pub use message::{ChatMessage, ChatMessageContent, ChatMessageType};
pub use paging::{
    ChatMessagesCollection, ChatParticipantsCollection, ChatThreadsCollection, PagedCollection,
};
pub use participant::{ChatParticipant, ChatUser, CommunicationIdentifier, CommunicationUser};
pub use thread::{ChatThread, ChatThreadItem, CreateChatThreadResult, InvalidParticipant};
