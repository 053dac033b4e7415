//! # Courier Chat Crate
//!
//! Typed client for the chat REST API. A [`ChatClient`] owns a
//! [`Credential`] that keeps the bearer token current, builds every request
//! against a pinned API version and classifies responses into [`ChatError`].
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use courier_chat::{ChatClient, SendChatMessageRequest};
//!
//! # async fn run() -> courier_chat::ChatResult<()> {
//! let client = ChatClient::new_with_token(
//!     "contoso.communication.azure.com",
//!     "eyJ0eXAi...",
//!     Utc::now() + Duration::hours(1),
//! )?;
//! client
//!     .send_chat_message("19:thread@thread.v2", SendChatMessageRequest::text("hello"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod credential;
pub mod endpoint;
pub mod entities;
pub mod transport;
pub mod types;

pub use api::{ChatClient, ChatClientBuilder};
pub use credential::{Credential, TokenFetcher, TokenSource, TOKEN_SCOPES, TOKEN_TTL_MINUTES};
pub use endpoint::{Endpoint, QueryParams, DEFAULT_API_VERSION};
pub use entities::{
    ChatMessage, ChatMessageContent, ChatMessageType, ChatMessagesCollection, ChatParticipant,
    ChatParticipantsCollection, ChatThread, ChatThreadItem, ChatThreadsCollection, ChatUser,
    CommunicationIdentifier, CommunicationUser, CreateChatThreadResult, InvalidParticipant,
    PagedCollection,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{
    ChatError, ChatResult, ListChatMessagesOptions, ListChatParticipantsOptions,
    ListChatThreadsOptions, SendChatMessageRequest, SendChatMessageResult,
    UpdateChatMessageRequest,
};
