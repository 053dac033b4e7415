use tracing::{debug, info, instrument};

use super::{Call, ChatClient};
use crate::endpoint::QueryParams;
use crate::entities::{ChatMessage, ChatMessagesCollection};
use crate::types::{
    ChatResult, ListChatMessagesOptions, SendChatMessageRequest, SendChatMessageResult,
    UpdateChatMessageRequest,
};

impl ChatClient {
    #[instrument(skip(self, request), fields(message_type = ?request.message_type))]
    pub async fn send_chat_message(
        &self,
        thread_id: &str,
        request: SendChatMessageRequest,
    ) -> ChatResult<SendChatMessageResult> {
        let url = self
            .endpoint
            .url(&["chat", "threads", thread_id, "messages"], &QueryParams::new())?;

        let result: SendChatMessageResult = self.execute(Call::post_json(url, &request)?).await?;
        debug!(message_id = %result.id, "chat message sent");
        Ok(result)
    }

    pub async fn get_chat_message(
        &self,
        thread_id: &str,
        message_id: &str,
    ) -> ChatResult<ChatMessage> {
        let url = self.endpoint.url(
            &["chat", "threads", thread_id, "messages", message_id],
            &QueryParams::new(),
        )?;
        self.execute(Call::get(url)).await
    }

    /// One page of messages, newest first.
    pub async fn list_chat_messages(
        &self,
        thread_id: &str,
        options: &ListChatMessagesOptions,
    ) -> ChatResult<ChatMessagesCollection> {
        let query = QueryParams::new()
            .push_opt("maxPageSize", options.max_page_size.filter(|size| *size > 0))
            .push_time("startTime", options.start_time);
        let url = self
            .endpoint
            .url(&["chat", "threads", thread_id, "messages"], &query)?;
        self.execute(Call::get(url)).await
    }

    #[instrument(skip(self))]
    pub async fn delete_chat_message(&self, thread_id: &str, message_id: &str) -> ChatResult<()> {
        let url = self.endpoint.url(
            &["chat", "threads", thread_id, "messages", message_id],
            &QueryParams::new(),
        )?;
        self.execute_empty(Call::delete(url)).await?;
        info!("chat message deleted");
        Ok(())
    }

    /// Edit content and/or metadata. Fields left as `None` are untouched.
    #[instrument(skip(self, update))]
    pub async fn update_chat_message(
        &self,
        thread_id: &str,
        message_id: &str,
        update: &UpdateChatMessageRequest,
    ) -> ChatResult<()> {
        let url = self.endpoint.url(
            &["chat", "threads", thread_id, "messages", message_id],
            &QueryParams::new(),
        )?;
        self.execute_empty(Call::patch_merge(url, update)?).await?;
        info!("chat message updated");
        Ok(())
    }
}
