//! Integration tests for the chat client against a mock chat service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use courier_chat::{
    ChatClient, ChatError, ChatUser, ListChatMessagesOptions, ListChatThreadsOptions,
    SendChatMessageRequest, UpdateChatMessageRequest,
};
use courier_identity::{AccessToken, IdentityError, IdentityIssuer, IssuedIdentity, TokenScope};
use httpmock::prelude::*;
use httpmock::Method;
use serde_json::json;

/// Issuer that hands out `t1` on creation and `t2`, `t3`, ... on refresh.
struct StubIssuer {
    lifetime: Duration,
    refreshes: AtomicUsize,
}

impl StubIssuer {
    fn new(lifetime: Duration) -> Arc<Self> {
        Arc::new(Self {
            lifetime,
            refreshes: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl IdentityIssuer for StubIssuer {
    async fn create_identity(
        &self,
        _scopes: &[TokenScope],
        _expires_in_minutes: u32,
    ) -> Result<IssuedIdentity, IdentityError> {
        Ok(IssuedIdentity {
            id: "8:acs:tester".to_string(),
            access_token: Some(AccessToken {
                token: "t1".to_string(),
                expires_on: Utc::now() + self.lifetime,
            }),
        })
    }

    async fn issue_access_token(
        &self,
        _user_id: &str,
        _scopes: &[TokenScope],
        _expires_in_minutes: u32,
    ) -> Result<AccessToken, IdentityError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 2;
        Ok(AccessToken {
            token: format!("t{n}"),
            expires_on: Utc::now() + Duration::hours(24),
        })
    }
}

async fn bootstrapped(server: &MockServer, issuer: Arc<StubIssuer>) -> ChatClient {
    ChatClient::builder(server.base_url())
        .bootstrap(issuer)
        .await
        .expect("client should bootstrap")
}

#[tokio::test]
async fn bootstrap_then_create_thread_carries_bearer_token() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/threads")
                .query_param("api-version", "2021-09-07")
                .header("Authorization", "Bearer t1")
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "topic": "topic",
                    "participants": [{
                        "communicationIdentifier": {
                            "rawId": "8:acs:user",
                            "communicationUser": { "id": "8:acs:user" }
                        },
                        "displayName": "User"
                    }]
                }));
            then.status(201)
                .json_body(json!({ "chatThread": { "id": "th-1", "topic": "topic" } }));
        })
        .await;

    let client = bootstrapped(&server, StubIssuer::new(Duration::minutes(60))).await;
    let result = client
        .create_chat_thread("topic", &[ChatUser::new("8:acs:user", "User")])
        .await
        .expect("thread should be created");

    mock.assert_async().await;
    assert_eq!(result.chat_thread.id, "th-1");
    assert!(result.invalid_participants.is_empty());
    assert_eq!(client.user_id(), Some("8:acs:tester"));
}

#[tokio::test]
async fn expired_bootstrap_token_is_refreshed_before_the_call() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/chat/threads/th-1")
                .header("Authorization", "Bearer t2");
            then.status(204);
        })
        .await;

    let issuer = StubIssuer::new(Duration::seconds(-1));
    let client = bootstrapped(&server, issuer.clone()).await;

    client
        .delete_chat_thread("th-1")
        .await
        .expect("delete should succeed with refreshed token");

    mock.assert_async().await;
    assert_eq!(issuer.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn listing_follows_next_link() {
    let server = MockServer::start_async().await;

    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/chat/threads")
                .query_param("maxPageSize", "1")
                .query_param("api-version", "2021-09-07");
            then.status(200).json_body(json!({
                "value": [{ "id": "th-1", "topic": "first" }],
                "nextLink": "/chat/threads?continuationToken=page2"
            }));
        })
        .await;

    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/chat/threads")
                .query_param("continuationToken", "page2")
                .query_param("api-version", "2021-09-07");
            then.status(200).json_body(json!({
                "value": [{ "id": "th-2", "topic": "second" }]
            }));
        })
        .await;

    let client =
        ChatClient::new_with_token(&server.base_url(), "tok", Utc::now() + Duration::hours(1))
            .expect("client should build");

    let options = ListChatThreadsOptions {
        max_page_size: Some(1),
        start_time: None,
    };
    let page = client.list_chat_threads(&options).await.expect("first page");
    assert_eq!(page.items[0].id, "th-1");

    let next = client
        .next_page(&page)
        .await
        .expect("second page")
        .expect("a second page exists");
    assert_eq!(next.items[0].id, "th-2");
    assert!(client.next_page(&next).await.expect("no error").is_none());

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn send_update_and_fetch_message() {
    let server = MockServer::start_async().await;

    let send = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/threads/th-1/messages")
                .json_body(json!({
                    "content": "hello",
                    "senderDisplayName": "Ada",
                    "type": "text",
                    "metadata": { "origin": "tests" }
                }));
            then.status(201).json_body(json!({ "id": "msg-1" }));
        })
        .await;

    let update = server
        .mock_async(|when, then| {
            when.method(Method::PATCH)
                .path("/chat/threads/th-1/messages/msg-1")
                .header("Content-Type", "application/merge-patch+json")
                .json_body(json!({ "content": "hello again" }));
            then.status(204);
        })
        .await;

    let get = server
        .mock_async(|when, then| {
            when.method(GET).path("/chat/threads/th-1/messages/msg-1");
            then.status(200).json_body(json!({
                "id": "msg-1",
                "type": "text",
                "sequenceId": "1",
                "version": "2",
                "content": { "message": "hello again" },
                "createdOn": "2024-05-01T10:00:00Z",
                "editedOn": "2024-05-01T10:01:00Z",
                "metadata": { "origin": "tests" }
            }));
        })
        .await;

    let client =
        ChatClient::new_with_token(&server.base_url(), "tok", Utc::now() + Duration::hours(1))
            .expect("client should build");

    let sent = client
        .send_chat_message(
            "th-1",
            SendChatMessageRequest::text("hello")
                .with_sender_display_name("Ada")
                .with_metadata("origin", "tests"),
        )
        .await
        .expect("message should be sent");
    assert_eq!(sent.id, "msg-1");

    client
        .update_chat_message("th-1", &sent.id, &UpdateChatMessageRequest::content("hello again"))
        .await
        .expect("message should be updated");

    let message = client
        .get_chat_message("th-1", &sent.id)
        .await
        .expect("message should be fetched");
    assert_eq!(message.text(), Some("hello again"));
    assert!(message.is_edited());
    assert_eq!(message.metadata.get("origin").map(String::as_str), Some("tests"));

    send.assert_async().await;
    update.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn remote_errors_carry_raw_body() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/chat/threads/th-404/messages");
            then.status(404)
                .body(r#"{"error":{"code":"NotFound","message":"thread not found"}}"#);
        })
        .await;

    let client =
        ChatClient::new_with_token(&server.base_url(), "tok", Utc::now() + Duration::hours(1))
            .expect("client should build");

    let err = client
        .list_chat_messages("th-404", &ListChatMessagesOptions::default())
        .await
        .expect_err("listing should fail");

    match err {
        ChatError::Remote { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("thread not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn rejected_token_is_unauthorized() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/threads/th-1/participants/:remove");
            then.status(401);
        })
        .await;

    let client =
        ChatClient::new_with_token(&server.base_url(), "revoked", Utc::now() + Duration::hours(1))
            .expect("client should build");

    let err = client
        .remove_chat_participant("th-1", "8:acs:someone")
        .await
        .expect_err("removal should be rejected");
    assert!(matches!(err, ChatError::Unauthorized));
    assert!(err.requires_reauthentication());
}

#[tokio::test]
async fn expired_attached_token_makes_no_request() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.path_contains("/chat");
            then.status(200);
        })
        .await;

    let client =
        ChatClient::new_with_token(&server.base_url(), "old", Utc::now() - Duration::minutes(1))
            .expect("client should build");

    let err = client
        .delete_chat_thread("th-1")
        .await
        .expect_err("expired token should fail");
    assert!(matches!(err, ChatError::TokenExpired));
    assert_eq!(mock.hits_async().await, 0);
}
