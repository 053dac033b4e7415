//! The chat operations facade.
//!
//! Every operation builds a `Call` and hands it to `execute` (or
//! `execute_empty`) to get back a typed result. Token acquisition, transport
//! and status classification live here once.

mod message;
mod participant;
mod thread;

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use courier_identity::{HttpIdentityClient, IdentityIssuer};
use parking_lot::RwLock;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::credential::{Credential, TokenFetcher, TokenSource};
use crate::endpoint::Endpoint;
use crate::entities::PagedCollection;
use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, JSON_CONTENT_TYPE,
    MERGE_PATCH_CONTENT_TYPE,
};
use crate::types::{ChatError, ChatResult};

/// Client for the chat REST API.
///
/// Cloning is cheap; clones share the credential, the transport and the
/// active token source.
#[derive(Clone)]
pub struct ChatClient {
    endpoint: Endpoint,
    transport: Arc<dyn HttpTransport>,
    credential: Arc<Credential>,
    token_source: Arc<RwLock<Arc<dyn TokenSource>>>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint.base().as_str())
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Bootstrap a new identity against the service's identity endpoints,
    /// authenticating with the resource access key.
    pub async fn new(host: &str, access_key: &str) -> ChatResult<Self> {
        let issuer = HttpIdentityClient::new(host, access_key)?;
        Self::builder(host).bootstrap(Arc::new(issuer)).await
    }

    /// Attach to a pre-minted token. The client cannot refresh it.
    pub fn new_with_token(
        host: &str,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> ChatResult<Self> {
        Self::builder(host).attach(token, expires_at)
    }

    pub fn builder(host: impl Into<String>) -> ChatClientBuilder {
        ChatClientBuilder::new(host)
    }

    /// Adopt an externally minted token in place.
    pub fn with_token(&self, token: impl Into<String>, expires_at: DateTime<Utc>) -> &Self {
        self.credential.replace(token, expires_at);
        self
    }

    /// Token for the next call, as produced by the active token source.
    pub async fn get_token(&self) -> ChatResult<String> {
        self.active_source().token().await
    }

    /// Route every future token lookup through `fetch`, on this client and
    /// every clone of it. There is no way back to the cached credential.
    pub fn set_token_fetcher<F>(&self, fetch: F)
    where
        F: Fn() -> ChatResult<String> + Send + Sync + 'static,
    {
        self.set_token_source(Arc::new(TokenFetcher::new(fetch)));
    }

    pub fn set_token_source(&self, source: Arc<dyn TokenSource>) {
        *self.token_source.write() = source;
    }

    /// Identity id when the client was bootstrapped.
    pub fn user_id(&self) -> Option<&str> {
        self.credential.subject_id()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Fetch the page after `page`, if the service advertised one.
    pub async fn next_page<T>(
        &self,
        page: &PagedCollection<T>,
    ) -> ChatResult<Option<PagedCollection<T>>>
    where
        T: DeserializeOwned,
    {
        let Some(link) = page.next_link() else {
            return Ok(None);
        };
        let url = self.endpoint.resolve_link(link)?;
        self.execute(Call::get(url)).await.map(Some)
    }

    pub(crate) async fn execute<T>(&self, call: Call) -> ChatResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.dispatch(call).await?;
        serde_json::from_slice(&response.body).map_err(ChatError::ResponseDecode)
    }

    pub(crate) async fn execute_empty(&self, call: Call) -> ChatResult<()> {
        self.dispatch(call).await.map(|_| ())
    }

    fn active_source(&self) -> Arc<dyn TokenSource> {
        self.token_source.read().clone()
    }

    async fn dispatch(&self, call: Call) -> ChatResult<HttpResponse> {
        let bearer_token = self.active_source().token().await?;

        let request = HttpRequest {
            method: call.method,
            url: call.url,
            bearer_token,
            content_type: call.content_type,
            body: call.body,
        };

        let response = self.transport.send(request).await?;
        classify(response)
    }
}

fn classify(response: HttpResponse) -> ChatResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    if response.status == StatusCode::UNAUTHORIZED {
        warn!("chat service rejected the bearer token");
        return Err(ChatError::Unauthorized);
    }

    let body = response.text();
    debug!(status = %response.status, body = %body, "chat call failed");
    Err(ChatError::remote(response.status.as_u16(), body))
}

/// A request ready to be authorised and sent.
#[derive(Debug)]
pub(crate) struct Call {
    method: Method,
    url: Url,
    content_type: &'static str,
    body: Option<Bytes>,
}

impl Call {
    pub(crate) fn get(url: Url) -> Self {
        Self::without_body(Method::GET, url)
    }

    pub(crate) fn delete(url: Url) -> Self {
        Self::without_body(Method::DELETE, url)
    }

    pub(crate) fn post_json<B: Serialize>(url: Url, body: &B) -> ChatResult<Self> {
        Self::with_body(Method::POST, url, JSON_CONTENT_TYPE, body)
    }

    pub(crate) fn patch_merge<B: Serialize>(url: Url, body: &B) -> ChatResult<Self> {
        Self::with_body(Method::PATCH, url, MERGE_PATCH_CONTENT_TYPE, body)
    }

    fn without_body(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            content_type: JSON_CONTENT_TYPE,
            body: None,
        }
    }

    fn with_body<B: Serialize>(
        method: Method,
        url: Url,
        content_type: &'static str,
        body: &B,
    ) -> ChatResult<Self> {
        let body = serde_json::to_vec(body).map_err(ChatError::RequestEncode)?;
        Ok(Self {
            method,
            url,
            content_type,
            body: Some(Bytes::from(body)),
        })
    }
}

/// Builds a [`ChatClient`] with an explicit transport or API version.
pub struct ChatClientBuilder {
    host: String,
    api_version: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ChatClientBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_version: None,
            transport: None,
        }
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn attach(
        self,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> ChatResult<ChatClient> {
        let endpoint = self.endpoint()?;
        Ok(self.finish(endpoint, Credential::attached(token, expires_at)))
    }

    /// Mint a new identity through `issuer`. The endpoint is validated first,
    /// so a bad host never costs an issuance call.
    pub async fn bootstrap(self, issuer: Arc<dyn IdentityIssuer>) -> ChatResult<ChatClient> {
        let endpoint = self.endpoint()?;
        let credential = Credential::bootstrap(issuer).await?;
        Ok(self.finish(endpoint, credential))
    }

    fn endpoint(&self) -> ChatResult<Endpoint> {
        let endpoint = Endpoint::new(&self.host)?;
        Ok(match &self.api_version {
            Some(version) => endpoint.with_api_version(version.clone()),
            None => endpoint,
        })
    }

    fn finish(self, endpoint: Endpoint, credential: Credential) -> ChatClient {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
        let credential = Arc::new(credential);
        let source: Arc<dyn TokenSource> = credential.clone();
        ChatClient {
            endpoint,
            transport,
            credential,
            token_source: Arc::new(RwLock::new(source)),
        }
    }
}
