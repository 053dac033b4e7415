//! # Courier Identity Crate
//!
//! Issues communication identities and short-lived access tokens for them.
//! The chat client only depends on the [`IdentityIssuer`] trait; the
//! [`HttpIdentityClient`] is the implementation that talks to the service's
//! identity endpoints with shared-key request signing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

mod client;
mod signing;

pub use client::HttpIdentityClient;
pub use signing::{SharedKeySigner, SignedHeaders};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("access key is not valid base64: {0}")]
    InvalidAccessKey(#[from] base64::DecodeError),
    #[error("invalid identity endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("identity http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity service returned {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("failed to encode identity request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid identity response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("request signing failed: {0}")]
    Signing(String),
}

/// Capability a token is minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    Chat,
    Voip,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Chat => "chat",
            TokenScope::Voip => "voip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

/// A freshly created identity. The service may omit the token when no scopes
/// were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedIdentity {
    pub id: String,
    pub access_token: Option<AccessToken>,
}

/// The identity-issuance collaborator used to bootstrap and refresh credentials.
#[async_trait]
pub trait IdentityIssuer: Send + Sync {
    async fn create_identity(
        &self,
        scopes: &[TokenScope],
        expires_in_minutes: u32,
    ) -> Result<IssuedIdentity, IdentityError>;

    async fn issue_access_token(
        &self,
        user_id: &str,
        scopes: &[TokenScope],
        expires_in_minutes: u32,
    ) -> Result<AccessToken, IdentityError>;
}

/// Resolve a resource host into a base URL.
///
/// Bare hosts are assumed to be served over https; anything carrying a scheme
/// is parsed as-is.
///
/// ```
/// use courier_identity::service_url;
///
/// let url = service_url("contoso.communication.azure.com").unwrap();
/// assert_eq!(url.as_str(), "https://contoso.communication.azure.com/");
///
/// let local = service_url("http://127.0.0.1:8080").unwrap();
/// assert_eq!(local.port(), Some(8080));
/// ```
pub fn service_url(host: &str) -> Result<Url, url::ParseError> {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        Url::parse(host)
    } else {
        Url::parse(&format!("https://{host}"))
    }
}
