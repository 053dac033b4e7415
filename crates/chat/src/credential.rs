//! Bearer-token lifecycle.
//!
//! A [`Credential`] holds the current token and its expiry. When it was
//! bootstrapped through an [`IdentityIssuer`] it can refresh itself on expiry;
//! when it was attached to a pre-minted token it cannot, and an expired token
//! surfaces as [`ChatError::TokenExpired`].
//!
//! The chat client never reads the credential directly. It asks a
//! [`TokenSource`], which is the credential itself unless the caller installed
//! a [`TokenFetcher`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use courier_identity::{AccessToken, IdentityIssuer, TokenScope};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::{ChatError, ChatResult};

/// Scopes requested for every chat token.
pub const TOKEN_SCOPES: [TokenScope; 2] = [TokenScope::Chat, TokenScope::Voip];

/// Lifetime requested for every chat token (24 hours).
pub const TOKEN_TTL_MINUTES: u32 = 1440;

/// Strategy that yields the bearer token for the next call.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> ChatResult<String>;
}

/// Caller-supplied token callback. Its result is used verbatim, without any
/// expiry checks.
pub struct TokenFetcher<F> {
    fetch: F,
}

impl<F> TokenFetcher<F>
where
    F: Fn() -> ChatResult<String> + Send + Sync,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl<F> TokenSource for TokenFetcher<F>
where
    F: Fn() -> ChatResult<String> + Send + Sync,
{
    async fn token(&self) -> ChatResult<String> {
        (self.fetch)()
    }
}

#[derive(Debug, Clone)]
struct TokenState {
    token: String,
    expires_at: DateTime<Utc>,
}

impl TokenState {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

struct IssuerBinding {
    issuer: Arc<dyn IdentityIssuer>,
    subject_id: String,
}

pub struct Credential {
    state: RwLock<TokenState>,
    // Serialises refreshes; the state is re-checked after acquiring it.
    refresh_lock: Mutex<()>,
    issuer: Option<IssuerBinding>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("expires_at", &self.expires_at())
            .field("subject_id", &self.subject_id())
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// Adopt a pre-minted token. The credential cannot refresh itself.
    pub fn attached(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            state: RwLock::new(TokenState {
                token: token.into(),
                expires_at,
            }),
            refresh_lock: Mutex::new(()),
            issuer: None,
        }
    }

    /// Mint a new identity with an initial token and keep the issuer around
    /// for later refreshes.
    pub async fn bootstrap(issuer: Arc<dyn IdentityIssuer>) -> ChatResult<Self> {
        let identity = issuer
            .create_identity(&TOKEN_SCOPES, TOKEN_TTL_MINUTES)
            .await?;

        let token = identity
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(ChatError::IssuanceReturnedEmpty)?;

        if identity.id.is_empty() {
            return Err(ChatError::IssuanceReturnedEmpty);
        }

        info!(user_id = %identity.id, expires_at = %token.expires_on, "bootstrapped chat identity");

        Ok(Self {
            state: RwLock::new(TokenState {
                token: token.token,
                expires_at: token.expires_on,
            }),
            refresh_lock: Mutex::new(()),
            issuer: Some(IssuerBinding {
                issuer,
                subject_id: identity.id,
            }),
        })
    }

    /// Identity the token was issued for, when bootstrapped.
    pub fn subject_id(&self) -> Option<&str> {
        self.issuer
            .as_ref()
            .map(|binding| binding.subject_id.as_str())
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.state.read().expires_at
    }

    pub fn can_refresh(&self) -> bool {
        self.issuer.is_some()
    }

    /// Replace token and expiry in one step.
    pub fn replace(&self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        *self.state.write() = TokenState {
            token: token.into(),
            expires_at,
        };
        debug!(expires_at = %expires_at, "credential replaced");
    }

    /// Return a usable token, refreshing it first when it has expired and an
    /// issuer is available.
    pub async fn get_token(&self) -> ChatResult<String> {
        let state = self.state.read().clone();
        if !state.is_expired_at(Utc::now()) {
            return non_empty(state.token);
        }

        let Some(binding) = self.issuer.as_ref() else {
            if state.token.is_empty() {
                return Err(ChatError::NoTokenProvided);
            }
            warn!(expired_at = %state.expires_at, "token expired and cannot be refreshed");
            return Err(ChatError::TokenExpired);
        };

        let _guard = self.refresh_lock.lock().await;

        let current = self.state.read().clone();
        if !current.is_expired_at(Utc::now()) && !current.token.is_empty() {
            debug!("token refreshed by a concurrent caller");
            return Ok(current.token);
        }

        self.refresh_with(binding).await
    }

    /// Issue a new token for the bound identity.
    pub async fn refresh(&self) -> ChatResult<()> {
        let binding = self.issuer.as_ref().ok_or(ChatError::RefreshUnavailable)?;
        let _guard = self.refresh_lock.lock().await;
        self.refresh_with(binding).await.map(|_| ())
    }

    async fn refresh_with(&self, binding: &IssuerBinding) -> ChatResult<String> {
        let issued: AccessToken = binding
            .issuer
            .issue_access_token(&binding.subject_id, &TOKEN_SCOPES, TOKEN_TTL_MINUTES)
            .await?;

        if issued.is_empty() {
            return Err(ChatError::IssuanceReturnedEmpty);
        }

        *self.state.write() = TokenState {
            token: issued.token.clone(),
            expires_at: issued.expires_on,
        };

        info!(
            user_id = %binding.subject_id,
            expires_at = %issued.expires_on,
            "refreshed chat token"
        );
        Ok(issued.token)
    }
}

#[async_trait]
impl TokenSource for Credential {
    async fn token(&self) -> ChatResult<String> {
        self.get_token().await
    }
}

fn non_empty(token: String) -> ChatResult<String> {
    if token.is_empty() {
        Err(ChatError::NoTokenProvided)
    } else {
        Ok(token)
    }
}
