use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{
    service_url, AccessToken, IdentityError, IdentityIssuer, IssuedIdentity, SharedKeySigner,
    TokenScope,
};

const DEFAULT_API_VERSION: &str = "2023-10-01";

/// Identity endpoints of a communication resource, authenticated with its
/// shared access key.
#[derive(Clone)]
pub struct HttpIdentityClient {
    endpoint: Url,
    api_version: String,
    signer: Arc<SharedKeySigner>,
    http: Client,
}

impl HttpIdentityClient {
    pub fn new(host: &str, access_key: &str) -> Result<Self, IdentityError> {
        let endpoint = service_url(host)?;
        let signer = SharedKeySigner::new(access_key)?;

        Ok(Self {
            endpoint,
            api_version: DEFAULT_API_VERSION.to_string(),
            signer: Arc::new(signer),
            http: Client::new(),
        })
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, segments: &[&str]) -> Result<Url, IdentityError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, IdentityError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        let payload = serde_json::to_vec(body).map_err(IdentityError::Encode)?;
        let signed = self.signer.sign(&Method::POST, &url, &payload, Utc::now())?;

        debug!(path = url.path(), "calling identity service");

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-ms-date", signed.date)
            .header("x-ms-content-sha256", signed.content_hash)
            .header("Authorization", signed.authorization)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(IdentityError::Remote {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(IdentityError::Decode)
    }
}

#[async_trait]
impl IdentityIssuer for HttpIdentityClient {
    async fn create_identity(
        &self,
        scopes: &[TokenScope],
        expires_in_minutes: u32,
    ) -> Result<IssuedIdentity, IdentityError> {
        let request = CreateIdentityRequest {
            create_token_with_scopes: scopes,
            expires_in_minutes,
        };

        let response: CreateIdentityResponse = self.post(&["identities"], &request).await?;

        info!(user_id = %response.identity.id, "created communication identity");

        Ok(IssuedIdentity {
            id: response.identity.id,
            access_token: response.access_token,
        })
    }

    async fn issue_access_token(
        &self,
        user_id: &str,
        scopes: &[TokenScope],
        expires_in_minutes: u32,
    ) -> Result<AccessToken, IdentityError> {
        let request = IssueTokenRequest {
            scopes,
            expires_in_minutes,
        };

        let token: AccessToken = self
            .post(&["identities", user_id, ":issueAccessToken"], &request)
            .await?;

        debug!(user_id, expires_on = %token.expires_on, "issued access token");
        Ok(token)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIdentityRequest<'a> {
    create_token_with_scopes: &'a [TokenScope],
    expires_in_minutes: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueTokenRequest<'a> {
    scopes: &'a [TokenScope],
    expires_in_minutes: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIdentityResponse {
    identity: IdentityRef,
    #[serde(default)]
    access_token: Option<AccessToken>,
}

#[derive(Deserialize)]
struct IdentityRef {
    id: String,
}
