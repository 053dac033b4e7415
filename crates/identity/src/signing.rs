//! Shared-key (HMAC-SHA256) request signing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::{Digest, Sha256};
use url::Url;

use crate::IdentityError;

type HmacSha256 = Hmac<Sha256>;

/// Headers that must accompany a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub date: String,
    pub content_hash: String,
    pub authorization: String,
}

#[derive(Clone)]
pub struct SharedKeySigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for SharedKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeySigner").finish_non_exhaustive()
    }
}

impl SharedKeySigner {
    /// Build a signer from the base64 access key of the resource.
    pub fn new(access_key: &str) -> Result<Self, IdentityError> {
        let key = STANDARD.decode(access_key.trim())?;
        Ok(Self { key })
    }

    pub fn sign(
        &self,
        method: &Method,
        url: &Url,
        body: &[u8],
        date: DateTime<Utc>,
    ) -> Result<SignedHeaders, IdentityError> {
        let date = date.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_hash = STANDARD.encode(Sha256::digest(body));

        let string_to_sign = format!(
            "{}\n{}\n{};{};{}",
            method.as_str(),
            path_and_query(url),
            date,
            authority(url),
            content_hash
        );

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|error| IdentityError::Signing(error.to_string()))?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        Ok(SignedHeaders {
            date,
            content_hash,
            authorization: format!(
                "HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature={signature}"
            ),
        })
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sign_produces_known_signature() {
        let signer = SharedKeySigner::new("Y291cmllci10ZXN0LWtleQ==").unwrap();
        let url =
            Url::parse("https://contoso.communication.azure.com/identities?api-version=2023-10-01")
                .unwrap();
        let body = br#"{"createTokenWithScopes":["chat"],"expiresInMinutes":60}"#;
        let date = Utc.with_ymd_and_hms(2021, 6, 15, 10, 20, 30).unwrap();

        let headers = signer.sign(&Method::POST, &url, body, date).unwrap();

        assert_eq!(headers.date, "Tue, 15 Jun 2021 10:20:30 GMT");
        assert_eq!(
            headers.content_hash,
            "kET9vD/6sAVRB6ISkrpOL44L0M1olvugZ/QYxlSQK9k="
        );
        assert_eq!(
            headers.authorization,
            "HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature=CmHHBa2g57HOhu46Ks2v2N1Ltf23riUznHqM6ip1W64="
        );
    }

    #[test]
    fn empty_body_hash_is_sha256_of_nothing() {
        let signer = SharedKeySigner::new("a2V5").unwrap();
        let url = Url::parse("http://127.0.0.1:9000/identities").unwrap();
        let headers = signer
            .sign(&Method::GET, &url, b"", Utc::now())
            .unwrap();
        assert_eq!(
            headers.content_hash,
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn authority_keeps_explicit_port() {
        let url = Url::parse("http://127.0.0.1:9000/identities").unwrap();
        assert_eq!(authority(&url), "127.0.0.1:9000");
        assert_eq!(path_and_query(&url), "/identities");
    }

    #[test]
    fn new_rejects_non_base64_keys() {
        let err = SharedKeySigner::new("not base64!").unwrap_err();
        assert!(matches!(err, IdentityError::InvalidAccessKey(_)));
    }
}
