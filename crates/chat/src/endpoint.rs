//! URL construction for chat operations.
//!
//! Every URL is built from the resource base, a list of path segments, the
//! optional query parameters that are actually present, and the pinned
//! `api-version` parameter, which is always emitted exactly once.

use chrono::{DateTime, SecondsFormat, Utc};
use courier_identity::service_url;
use url::Url;

use crate::types::{ChatError, ChatResult};

pub const DEFAULT_API_VERSION: &str = "2021-09-07";

const API_VERSION_PARAM: &str = "api-version";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    api_version: String,
}

impl Endpoint {
    pub fn new(host: &str) -> ChatResult<Self> {
        let mut base = service_url(host)?;
        base.set_query(None);
        Ok(Self {
            base,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn url(&self, segments: &[&str], query: &QueryParams) -> ChatResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &query.pairs {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(API_VERSION_PARAM, &self.api_version);
        }

        Ok(url)
    }

    /// Resolve a continuation link returned by a listing. Relative links are
    /// joined onto the base and `api-version` is added only if missing. Links
    /// to any other origin are refused so the bearer token stays on this host.
    pub fn resolve_link(&self, link: &str) -> ChatResult<Url> {
        let mut url = self.base.join(link)?;
        if url.origin() != self.base.origin() {
            return Err(ChatError::ForeignLink(link.to_string()));
        }
        let has_version = url.query_pairs().any(|(key, _)| key == API_VERSION_PARAM);
        if !has_version {
            url.query_pairs_mut()
                .append_pair(API_VERSION_PARAM, &self.api_version);
        }
        Ok(url)
    }
}

/// Ordered query parameters; absent optional values are never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub fn push_opt<V: ToString>(self, key: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    pub fn push_time(self, key: &'static str, value: Option<DateTime<Utc>>) -> Self {
        self.push_opt(
            key,
            value.map(|time| time.to_rfc3339_opts(SecondsFormat::Secs, true)),
        )
    }
}
