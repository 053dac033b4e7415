use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use courier_chat::{ChatClient, ReqwestTransport};
use courier_config::{CourierConfig, CredentialConfig};
use courier_identity::HttpIdentityClient;
use tracing::info;

pub mod telemetry {
    use std::fs::{File, OpenOptions};
    use std::path::Path;
    use std::sync::Mutex;

    use anyhow::{Context, Result};
    use courier_config::TelemetryConfig;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// `RUST_LOG` wins over the configured filter.
    pub fn build_filter(config: &TelemetryConfig) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    pub fn open_log_file(path: &Path) -> Result<File> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory {}", parent.display()))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))
    }

    /// Install the global subscriber. Output goes to stdout, or is appended to
    /// `log_file` when one is configured.
    pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
        let env_filter = build_filter(config);

        let result = match &config.log_file {
            Some(path) => {
                let file = open_log_file(Path::new(path))?;
                let subscriber = SubscriberBuilder::default()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .finish();
                tracing::subscriber::set_global_default(subscriber)
            }
            None => {
                let subscriber = SubscriberBuilder::default()
                    .with_env_filter(env_filter)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)
            }
        };

        result.map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// How the session obtained its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    /// A pre-minted token from configuration; it cannot be refreshed.
    Attached,
    /// A fresh identity minted with the resource access key.
    Bootstrapped,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    pub client: ChatClient,
    pub mode: CredentialMode,
}

impl ChatSession {
    /// Build a chat client from configuration. A configured token is attached
    /// as-is; otherwise a new identity is bootstrapped with the access key.
    pub async fn connect(config: &CourierConfig) -> Result<Self> {
        let host = config.service.host.trim();
        if host.is_empty() {
            bail!("service.host must be configured");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.request_timeout_seconds))
            .user_agent(config.http.user_agent.as_str())
            .build()
            .context("failed to build http client")?;

        let builder = ChatClient::builder(host)
            .api_version(config.service.chat_api_version.clone())
            .transport(Arc::new(ReqwestTransport::from_client(http.clone())));

        if let Some((token, expires_at)) = attached_credential(&config.credential)? {
            let client = builder
                .attach(token, expires_at)
                .context("failed to attach chat credential")?;
            info!(host, %expires_at, "chat session attached to configured token");
            return Ok(Self {
                client,
                mode: CredentialMode::Attached,
            });
        }

        let Some(access_key) = config.service.access_key.as_deref() else {
            bail!("no credential configured: set credential.token and credential.expires_at, or service.access_key");
        };

        let issuer = HttpIdentityClient::new(host, access_key)
            .context("failed to build identity client")?
            .with_api_version(config.service.identity_api_version.clone())
            .with_http_client(http);

        let client = builder
            .bootstrap(Arc::new(issuer))
            .await
            .context("failed to bootstrap chat identity")?;

        info!(host, user_id = ?client.user_id(), "chat session bootstrapped");
        Ok(Self {
            client,
            mode: CredentialMode::Bootstrapped,
        })
    }

    pub fn into_client(self) -> ChatClient {
        self.client
    }
}

fn attached_credential(config: &CredentialConfig) -> Result<Option<(String, DateTime<Utc>)>> {
    let Some(token) = config.token.as_deref().filter(|token| !token.is_empty()) else {
        return Ok(None);
    };

    let raw = config
        .expires_at
        .as_deref()
        .context("credential.expires_at is required when credential.token is set")?;
    let expires_at = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("credential.expires_at is not an RFC 3339 timestamp: {raw}"))?
        .with_timezone(&Utc);

    Ok(Some((token.to_string(), expires_at)))
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
