use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "courier.toml",
    "config/courier.toml",
    "crates/config/courier.toml",
    "../courier.toml",
    "../config/courier.toml",
];

pub const DEFAULT_CHAT_API_VERSION: &str = "2021-09-07";
pub const DEFAULT_IDENTITY_API_VERSION: &str = "2023-10-01";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourierConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub credential: CredentialConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Location of the communication resource and the API versions spoken to it.
///
/// ```
/// use courier_config::ServiceConfig;
///
/// let service = ServiceConfig::default();
/// assert_eq!(service.chat_api_version, "2021-09-07");
/// assert_eq!(service.identity_api_version, "2023-10-01");
/// assert!(service.access_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default = "ServiceConfig::default_chat_api_version")]
    pub chat_api_version: String,
    #[serde(default = "ServiceConfig::default_identity_api_version")]
    pub identity_api_version: String,
}

impl ServiceConfig {
    fn default_chat_api_version() -> String {
        DEFAULT_CHAT_API_VERSION.to_string()
    }

    fn default_identity_api_version() -> String {
        DEFAULT_IDENTITY_API_VERSION.to_string()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            access_key: None,
            chat_api_version: Self::default_chat_api_version(),
            identity_api_version: Self::default_identity_api_version(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "HttpConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "HttpConfig::default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    const fn default_request_timeout() -> u64 {
        30
    }

    fn default_user_agent() -> String {
        "courier-chat".to_string()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: Self::default_request_timeout(),
            user_agent: Self::default_user_agent(),
        }
    }
}

/// A pre-minted bearer token. When both fields are present the client attaches
/// to it instead of bootstrapping a new identity.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CredentialConfig {
    pub token: Option<String>,
    /// RFC 3339 timestamp.
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "TelemetryConfig::default_filter")]
    pub filter: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl TelemetryConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
            log_file: None,
        }
    }
}

/// Load the client configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use courier_config::load;
///
/// std::env::remove_var("COURIER_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.service.chat_api_version.is_empty());
/// ```
pub fn load() -> anyhow::Result<CourierConfig> {
    let defaults = CourierConfig::default();

    let request_timeout =
        i64::try_from(defaults.http.request_timeout_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("service.host", defaults.service.host.clone())?
        .set_default(
            "service.chat_api_version",
            defaults.service.chat_api_version.clone(),
        )?
        .set_default(
            "service.identity_api_version",
            defaults.service.identity_api_version.clone(),
        )?
        .set_default("http.request_timeout_seconds", request_timeout)?
        .set_default("http.user_agent", defaults.http.user_agent.clone())?
        .set_default("telemetry.filter", defaults.telemetry.filter.clone())?;

    let environment_overrides = config::Environment::with_prefix("COURIER").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("COURIER_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via COURIER_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<CourierConfig>()
        .context("invalid configuration")?;

    debug!(
        host = %config.service.host,
        access_key = config.service.access_key.is_some(),
        attached_token = config.credential.token.is_some(),
        "loaded client configuration"
    );
    Ok(config)
}
