/*
 * Responsibility
 * - 環境変数の読み込み (Authorizer / Passthrough / HTTP サーバ)
 * - 設定値のバリデーション (必須値が無ければ起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_LITELLM_URL: &str = "http://localhost:4000";
pub const DEFAULT_ADMIN_PATH_PREFIX: &str = "/models";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        tracing::error!(error = %e, "configuration error");
        AppError::Internal
    }
}

/// Settings consumed by the request authorizer.
#[derive(Debug, Clone)]
pub struct AuthorizerConfig {
    pub client_id: String,
    pub authority: String,
    pub admin_group: String,
    // dot-separated path into the claims, e.g. `cognito:groups` or `realm_access.roles`
    pub jwt_groups_prop: String,
    pub admin_path_prefixes: Vec<String>,
    pub oidc_timeout: Duration,
    pub jwks_cache_ttl: Duration,
    pub leeway_seconds: u64,
    pub ssl_cert_file: Option<PathBuf>,
}

impl AuthorizerConfig {
    pub fn new(client_id: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            authority: authority.into(),
            admin_group: String::new(),
            jwt_groups_prop: String::new(),
            admin_path_prefixes: vec![DEFAULT_ADMIN_PATH_PREFIX.to_string()],
            oidc_timeout: Duration::from_secs(120),
            jwks_cache_ttl: Duration::from_secs(360),
            leeway_seconds: 0,
            ssl_cert_file: None,
        }
    }

    pub fn with_admin_group(
        mut self,
        admin_group: impl Into<String>,
        jwt_groups_prop: impl Into<String>,
    ) -> Self {
        self.admin_group = admin_group.into();
        self.jwt_groups_prop = jwt_groups_prop.into();
        self
    }
}

/// Settings for the model-serving passthrough.
#[derive(Clone)]
pub struct PassthroughConfig {
    pub base_url: String,
    // service credential injected as `Authorization: Bearer <key>`
    pub litellm_key: String,
}

impl fmt::Debug for PassthroughConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the service credential
        f.debug_struct("PassthroughConfig")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    pub authorizer: AuthorizerConfig,
    pub passthrough: PassthroughConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port =
            u16::try_from(env_u64("PORT", 3000)?).map_err(|_| ConfigError::Invalid("PORT"))?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins =
            split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let request_timeout = Duration::from_secs(env_u64("REQUEST_TIMEOUT_SECONDS", 300)?);

        let client_id =
            std::env::var("CLIENT_ID").map_err(|_| ConfigError::Missing("CLIENT_ID"))?;
        let authority =
            std::env::var("AUTHORITY").map_err(|_| ConfigError::Missing("AUTHORITY"))?;
        url::Url::parse(&authority).map_err(|_| ConfigError::Invalid("AUTHORITY"))?;

        let admin_group = std::env::var("ADMIN_GROUP").unwrap_or_default();
        let jwt_groups_prop = std::env::var("JWT_GROUPS_PROP").unwrap_or_default();

        let admin_path_prefixes = match std::env::var("ADMIN_PATH_PREFIXES") {
            Ok(v) => split_list(&v),
            Err(_) => vec![DEFAULT_ADMIN_PATH_PREFIX.to_string()],
        };

        let ssl_cert_file = std::env::var("SSL_CERT_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let authorizer = AuthorizerConfig {
            client_id,
            authority,
            admin_group,
            jwt_groups_prop,
            admin_path_prefixes,
            oidc_timeout: Duration::from_secs(env_u64("OIDC_TIMEOUT_SECONDS", 120)?),
            jwks_cache_ttl: Duration::from_secs(env_u64("JWKS_CACHE_TTL_SECONDS", 360)?), // 6 min
            leeway_seconds: env_u64("JWT_LEEWAY_SECONDS", 0)?,
            ssl_cert_file,
        };

        let litellm_key =
            std::env::var("LITELLM_KEY").map_err(|_| ConfigError::Missing("LITELLM_KEY"))?;
        let base_url = std::env::var("LITELLM_URL")
            .unwrap_or_else(|_| DEFAULT_LITELLM_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url).map_err(|_| ConfigError::Invalid("LITELLM_URL"))?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            authorizer,
            passthrough: PassthroughConfig {
                base_url,
                litellm_key,
            },
        })
    }
}

fn env_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    parse_u64(key, std::env::var(key).ok(), default)
}

// Unset or blank falls back to `default`; anything else must parse.
fn parse_u64(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v.parse::<u64>().map_err(|_| ConfigError::Invalid(key)),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
