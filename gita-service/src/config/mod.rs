use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Default timeout for outbound Gemini calls, in seconds.
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct GitaConfig {
    pub http: HttpConfig,
    pub google: GoogleConfig,
    pub server: ServerConfig,
}

/// HTTP section, loaded through the `config` crate (`APP__PORT` etc.).
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Default)]
pub struct GoogleConfig {
    /// Provider credential. Never hard-coded; absent means the service
    /// runs in fallback-only mode.
    pub api_key: Option<String>,
    /// Timeout for outbound generateContent/list-models calls.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Directory the chat page assets are served from.
    pub static_dir: String,
}

impl GitaConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let http = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize::<HttpConfig>()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(GitaConfig {
            http,
            google: GoogleConfig {
                api_key: env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
                timeout_secs: get_env(
                    "GEMINI_TIMEOUT_SECS",
                    Some(&DEFAULT_GEMINI_TIMEOUT_SECS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS),
            },
            server: ServerConfig {
                static_dir: get_env("STATIC_DIR", Some("gita-service/static"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
