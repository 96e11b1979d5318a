use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::shared::constants::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SESSION_FILE};

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` until an endpoint URL is configured
    pub endpoint: Option<EndpointConfig>,
    pub poll: PollConfig,
    pub session: SessionConfig,
    pub download: DownloadConfig,
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
}

/// Remote file-record endpoint
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
}

/// Where the identity is persisted between runs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub dir: PathBuf,
}

impl Config {
    pub fn load(overrides: ConfigOverrides) -> Result<Self, String> {
        // Load .env file if exists, ignore if not found
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let endpoint_url = overrides
            .endpoint_url
            .or_else(|| env::var("FILEDROP_ENDPOINT_URL").ok());
        let endpoint = match endpoint_url {
            Some(url) => Some(EndpointConfig::from_env(url)?),
            None => None,
        };

        let mut session = SessionConfig::from_env();
        if let Some(path) = overrides.session_file {
            session.path = path;
        }

        let mut download = DownloadConfig::from_env();
        if let Some(dir) = overrides.download_dir {
            download.dir = dir;
        }

        Ok(Config {
            endpoint,
            poll: PollConfig::from_env()?,
            session,
            download,
        })
    }

    pub fn endpoint(&self) -> Result<&EndpointConfig, String> {
        self.endpoint.as_ref().ok_or_else(|| {
            "FILEDROP_ENDPOINT_URL must be set (or pass --endpoint)".to_string()
        })
    }
}

impl EndpointConfig {
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn from_env(url: String) -> Result<Self, String> {
        let request_timeout_secs = env::var("FILEDROP_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "FILEDROP_REQUEST_TIMEOUT_SECS must be a valid number".to_string())?;

        let user_agent = env::var("FILEDROP_USER_AGENT")
            .unwrap_or_else(|_| format!("filedrop-client/{}", env!("CARGO_PKG_VERSION")));

        Self::new(url, Duration::from_secs(request_timeout_secs), user_agent)
    }

    pub fn new(url: String, request_timeout: Duration, user_agent: String) -> Result<Self, String> {
        let url = url.trim().to_string();
        if url.is_empty() {
            return Err("Endpoint URL must not be empty".to_string());
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(format!("Endpoint URL must be http(s): {}", url));
        }

        Ok(Self {
            url,
            request_timeout,
            user_agent,
        })
    }
}

impl PollConfig {
    pub fn from_env() -> Result<Self, String> {
        let interval_secs = env::var("FILEDROP_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "FILEDROP_POLL_INTERVAL_SECS must be a valid number".to_string())?;

        if interval_secs == 0 {
            return Err("FILEDROP_POLL_INTERVAL_SECS must be greater than zero".to_string());
        }

        Ok(Self {
            interval: Duration::from_secs(interval_secs),
        })
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let path = env::var("FILEDROP_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE));

        Self { path }
    }
}

impl DownloadConfig {
    pub fn from_env() -> Self {
        let dir = env::var("FILEDROP_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("downloads"));

        Self { dir }
    }
}
