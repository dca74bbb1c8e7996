use std::fmt;
use std::path::{Path, PathBuf};

pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const OMDB_API_KEY_VAR: &str = "OMDB_API_KEY";
pub const OMDB_BASE_URL_VAR: &str = "OMDB_BASE_URL";
pub const LOG_DIR_VAR: &str = "LOG_DIR";

pub const DEFAULT_OMDB_BASE_URL: &str = "http://www.omdbapi.com";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is absent or empty.
    Missing(&'static str),
    /// A variable is present but malformed.
    Invalid { var: &'static str, reason: String },
    /// The `.env` file exists but could not be read or parsed.
    DotEnv { path: PathBuf, source: dotenvy::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "required environment variable {} is not set", var),
            Self::Invalid { var, reason } => write!(f, "invalid value for {}: {}", var, reason),
            Self::DotEnv { path, source } => {
                write!(f, "failed to load env file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DotEnv { source, .. } => Some(source),
            Self::Missing(_) | Self::Invalid { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub omdb_api_key: String,
    /// OMDb endpoint, without the trailing query string.
    pub omdb_base_url: String,
    /// Directory holding bot.log.
    pub log_dir: PathBuf,
}

impl Config {
    /// Read the process environment. Call [`load_dotenv`] first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_token = required(&lookup, TELEGRAM_TOKEN_VAR)?;
        let omdb_api_key = required(&lookup, OMDB_API_KEY_VAR)?;

        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Invalid {
                var: TELEGRAM_TOKEN_VAR,
                reason: "expected format 123456789:ABCdefGHI...".into(),
            });
        }

        let omdb_base_url = optional(&lookup, OMDB_BASE_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_OMDB_BASE_URL.to_string());
        if !omdb_base_url.starts_with("http://") && !omdb_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: OMDB_BASE_URL_VAR,
                reason: format!("'{}' is not an http(s) URL", omdb_base_url),
            });
        }

        let log_dir = log_dir_from(&lookup);

        Ok(Self {
            telegram_token,
            omdb_api_key,
            omdb_base_url,
            log_dir,
        })
    }
}

/// Log directory, resolved on its own so logging can start before the rest of the config is validated.
pub fn log_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    optional(&lookup, LOG_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Values already present in the environment win over the file.
/// A missing file is fine; an unreadable or malformed one is an error.
pub fn load_dotenv<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::DotEnv { path: path.to_path_buf(), source: e }),
    }
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, var).ok_or(ConfigError::Missing(var))
}

fn optional<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
