//! Configuration — read from environment variables.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

const DEFAULT_DB_PATH: &str = "./data/contacts.db";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token.
    pub bot_token: SecretString,
    /// Path to the local libSQL database file.
    pub db_path: PathBuf,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl BotConfig {
    /// Read configuration from `TELEGRAM_BOT_TOKEN`,
    /// `CONTACT_BOT_DB_PATH`, and `CONTACT_BOT_POLL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::build(
            std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            std::env::var("CONTACT_BOT_DB_PATH").ok(),
            std::env::var("CONTACT_BOT_POLL_TIMEOUT_SECS").ok(),
        )
    }

    fn build(
        token: Option<String>,
        db_path: Option<String>,
        poll_timeout: Option<String>,
    ) -> Result<Self, ConfigError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()))?;

        let poll_timeout_secs = match poll_timeout {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CONTACT_BOT_POLL_TIMEOUT_SECS".to_string(),
                message: format!("{raw:?} is not a number of seconds"),
            })?,
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        Ok(Self {
            bot_token: SecretString::from(token),
            db_path: PathBuf::from(db_path.unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            poll_timeout_secs,
        })
    }
}
