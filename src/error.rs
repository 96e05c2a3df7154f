//! Error types for the contact book bot.

use std::num::ParseIntError;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Chat transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    #[error("Failed to edit message {message_id}: {reason}")]
    EditFailed { message_id: i64, reason: String },

    #[error("Failed to delete message {message_id}: {reason}")]
    DeleteFailed { message_id: i64, reason: String },

    #[error("Failed to answer callback {callback_id}: {reason}")]
    AnswerFailed { callback_id: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Dispatcher-level errors: bad user input or unroutable events.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid contact id: {0}")]
    InvalidContactId(#[from] ParseIntError),

    #[error("Invalid birthday {input:?}, expected dd.mm")]
    InvalidBirthday { input: String },

    #[error("No callback handler for action {0:?}")]
    UnknownAction(String),

    #[error("No contact is selected")]
    NoContactSelected,
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
