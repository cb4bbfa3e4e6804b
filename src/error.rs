//! Error types for `sfawesome`.

use std::path::PathBuf;

/// Errors that can occur while resolving, building, or executing a command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two distinct primary commands were given.
    #[error("--{first} and --{second} were given as arguments. Only use one.")]
    ConflictingCommand {
        /// The primary command seen first.
        first: &'static str,
        /// The primary command that conflicted with it.
        second: &'static str,
    },

    /// No primary command was given and defaulting is disabled.
    #[error("There were no commands given.")]
    NoCommand,

    /// A command that targets a single case was given no case number.
    #[error("--{command} requires a case number")]
    MissingCaseNumber {
        /// The primary command that needed it.
        command: &'static str,
    },

    /// A case number resolved to zero records.
    #[error("Case {0} does not exist")]
    CaseNotFound(String),

    /// An option name outside the known primary and modifier sets.
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// An option that needs a non-empty value was given an empty one.
    #[error("--{option} requires a value")]
    MissingValue {
        /// The option missing its value.
        option: &'static str,
    },

    /// A request whose payload does not belong to its command.
    #[error("--{0} was given data it cannot use")]
    MismatchedPayload(&'static str),

    /// An order-by key that is neither a known alias nor a plain field name.
    #[error("Cannot order by '{0}': not a field name")]
    InvalidOrderKey(String),

    /// A field value not present in the configured list of valid values.
    #[error("{value} is not a valid {field}")]
    InvalidFieldValue {
        /// User-facing field key (owner, status, ...).
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The remote record service rejected or failed a request.
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// The configuration could not be located or is incomplete.
    #[error("Config error: {0}")]
    Config(String),

    /// The configuration file does not exist.
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
