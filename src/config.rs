//! Configuration management for sfawesome.
//!
//! The config lives in `~/.sfawesome.yaml` (or wherever `SFAWESOME_CONFIG`
//! points) and is loaded once at startup into an immutable [`Config`]:
//!
//! ```yaml
//! salesforce:
//!   username: dev@example.com
//!   password: hunter2
//!   token: XXXXXXXX
//!   client_id: 3MVG9...
//!   client_secret: "1234"
//! defaults:
//!   owner: alice
//!   priority: Medium
//! valid:
//!   statuses: [New, Open, Closed]
//! strict_validation: false
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Config file name within the home directory.
pub const CONFIG_FILE_NAME: &str = ".sfawesome.yaml";

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "SFAWESOME_CONFIG";

/// Login host used when none is configured.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";

/// REST API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "59.0";

/// Login details for the remote service.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account user name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Security token appended to the password at login.
    #[serde(default)]
    pub token: String,
    /// Connected app consumer key.
    pub client_id: String,
    /// Connected app consumer secret.
    #[serde(default)]
    pub client_secret: String,
    /// Login host.
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// REST API version, e.g. `59.0`.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            token: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            login_url: default_login_url(),
            api_version: default_api_version(),
        }
    }
}

impl Credentials {
    /// The password as the login endpoint expects it (password followed by token).
    #[must_use]
    pub fn password_with_token(&self) -> String {
        format!("{}{}", self.password, self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("login_url", &self.login_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Values applied to new cases when the matching option is not given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDefaults {
    /// Default developer.
    #[serde(default)]
    pub owner: Option<String>,
    /// Default case type.
    #[serde(default, rename = "type")]
    pub case_type: Option<String>,
    /// Default status.
    #[serde(default)]
    pub status: Option<String>,
    /// Default priority.
    #[serde(default)]
    pub priority: Option<String>,
}

/// Allowed values per field. An empty list allows anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidValues {
    /// Allowed owners.
    #[serde(default)]
    pub owners: Vec<String>,
    /// Allowed statuses.
    #[serde(default)]
    pub statuses: Vec<String>,
    /// Allowed case types.
    #[serde(default)]
    pub types: Vec<String>,
    /// Allowed releases.
    #[serde(default)]
    pub releases: Vec<String>,
    /// Allowed priorities.
    #[serde(default)]
    pub priorities: Vec<String>,
}

impl ValidValues {
    fn list_for(&self, field: &str) -> &[String] {
        match field {
            "owner" => &self.owners,
            "status" => &self.statuses,
            "type" => &self.types,
            "release" => &self.releases,
            "priority" => &self.priorities,
            _ => &[],
        }
    }

    /// Check `value` against the list for `field`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFieldValue`] if the list is non-empty and does
    /// not contain `value`.
    pub fn check(&self, field: &'static str, value: &str) -> Result<()> {
        let allowed = self.list_for(field);
        if allowed.is_empty() || allowed.iter().any(|v| v == value) {
            Ok(())
        } else {
            Err(Error::InvalidFieldValue { field, value: value.to_string() })
        }
    }
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Remote service credentials.
    pub salesforce: Credentials,

    /// Defaults for new cases.
    #[serde(default)]
    pub defaults: FieldDefaults,

    /// Allowed values, enforced only with `strict_validation`.
    #[serde(default)]
    pub valid: ValidValues,

    /// Reject create/update values that are not in `valid`.
    #[serde(default)]
    pub strict_validation: bool,

    /// Name appended to notes. Defaults to the home directory's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Pager command for list output. Defaults to `$PAGER`, then `less -R`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pager: Option<String>,
}

impl Config {
    /// Parse a config from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid config YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load config from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be determined, the file is
    /// missing, or it cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load config from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist, or a
    /// parse error if it is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), user = %config.salesforce.username, "loaded config");
        Ok(config)
    }

    /// Where the config is read from: `$SFAWESOME_CONFIG`, else `~/.sfawesome.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the variable nor a home directory is available.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))
    }

    /// Check a create/update value when strict validation is on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFieldValue`] for a value outside the configured list.
    pub fn validate(&self, field: &'static str, value: &str) -> Result<()> {
        if self.strict_validation {
            self.valid.check(field, value)
        } else {
            Ok(())
        }
    }

    /// Name to sign notes with.
    #[must_use]
    pub fn signature(&self) -> Option<String> {
        self.signature
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| dirs::home_dir().as_deref().and_then(signature_from_home))
    }
}

/// Capitalized last component of a home directory path.
#[must_use]
pub fn signature_from_home(home: &Path) -> Option<String> {
    let name = home.file_name()?.to_str()?;
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const SAMPLE: &str = "
salesforce:
  username: dev@example.com
  password: pw
  token: TOK
  client_id: cid
defaults:
  owner: alice
  type: Problem
valid:
  statuses: [New, Closed]
strict_validation: true
";

    #[test]
    fn test_parse_sample() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.salesforce.username, "dev@example.com");
        assert_eq!(config.salesforce.password_with_token(), "pwTOK");
        assert_eq!(config.salesforce.login_url, DEFAULT_LOGIN_URL);
        assert_eq!(config.salesforce.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.defaults.owner.as_deref(), Some("alice"));
        assert_eq!(config.defaults.case_type.as_deref(), Some("Problem"));
        assert!(config.strict_validation);
        assert_eq!(config.valid.statuses, vec!["New", "Closed"]);
    }

    #[test]
    fn test_missing_credentials_is_error() {
        assert!(Config::from_yaml("defaults: {}\n").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let debug = format!("{:?}", config.salesforce);
        assert!(debug.contains("dev@example.com"));
        assert!(!debug.contains("TOK"));
        assert!(!debug.contains("\"pw\""));
    }

    #[test]
    fn test_validate_strict() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert!(config.validate("status", "New").is_ok());
        let err = config.validate("status", "Bogus").unwrap_err();
        assert!(matches!(err, Error::InvalidFieldValue { field: "status", .. }));
        // No list configured for owners, so anything goes.
        assert!(config.validate("owner", "anyone").is_ok());
    }

    #[test]
    fn test_validate_lenient_by_default() {
        let mut config = Config::from_yaml(SAMPLE).unwrap();
        config.strict_validation = false;
        assert!(config.validate("status", "Bogus").is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.salesforce.client_id, "cid");
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.yaml");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(p) if p == path));
    }

    #[test]
    #[serial]
    fn test_default_path_env_override() {
        std::env::set_var(CONFIG_ENV_VAR, "/tmp/custom-sfawesome.yaml");
        let path = Config::default_path().unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);
        assert_eq!(path, PathBuf::from("/tmp/custom-sfawesome.yaml"));
    }

    #[test]
    #[serial]
    fn test_default_path_in_home() {
        std::env::remove_var(CONFIG_ENV_VAR);
        if let Ok(path) = Config::default_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_signature_from_home() {
        assert_eq!(signature_from_home(Path::new("/home/evan")).as_deref(), Some("Evan"));
        assert_eq!(signature_from_home(Path::new("/")), None);
    }

    #[test]
    fn test_configured_signature_wins() {
        let config = Config { signature: Some("QA Team".to_string()), ..Config::default() };
        assert_eq!(config.signature().as_deref(), Some("QA Team"));
    }
}
