//! Runtime settings: built-in defaults, then an optional TOML file, then
//! environment variables.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::interface_adapters::stores::DEFAULT_STORAGE_KEY;
use crate::use_cases::DEFAULT_INVITATION_PARAM;

pub const CONFIG_PATH_VAR: &str = "GUEST_DIRECTORY_CONFIG";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";
const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60 * 8;

/// Which guest store the directory persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// JSON file under the data directory. Single process, offline friendly.
    Local,
    /// Shared PostgreSQL table with change notifications.
    Cloud,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "cloud" => Some(Self::Cloud),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub backend: BackendKind,
    pub database_url: Option<String>,
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub invitation_param: String,
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub session_ttl_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend: BackendKind::Local,
            database_url: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            invitation_param: DEFAULT_INVITATION_PARAM.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: None,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }
}

// Every key is optional; anything left out keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    port: Option<u16>,
    backend: Option<String>,
    database_url: Option<String>,
    data_dir: Option<PathBuf>,
    storage_key: Option<String>,
    invitation_param: Option<String>,
    admin_email: Option<String>,
    admin_password: Option<String>,
    session_ttl_seconds: Option<u64>,
}

#[derive(Debug)]
pub enum ConfigError {
    ReadFile { path: PathBuf, reason: String },
    ParseFile { path: PathBuf, reason: String },
    InvalidValue { key: &'static str, value: String },
    MissingDatabaseUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFile { path, reason } => {
                write!(f, "failed to read config file {}: {reason}", path.display())
            }
            ConfigError::ParseFile { path, reason } => {
                write!(f, "failed to parse config file {}: {reason}", path.display())
            }
            ConfigError::InvalidValue { key, value } => write!(f, "invalid {key}: {value:?}"),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL must be set when GUEST_BACKEND=cloud")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Settings {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                let path = PathBuf::from(path);
                let raw = std::fs::read_to_string(&path).map_err(|err| ConfigError::ReadFile {
                    path: path.clone(),
                    reason: err.to_string(),
                })?;
                Some((path, raw))
            }
            _ => None,
        };

        Self::from_sources(
            file.as_ref().map(|(path, raw)| (path.clone(), raw.as_str())),
            |key| std::env::var(key).ok(),
        )
    }

    /// Layers `file` and then `env` over the defaults. `env` is a lookup so
    /// tests can supply variables without touching the process environment.
    pub fn from_sources(
        file: Option<(PathBuf, &str)>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some((path, raw)) = file {
            let parsed: FileSettings = toml::from_str(raw).map_err(|err| ConfigError::ParseFile {
                path,
                reason: err.to_string(),
            })?;
            settings.apply_file(parsed)?;
        }
        settings.apply_env(env)?;

        if settings.backend == BackendKind::Cloud && settings.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(settings)
    }

    fn apply_file(&mut self, file: FileSettings) -> Result<(), ConfigError> {
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(backend) = file.backend {
            self.backend = parse_backend(&backend)?;
        }
        if let Some(url) = file.database_url {
            self.database_url = non_empty(url);
        }
        if let Some(dir) = file.data_dir {
            self.data_dir = dir;
        }
        if let Some(key) = file.storage_key.and_then(non_empty) {
            self.storage_key = key;
        }
        if let Some(param) = file.invitation_param.and_then(non_empty) {
            self.invitation_param = param;
        }
        if let Some(email) = file.admin_email.and_then(non_empty) {
            self.admin_email = email;
        }
        if let Some(password) = file.admin_password {
            self.admin_password = password_or_none(password);
        }
        if let Some(ttl) = file.session_ttl_seconds {
            self.session_ttl_seconds = ttl;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(port) = env("GUEST_DIRECTORY_PORT") {
            self.port = parse_number("GUEST_DIRECTORY_PORT", &port)?;
        }
        if let Some(backend) = env("GUEST_BACKEND") {
            self.backend = parse_backend(&backend)?;
        }
        if let Some(url) = env("DATABASE_URL") {
            self.database_url = non_empty(url);
        }
        if let Some(dir) = env("GUEST_DATA_DIR").and_then(non_empty) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = env("GUEST_STORAGE_KEY").and_then(non_empty) {
            self.storage_key = key;
        }
        if let Some(param) = env("INVITATION_PARAM").and_then(non_empty) {
            self.invitation_param = param;
        }
        if let Some(email) = env("ADMIN_EMAIL").and_then(non_empty) {
            self.admin_email = email;
        }
        if let Some(password) = env("ADMIN_PASSWORD") {
            self.admin_password = password_or_none(password);
        }
        if let Some(ttl) = env("ADMIN_SESSION_TTL_SECONDS") {
            self.session_ttl_seconds = parse_number("ADMIN_SESSION_TTL_SECONDS", &ttl)?;
        }
        Ok(())
    }
}

fn parse_backend(value: &str) -> Result<BackendKind, ConfigError> {
    BackendKind::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        key: "GUEST_BACKEND",
        value: value.to_string(),
    })
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Passwords are taken verbatim; only a blank one disables sign-in.
fn password_or_none(value: String) -> Option<String> {
    Some(value).filter(|password| !password.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn when_nothing_is_configured_then_defaults_apply() {
        let settings = Settings::from_sources(None, env_from(&[])).expect("expected settings");

        assert_eq!(settings.port, 3000);
        assert_eq!(settings.backend, BackendKind::Local);
        assert_eq!(settings.storage_key, "wedding_guests");
        assert_eq!(settings.invitation_param, "guest");
        assert!(settings.admin_password.is_none());
    }

    #[test]
    fn when_file_and_env_both_set_a_value_then_env_wins() {
        let file = r#"
            port = 4000
            invitation_param = "invite"
            admin_email = "file@example.com"
        "#;

        let settings = Settings::from_sources(
            Some((PathBuf::from("guests.toml"), file)),
            env_from(&[("GUEST_DIRECTORY_PORT", "5000")]),
        )
        .expect("expected settings");

        assert_eq!(settings.port, 5000);
        assert_eq!(settings.invitation_param, "invite");
        assert_eq!(settings.admin_email, "file@example.com");
    }

    #[test]
    fn when_cloud_backend_has_no_database_url_then_loading_fails() {
        let result = Settings::from_sources(None, env_from(&[("GUEST_BACKEND", "cloud")]));

        assert!(matches!(result, Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn when_cloud_backend_has_database_url_then_it_is_selected() {
        let settings = Settings::from_sources(
            None,
            env_from(&[
                ("GUEST_BACKEND", "Cloud"),
                ("DATABASE_URL", "postgres://localhost/guests"),
            ]),
        )
        .expect("expected settings");

        assert_eq!(settings.backend, BackendKind::Cloud);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/guests")
        );
    }

    #[test]
    fn when_backend_is_unknown_then_loading_fails() {
        let result = Settings::from_sources(None, env_from(&[("GUEST_BACKEND", "firebase")]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "GUEST_BACKEND", .. })
        ));
    }

    #[test]
    fn when_port_is_not_a_number_then_loading_fails() {
        let result = Settings::from_sources(None, env_from(&[("GUEST_DIRECTORY_PORT", "http")]));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "GUEST_DIRECTORY_PORT", .. })
        ));
    }

    #[test]
    fn when_admin_password_is_blank_then_login_stays_disabled() {
        let settings = Settings::from_sources(None, env_from(&[("ADMIN_PASSWORD", "   ")]))
            .expect("expected settings");

        assert!(settings.admin_password.is_none());
    }

    #[test]
    fn when_file_has_unknown_key_then_loading_fails() {
        let result = Settings::from_sources(
            Some((PathBuf::from("guests.toml"), "colour = \"blue\"")),
            env_from(&[]),
        );

        assert!(matches!(result, Err(ConfigError::ParseFile { .. })));
    }
}
