//! Configuration loader
//!
//! Layers, lowest precedence first: built-in defaults, the JSON config file,
//! `VOKETAG_*` environment variables, explicit overrides from the CLI.

use crate::config::{Config, Endpoints, HttpSettings, PollingSettings};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use voketag_core::{
    Error, Result, DEFAULT_ADMIN_API, DEFAULT_FACTORY_API, DEFAULT_SCAN_API, DEFAULT_VERIFY_URL,
    VOKETAG_ADMIN_API_VAR, VOKETAG_FACTORY_API_VAR, VOKETAG_HTTP_TIMEOUT_MS_VAR,
    VOKETAG_POLL_INTERVAL_MS_VAR, VOKETAG_POLL_MAX_ATTEMPTS_VAR, VOKETAG_SCAN_API_VAR,
    VOKETAG_SESSION_FILE_VAR, VOKETAG_VERIFY_URL_VAR,
};
use voketag_utils::XdgPaths;

/// On-disk shape of `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub admin_api: Option<String>,
    pub factory_api: Option<String>,
    pub scan_api: Option<String>,
    pub verify_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub poll_max_attempts: Option<u32>,
    pub http_timeout_ms: Option<u64>,
    pub session_file: Option<PathBuf>,
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub admin_api: Option<String>,
    pub factory_api: Option<String>,
    pub scan_api: Option<String>,
}

/// Configuration loader that merges all layers into a [`Config`]
pub struct ConfigLoader {
    /// Explicit config file; when unset the XDG default is read if it exists
    file: Option<PathBuf>,
    /// Environment snapshot; `None` reads the process environment
    env: Option<HashMap<String, String>>,
    overrides: Overrides,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            file: None,
            env: None,
            overrides: Overrides::default(),
        }
    }

    /// Read this file instead of the XDG default. A missing explicit file is an error.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Use this environment instead of the process environment
    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Apply command-line overrides
    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load the configuration
    pub fn load(self) -> Result<Config> {
        let file = match &self.file {
            Some(path) => read_config_file(path)?,
            None => {
                let default_path = XdgPaths::config_file();
                if default_path.exists() {
                    read_config_file(&default_path)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let env = self
            .env
            .unwrap_or_else(|| std::env::vars().collect::<HashMap<_, _>>());
        let env_str = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).cloned();

        let pick = |cli: &Option<String>, var: &str, file: &Option<String>, default: &str| {
            cli.clone()
                .or_else(|| env_str(var))
                .or_else(|| file.clone())
                .unwrap_or_else(|| default.to_string())
        };

        let endpoints = Endpoints {
            admin_api: parse_url(
                "admin_api",
                &pick(&self.overrides.admin_api, VOKETAG_ADMIN_API_VAR, &file.admin_api, DEFAULT_ADMIN_API),
            )?,
            factory_api: parse_url(
                "factory_api",
                &pick(&self.overrides.factory_api, VOKETAG_FACTORY_API_VAR, &file.factory_api, DEFAULT_FACTORY_API),
            )?,
            scan_api: parse_url(
                "scan_api",
                &pick(&self.overrides.scan_api, VOKETAG_SCAN_API_VAR, &file.scan_api, DEFAULT_SCAN_API),
            )?,
            verify_url: parse_url(
                "verify_url",
                &pick(&None, VOKETAG_VERIFY_URL_VAR, &file.verify_url, DEFAULT_VERIFY_URL),
            )?,
        };

        let mut polling = PollingSettings::default();
        if let Some(ms) = parse_env_number::<u64>(&env_str(VOKETAG_POLL_INTERVAL_MS_VAR), VOKETAG_POLL_INTERVAL_MS_VAR)?
            .or(file.poll_interval_ms)
        {
            polling.interval = Duration::from_millis(ms);
        }
        if let Some(n) = parse_env_number::<u32>(&env_str(VOKETAG_POLL_MAX_ATTEMPTS_VAR), VOKETAG_POLL_MAX_ATTEMPTS_VAR)?
            .or(file.poll_max_attempts)
        {
            if n == 0 {
                return Err(Error::configuration("poll_max_attempts must be at least 1"));
            }
            polling.max_attempts = n;
        }

        let mut http = HttpSettings::default();
        if let Some(ms) = parse_env_number::<u64>(&env_str(VOKETAG_HTTP_TIMEOUT_MS_VAR), VOKETAG_HTTP_TIMEOUT_MS_VAR)?
            .or(file.http_timeout_ms)
        {
            http.timeout = Duration::from_millis(ms);
        }

        let session_file = env_str(VOKETAG_SESSION_FILE_VAR)
            .map(PathBuf::from)
            .or(file.session_file)
            .unwrap_or_else(XdgPaths::session_file);

        tracing::debug!(
            admin_api = %endpoints.admin_api,
            factory_api = %endpoints.factory_api,
            scan_api = %endpoints.scan_api,
            "configuration loaded"
        );

        Ok(Config {
            endpoints,
            polling,
            http,
            session_file,
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content =
        std::fs::read_to_string(path).map_err(|e| Error::file_system(path, "read config", e))?;
    serde_json::from_str(&content).map_err(|e| {
        Error::configuration(format!("invalid config file '{}': {e}", path.display()))
    })
}

fn parse_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| Error::configuration(format!("{field}: invalid URL '{value}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::configuration(format!(
            "{field}: unsupported scheme '{other}'"
        ))),
    }
}

fn parse_env_number<T: std::str::FromStr>(value: &Option<String>, var: &str) -> Result<Option<T>> {
    value
        .as_deref()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| Error::configuration(format!("{var} must be a number, got '{v}'")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn empty_file() -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{{}}").unwrap();
        f
    }

    #[test]
    fn test_defaults() {
        let file = empty_file();
        let config = ConfigLoader::new()
            .file(file.path())
            .env(HashMap::new())
            .load()
            .unwrap();

        assert_eq!(config.endpoints.admin_api.as_str(), "http://127.0.0.1:8082/");
        assert_eq!(config.endpoints.factory_api.as_str(), "http://localhost:8081/v1");
        assert_eq!(config.polling, PollingSettings::default());
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"admin_api": "http://file:1", "scan_api": "http://file:3", "poll_interval_ms": 10}}"#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .file(file.path())
            .env(env(&[
                (VOKETAG_ADMIN_API_VAR, "http://env:1"),
                (VOKETAG_POLL_INTERVAL_MS_VAR, "20"),
            ]))
            .overrides(Overrides {
                admin_api: Some("http://cli:1".into()),
                ..Default::default()
            })
            .load()
            .unwrap();

        assert_eq!(config.endpoints.admin_api.as_str(), "http://cli:1/");
        assert_eq!(config.endpoints.scan_api.as_str(), "http://file:3/");
        assert_eq!(config.polling.interval, Duration::from_millis(20));
    }

    #[test]
    fn test_rejects_bad_url_and_numbers() {
        let file = empty_file();
        let err = ConfigLoader::new()
            .file(file.path())
            .env(env(&[(VOKETAG_SCAN_API_VAR, "ftp://nope")]))
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));

        let err = ConfigLoader::new()
            .file(file.path())
            .env(env(&[(VOKETAG_POLL_MAX_ATTEMPTS_VAR, "lots")]))
            .load()
            .unwrap_err();
        assert!(err.to_string().contains(VOKETAG_POLL_MAX_ATTEMPTS_VAR));
    }

    #[test]
    fn test_unknown_file_keys_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"admin_url": "http://typo"}}"#).unwrap();
        let err = ConfigLoader::new()
            .file(file.path())
            .env(HashMap::new())
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::new()
            .file("/definitely/not/here.json")
            .env(HashMap::new())
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }
}
