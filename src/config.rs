//! Endpoint and credential configuration.
//!
//! A [`Config`] is required to build a [`BaseClient`](crate::client::BaseClient), so a
//! missing URL or token is reported before any request can be made.

use std::path::Path;

use reqwest::Url;
use serde::Deserialize;

/// Environment variable holding the API base URL, e.g. `https://demo.dataverse.org/api`.
pub const API_URL_VAR: &str = "API_URL";

/// Environment variable holding the API token.
pub const API_TOKEN_VAR: &str = "API_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Set environment variables '{API_URL_VAR}' and '{API_TOKEN_VAR}' ({0} is missing)")]
    Missing(String),

    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where to reach the Dataverse API and how to authenticate against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    api_url: Url,
    api_token: String,
}

#[derive(Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    api_token: Option<String>,
}

impl Config {
    pub fn new(api_url: &str, api_token: &str) -> Result<Self, ConfigError> {
        if api_url.trim().is_empty() {
            return Err(ConfigError::Missing(API_URL_VAR.to_string()));
        }
        if api_token.trim().is_empty() {
            return Err(ConfigError::Missing(API_TOKEN_VAR.to_string()));
        }

        // The base URL is treated as a directory so that relative resource
        // paths are appended instead of replacing the last segment.
        let normalized = format!("{}/", api_url.trim().trim_end_matches('/'));
        let api_url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;

        if api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: api_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            api_url,
            api_token: api_token.trim().to_string(),
        })
    }

    /// Reads `API_URL` and `API_TOKEN` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let api_url = read_var(&lookup, API_URL_VAR)?;
        let api_token = read_var(&lookup, API_TOKEN_VAR)?;
        Self::new(&api_url, &api_token)
    }

    /// Reads `api_url` and `api_token` from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content)?;

        let api_url = file
            .api_url
            .ok_or_else(|| ConfigError::Missing(API_URL_VAR.to_string()))?;
        let api_token = file
            .api_token
            .ok_or_else(|| ConfigError::Missing(API_TOKEN_VAR.to_string()))?;

        Self::new(&api_url, &api_token)
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

fn read_var<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_new_normalizes_trailing_slash() {
        let with = Config::new("https://demo.dataverse.org/api/", "token").unwrap();
        let without = Config::new("https://demo.dataverse.org/api", "token").unwrap();

        assert_eq!(with, without);
        assert_eq!(with.api_url().as_str(), "https://demo.dataverse.org/api/");
        assert_eq!(
            with.api_url().join("datasets/1").unwrap().as_str(),
            "https://demo.dataverse.org/api/datasets/1"
        );
    }

    #[test]
    fn test_new_rejects_missing_values() {
        assert!(matches!(
            Config::new("", "token"),
            Err(ConfigError::Missing(var)) if var == API_URL_VAR
        ));
        assert!(matches!(
            Config::new("https://demo.dataverse.org/api", "  "),
            Err(ConfigError::Missing(var)) if var == API_TOKEN_VAR
        ));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = Config::new("not a url", "token");
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_from_vars() {
        let config = Config::from_vars(vars(&[
            (API_URL_VAR, "https://demo.dataverse.org/api"),
            (API_TOKEN_VAR, "secret"),
        ]))
        .expect("Could not build config");

        assert_eq!(config.api_token(), "secret");
        assert_eq!(config.api_url().as_str(), "https://demo.dataverse.org/api/");
    }

    #[test]
    fn test_from_vars_missing_or_blank() {
        let result = Config::from_vars(vars(&[(API_TOKEN_VAR, "secret")]));
        assert!(matches!(result, Err(ConfigError::Missing(var)) if var == API_URL_VAR));

        let result = Config::from_vars(vars(&[
            (API_URL_VAR, "https://demo.dataverse.org/api"),
            (API_TOKEN_VAR, "   "),
        ]));
        assert!(matches!(result, Err(ConfigError::Missing(var)) if var == API_TOKEN_VAR));

        let err = Config::from_vars(vars(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Set environment variables 'API_URL' and 'API_TOKEN' (API_URL is missing)"
        );
    }

    #[test]
    fn test_from_env() {
        // The only test that touches these variables
        std::env::set_var(API_URL_VAR, "https://demo.dataverse.org/api");
        std::env::set_var(API_TOKEN_VAR, "from-env");

        let config = Config::from_env().expect("Could not read environment");

        std::env::remove_var(API_URL_VAR);
        std::env::remove_var(API_TOKEN_VAR);

        assert_eq!(config.api_token(), "from-env");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing(var)) if var == API_URL_VAR
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("Could not create temp file");
        writeln!(file, "api_url = \"https://demo.dataverse.org/api\"").unwrap();
        writeln!(file, "api_token = \"secret\"").unwrap();

        let config = Config::from_file(file.path()).expect("Could not read config");

        assert_eq!(config.api_token(), "secret");
        assert_eq!(config.api_url().as_str(), "https://demo.dataverse.org/api/");
    }

    #[test]
    fn test_from_file_missing_token() {
        let mut file = tempfile::NamedTempFile::new().expect("Could not create temp file");
        writeln!(file, "api_url = \"https://demo.dataverse.org/api\"").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Missing(var)) if var == API_TOKEN_VAR));
    }
}
