//! Configuration for the capability environment.
//!
//! Sources, later ones win: built-in defaults, an optional file, then `LATVIS__*`
//! environment variables (`LATVIS__QUEUE_NAME=tiles`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ports::LATVIS_OUTPUT_KIND;

const ENV_PREFIX: &str = "LATVIS";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatastoreConfig {
    #[default]
    Memory,
    Fs { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Namespace constant for stored blobs.
    #[serde(default = "default_blob_kind")]
    pub blob_kind: String,

    /// Target queue for `TaskQueue::enqueue`; empty means the backend default.
    #[serde(default)]
    pub queue_name: String,

    /// Base for relative enqueue targets such as `/render`.
    #[serde(default)]
    pub task_base_url: Option<String>,

    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,

    #[serde(default = "default_identity_header")]
    pub identity_header: String,

    /// Upper bound on every request's lifetime.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub datastore: DatastoreConfig,
}

fn default_blob_kind() -> String {
    LATVIS_OUTPUT_KIND.to_string()
}

fn default_request_id_header() -> String {
    "x-request-id".to_string()
}

fn default_identity_header() -> String {
    "x-latvis-user".to_string()
}

fn default_user_agent() -> String {
    concat!("latvis/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            blob_kind: default_blob_kind(),
            queue_name: String::new(),
            task_base_url: None,
            request_id_header: default_request_id_header(),
            identity_header: default_identity_header(),
            request_timeout_ms: None,
            user_agent: default_user_agent(),
            datastore: DatastoreConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Defaults, then `path` (any format the `config` crate knows) if given, then env.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// `load`, reading `LATVIS__*` from `env` instead of the process environment
    /// when it is given.
    pub fn load_with_env(
        path: Option<&str>,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(raw, ::config::FileFormat::Toml))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blob_kind.trim().is_empty() {
            return Err(ConfigError::Invalid("blob_kind cannot be empty".to_string()));
        }
        for (field, header) in [
            ("request_id_header", &self.request_id_header),
            ("identity_header", &self.identity_header),
        ] {
            if http::HeaderName::from_bytes(header.as_bytes()).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "{field} '{header}' is not a valid header name"
                )));
            }
        }
        self.task_base_url()?;
        if let DatastoreConfig::Fs { root } = &self.datastore
            && root.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "datastore.root is required for fs backend".to_string(),
            ));
        }
        Ok(())
    }

    pub fn task_base_url(&self) -> Result<Option<url::Url>, ConfigError> {
        self.task_base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                url::Url::parse(value).map_err(|e| {
                    ConfigError::Invalid(format!("task_base_url '{value}': {e}"))
                })
            })
            .transpose()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_source_gives_defaults() {
        let config = EnvironmentConfig::from_toml_str("").unwrap();
        assert_eq!(config, EnvironmentConfig::default());
        assert_eq!(config.blob_kind, "latvis-output");
        assert_eq!(config.datastore, DatastoreConfig::Memory);
    }

    #[test]
    fn file_values_override_defaults() {
        let config = EnvironmentConfig::from_toml_str(
            r#"
            queue_name = "tiles"
            task_base_url = "http://localhost:8080/"
            request_timeout_ms = 30000

            [datastore]
            backend = "fs"
            root = "/var/lib/latvis"
            "#,
        )
        .unwrap();

        assert_eq!(config.queue_name, "tiles");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(
            config.datastore,
            DatastoreConfig::Fs {
                root: PathBuf::from("/var/lib/latvis")
            }
        );
        assert_eq!(
            config.task_base_url().unwrap().unwrap().as_str(),
            "http://localhost:8080/"
        );
    }

    fn env(vars: &[(&str, &str)]) -> ::config::Map<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn env_vars_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latvis.toml");
        std::fs::write(&path, "queue_name = \"from-file\"\nrequest_timeout_ms = 30000\n").unwrap();

        let config = EnvironmentConfig::load_with_env(
            path.to_str(),
            Some(env(&[
                ("LATVIS__QUEUE_NAME", "tiles"),
                ("LATVIS__REQUEST_TIMEOUT_MS", "250"),
                ("LATVIS__DATASTORE__BACKEND", "fs"),
                ("LATVIS__DATASTORE__ROOT", "/var/lib/latvis"),
                ("LATVIS_QUEUE_NAME", "single-underscore-is-ignored"),
                ("OTHER__BLOB_KIND", "ignored"),
            ])),
        )
        .unwrap();

        assert_eq!(config.queue_name, "tiles");
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(
            config.datastore,
            DatastoreConfig::Fs {
                root: PathBuf::from("/var/lib/latvis")
            }
        );
        assert_eq!(config.blob_kind, "latvis-output");
    }

    #[test]
    fn invalid_env_value_is_rejected() {
        let result =
            EnvironmentConfig::load_with_env(None, Some(env(&[("LATVIS__BLOB_KIND", " ")])));

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[rstest]
    #[case::blank_kind("blob_kind = \"  \"")]
    #[case::bad_header("identity_header = \"not a header\"")]
    #[case::bad_base_url("task_base_url = \"::nope\"")]
    #[case::fs_without_root("[datastore]\nbackend = \"fs\"\nroot = \"\"")]
    fn invalid_values_are_rejected(#[case] raw: &str) {
        assert!(matches!(
            EnvironmentConfig::from_toml_str(raw),
            Err(ConfigError::Invalid(_))
        ));
    }
}
