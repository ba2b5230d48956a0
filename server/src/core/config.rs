use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_EXECUTOR_URL, DEFAULT_HOST, DEFAULT_MAX_FILTERS,
    DEFAULT_PORT,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Query executor configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ExecutorFileConfig {
    /// Datasource query endpoint
    pub url: Option<String>,
    /// Request timeout; absent means the HTTP client default
    pub timeout_secs: Option<u64>,
    /// Bearer token for executors with auth enabled
    pub api_token: Option<String>,
}

/// SQL generation configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    /// Accept raw SQL fragments in freeform search mode
    pub allow_freeform_sql: Option<bool>,
    /// Maximum structured filters per request
    pub max_filters: Option<usize>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub executor: Option<ExecutorFileConfig>,
    pub query: Option<QueryFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(executor) = other.executor {
            let current = self
                .executor
                .get_or_insert_with(ExecutorFileConfig::default);
            if executor.url.is_some() {
                tracing::trace!(url = ?executor.url, "Merging executor.url");
                current.url = executor.url;
            }
            if executor.timeout_secs.is_some() {
                tracing::trace!(timeout_secs = ?executor.timeout_secs, "Merging executor.timeout_secs");
                current.timeout_secs = executor.timeout_secs;
            }
            if executor.api_token.is_some() {
                tracing::trace!("Merging executor.api_token");
                current.api_token = executor.api_token;
            }
        }

        if let Some(query) = other.query {
            let current = self.query.get_or_insert_with(QueryFileConfig::default);
            if query.allow_freeform_sql.is_some() {
                tracing::trace!(allow = ?query.allow_freeform_sql, "Merging query.allow_freeform_sql");
                current.allow_freeform_sql = query.allow_freeform_sql;
            }
            if query.max_filters.is_some() {
                tracing::trace!(max_filters = ?query.max_filters, "Merging query.max_filters");
                current.max_filters = query.max_filters;
            }
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config Structs
// =============================================================================

/// Server configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Query executor configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub url: String,
    pub timeout: Option<Duration>,
    pub api_token: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_EXECUTOR_URL.to_string(),
            timeout: None,
            api_token: None,
        }
    }
}

/// SQL generation configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub allow_freeform_sql: bool,
    pub max_filters: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            allow_freeform_sql: false,
            max_filters: DEFAULT_MAX_FILTERS,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub executor: ExecutorConfig,
    pub query: QueryConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.olapscope/olapscope.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_sources(cli, file_config);
        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, file config and CLI/env overrides
    fn from_sources(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_executor = file_config.executor.unwrap_or_default();
        let file_query = file_config.query.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let executor = ExecutorConfig {
            url: cli
                .executor_url
                .clone()
                .or(file_executor.url)
                .unwrap_or_else(|| DEFAULT_EXECUTOR_URL.to_string()),
            timeout: cli
                .executor_timeout_secs
                .or(file_executor.timeout_secs)
                .map(Duration::from_secs),
            api_token: cli
                .executor_api_token
                .clone()
                .or(file_executor.api_token)
                .filter(|t| !t.is_empty()),
        };

        let query = QueryConfig {
            allow_freeform_sql: cli
                .allow_freeform_sql
                .or(file_query.allow_freeform_sql)
                .unwrap_or(false),
            max_filters: file_query.max_filters.unwrap_or(DEFAULT_MAX_FILTERS),
        };

        // debug: CLI/env flag takes precedence, then file config, default false
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        Self {
            server: ServerConfig { host, port },
            executor,
            query,
            debug,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        let url = &self.executor.url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!(
                "Configuration error: executor.url must start with http:// or https://. Got: {}",
                url
            );
        }

        if self.executor.timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("Configuration error: executor.timeout_secs must be greater than 0");
        }

        if self.query.max_filters == 0 {
            anyhow::bail!("Configuration error: query.max_filters must be greater than 0");
        }

        if self.query.allow_freeform_sql && is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Freeform SQL is enabled while binding to all network interfaces. \
                 Raw SQL fragments from any client on the network reach the executor."
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.olapscope/olapscope.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "executor": { "url": "http://grafana:3000/api/ds/query", "timeout_secs": 15 },
            "query": { "allow_freeform_sql": false, "max_filters": 10 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("0.0.0.0".to_string())
        );
        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(config.executor.as_ref().unwrap().timeout_secs, Some(15));
        assert_eq!(
            config.query.as_ref().unwrap().allow_freeform_sql,
            Some(false)
        );
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.executor.is_none());
        assert!(config.query.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "port": 1 }, "sever": { "port": 2 } }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let extra = config.extra.as_object().unwrap();
        assert!(extra.contains_key("sever"));
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{ "server": { "host": "127.0.0.1", "port": 5390 }, "executor": { "url": "http://a" } }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{ "server": { "port": 9000 }, "executor": { "api_token": "t" }, "debug": true }"#,
        )
        .unwrap();

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host, Some("127.0.0.1".to_string()));
        assert_eq!(server.port, Some(9000));
        let executor = base.executor.unwrap();
        assert_eq!(executor.url, Some("http://a".to_string()));
        assert_eq!(executor.api_token, Some("t".to_string()));
        assert_eq!(base.debug, Some(true));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_sources(&CliConfig::default(), FileConfig::default());
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.executor.url, DEFAULT_EXECUTOR_URL);
        assert!(config.executor.timeout.is_none());
        assert!(config.executor.api_token.is_none());
        assert!(!config.query.allow_freeform_sql);
        assert!(!QueryConfig::default().allow_freeform_sql);
        assert_eq!(config.query.max_filters, DEFAULT_MAX_FILTERS);
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_cli_override() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "server": { "port": 7000 }, "executor": { "url": "http://file", "timeout_secs": 5 } }"#,
        )
        .unwrap();
        let cli = CliConfig {
            port: Some(7100),
            executor_url: Some("http://cli".to_string()),
            allow_freeform_sql: Some(true),
            ..Default::default()
        };

        let config = AppConfig::from_sources(&cli, file);
        assert_eq!(config.server.port, 7100);
        assert_eq!(config.executor.url, "http://cli");
        assert_eq!(config.executor.timeout, Some(Duration::from_secs(5)));
        assert!(config.query.allow_freeform_sql);
    }

    #[test]
    fn test_app_config_empty_token_ignored() {
        let cli = CliConfig {
            executor_api_token: Some(String::new()),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        assert!(config.executor.api_token.is_none());
    }

    #[test]
    fn test_app_config_validation_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.port"));
    }

    #[test]
    fn test_app_config_validation_bad_executor_url() {
        let cli = CliConfig {
            executor_url: Some("localhost:3000".to_string()),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("executor.url"));
    }

    #[test]
    fn test_app_config_validation_zero_max_filters() {
        let file: FileConfig = serde_json::from_str(r#"{ "query": { "max_filters": 0 } }"#).unwrap();
        let config = AppConfig::from_sources(&CliConfig::default(), file);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_load_from_cli_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "server": {{ "port": 6100 }}, "query": {{ "max_filters": 5 }} }}"#
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 6100);
        assert_eq!(config.query.max_filters, 5);
    }

    #[test]
    fn test_app_config_load_missing_path() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/definitely/not/here/olapscope.json")),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));
        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
    }
}
