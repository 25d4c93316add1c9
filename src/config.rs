//! Run configuration
//!
//! `AppConfig` is built once at startup from built-in defaults, an optional
//! YAML file and the process environment, then shared read-only with every
//! pipeline. Nothing below reads ambient state after construction.

use crate::error::{Error, Result};
use crate::types::{BackoffType, DestinationKind, ObjectType, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

/// Default CRM API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com";

/// Default number of object types processed concurrently
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default number of retries for transient failures
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default first backoff delay in milliseconds
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;

/// Default backoff ceiling in milliseconds
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 60_000;

/// Default maximum properties requested per call
pub const DEFAULT_PROPERTIES_CHUNK_SIZE: usize = 50;

/// Default (and maximum) records per page
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Largest page size the API accepts
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Default pause between pages of one chunk, in milliseconds
pub const DEFAULT_PAGE_DELAY_MS: u64 = 50;

/// Default client-side request rate per transport
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Default directory for CSV artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "hubspot_data";

/// Object types synced when no configuration file overrides them
pub const DEFAULT_OBJECTS: &[&str] = &[
    "carts",
    "companies",
    "contacts",
    "deals",
    "discounts",
    "fees",
    "goal_targets",
    "invoices",
    "line_items",
    "products",
    "quotes",
    "taxes",
    "calls",
    "emails",
    "meetings",
    "notes",
    "tasks",
    "communications",
    "postal_mail",
];

// ============================================================================
// Resolved Configuration
// ============================================================================

/// Complete, validated configuration for one run
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub http: HttpSettings,
    pub fetch: FetchSettings,
    pub destination: DestinationConfig,
    /// Number of object-type pipelines run concurrently
    pub max_workers: usize,
    /// Directory CSV files are written to
    pub output_dir: PathBuf,
    /// Object types in configuration order
    pub objects: Vec<ObjectType>,
}

/// Source API settings
#[derive(Clone)]
pub struct SourceConfig {
    pub base_url: String,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Transport settings shared by every per-object HTTP client
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_type: BackoffType,
    /// Client-side rate limit; `None` disables it
    pub requests_per_second: Option<u32>,
}

/// Chunked fetch settings
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub chunk_size: usize,
    pub page_limit: u32,
    pub page_delay: Duration,
}

/// Destination store settings
#[derive(Clone)]
pub struct DestinationConfig {
    pub kind: DestinationKind,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub secure: bool,
    /// DuckDB database file; `None` means in-memory
    pub duckdb_path: Option<PathBuf>,
}

impl std::fmt::Debug for DestinationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationConfig")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("secure", &self.secure)
            .field("duckdb_path", &self.duckdb_path)
            .finish_non_exhaustive()
    }
}

impl DestinationConfig {
    /// Base URL of the ClickHouse HTTP interface
    pub fn clickhouse_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.trim_end_matches('/').to_string();
        }
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                access_token: None,
            },
            http: HttpSettings {
                timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
                max_retries: DEFAULT_MAX_RETRIES,
                initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
                max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
                backoff_type: BackoffType::Exponential,
                requests_per_second: Some(DEFAULT_REQUESTS_PER_SECOND),
            },
            fetch: FetchSettings {
                chunk_size: DEFAULT_PROPERTIES_CHUNK_SIZE,
                page_limit: DEFAULT_PAGE_LIMIT,
                page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            },
            destination: DestinationConfig {
                kind: DestinationKind::Clickhouse,
                host: "localhost".to_string(),
                port: 8443,
                user: "default".to_string(),
                password: String::new(),
                database: "default".to_string(),
                secure: true,
                duckdb_path: None,
            },
            max_workers: DEFAULT_MAX_WORKERS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            objects: DEFAULT_OBJECTS
                .iter()
                .map(|name| ObjectType::standard(*name))
                .collect(),
        }
    }
}

// ============================================================================
// File Configuration (YAML)
// ============================================================================

/// Optional overrides read from a YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub http: HttpFileConfig,
    #[serde(default)]
    pub fetch: FetchFileConfig,
    #[serde(default)]
    pub destination: DestinationFileConfig,
    /// Replaces the default object table when present
    #[serde(default)]
    pub objects: Option<Vec<ObjectEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpFileConfig {
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
    pub backoff: Option<BackoffType>,
    /// 0 disables client-side rate limiting
    pub requests_per_second: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchFileConfig {
    pub chunk_size: Option<usize>,
    pub page_limit: Option<u32>,
    pub page_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationFileConfig {
    pub kind: Option<DestinationKind>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub database: Option<String>,
    pub secure: Option<bool>,
    pub duckdb_path: Option<PathBuf>,
}

/// One entry of the object table; the endpoint defaults to `crm/v3/objects/<name>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectEntry {
    pub name: String,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl FileConfig {
    /// Parse a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }
}

// ============================================================================
// Loading
// ============================================================================

impl AppConfig {
    /// Load configuration from `.env`, the process environment and an optional YAML file
    pub fn load(file: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file_config = file.map(FileConfig::from_file).transpose()?;
        Self::from_sources(file_config, |key| std::env::var(key).ok())
    }

    /// Build configuration from an optional file and an environment lookup
    ///
    /// Environment values take precedence over the file, which takes
    /// precedence over the defaults.
    pub fn from_sources<F>(file: Option<FileConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env(&env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(base_url) = file.base_url {
            self.source.base_url = base_url;
        }
        if let Some(workers) = file.max_workers {
            self.max_workers = workers;
        }
        if let Some(dir) = file.output_dir {
            self.output_dir = dir;
        }

        let http = file.http;
        if let Some(secs) = http.timeout_secs {
            self.http.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = http.max_retries {
            self.http.max_retries = retries;
        }
        if let Some(ms) = http.initial_backoff_ms {
            self.http.initial_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = http.max_backoff_ms {
            self.http.max_backoff = Duration::from_millis(ms);
        }
        if let Some(backoff) = http.backoff {
            self.http.backoff_type = backoff;
        }
        if let Some(rps) = http.requests_per_second {
            self.http.requests_per_second = (rps > 0).then_some(rps);
        }

        let fetch = file.fetch;
        if let Some(size) = fetch.chunk_size {
            self.fetch.chunk_size = size;
        }
        if let Some(limit) = fetch.page_limit {
            self.fetch.page_limit = limit;
        }
        if let Some(ms) = fetch.page_delay_ms {
            self.fetch.page_delay = Duration::from_millis(ms);
        }

        let dest = file.destination;
        if let Some(kind) = dest.kind {
            self.destination.kind = kind;
        }
        if let Some(host) = dest.host {
            self.destination.host = host;
        }
        if let Some(secure) = dest.secure {
            self.destination.secure = secure;
            self.destination.port = default_clickhouse_port(secure);
        }
        if let Some(port) = dest.port {
            self.destination.port = port;
        }
        if let Some(user) = dest.user {
            self.destination.user = user;
        }
        if let Some(database) = dest.database {
            self.destination.database = database;
        }
        if let Some(path) = dest.duckdb_path {
            self.destination.duckdb_path = Some(path);
        }

        if let Some(objects) = file.objects {
            self.objects = objects
                .into_iter()
                .map(|entry| match entry.endpoint {
                    Some(endpoint) => ObjectType::new(entry.name, endpoint),
                    None => ObjectType::standard(entry.name),
                })
                .collect();
        }
    }

    fn apply_env<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).none_if_empty();

        self.source.access_token = var("HUBSPOT_ACCESS_TOKEN").or(self.source.access_token.take());
        if let Some(base_url) = var("HUBSPOT_BASE_URL") {
            self.source.base_url = base_url;
        }
        if let Some(dir) = var("CRM_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        if let Some(kind) = var("CRM_DESTINATION") {
            self.destination.kind = kind
                .parse()
                .map_err(|e: String| Error::invalid_value("CRM_DESTINATION", e))?;
        }
        if let Some(host) = var("CLICKHOUSE_HOST") {
            self.destination.host = host;
        }
        if let Some(secure) = var("CLICKHOUSE_SECURE") {
            let secure = parse_bool(&secure)
                .ok_or_else(|| Error::invalid_value("CLICKHOUSE_SECURE", "expected true or false"))?;
            self.destination.secure = secure;
            self.destination.port = default_clickhouse_port(secure);
        }
        if let Some(port) = var("CLICKHOUSE_PORT") {
            self.destination.port = port
                .parse()
                .map_err(|e| Error::invalid_value("CLICKHOUSE_PORT", format!("{e}")))?;
        }
        if let Some(user) = var("CLICKHOUSE_USER") {
            self.destination.user = user;
        }
        if let Some(password) = var("CLICKHOUSE_PASSWORD") {
            self.destination.password = password;
        }
        if let Some(database) = var("CLICKHOUSE_DATABASE") {
            self.destination.database = database;
        }
        if let Some(path) = var("DUCKDB_PATH") {
            self.destination.duckdb_path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(Error::invalid_value("max_workers", "must be greater than 0"));
        }
        if self.fetch.chunk_size == 0 {
            return Err(Error::invalid_value("fetch.chunk_size", "must be greater than 0"));
        }
        if self.fetch.page_limit == 0 || self.fetch.page_limit > MAX_PAGE_LIMIT {
            return Err(Error::invalid_value(
                "fetch.page_limit",
                format!("must be between 1 and {MAX_PAGE_LIMIT}"),
            ));
        }
        if self.source.base_url.is_empty() {
            return Err(Error::invalid_value("base_url", "cannot be empty"));
        }
        url::Url::parse(&self.source.base_url)?;

        let mut seen = std::collections::HashSet::new();
        for object in &self.objects {
            if object.name.is_empty() || object.endpoint.is_empty() {
                return Err(Error::invalid_value(
                    "objects",
                    "object name and endpoint cannot be empty",
                ));
            }
            if !seen.insert(object.name.as_str()) {
                return Err(Error::invalid_value(
                    "objects",
                    format!("duplicate object type '{}'", object.name),
                ));
            }
        }

        if self.objects.is_empty() {
            tracing::warn!("No object types configured - nothing will be synced");
        }

        Ok(())
    }

    /// Bearer token, required by every command that talks to the CRM API
    pub fn require_token(&self) -> Result<&str> {
        self.source
            .access_token
            .as_deref()
            .ok_or_else(|| Error::missing_field("HUBSPOT_ACCESS_TOKEN"))
    }

    /// Resolve a comma-separated selection against the configured objects
    ///
    /// Unknown names are rejected rather than silently skipped.
    pub fn select_objects(&self, selection: Option<&str>) -> Result<Vec<ObjectType>> {
        let Some(selection) = selection else {
            return Ok(self.objects.clone());
        };

        selection
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                self.objects
                    .iter()
                    .find(|object| object.name == name)
                    .cloned()
                    .ok_or_else(|| {
                        Error::invalid_value("objects", format!("'{name}' is not configured"))
                    })
            })
            .collect()
    }
}

fn default_clickhouse_port(secure: bool) -> u16 {
    if secure {
        8443
    } else {
        8123
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_sources(None, env_from(&[])).unwrap();
        assert_eq!(config.source.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.fetch.chunk_size, 50);
        assert_eq!(config.fetch.page_limit, 100);
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.objects.len(), DEFAULT_OBJECTS.len());
        assert_eq!(config.objects[0], ObjectType::standard("carts"));
        assert!(config.source.access_token.is_none());
    }

    #[test]
    fn test_missing_token_is_fatal_only_when_required() {
        let config = AppConfig::from_sources(None, env_from(&[])).unwrap();
        let err = config.require_token().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));

        let config =
            AppConfig::from_sources(None, env_from(&[("HUBSPOT_ACCESS_TOKEN", "pat-123")]))
                .unwrap();
        assert_eq!(config.require_token().unwrap(), "pat-123");
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_sources(
            None,
            env_from(&[
                ("CLICKHOUSE_HOST", "ch.internal"),
                ("CLICKHOUSE_SECURE", "false"),
                ("CLICKHOUSE_USER", "loader"),
                ("CRM_DESTINATION", "duckdb"),
                ("DUCKDB_PATH", "/tmp/crm.duckdb"),
            ]),
        )
        .unwrap();

        assert_eq!(config.destination.kind, DestinationKind::Duckdb);
        assert_eq!(config.destination.port, 8123);
        assert_eq!(config.destination.user, "loader");
        assert_eq!(config.destination.clickhouse_url(), "http://ch.internal:8123");
        assert_eq!(
            config.destination.duckdb_path,
            Some(PathBuf::from("/tmp/crm.duckdb"))
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = AppConfig::from_sources(None, env_from(&[("CLICKHOUSE_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_yaml_file() {
        let yaml = r"
max_workers: 2
fetch:
  chunk_size: 25
  page_delay_ms: 0
http:
  requests_per_second: 0
objects:
  - name: contacts
  - name: payments
    endpoint: crm/v3/objects/commerce_payments
";
        let file = FileConfig::from_yaml(yaml).unwrap();
        let config = AppConfig::from_sources(Some(file), env_from(&[])).unwrap();

        assert_eq!(config.max_workers, 2);
        assert_eq!(config.fetch.chunk_size, 25);
        assert_eq!(config.fetch.page_delay, Duration::ZERO);
        assert!(config.http.requests_per_second.is_none());
        assert_eq!(
            config.objects,
            vec![
                ObjectType::standard("contacts"),
                ObjectType::new("payments", "crm/v3/objects/commerce_payments"),
            ]
        );
    }

    #[test]
    fn test_validation() {
        let file = FileConfig::from_yaml("fetch:\n  page_limit: 500\n").unwrap();
        assert!(AppConfig::from_sources(Some(file), env_from(&[])).is_err());

        let file = FileConfig::from_yaml("max_workers: 0\n").unwrap();
        assert!(AppConfig::from_sources(Some(file), env_from(&[])).is_err());

        let file =
            FileConfig::from_yaml("objects:\n  - name: deals\n  - name: deals\n").unwrap();
        assert!(AppConfig::from_sources(Some(file), env_from(&[])).is_err());

        assert!(FileConfig::from_yaml("unknown_key: 1\n").is_err());
    }

    #[test]
    fn test_select_objects() {
        let config = AppConfig::from_sources(None, env_from(&[])).unwrap();

        let all = config.select_objects(None).unwrap();
        assert_eq!(all.len(), config.objects.len());

        let some = config.select_objects(Some("deals, contacts")).unwrap();
        assert_eq!(some[0].name, "deals");
        assert_eq!(some[1].name, "contacts");

        assert!(config.select_objects(Some("tickets")).is_err());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = AppConfig::from_sources(
            None,
            env_from(&[
                ("HUBSPOT_ACCESS_TOKEN", "pat-secret"),
                ("CLICKHOUSE_PASSWORD", "hunter2"),
            ]),
        )
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("pat-secret"));
        assert!(!debug.contains("hunter2"));
    }
}
