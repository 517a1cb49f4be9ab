//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Artifact storage configuration
    pub artifacts: ArtifactConfig,
    /// Query limits and lookup policy
    pub query: QueryConfig,
    /// Access control configuration
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `sqlite:` URL or path of the database written by the capture agent
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Connection acquire and per-query timeout (in seconds)
    pub timeout_secs: u64,
}

/// Artifact storage configuration
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Directory that file-backed snapshots must live under
    pub snapshot_root: PathBuf,
}

/// Query configuration
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Snapshot limit used when the caller omits one
    pub default_snaps_limit: i64,
    /// Log limit used when the caller omits one
    pub default_logs_limit: i64,
    /// Largest limit a caller may request
    pub max_limit: i64,
    /// Report unknown employees as not found instead of returning empty lists
    pub strict_employee_lookup: bool,
}

/// Access control configuration
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Bearer token required on every route but `/health`; open access when unset
    pub admin_token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: ServerConfig {
                port: parse_or(&lookup, "PORT", 8000),
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                cors_origins: lookup("CORS_ORIGINS")
                    .map(|raw| {
                        raw.split(',')
                            .map(|o| o.trim().to_string())
                            .filter(|o| !o.is_empty())
                            .collect()
                    })
                    .unwrap_or_else(|| vec!["*".to_string()]),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:enyard.db".to_string()),
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5),
                timeout_secs: parse_or(&lookup, "DB_TIMEOUT_SECS", 5),
            },
            artifacts: ArtifactConfig {
                snapshot_root: lookup("SNAPSHOT_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("output")),
            },
            query: query_config(&lookup),
            auth: AuthConfig {
                admin_token: lookup("ADMIN_TOKEN").filter(|t| !t.trim().is_empty()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn query_config<F>(lookup: &F) -> QueryConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut max_limit: i64 = parse_or(lookup, "MAX_LIMIT", 500);
    if max_limit < 1 {
        tracing::warn!(max_limit, "MAX_LIMIT must be positive, using 500");
        max_limit = 500;
    }

    QueryConfig {
        default_snaps_limit: default_limit(lookup, "DEFAULT_SNAPS_LIMIT", max_limit),
        default_logs_limit: default_limit(lookup, "DEFAULT_LOGS_LIMIT", max_limit),
        max_limit,
        strict_employee_lookup: lookup("STRICT_EMPLOYEE_LOOKUP")
            .map(|v| parse_flag(&v))
            .unwrap_or(false),
    }
}

/// Read a default limit, falling back when it lies outside `1..=max_limit`
fn default_limit<F>(lookup: &F, key: &str, max_limit: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    let fallback = 50.min(max_limit);
    let value: i64 = parse_or(lookup, key, fallback);
    if (1..=max_limit).contains(&value) {
        value
    } else {
        tracing::warn!(
            key,
            value,
            max_limit,
            fallback,
            "Default limit outside 1..=MAX_LIMIT, using fallback"
        );
        fallback
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        None => default,
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
