//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8083;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default Neo4j connection URI for local development.
pub const DEFAULT_GRAPH_URI: &str = "neo4j://localhost:7687";

/// Default Neo4j username.
pub const DEFAULT_GRAPH_USERNAME: &str = "neo4j";

/// Default Neo4j password for local development.
pub const DEFAULT_GRAPH_PASSWORD: &str = "password";

/// Default per-entity graph write timeout in seconds.
pub const DEFAULT_GRAPH_WRITE_TIMEOUT_SECS: u64 = 30;

/// Default OpenAlex API base URL.
pub const DEFAULT_OPENALEX_BASE_URL: &str = "https://api.openalex.org";

/// Default upstream fetch timeout in seconds. Work-list pages can be large.
pub const DEFAULT_OPENALEX_TIMEOUT_SECS: u64 = 20;

/// Default OpenAlex page size for work-list pagination.
pub const DEFAULT_OPENALEX_PER_PAGE: u32 = 200;

/// Default number of works saved synchronously before the response returns.
pub const DEFAULT_INITIAL_BATCH_SIZE: usize = 30;

/// Default number of days before ingested author data is considered stale.
pub const DEFAULT_STALENESS_DAYS: u32 = 15;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub graph: GraphConfig,
    pub openalex: OpenAlexConfig,
    pub ingest: IngestSettings,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Neo4j graph store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub write_timeout_secs: u64,
}

/// OpenAlex source client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAlexConfig {
    pub base_url: String,
    /// Contact address for the OpenAlex "polite pool"; appended as `mailto=`.
    pub mailto: Option<String>,
    pub timeout_secs: u64,
    pub per_page: u32,
}

/// Ingestion pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    pub initial_batch_size: usize,
    pub staleness_days: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("SCHOLARGRAPH_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_parsed("SCHOLARGRAPH_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parsed(
                    "SCHOLARGRAPH_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            graph: GraphConfig {
                uri: std::env::var("NEO4J_URI").unwrap_or_else(|_| DEFAULT_GRAPH_URI.to_string()),
                username: std::env::var("NEO4J_USERNAME")
                    .unwrap_or_else(|_| DEFAULT_GRAPH_USERNAME.to_string()),
                password: std::env::var("NEO4J_PASSWORD")
                    .unwrap_or_else(|_| DEFAULT_GRAPH_PASSWORD.to_string()),
                write_timeout_secs: env_parsed(
                    "NEO4J_WRITE_TIMEOUT",
                    DEFAULT_GRAPH_WRITE_TIMEOUT_SECS,
                ),
            },
            openalex: OpenAlexConfig {
                base_url: std::env::var("OPENALEX_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_OPENALEX_BASE_URL.to_string()),
                mailto: std::env::var("OPENALEX_MAILTO").ok().filter(|s| !s.is_empty()),
                timeout_secs: env_parsed("OPENALEX_TIMEOUT", DEFAULT_OPENALEX_TIMEOUT_SECS),
                per_page: env_parsed("OPENALEX_PER_PAGE", DEFAULT_OPENALEX_PER_PAGE),
            },
            ingest: IngestSettings {
                initial_batch_size: env_parsed(
                    "INGEST_INITIAL_BATCH_SIZE",
                    DEFAULT_INITIAL_BATCH_SIZE,
                ),
                staleness_days: env_parsed("INGEST_STALENESS_DAYS", DEFAULT_STALENESS_DAYS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: env_parsed("CORS_ALLOW_CREDENTIALS", true),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.graph.uri.is_empty() {
            anyhow::bail!("Neo4j URI cannot be empty");
        }

        if self.openalex.base_url.is_empty() {
            anyhow::bail!("OpenAlex base URL cannot be empty");
        }

        if self.openalex.per_page == 0 || self.openalex.per_page > 200 {
            anyhow::bail!(
                "OpenAlex per_page must be between 1 and 200, got {}",
                self.openalex.per_page
            );
        }

        if self.ingest.initial_batch_size == 0 {
            anyhow::bail!("Initial batch size must be greater than 0");
        }

        if self.ingest.staleness_days == 0 {
            anyhow::bail!("Staleness window must be at least 1 day");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            graph: GraphConfig {
                uri: DEFAULT_GRAPH_URI.to_string(),
                username: DEFAULT_GRAPH_USERNAME.to_string(),
                password: DEFAULT_GRAPH_PASSWORD.to_string(),
                write_timeout_secs: DEFAULT_GRAPH_WRITE_TIMEOUT_SECS,
            },
            openalex: OpenAlexConfig {
                base_url: DEFAULT_OPENALEX_BASE_URL.to_string(),
                mailto: None,
                timeout_secs: DEFAULT_OPENALEX_TIMEOUT_SECS,
                per_page: DEFAULT_OPENALEX_PER_PAGE,
            },
            ingest: IngestSettings {
                initial_batch_size: DEFAULT_INITIAL_BATCH_SIZE,
                staleness_days: DEFAULT_STALENESS_DAYS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
        }
    }
}

/// Read an environment variable and parse it, falling back to a default.
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
