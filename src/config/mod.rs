//! Application configuration
//!
//! Loaded from a TOML file with environment variable overrides,
//! constructed once at startup and read-only afterwards.
//! Precedence: ENV > TOML > defaults.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Application configuration
///
/// - server: bind address, port, worker count
/// - database: persistent storage
/// - cache: in-memory cache
/// - location: resolution pipeline (provider order, staleness window,
///   same-location pattern)
/// - providers: external geolocation provider table
/// - logging: log output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_backend")]
    pub backend: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    /// Cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

/// Resolution pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Records older than this many days are refreshed from a provider
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,
    /// Address prefix pattern for same-location detection
    #[serde(default = "default_same_location_regex")]
    pub same_location_regex: String,
    #[serde(default = "default_first_provider")]
    pub first_provider: String,
    #[serde(default = "default_second_provider")]
    pub second_provider: String,
}

/// One external provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    /// URL template with `{ip}` and `{accessKey}` placeholders
    pub uri_pattern: String,
    #[serde(default)]
    pub access_key: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_backend() -> String {
    "sqlite".to_string()
}

fn default_database_url() -> String {
    "sqlite://iplocator.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    8
}

fn default_cache_backend() -> String {
    "memory".to_string()
}

fn default_cache_ttl() -> u64 {
    30 * 60
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_stale_after_days() -> i64 {
    30
}

fn default_same_location_regex() -> String {
    r"\d{1,3}\.\d{1,3}\.\d{1,3}".to_string()
}

fn default_first_provider() -> String {
    "ipstack".to_string()
}

fn default_second_provider() -> String {
    "ipapi".to_string()
}

/// Default provider table; access keys are filled in via config
fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "ipstack".to_string(),
            uri_pattern: "http://api.ipstack.com/{ip}?access_key={accessKey}".to_string(),
            access_key: String::new(),
        },
        ProviderConfig {
            name: "ipapi".to_string(),
            uri_pattern: "http://ip-api.com/json/{ip}".to_string(),
            access_key: String::new(),
        },
        ProviderConfig {
            name: "keycdn".to_string(),
            uri_pattern: "https://tools.keycdn.com/geo.json?host={ip}".to_string(),
            access_key: String::new(),
        },
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_enable_rotation() -> bool {
    false
}

fn default_max_backups() -> u32 {
    7
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            location: LocationConfig::default(),
            providers: default_providers(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_database_backend(),
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            default_ttl: default_cache_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
            same_location_regex: default_same_location_regex(),
            first_provider: default_first_provider(),
            second_provider: default_second_provider(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            format: default_log_format(),
            enable_rotation: default_enable_rotation(),
            max_backups: default_max_backups(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file with environment variable fallback
    pub fn load() -> Self {
        let mut config = Self::load_from_file();
        config.override_with_env();
        config
    }

    /// Load configuration from TOML file
    fn load_from_file() -> Self {
        let config_paths = [
            "config.toml",
            "iplocator.toml",
            "config/config.toml",
            "/etc/iplocator/config.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                debug!("Loading config from: {}", path);
                match fs::read_to_string(path) {
                    Ok(content) => match toml::from_str::<AppConfig>(&content) {
                        Ok(config) => {
                            debug!("Successfully loaded config from: {}", path);
                            return config;
                        }
                        Err(e) => {
                            warn!("Failed to parse config file {}: {}", path, e);
                        }
                    },
                    Err(e) => {
                        warn!("Failed to read config file {}: {}", path, e);
                    }
                }
            }
        }

        debug!("No config file found, using defaults");
        Self::default()
    }

    /// Override configuration with environment variables
    fn override_with_env(&mut self) {
        // Server config
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            } else {
                error!("Invalid SERVER_PORT: {}", port);
            }
        }

        // Database config
        if let Ok(backend) = env::var("DATABASE_BACKEND") {
            self.database.backend = backend;
        }
        if let Ok(database_url) = env::var("DATABASE_URL") {
            self.database.database_url = database_url;
        }
        if let Ok(pool_size) = env::var("DATABASE_POOL_SIZE") {
            if let Ok(size) = pool_size.parse::<u32>() {
                self.database.pool_size = size;
            } else {
                error!("Invalid DATABASE_POOL_SIZE: {}", pool_size);
            }
        }

        // Cache config
        if let Ok(backend) = env::var("CACHE_BACKEND") {
            self.cache.backend = backend;
        }
        if let Ok(default_ttl) = env::var("CACHE_DEFAULT_TTL") {
            if let Ok(ttl) = default_ttl.parse() {
                self.cache.default_ttl = ttl;
            } else {
                error!("Invalid CACHE_DEFAULT_TTL: {}", default_ttl);
            }
        }

        // Location config
        if let Ok(days) = env::var("LOCATION_STALE_AFTER_DAYS") {
            if let Ok(days) = days.parse() {
                self.location.stale_after_days = days;
            } else {
                error!("Invalid LOCATION_STALE_AFTER_DAYS: {}", days);
            }
        }
        if let Ok(regex) = env::var("LOCATION_SAME_LOCATION_REGEX") {
            self.location.same_location_regex = regex;
        }
        if let Ok(first) = env::var("LOCATION_FIRST_PROVIDER") {
            self.location.first_provider = first;
        }
        if let Ok(second) = env::var("LOCATION_SECOND_PROVIDER") {
            self.location.second_provider = second;
        }

        // Provider access keys: <NAME>_ACCESS_KEY, e.g. IPSTACK_ACCESS_KEY
        for provider in &mut self.providers {
            let var = format!("{}_ACCESS_KEY", provider.name.to_uppercase());
            if let Ok(key) = env::var(&var) {
                provider.access_key = key;
            }
        }

        // Logging config
        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(file) = env::var("LOG_FILE") {
            self.logging.file = Some(file);
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}
