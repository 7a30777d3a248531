use common::config::StorageConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Sentiment analysis collaborator settings.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Gemini API key. Analysis is disabled when absent.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Upper bound for one analysis call, after which the record is saved
    /// without sentiment fields.
    pub timeout_secs: u64,
    /// Combined `title. note` text must be longer than this to be analyzed.
    pub min_text_len: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Per-file ceiling in bytes.
    pub max_file_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("analysis.model", "gemini-2.5-flash")?
            .set_default(
                "analysis.endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("analysis.timeout_secs", 10)?
            .set_default("analysis.min_text_len", 3)?
            .set_default("upload.max_file_size", crate::decoder::MAX_FILE_SIZE)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., JOURNAL__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("JOURNAL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins"),
            )
            .build()?;

        s.try_deserialize()
    }
}
