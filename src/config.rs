use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::env;
use config;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MovieDbConfig {
    pub base_url: String,
    pub image_base_url: String,
    /// Movie lookups are disabled when no key is configured.
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    pub movie_db: MovieDbConfig,
    // Populated from the .env file
    pub database_path: String,
    pub allowed_origins: String,
    pub log_level: String,
    pub session_secret_key: String,
    pub use_secure_cookies: bool,
    pub public_base_url: Option<String>,
}

fn required_var(name: &str) -> Result<String, config::ConfigError> {
    env::var(name).map_err(|_| config::ConfigError::Message(format!(
        "FATAL: Environment variable '{}' is not set in your .env file.", name
    )))
}

impl Config {
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path)
            .map_err(|e| config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}", env_path.display(), e
            )))?;

        let database_path = required_var("DATABASE_PATH")?;
        let session_secret_key = required_var("SESSION_SECRET_KEY")?;

        // 128 hex characters, i.e. the 64 bytes the cookie key needs.
        if session_secret_key.len() != 128 || !session_secret_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(config::ConfigError::Message(
                "FATAL: 'SESSION_SECRET_KEY' must be 128 hexadecimal characters long (64 bytes).".to_string()
            ));
        }

        if Path::new(&database_path).is_relative() {
            return Err(config::ConfigError::Message(format!(
                "FATAL: The 'DATABASE_PATH' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
                database_path
            )));
        }

        let allowed_origins = env::var("ALLOWED_ORIGINS").unwrap_or_default();
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let use_secure_cookies = env::var("USE_SECURE_COOKIES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let tmdb_api_key = env::var("TMDB_API_KEY").ok().filter(|key| !key.trim().is_empty());
        if tmdb_api_key.is_none() {
            log::warn!("TMDB_API_KEY is not set. Movie search and film drafts will be unavailable.");
        }
        let public_base_url = env::var("PUBLIC_BASE_URL").ok().filter(|url| !url.trim().is_empty());

        let mut builder = config::Config::builder()
            // Web host/port and movie database endpoints come from TOML.
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml))
            .set_override("database_path", database_path)?
            .set_override("session_secret_key", session_secret_key)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .set_override("use_secure_cookies", use_secure_cookies)?;

        if let Some(key) = tmdb_api_key {
            builder = builder.set_override("movie_db.api_key", key)?;
        }
        if let Some(url) = public_base_url {
            builder = builder.set_override("public_base_url", url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Returns the full path to the club database file inside its own folder.
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("club")
            .join("film_club.db")
    }

    /// Base URL used when building links sent to members, such as password resets.
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.web.host, self.web.port),
        }
    }
}
