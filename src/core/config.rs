use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub category_store: CategoryStoreConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Remote category store connection settings
#[derive(Debug, Clone)]
pub struct CategoryStoreConfig {
    /// Base URL of the remote store (e.g. "http://127.0.0.1:8000")
    pub base_url: String,
    /// Bearer token forwarded on every request, if any
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    /// Fixed depth of the backend level numbering
    pub max_depth: i32,
    /// Viewing sessions unused for this long are dropped
    pub session_idle_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            category_store: CategoryStoreConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl CategoryStoreConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 15;
    const DEFAULT_MAX_DEPTH: i32 = 5;
    const MAX_SUPPORTED_DEPTH: i32 = 10;
    const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("CATEGORY_STORE_URL")
            .map_err(|_| "CATEGORY_STORE_URL environment variable is required".to_string())?
            .trim_end_matches('/')
            .to_string();

        let api_token = env::var("CATEGORY_STORE_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        let timeout_secs = env::var("CATEGORY_STORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "CATEGORY_STORE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_depth = env::var("CATEGORY_MAX_DEPTH")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_DEPTH.to_string())
            .parse::<i32>()
            .map_err(|_| "CATEGORY_MAX_DEPTH must be a valid number".to_string())?;

        let session_idle_secs = env::var("CATEGORY_SESSION_IDLE_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SESSION_IDLE_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "CATEGORY_SESSION_IDLE_SECS must be a valid number".to_string())?;

        if !(1..=Self::MAX_SUPPORTED_DEPTH).contains(&max_depth) {
            return Err(format!(
                "CATEGORY_MAX_DEPTH must be between 1 and {}",
                Self::MAX_SUPPORTED_DEPTH
            ));
        }

        Ok(Self {
            base_url,
            api_token,
            request_timeout: Duration::from_secs(timeout_secs),
            max_depth,
            session_idle_timeout: Duration::from_secs(session_idle_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Category Versions API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Editing and synchronization of versioned category trees".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
