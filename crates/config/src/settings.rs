use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub drive: DriveSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongodb,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub admin_token_ttl_secs: u64,
    pub nonce_secret: String,
    pub nonce_lifetime_secs: u64,
}

/// Google OAuth2 + Drive v3 endpoints and the limits applied to proxied calls.
#[derive(Debug, Deserialize, Clone)]
pub struct DriveSettings {
    pub redirect_uri: String,
    pub post_auth_redirect: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub api_base: String,
    pub upload_base: String,
    pub scopes: Vec<String>,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub expiry_skew_secs: i64,
    pub max_upload_bytes: usize,
    pub max_download_bytes: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("DRIVEBRIDGE")
                    .list_separator(",")
                    .with_list_parse_key("app.cors_origins")
                    .with_list_parse_key("drive.scopes")
                    .try_parsing(true),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.backend", "mongodb")?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "drivebridge")?
            .set_default("auth.jwt_secret", "change-me-in-production")?
            .set_default("auth.issuer", "drivebridge")?
            .set_default("auth.admin_token_ttl_secs", 86400)?
            .set_default("auth.nonce_secret", "change-me-in-production-too")?
            .set_default("auth.nonce_lifetime_secs", 86400)?
            .set_default(
                "drive.redirect_uri",
                "http://localhost:3000/api/v1/drive/callback",
            )?
            .set_default("drive.post_auth_redirect", "/admin/drive?auth=success")?
            .set_default(
                "drive.auth_endpoint",
                "https://accounts.google.com/o/oauth2/v2/auth",
            )?
            .set_default("drive.token_endpoint", "https://oauth2.googleapis.com/token")?
            .set_default("drive.api_base", "https://www.googleapis.com/drive/v3")?
            .set_default(
                "drive.upload_base",
                "https://www.googleapis.com/upload/drive/v3",
            )?
            .set_default(
                "drive.scopes",
                vec![
                    "https://www.googleapis.com/auth/drive.file".to_string(),
                    "https://www.googleapis.com/auth/drive.readonly".to_string(),
                ],
            )?
            .set_default("drive.page_size", 20)?
            .set_default("drive.request_timeout_secs", 30)?
            .set_default("drive.expiry_skew_secs", 30)?
            .set_default("drive.max_upload_bytes", 25 * 1024 * 1024)?
            .set_default("drive.max_download_bytes", 25 * 1024 * 1024)?
            .build()?;

        config.try_deserialize()
    }
}
