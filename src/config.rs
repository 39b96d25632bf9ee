// src/config.rs

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,

    /// Root of the upload storage area.
    pub upload_dir: PathBuf,
    /// Sub-folder of `upload_dir` holding profile images.
    pub profile_dir: String,
    /// Sub-folder of `upload_dir` holding hoax attachments.
    pub attachment_dir: String,

    pub mail: MailConfig,

    pub token_sweep_interval: Duration,
    pub attachment_sweep_interval: Duration,
}

/// Outgoing mail settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from: String,
    /// Base URL of the web client, used to build activation and reset links.
    pub client_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://hoaxify.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let mail = MailConfig {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: parse_or("SMTP_PORT", 587),
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            from: env::var("MAIL_FROM").unwrap_or_else(|_| "My App <info@my-app.com>".to_string()),
            client_base_url: env::var("CLIENT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        };

        Self {
            database_url,
            rust_log,
            bind_addr,
            upload_dir: PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string())),
            profile_dir: env::var("PROFILE_DIR").unwrap_or_else(|_| "profile".to_string()),
            attachment_dir: env::var("ATTACHMENT_DIR").unwrap_or_else(|_| "attachment".to_string()),
            mail,
            token_sweep_interval: Duration::from_secs(parse_or("TOKEN_SWEEP_INTERVAL_SECS", 60 * 60)),
            attachment_sweep_interval: Duration::from_secs(parse_or(
                "ATTACHMENT_SWEEP_INTERVAL_SECS",
                24 * 60 * 60,
            )),
        }
    }

    pub fn profile_folder(&self) -> PathBuf {
        self.upload_dir.join(&self.profile_dir)
    }

    pub fn attachment_folder(&self) -> PathBuf {
        self.upload_dir.join(&self.attachment_dir)
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
