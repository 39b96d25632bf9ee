// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{
    Arc, Mutex, OnceLock,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use hoaxify::{
    config::{Config, MailConfig},
    routes,
    services::email::{MailError, Mailer, OutgoingEmail},
    state::AppState,
    utils::hash::hash_password,
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tempfile::TempDir;

pub const PASSWORD: &str = "P4ssword";

/// Hashing is slow in debug builds, so fixtures share one hash of `PASSWORD`.
fn hashed_password() -> &'static str {
    static HASHED: OnceLock<String> = OnceLock::new();
    HASHED.get_or_init(|| hash_password(PASSWORD).unwrap())
}

/// Records outgoing mail instead of sending it; can be told to fail.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    pub fn fail_next_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError("Mailbox unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub config: Config,
    pub mailer: Arc<RecordingMailer>,
    pub client: reqwest::Client,
    _uploads: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Inserts a user directly, bypassing registration.
    pub async fn create_user(&self, username: &str, email: &str, active: bool) -> i64 {
        sqlx::query("INSERT INTO users (username, email, password, inactive) VALUES (?, ?, ?, ?)")
            .bind(username)
            .bind(email)
            .bind(hashed_password())
            .bind(!active)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn create_users(&self, active: usize, inactive: usize) -> Vec<i64> {
        let mut ids = Vec::new();
        for i in 0..active + inactive {
            let username = format!("user{}", i + 1);
            let email = format!("user{}@mail.com", i + 1);
            ids.push(self.create_user(&username, &email, i < active).await);
        }
        ids
    }

    pub async fn login(&self, email: &str) -> String {
        let body: serde_json::Value = self
            .client
            .post(self.url("/api/1.0/auth"))
            .json(&serde_json::json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["token"].as_str().expect("login returned no token").to_string()
    }

    pub async fn add_hoax(&self, user_id: i64, content: &str, timestamp: i64) -> i64 {
        sqlx::query("INSERT INTO hoaxes (content, timestamp, user_id) VALUES (?, ?, ?)")
            .bind(content)
            .bind(timestamp)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn add_attachment(&self, filename: &str, upload_date: i64, hoax_id: Option<i64>) -> i64 {
        std::fs::write(self.config.attachment_folder().join(filename), b"attachment").unwrap();
        sqlx::query(
            "INSERT INTO file_attachments (filename, upload_date, file_type, hoax_id) VALUES (?, ?, 'image/png', ?)",
        )
        .bind(filename)
        .bind(upload_date)
        .bind(hoax_id)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub fn png_bytes(size: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    bytes.resize(size.max(bytes.len()), 0);
    bytes
}

/// Configuration pointing all storage under `upload_dir`, with a mail
/// setup that is never contacted.
pub fn test_config(upload_dir: PathBuf) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        upload_dir,
        profile_dir: "profile".to_string(),
        attachment_dir: "attachment".to_string(),
        mail: MailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: None,
            smtp_password: None,
            from: "My App <info@my-app.com>".to_string(),
            client_base_url: "http://localhost:8080".to_string(),
        },
        token_sweep_interval: Duration::from_secs(3600),
        attachment_sweep_interval: Duration::from_secs(86400),
    }
}

/// A migrated database file under `dir`, shared by several connections so
/// that lock contention behaves as in production.
pub async fn file_pool(dir: &Path) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(dir.join("hoaxify-test.db"))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("Failed to open SQLite file");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

/// Spawns the app on a random port, backed by an in-memory database and a
/// temporary upload folder.
pub async fn spawn_app() -> TestApp {
    // A single connection that never expires keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let uploads = tempfile::tempdir().expect("Failed to create upload dir");

    let config = test_config(uploads.path().join("uploads-test"));

    hoaxify::services::file::create_folders(&config)
        .await
        .expect("Failed to create upload folders");

    let mailer = Arc::new(RecordingMailer::default());

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        mailer: mailer.clone(),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        config,
        mailer,
        client: reqwest::Client::new(),
        _uploads: uploads,
    }
}
