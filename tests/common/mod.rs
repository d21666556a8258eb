#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::web::Data;
use actix_web::App;
use projectstash::auth;
use projectstash::config::Config;
use projectstash::db::Db;
use projectstash::models::user::User;
use projectstash::routes;
use projectstash::users;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One throwaway database and uploads root per test, removed on drop.
pub struct TestHarness {
    pub cfg: Config,
    pub db: Db,
    root: PathBuf,
}

impl TestHarness {
    pub async fn new() -> Self {
        let root = std::env::temp_dir().join(format!("projectstash-test-{}", Uuid::new_v4()));
        let storage_dir = root.join("uploads");
        fs::create_dir_all(&storage_dir).expect("create fixture root");

        let cfg = Config {
            listen: "127.0.0.1:0".to_string(),
            database_path: root.join("data.sqlite3").to_string_lossy().into_owned(),
            storage_dir: storage_dir.to_string_lossy().into_owned(),
            jwt_secret: Some("integration-test-secret".to_string()),
            allowed_origins: vec![],
            token_ttl_minutes: 30,
            max_upload_size: 16 * 1024 * 1024,
        };
        let db = Db::connect_and_migrate(&cfg)
            .await
            .expect("database init failed");
        Self { cfg, db, root }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(Data::new(self.cfg.clone()))
            .app_data(Data::new(self.db.clone()))
            .configure(routes::configure)
    }

    pub async fn seed_user(&self, username: &str, password: &str) -> User {
        users::create_user(&self.db, username, None, None, password)
            .await
            .expect("seed user")
    }

    pub fn token_for(&self, username: &str) -> String {
        auth::create_access_token(username, &self.cfg).expect("issue token")
    }

    pub fn bearer(&self, username: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token_for(username)))
    }

    pub fn storage_root(&self) -> &Path {
        Path::new(&self.cfg.storage_dir)
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

pub const MULTIPART_BOUNDARY: &str = "----projectstash-test-boundary";

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}

pub fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
