#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use gymsite::auth::password;
use gymsite::auth::session::SESSION_COOKIE;
use gymsite::config::Config;
use gymsite::db;

pub const ADMIN_EMAIL: &str = "admin@gym.test";
pub const ADMIN_PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Insert a user directly, bypassing the HTTP layer.
    pub async fn create_user(&self, email: &str, pw: &str, is_admin: bool) -> Uuid {
        let pw_hash = password::hash(pw).unwrap();
        db::users::create(&self.pool, email, &pw_hash, "Test User", is_admin)
            .await
            .expect("create user failed")
            .id
    }

    pub async fn seed_admin(&self) -> Uuid {
        self.create_user(ADMIN_EMAIL, ADMIN_PASSWORD, true).await
    }

    /// Submit the login form; returns the status and the session token if one was set.
    pub async fn login(&self, email: &str, pw: &str) -> (StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("email", email), ("password", pw), ("next", "/admin")])
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let token = resp
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|cookie| {
                cookie
                    .strip_prefix(&format!("{SESSION_COOKIE}="))
                    .and_then(|rest| rest.split(';').next())
                    .filter(|value| !value.is_empty())
                    .map(String::from)
            });
        (status, token)
    }

    /// Seed the admin and log in, returning the session token.
    pub async fn admin_session(&self) -> String {
        self.seed_admin().await;
        let (status, token) = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "admin login failed");
        token.expect("login did not set a session cookie")
    }

    /// GET a page with an optional session cookie; returns (status, body).
    pub async fn get_page(&self, path: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.header("cookie", format!("{SESSION_COOKIE}={token}"));
        }
        let resp = req.send().await.expect("get request failed");
        let status = resp.status();
        (status, resp.text().await.unwrap_or_default())
    }

    pub async fn get_json(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST JSON, authenticated with the session cookie when a token is given.
    pub async fn post_json(&self, path: &str, token: Option<&str>, body: &Value) -> (Value, StatusCode) {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.header("cookie", format!("{SESSION_COOKIE}={token}"));
        }
        let resp = req.send().await.expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn seed_plan(&self, name: &str, price_cents: i64, sort_order: i32, active: bool) {
        sqlx::query(
            "INSERT INTO plans (name, description, price_cents, features, sort_order, is_active)
             VALUES ($1, 'Test plan', $2, ARRAY['Open gym'], $3, $4)",
        )
        .bind(name)
        .bind(price_cents)
        .bind(sort_order)
        .bind(active)
        .execute(&self.pool)
        .await
        .expect("seed plan failed");
    }

    pub async fn seed_product(&self, name: &str, price_cents: i64, image_path: Option<&str>) {
        sqlx::query(
            "INSERT INTO products (name, description, price_cents, image_path)
             VALUES ($1, 'Test product', $2, $3)",
        )
        .bind(name)
        .bind(price_cents)
        .bind(image_path)
        .execute(&self.pool)
        .await
        .expect("seed product failed");
    }
}

fn database_url() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database.
/// Returns `None` when `DATABASE_URL` is not set so database tests are skipped.
pub async fn spawn_app() -> Option<TestApp> {
    let Some(base_url) = database_url() else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    // Create a unique test database
    let db_name = format!("gymsite_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let upload_dir = std::env::temp_dir().join(&db_name);

    let config = Config {
        database_url: test_url,
        session_secret: "test-session-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        upload_dir: upload_dir.clone(),
        max_upload_size: 1_048_576,
        log_level: "warn".to_string(),
        admin: None,
        smtp: None,
    };

    let (app, _state) = gymsite::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    Some(TestApp {
        addr,
        pool,
        client,
        db_name,
        upload_dir,
    })
}

/// Drop the test database and upload directory after a test.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;
    let _ = tokio::fs::remove_dir_all(&app.upload_dir).await;

    let Some(base_url) = database_url() else {
        return;
    };

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
