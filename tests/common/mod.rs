/// Shared harness: a full router over an in-memory database
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use platform_accounts::{
    account::PasswordHasher,
    config::{
        AuthConfig, LogFormat, LoggingConfig, ProfileConfig, ServerConfig, ServiceConfig, StorageConfig,
    },
    db::{
        self,
        account::{self as account_db, NewAccount},
    },
    server::build_router,
    AppContext,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const ADMIN_ID: &str = "admin-account-id";
pub const ADMIN_EMAIL: &str = "admin@platform.test";
pub const ADMIN_PASSWORD: &str = "Adm1n-P@ss";
pub const PASSWORD: &str = "P@ss1234!";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

fn test_config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 0,
            version: "test".to_string(),
        },
        storage: StorageConfig {
            data_directory: "./data".into(),
            account_db: "./data/accounts.sqlite".into(),
        },
        authentication: AuthConfig {
            jwt_secret: "integration-secret-key-0123456789abcdef".to_string(),
            token_ttl_days: 7,
            admin_ids: vec![ADMIN_ID.to_string()],
            password_hash_cost: 1,
        },
        profile: ProfileConfig { cooldown_days: 7 },
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        },
    }
}

/// Router over a fresh database that already holds the admin account
pub async fn spawn_app() -> TestApp {
    let db = db::create_in_memory_pool().await.unwrap();

    let admin_hash = PasswordHasher::new(1).unwrap().hash(ADMIN_PASSWORD).unwrap();
    account_db::insert(
        &db,
        &NewAccount {
            id: ADMIN_ID.to_string(),
            email: ADMIN_EMAIL.to_string(),
            password_hash: admin_hash,
            display_name: "Admin".to_string(),
            created_at: Utc::now(),
        },
    )
    .await
    .unwrap();

    let ctx = AppContext::with_pool(test_config(), db.clone()).unwrap();

    TestApp {
        router: build_router(ctx),
        db,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// Register an account and return its id
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/users/register",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": PASSWORD,
                    "displayName": "Tester",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        body["user"]["id"].as_str().unwrap().to_string()
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/users/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// One post plus a comment, like and playlist entry owned by `user_id`
    pub async fn seed_owned_rows(&self, user_id: &str) {
        let now = Utc::now();
        let post_id = format!("post-{}", user_id);

        sqlx::query("INSERT INTO post (id, title, created_at) VALUES (?1, 'Song', ?2)")
            .bind(&post_id)
            .bind(now)
            .execute(&self.db)
            .await
            .unwrap();

        for (table, prefix) in [("comment", "c"), ("post_like", "l"), ("playlist_entry", "p")] {
            let sql = format!(
                "INSERT INTO {} (id, post_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                table
            );
            sqlx::query(&sql)
                .bind(format!("{}-{}", prefix, user_id))
                .bind(&post_id)
                .bind(user_id)
                .bind(now)
                .execute(&self.db)
                .await
                .unwrap();
        }
    }
}
