#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use academia::modules::users::repository::{InMemoryUserRepository, UserRepository};
use academia::router::init_router;
use academia::state::AppState;
use academia::utils::email::{ConsoleEmailService, EmailMessage};
use academia_config::{AuthConfig, CorsConfig, EmailConfig};
use academia_core::{Clock, FixedClock};
use academia_models::User;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "Str0ng!pass";
pub const FRONTEND_URL: &str = "http://frontend.test";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 7, 30, 0).unwrap()
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        app_name: "Academia".to_string(),
        secret: "integration-test-secret-key-32-characters".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 4 * 3600,
        password_reset_timeout_days: 3,
    }
}

pub fn email_config() -> EmailConfig {
    EmailConfig {
        enabled: false,
        smtp_host: "localhost".to_string(),
        smtp_port: 1025,
        smtp_username: String::new(),
        smtp_password: String::new(),
        from_email: "noreply@academia.test".to_string(),
        from_name: "Academia".to_string(),
        frontend_url: FRONTEND_URL.to_string(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: InMemoryUserRepository,
    pub mailer: ConsoleEmailService,
    pub clock: FixedClock,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repository(|users| Arc::new(users) as Arc<dyn UserRepository>)
    }

    /// Serve the app from the repository `wrap` builds around the shared
    /// in-memory store.
    pub fn with_repository(
        wrap: impl FnOnce(InMemoryUserRepository) -> Arc<dyn UserRepository>,
    ) -> Self {
        let users = InMemoryUserRepository::new();
        let mailer = ConsoleEmailService::recording();
        let clock = FixedClock::new(start_time());
        let state = AppState::new(
            wrap(users.clone()),
            Arc::new(mailer.clone()),
            Arc::new(clock.clone()),
            auth_config(),
            email_config(),
            CorsConfig {
                allowed_origins: vec![FRONTEND_URL.to_string()],
            },
        );
        Self {
            router: init_router(state.clone()),
            state,
            users,
            mailer,
            clock,
        }
    }

    /// Store an active user whose password is [`PASSWORD`].
    pub async fn create_user(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        roles: &[&str],
    ) -> User {
        // Low cost keeps the suite fast; verification accepts any cost.
        let hash = bcrypt::hash(PASSWORD, 4).unwrap();
        let user = User::new(
            "Test User",
            username,
            email,
            hash,
            roles.iter().map(|r| r.to_string()).collect(),
            self.clock.now(),
        );
        self.users.create(&user).await.unwrap()
    }

    pub async fn user(&self, user: &User) -> User {
        self.users.get_by_id(user.id).await.unwrap().unwrap()
    }

    /// Overwrite the stored record.
    pub async fn save(&self, user: &User) -> User {
        self.users.update(user).await.unwrap()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send_json("POST", uri, body, token).await
    }

    pub async fn put(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send_json("PUT", uri, body, token).await
    }

    pub async fn delete(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send_json("DELETE", uri, body, token).await
    }

    async fn send_json(
        &self,
        method: &str,
        uri: &str,
        body: Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    /// Log in and return the session token.
    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/login",
                serde_json::json!({ "username": username, "password": PASSWORD }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Wait for background mail until `count` messages have been recorded.
    pub async fn wait_for_mail(&self, count: usize) -> Vec<EmailMessage> {
        for _ in 0..100 {
            let sent = self.mailer.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} email(s), got {:?}", self.mailer.sent());
    }

    /// Give background tasks a chance to run, then return what was sent.
    pub async fn settled_mail(&self) -> Vec<EmailMessage> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.mailer.sent()
    }
}
