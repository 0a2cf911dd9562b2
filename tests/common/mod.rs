//! Common Test Utilities
//!
//! Builds the full router against a test database and Redis, with helpers
//! for JSON requests. Each `TestApp` gets its own client IP so the
//! per-identifier rate limiter never couples tests to each other.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use estate_server::config::{
    ChatSettings, CorsSettings, DatabaseSettings, JwtSettings, OtpSettings, RateLimitSettings,
    RedisSettings, ServerSettings, Settings, SmtpSettings, SnowflakeSettings, WebSocketSettings,
};
use estate_server::infrastructure::cache::{create_redis_client, OtpStore};
use estate_server::infrastructure::database::{create_pool, run_migrations};
use estate_server::infrastructure::email::Mailer;
use estate_server::presentation::http::routes::create_routes;
use estate_server::presentation::websocket::ChatGateway;
use estate_server::shared::snowflake::SnowflakeGenerator;
use estate_server::startup::AppState;
use std::sync::Arc;

pub struct TestApp {
    pub router: Router,
    client_ip: String,
}

fn test_settings(database_url: String, redis_url: String) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: database_url,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: 5,
        },
        redis: RedisSettings {
            url: redis_url,
            pool_size: 5,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-0123456789abcdef".into(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        },
        smtp: SmtpSettings {
            host: "localhost".into(),
            port: 2525,
            username: String::new(),
            password: String::new(),
            from_address: "no-reply@estate.test".into(),
        },
        otp: OtpSettings {
            expiry_secs: 600,
            max_requests_per_hour: 5,
        },
        chat: ChatSettings {
            history_limit: 50,
            max_page_size: 100,
        },
        snowflake: SnowflakeSettings { machine_id: 31 },
        rate_limit: RateLimitSettings {
            auth_per_minute: 5,
            api_per_minute: 60,
            websocket_per_minute: 10,
        },
        cors: CorsSettings {
            allowed_origins: vec!["http://localhost:3000".into()],
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
            heartbeat_interval_ms: 45000,
        },
        environment: "test".into(),
    }
}

impl TestApp {
    /// Build the app against the test stack, or `None` when no stack is
    /// configured.
    pub async fn spawn() -> Option<Self> {
        let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
        let redis_url = std::env::var("TEST_REDIS_URL").ok()?;

        let settings = test_settings(database_url, redis_url);

        let db = create_pool(&settings.database)
            .await
            .expect("test database unreachable");
        run_migrations(&db).await.expect("migrations failed");

        let redis = create_redis_client(&settings.redis)
            .await
            .expect("test redis unreachable");

        let otp_store = OtpStore::new(redis.clone());
        let mailer = Mailer::new(&settings.smtp).expect("mailer setup failed");
        let snowflake = Arc::new(SnowflakeGenerator::new(31, 31));
        let gateway = Arc::new(ChatGateway::new());

        let state = AppState {
            db,
            redis,
            otp_store,
            mailer,
            snowflake,
            gateway,
            settings: Arc::new(settings),
        };

        // Unique client IP per TestApp so the rate limiter keys don't
        // collide across tests
        let suffix = uuid::Uuid::new_v4().as_u128();
        let client_ip = format!(
            "10.{}.{}.{}",
            (suffix >> 16) & 0xFF,
            (suffix >> 8) & 0xFF,
            suffix & 0xFF
        );

        Some(Self {
            router: create_routes(state),
            client_ip,
        })
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", &self.client_ip)
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(self.builder("GET", uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            self.builder("GET", uri)
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response<Body> {
        self.send(
            self.builder("POST", uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_json_auth(&self, uri: &str, body: &Value, token: &str) -> Response<Body> {
        self.send(
            self.builder("POST", uri)
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.post_json_auth(uri, &serde_json::json!({}), token).await
    }

    pub async fn patch_json_auth(&self, uri: &str, body: &Value, token: &str) -> Response<Body> {
        self.send(
            self.builder("PATCH", uri)
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            self.builder("DELETE", uri)
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Register an account and return `(account_id, access_token)`.
    pub async fn register(&self, role: &str, email: &str) -> (String, String) {
        let mut body = serde_json::json!({
            "full_name": "Test Person",
            "email": email,
            "password": "integration-pass-1",
        });
        if role == "agent" {
            body["license_number"] = Value::String("RE-0001".into());
        }

        let response = self
            .post_json(&format!("/api/v1/auth/{}/register", role), &body)
            .await;
        assert_eq!(response.status(), 201, "registration failed for {}", role);

        let json = read_json(response).await;
        (
            json["account"]["id"].as_str().unwrap().to_string(),
            json["access_token"].as_str().unwrap().to_string(),
        )
    }
}

/// Read a response body as JSON.
pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Generate a unique test email.
pub fn unique_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4().simple())
}
