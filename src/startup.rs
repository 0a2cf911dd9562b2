//! Application Startup
//!
//! Builds shared state, wires the router and runs the server.

use std::sync::Arc;

use anyhow::Context;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;
use crate::infrastructure::cache::{create_redis_client, OtpStore};
use crate::infrastructure::database::{create_pool, run_migrations};
use crate::infrastructure::email::Mailer;
use crate::presentation::http::routes::create_routes;
use crate::presentation::websocket::ChatGateway;
use crate::shared::snowflake::SnowflakeGenerator;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub otp_store: OtpStore,
    pub mailer: Mailer,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub gateway: Arc<ChatGateway>,
    pub settings: Arc<Settings>,
}

/// A built application ready to serve.
pub struct Application {
    listener: TcpListener,
    router: axum::Router,
    port: u16,
}

impl Application {
    /// Connect to external services, run migrations and bind the listener.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let db = create_pool(&settings.database)
            .await
            .context("Failed to create database pool")?;
        info!("Database pool created");

        run_migrations(&db)
            .await
            .context("Failed to run database migrations")?;
        info!("Database migrations applied");

        let redis = create_redis_client(&settings.redis)
            .await
            .context("Failed to connect to Redis")?;

        let otp_store = OtpStore::new(redis.clone());

        let mailer =
            Mailer::new(&settings.smtp).map_err(|e| anyhow::anyhow!("Mailer setup: {}", e))?;

        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            0,
        ));

        let gateway = Arc::new(ChatGateway::new());

        let addr = settings.server_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        let port = listener.local_addr()?.port();

        let state = AppState {
            db,
            redis,
            otp_store,
            mailer,
            snowflake,
            gateway,
            settings: Arc::new(settings),
        };

        let router = create_routes(state);

        Ok(Self {
            listener,
            router,
            port,
        })
    }

    /// The bound port (useful when binding port 0 in tests).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until the process is stopped.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        info!(port = self.port, "Listening");
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .context("Server error")
    }
}
