//! Configuration Management
//!
//! Layered application settings loaded from files and environment.

mod settings;

pub use settings::{
    ChatSettings, CorsSettings, DatabaseSettings, JwtSettings, OtpSettings, RateLimitSettings,
    RedisSettings, ServerSettings, Settings, SmtpSettings, SnowflakeSettings, WebSocketSettings,
    MIN_JWT_SECRET_LENGTH,
};
