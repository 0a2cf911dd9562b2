//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - OTP storage (Redis)
//! - SMTP email delivery
//! - Prometheus metrics

pub mod cache;
pub mod database;
pub mod email;
pub mod metrics;
pub mod repositories;
