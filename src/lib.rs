//! # Estate Server Library
//!
//! This crate provides a real-estate marketplace backend with:
//! - RESTful HTTP API for listings, showings, notifications and accounts
//! - WebSocket channel for real-time conversation messaging
//! - PostgreSQL for persistent storage
//! - Redis for OTP codes and rate limiting
//! - SMTP delivery for password-reset codes
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, cache, email and metrics implementations
//! - **Presentation Layer**: HTTP handlers and the WebSocket chat gateway
//!
//! ## Module Structure
//!
//! ```text
//! estate_server/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities, value objects, and traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Database, cache, email and metrics implementations
//! +-- presentation/  HTTP routes and WebSocket handlers
//! +-- shared/        Common utilities (errors, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
