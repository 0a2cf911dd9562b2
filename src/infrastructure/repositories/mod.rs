//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! This module provides concrete implementations of the repository traits
//! defined in the domain layer. Each repository handles data access for
//! a specific entity type.
//!
//! ## Available Repositories
//!
//! - **AccountRepository** - Accounts across the agents/sellers/buyers tables
//! - **ListingRepository** - Property listings with filtered search
//! - **ShowingRepository** - Showing schedules and status transitions
//! - **ConversationRepository** - Chat threads with unread counters
//! - **MessageRepository** - Messages with keyset pagination
//! - **NotificationRepository** - Per-account notification records
//! - **PrivacyRepository** - Privacy settings and legal documents
//! - **SessionRepository** - Refresh-token sessions

pub mod account_repository;
pub mod conversation_repository;
pub mod listing_repository;
pub mod message_repository;
pub mod notification_repository;
pub mod privacy_repository;
pub mod session_repository;
pub mod showing_repository;

pub use account_repository::PgAccountRepository;
pub use conversation_repository::PgConversationRepository;
pub use listing_repository::PgListingRepository;
pub use message_repository::PgMessageRepository;
pub use notification_repository::PgNotificationRepository;
pub use privacy_repository::PgPrivacyRepository;
pub use session_repository::PgSessionRepository;
pub use showing_repository::PgShowingRepository;
