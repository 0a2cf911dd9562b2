//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, JWT tokens, session rotation
//! - **PasswordResetService**: OTP request/verify/reset over email
//! - **ListingService**: Property listing CRUD and search
//! - **ShowingService**: Showing-schedule workflow and transitions
//! - **ChatService**: Conversations, messages, unread counters
//! - **NotificationService**: Notification listing and read state
//! - **PrivacyService**: Privacy settings and legal documents

pub mod auth_service;
pub mod password_reset_service;
pub mod listing_service;
pub mod showing_service;
pub mod chat_service;
pub mod notification_service;
pub mod privacy_service;

// Re-export auth service types
pub use auth_service::{
    decode_access_token, AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims,
    RegisterAccountDto,
};

// Re-export password reset service types
pub use password_reset_service::{
    PasswordResetError, PasswordResetService, PasswordResetServiceImpl,
};

// Re-export listing service types
pub use listing_service::{
    CreateListingDto, ListingError, ListingService, ListingServiceImpl, UpdateListingDto,
};

// Re-export showing service types
pub use showing_service::{
    RequestShowingDto, ShowingError, ShowingService, ShowingServiceImpl,
};

// Re-export chat service types
pub use chat_service::{ChatError, ChatService, ChatServiceImpl, SentMessage};

// Re-export notification service types
pub use notification_service::{
    NotificationError, NotificationService, NotificationServiceImpl,
};

// Re-export privacy service types
pub use privacy_service::{PrivacyError, PrivacyService, PrivacyServiceImpl, UpdatePrivacyDto};
