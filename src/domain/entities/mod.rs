//! # Domain Entities
//!
//! Core domain entities representing the main business objects in the
//! marketplace. All entities map directly to their corresponding database
//! tables.
//!
//! ## Core Entities
//!
//! - **Account**: One account row from the agents / sellers / buyers tables
//! - **Listing**: A property listing owned by an agent
//! - **ShowingSchedule**: A tour request with a status lifecycle
//! - **Conversation**: A chat thread between an agent and a seller or buyer
//! - **ChatMessage**: A message inside a conversation
//!
//! ## Supporting Entities
//!
//! - **Notification**: Persistent per-account notification records
//! - **PrivacySettings / LegalDocument**: Privacy preferences and legal texts
//! - **Session**: Refresh-token sessions for JWT renewal
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access
//! operations. These traits are implemented in the infrastructure layer,
//! following the dependency inversion principle.

mod account;
mod conversation;
mod listing;
mod message;
mod notification;
mod privacy;
mod session;
mod showing;

// Re-export Account entity and related types
pub use account::{Account, AccountRepository};

// Re-export Listing entity and related types
pub use listing::{Listing, ListingFilter, ListingRepository, ListingStatus, PropertyType};

// Re-export ShowingSchedule entity and related types
pub use showing::{ShowingRepository, ShowingSchedule, ShowingStatus};

// Re-export Conversation entity and related types
pub use conversation::{Conversation, ConversationRepository};

// Re-export ChatMessage entity and related types
pub use message::{ChatMessage, MessageRepository, MAX_MESSAGE_LENGTH};

// Re-export Notification entity and related types
pub use notification::{Notification, NotificationKind, NotificationRepository};

// Re-export privacy module types
pub use privacy::{LegalDocument, PrivacyRepository, PrivacySettings};

// Re-export Session entity and related types
pub use session::{Session, SessionRepository};
