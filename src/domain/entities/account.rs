//! Account entity and repository trait.
//!
//! Agents, sellers and buyers are three independent tables with the same
//! column shape except for the agent-only columns. One entity type carries a
//! `Role` discriminator; the repository routes queries to the right table.
//!
//! Table shape (`agents` / `sellers` / `buyers`):
//! - id: BIGINT PRIMARY KEY (Snowflake ID)
//! - full_name: VARCHAR(100) NOT NULL
//! - email: VARCHAR(255) NOT NULL UNIQUE
//! - password_hash: VARCHAR(255) NOT NULL
//! - phone: VARCHAR(32) NULL
//! - license_number: VARCHAR(64) NULL   -- agents only
//! - agency: VARCHAR(100) NULL          -- agents only
//! - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Role;
use crate::shared::error::AppError;

/// One account row from the agents, sellers or buyers table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Snowflake ID (primary key within the role's table)
    pub id: i64,

    /// Which table this account lives in
    pub role: Role,

    /// Full display name
    pub full_name: String,

    /// Email address (unique per table)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Contact phone number
    pub phone: Option<String>,

    /// Real-estate license number (agents only)
    pub license_number: Option<String>,

    /// Agency / brokerage name (agents only)
    pub agency: Option<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check whether the account may own listings.
    pub fn can_list_properties(&self) -> bool {
        self.role == Role::Agent
    }
}

impl Default for Account {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            role: Role::Buyer,
            full_name: String::new(),
            email: String::new(),
            password_hash: String::new(),
            phone: None,
            license_number: None,
            agency: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for account data access across the three role tables.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by role and Snowflake ID.
    async fn find_by_id(&self, role: Role, id: i64) -> Result<Option<Account>, AppError>;

    /// Find an account by role and email address.
    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, AppError>;

    /// Create a new account in the role's table.
    async fn create(&self, account: &Account) -> Result<Account, AppError>;

    /// Update profile fields (name, phone, agent columns).
    async fn update(&self, account: &Account) -> Result<Account, AppError>;

    /// Replace the stored password hash.
    async fn update_password(&self, role: Role, id: i64, password_hash: &str)
        -> Result<(), AppError>;

    /// Check if an email address is already registered for the role.
    async fn email_exists(&self, role: Role, email: &str) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_account(role: Role) -> Account {
        Account {
            id: 42,
            role,
            full_name: "Jordan Example".to_string(),
            email: "jordan@example.com".to_string(),
            password_hash: "hashed_password".to_string(),
            phone: None,
            license_number: None,
            agency: None,
            ..Account::default()
        }
    }

    #[test]
    fn test_only_agents_can_list_properties() {
        assert!(create_test_account(Role::Agent).can_list_properties());
        assert!(!create_test_account(Role::Seller).can_list_properties());
        assert!(!create_test_account(Role::Buyer).can_list_properties());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let account = create_test_account(Role::Buyer);
        let serialized = serde_json::to_string(&account).expect("Failed to serialize account");

        assert!(!serialized.contains("password_hash"));
        assert!(!serialized.contains("hashed_password"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let account = create_test_account(Role::Agent);
        let serialized = serde_json::to_string(&account).unwrap();
        assert!(serialized.contains("\"role\":\"agent\""));
    }
}
