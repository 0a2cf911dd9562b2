//! Account roles and participant references.
//!
//! Agents, sellers and buyers live in three independent tables; `Role`
//! selects the table and `Party` identifies one row across all of them.

use serde::{Deserialize, Serialize};

/// The three independent account types of the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agent,
    Seller,
    Buyer,
}

impl Role {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "agent" => Some(Self::Agent),
            "seller" => Some(Self::Seller),
            "buyer" => Some(Self::Buyer),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Seller => "seller",
            Self::Buyer => "buyer",
        }
    }

    /// Table holding accounts of this role.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Agent => "agents",
            Self::Seller => "sellers",
            Self::Buyer => "buyers",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The non-agent side of a conversation: a seller or a buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactRole {
    Seller,
    Buyer,
}

impl ContactRole {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "seller" => Some(Self::Seller),
            "buyer" => Some(Self::Buyer),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Buyer => "buyer",
        }
    }
}

impl From<ContactRole> for Role {
    fn from(role: ContactRole) -> Self {
        match role {
            ContactRole::Seller => Role::Seller,
            ContactRole::Buyer => Role::Buyer,
        }
    }
}

impl TryFrom<Role> for ContactRole {
    type Error = ();

    fn try_from(role: Role) -> Result<Self, Self::Error> {
        match role {
            Role::Seller => Ok(ContactRole::Seller),
            Role::Buyer => Ok(ContactRole::Buyer),
            Role::Agent => Err(()),
        }
    }
}

impl std::fmt::Display for ContactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One account across the three account tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    pub role: Role,
    pub id: i64,
}

impl Party {
    pub fn new(role: Role, id: i64) -> Self {
        Self { role, id }
    }

    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Agent, Role::Seller, Role::Buyer] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_from_str_case_insensitive() {
        assert_eq!(Role::from_str("AGENT"), Some(Role::Agent));
        assert_eq!(Role::from_str("Seller"), Some(Role::Seller));
    }

    #[test]
    fn test_role_from_str_unknown() {
        assert_eq!(Role::from_str("admin"), None);
        assert_eq!(Role::from_str(""), None);
    }

    #[test]
    fn test_role_table_names() {
        assert_eq!(Role::Agent.table(), "agents");
        assert_eq!(Role::Seller.table(), "sellers");
        assert_eq!(Role::Buyer.table(), "buyers");
    }

    #[test]
    fn test_contact_role_excludes_agent() {
        assert!(ContactRole::try_from(Role::Agent).is_err());
        assert_eq!(ContactRole::try_from(Role::Buyer), Ok(ContactRole::Buyer));
        assert_eq!(ContactRole::try_from(Role::Seller), Ok(ContactRole::Seller));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), "\"agent\"");
        assert_eq!(
            serde_json::to_string(&ContactRole::Buyer).unwrap(),
            "\"buyer\""
        );
    }

    #[test]
    fn test_party_is_agent() {
        assert!(Party::new(Role::Agent, 1).is_agent());
        assert!(!Party::new(Role::Buyer, 1).is_agent());
    }
}
