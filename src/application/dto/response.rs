//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::application::services::AuthTokens;
use crate::domain::{
    Account, ChatMessage, Conversation, LegalDocument, Listing, Notification, Party,
    PrivacySettings, ShowingSchedule,
};

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Account response
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub role: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    pub created_at: String,
}

impl AccountResponse {
    /// Render an account. `include_contact` gates email/phone exposure: the
    /// account owner always sees them; other viewers only per the owner's
    /// privacy settings.
    pub fn from_account(account: Account, include_contact: bool) -> Self {
        Self {
            id: account.id.to_string(),
            role: account.role.as_str().to_string(),
            full_name: account.full_name,
            email: if include_contact {
                Some(account.email)
            } else {
                None
            },
            phone: if include_contact { account.phone } else { None },
            license_number: account.license_number,
            agency: account.agency,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Registration response (account plus tokens)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub account: AccountResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl RegisterResponse {
    pub fn new(account: Account, tokens: AuthTokens) -> Self {
        Self {
            account: AccountResponse::from_account(account, true),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: String,
    pub agent_id: String,
    pub seller_id: Option<String>,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub status: String,
    pub price_cents: i64,
    pub address: String,
    pub city: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id.to_string(),
            agent_id: listing.agent_id.to_string(),
            seller_id: listing.seller_id.map(|id| id.to_string()),
            title: listing.title,
            description: listing.description,
            property_type: listing.property_type.as_str().to_string(),
            status: listing.status.as_str().to_string(),
            price_cents: listing.price_cents,
            address: listing.address,
            city: listing.city,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            area_sqm: listing.area_sqm,
            created_at: listing.created_at.to_rfc3339(),
            updated_at: listing.updated_at.to_rfc3339(),
        }
    }
}

/// Showing response
#[derive(Debug, Serialize)]
pub struct ShowingResponse {
    pub id: String,
    pub listing_id: String,
    pub agent_id: String,
    pub buyer_id: String,
    pub status: String,
    pub scheduled_start: String,
    pub scheduled_end: String,
    pub note: Option<String>,
    pub decline_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ShowingSchedule> for ShowingResponse {
    fn from(showing: ShowingSchedule) -> Self {
        Self {
            id: showing.id.to_string(),
            listing_id: showing.listing_id.to_string(),
            agent_id: showing.agent_id.to_string(),
            buyer_id: showing.buyer_id.to_string(),
            status: showing.status.as_str().to_string(),
            scheduled_start: showing.scheduled_start.to_rfc3339(),
            scheduled_end: showing.scheduled_end.to_rfc3339(),
            note: showing.note,
            decline_reason: showing.decline_reason,
            created_at: showing.created_at.to_rfc3339(),
            updated_at: showing.updated_at.to_rfc3339(),
        }
    }
}

/// Conversation response, rendered for a specific viewer so `unread` is the
/// viewer's own counter
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub agent_id: String,
    pub contact_role: String,
    pub contact_id: String,
    pub listing_id: Option<String>,
    pub unread: i32,
    pub last_message_at: Option<String>,
    pub created_at: String,
}

impl ConversationResponse {
    pub fn for_viewer(conversation: Conversation, viewer: Party) -> Self {
        let unread = conversation.unread_for(viewer);
        Self {
            id: conversation.id.to_string(),
            agent_id: conversation.agent_id.to_string(),
            contact_role: conversation.contact_role.as_str().to_string(),
            contact_id: conversation.contact_id.to_string(),
            listing_id: conversation.listing_id.map(|id| id.to_string()),
            unread,
            last_message_at: conversation.last_message_at.map(|t| t.to_rfc3339()),
            created_at: conversation.created_at.to_rfc3339(),
        }
    }
}

/// Chat message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_role: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<ChatMessage> for MessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender_role: message.sender_role.as_str().to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Notification response
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub kind: String,
    pub body: String,
    pub reference_id: Option<String>,
    pub read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            kind: notification.kind.as_str().to_string(),
            body: notification.body,
            reference_id: notification.reference_id.map(|id| id.to_string()),
            read: notification.read,
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

/// Unread notification count response
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// Privacy settings response
#[derive(Debug, Serialize)]
pub struct PrivacySettingsResponse {
    pub show_email: bool,
    pub show_phone: bool,
    pub marketing_emails: bool,
    pub updated_at: String,
}

impl From<PrivacySettings> for PrivacySettingsResponse {
    fn from(settings: PrivacySettings) -> Self {
        Self {
            show_email: settings.show_email,
            show_phone: settings.show_phone,
            marketing_emails: settings.marketing_emails,
            updated_at: settings.updated_at.to_rfc3339(),
        }
    }
}

/// Legal document response
#[derive(Debug, Serialize)]
pub struct LegalDocumentResponse {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub version: i32,
    pub published_at: String,
}

impl From<LegalDocument> for LegalDocumentResponse {
    fn from(document: LegalDocument) -> Self {
        Self {
            slug: document.slug,
            title: document.title,
            body: document.body,
            version: document.version,
            published_at: document.published_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContactRole, Role};
    use chrono::Utc;

    #[test]
    fn test_conversation_unread_is_viewer_specific() {
        let conversation = Conversation {
            id: 1,
            agent_id: 10,
            contact_role: ContactRole::Buyer,
            contact_id: 20,
            agent_unread: 4,
            contact_unread: 7,
            ..Conversation::default()
        };

        let agent_view =
            ConversationResponse::for_viewer(conversation.clone(), Party::new(Role::Agent, 10));
        assert_eq!(agent_view.unread, 4);

        let buyer_view =
            ConversationResponse::for_viewer(conversation, Party::new(Role::Buyer, 20));
        assert_eq!(buyer_view.unread, 7);
    }

    #[test]
    fn test_account_response_hides_contact_details() {
        let account = Account {
            id: 5,
            role: Role::Seller,
            full_name: "Sam Seller".into(),
            email: "sam@example.com".into(),
            password_hash: "hash".into(),
            phone: Some("+1-555-0100".into()),
            license_number: None,
            agency: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let public = AccountResponse::from_account(account.clone(), false);
        assert!(public.email.is_none());
        assert!(public.phone.is_none());

        let own = AccountResponse::from_account(account, true);
        assert_eq!(own.email.as_deref(), Some("sam@example.com"));
    }
}
