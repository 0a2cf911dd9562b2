//! Request DTOs
//!
//! Data structures for API request bodies.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Registration request (all three roles; license/agency are agent-only)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, max = 64, message = "License number must be 1-64 characters"))]
    pub license_number: Option<String>,

    #[validate(length(max = 100, message = "Agency must be at most 100 characters"))]
    pub agency: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Password reset code request
#[derive(Debug, Deserialize, Validate)]
pub struct RequestResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset code verification request
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Create listing request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    pub seller_id: Option<String>,

    #[validate(length(min = 2, max = 200, message = "Title must be 2-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    pub property_type: String,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: i64,

    #[validate(length(min = 1, max = 255, message = "Address must be 1-255 characters"))]
    pub address: String,

    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: String,

    #[validate(range(min = 0, max = 50, message = "Bedrooms must be 0-50"))]
    pub bedrooms: i32,

    #[validate(range(min = 0, max = 50, message = "Bathrooms must be 0-50"))]
    pub bathrooms: i32,

    pub area_sqm: Option<i32>,
}

/// Update listing request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 2, max = 200, message = "Title must be 2-200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    /// 'active' | 'pending' | 'sold' | 'withdrawn'
    pub status: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: Option<i64>,

    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqm: Option<i32>,
}

/// Listing search query parameters
#[derive(Debug, Deserialize, Default)]
pub struct ListingQueryParams {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub min_bedrooms: Option<i32>,
    /// Keyset cursor: listings with id below this
    pub before: Option<String>,
    pub limit: Option<i32>,
}

/// Request showing request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShowingRequest {
    pub listing_id: String,

    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,

    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,
}

/// Decline showing request
#[derive(Debug, Deserialize, Validate)]
pub struct DeclineShowingRequest {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

/// Open conversation request; the caller names the counterpart
#[derive(Debug, Deserialize)]
pub struct OpenConversationRequest {
    /// 'agent' | 'seller' | 'buyer'
    pub other_role: String,
    pub other_id: String,
    pub listing_id: Option<String>,
}

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,
}

/// Message history query parameters
#[derive(Debug, Deserialize, Default)]
pub struct MessageQueryParams {
    pub before: Option<String>,
    pub limit: Option<i32>,
}

/// Notification list query parameters
#[derive(Debug, Deserialize, Default)]
pub struct NotificationQueryParams {
    pub limit: Option<i32>,
}

/// Update privacy settings request
#[derive(Debug, Deserialize)]
pub struct UpdatePrivacyRequest {
    pub show_email: Option<bool>,
    pub show_phone: Option<bool>,
    pub marketing_emails: Option<bool>,
}

/// Parse a snowflake ID rendered as a JSON string.
pub fn parse_id(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            full_name: "Casey Agent".into(),
            email: "casey@example.com".into(),
            password: "long-enough-password".into(),
            phone: None,
            license_number: Some("RE-12345".into()),
            agency: None,
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".into(),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_send_message_length_bounds() {
        let empty = SendMessageRequest { content: "".into() };
        assert!(empty.validate().is_err());

        let too_long = SendMessageRequest {
            content: "x".repeat(4001),
        };
        assert!(too_long.validate().is_err());

        let ok = SendMessageRequest {
            content: "hello".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("123456789"), Some(123456789));
        assert_eq!(parse_id("abc"), None);
    }
}
