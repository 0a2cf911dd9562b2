//! Authentication Service
//!
//! Registration, login, JWT token management and session handling for the
//! three account tables. The JWT carries the account role so every request
//! can be resolved to a `Party` without guessing which table to look in.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::JwtSettings;
use crate::domain::{Account, AccountRepository, Party, Role, Session, SessionRepository};
use crate::shared::snowflake::SnowflakeGenerator;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account in the role's table
    async fn register(
        &self,
        role: Role,
        request: RegisterAccountDto,
    ) -> Result<(Account, AuthTokens), AuthError>;

    /// Authenticate an account with credentials
    async fn authenticate(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, AuthError>;

    /// Refresh access token using refresh token (rotates the refresh token)
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke refresh token (logout)
    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Get the current account from an access token
    async fn get_current_account(&self, access_token: &str) -> Result<Account, AuthError>;
}

/// Registration input
#[derive(Debug, Clone)]
pub struct RegisterAccountDto {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    /// Agents only
    pub license_number: Option<String>,
    /// Agents only
    pub agency: Option<String>,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Account role ('agent' | 'seller' | 'buyer')
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Resolve the claims to a party reference.
    pub fn party(&self) -> Result<Party, AuthError> {
        let id = self.sub.parse::<i64>().map_err(|_| AuthError::InvalidToken)?;
        let role = Role::from_str(&self.role).ok_or(AuthError::InvalidToken)?;
        Ok(Party::new(role, id))
    }
}

/// Decode and validate an access token into its claims.
///
/// Shared with the HTTP auth middleware and the WebSocket query-string
/// authentication path.
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("License number is required for agents")]
    LicenseRequired,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// AuthService implementation
pub struct AuthServiceImpl<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    account_repo: Arc<A>,
    session_repo: Arc<S>,
    id_generator: Arc<SnowflakeGenerator>,
    jwt_settings: JwtSettings,
}

impl<A, S> AuthServiceImpl<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    /// Create a new AuthServiceImpl
    pub fn new(
        account_repo: Arc<A>,
        session_repo: Arc<S>,
        id_generator: Arc<SnowflakeGenerator>,
        jwt_settings: JwtSettings,
    ) -> Self {
        Self {
            account_repo,
            session_repo,
            id_generator,
            jwt_settings,
        }
    }

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Generate access and refresh tokens for an account
    fn generate_tokens(&self, account: Party) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();
        let access_expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);

        let access_claims = Claims {
            sub: account.id.to_string(),
            role: account.role.as_str().to_string(),
            exp: access_expiry.timestamp(),
            iat: now.timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        // Opaque refresh token: no account information in the token itself
        let refresh_token = format!("{}.{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
            token_type: "Bearer".to_string(),
        })
    }

    /// Hash refresh token for storage
    fn hash_refresh_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Persist a session row for a freshly issued refresh token
    async fn store_session(&self, account: Party, refresh_token: &str) -> Result<(), AuthError> {
        let session = Session {
            id: uuid::Uuid::new_v4(),
            account_role: account.role,
            account_id: account.id,
            refresh_token_hash: self.hash_refresh_token(refresh_token),
            expires_at: Utc::now() + Duration::days(self.jwt_settings.refresh_token_expiry_days),
            created_at: Utc::now(),
        };

        self.session_repo
            .create(&session)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl<A, S> AuthService for AuthServiceImpl<A, S>
where
    A: AccountRepository + 'static,
    S: SessionRepository + 'static,
{
    async fn register(
        &self,
        role: Role,
        request: RegisterAccountDto,
    ) -> Result<(Account, AuthTokens), AuthError> {
        if role == Role::Agent && request.license_number.is_none() {
            return Err(AuthError::LicenseRequired);
        }

        if self
            .account_repo
            .email_exists(role, &request.email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::EmailExists);
        }

        let password_hash = self.hash_password(&request.password)?;

        let now = Utc::now();
        let account = Account {
            id: self.id_generator.generate(),
            role,
            full_name: request.full_name,
            email: request.email,
            password_hash,
            phone: request.phone,
            license_number: if role == Role::Agent {
                request.license_number
            } else {
                None
            },
            agency: if role == Role::Agent {
                request.agency
            } else {
                None
            },
            created_at: now,
            updated_at: now,
        };

        let created = self
            .account_repo
            .create(&account)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let party = Party::new(created.role, created.id);
        let tokens = self.generate_tokens(party)?;
        self.store_session(party, &tokens.refresh_token).await?;

        Ok((created, tokens))
    }

    async fn authenticate(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, AuthError> {
        let account = self
            .account_repo
            .find_by_email(role, email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let party = Party::new(account.role, account.id);
        let tokens = self.generate_tokens(party)?;
        self.store_session(party, &tokens.refresh_token).await?;

        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let token_hash = self.hash_refresh_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        // Token rotation: the presented refresh token is retired and a new
        // session row replaces it
        self.session_repo
            .delete_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let tokens = self.generate_tokens(session.account())?;
        self.store_session(session.account(), &tokens.refresh_token)
            .await?;

        Ok(tokens)
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = self.hash_refresh_token(refresh_token);

        self.session_repo
            .delete_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(())
    }

    async fn get_current_account(&self, access_token: &str) -> Result<Account, AuthError> {
        let claims = decode_access_token(access_token, &self.jwt_settings.secret)?;
        let party = claims.party()?;

        self.account_repo
            .find_by_id(party.role, party.id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::AccountNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-that-is-long-enough-32b".to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        }
    }

    fn encode_claims(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_claims_roundtrip_carries_role() {
        let settings = test_settings();
        let claims = Claims {
            sub: "42".to_string(),
            role: "seller".to_string(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            iat: Utc::now().timestamp(),
            jti: None,
        };
        let token = encode_claims(&claims, &settings.secret);

        let decoded = decode_access_token(&token, &settings.secret).unwrap();
        assert_eq!(decoded.party().unwrap(), Party::new(Role::Seller, 42));
    }

    #[test]
    fn test_expired_token_rejected() {
        let settings = test_settings();
        let claims = Claims {
            sub: "1".to_string(),
            role: "agent".to_string(),
            exp: (Utc::now() - Duration::minutes(5)).timestamp(),
            iat: (Utc::now() - Duration::minutes(20)).timestamp(),
            jti: None,
        };
        let token = encode_claims(&claims, &settings.secret);

        assert!(matches!(
            decode_access_token(&token, &settings.secret),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let settings = test_settings();
        let claims = Claims {
            sub: "1".to_string(),
            role: "buyer".to_string(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            iat: Utc::now().timestamp(),
            jti: None,
        };
        let token = encode_claims(&claims, "another-secret-that-is-long-enough");

        assert!(matches!(
            decode_access_token(&token, &settings.secret),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_unknown_role_claim_rejected() {
        let claims = Claims {
            sub: "1".to_string(),
            role: "admin".to_string(),
            exp: 0,
            iat: 0,
            jti: None,
        };
        assert!(matches!(claims.party(), Err(AuthError::InvalidToken)));
    }
}
