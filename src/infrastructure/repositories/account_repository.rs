//! Account Repository Implementation
//!
//! PostgreSQL implementation of account operations. Agents, sellers and
//! buyers live in three tables with the same core shape; the repository
//! picks the table from the account's `Role`. The table name is always one
//! of three compile-time constants, never caller input.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Account, AccountRepository, Role};
use crate::shared::error::AppError;

/// PostgreSQL account repository implementation.
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Creates a new PgAccountRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// SELECT clause for the role's table, normalized to the common row shape.
    fn select_sql(role: Role) -> String {
        match role {
            Role::Agent => "SELECT id, full_name, email, password_hash, phone, \
                            license_number, agency, created_at, updated_at FROM agents"
                .to_string(),
            _ => format!(
                "SELECT id, full_name, email, password_hash, phone, \
                 NULL::varchar AS license_number, NULL::varchar AS agency, \
                 created_at, updated_at FROM {}",
                role.table()
            ),
        }
    }
}

/// Internal row type for account queries.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    full_name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    license_number: Option<String>,
    agency: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    /// Converts database row to domain Account entity.
    fn into_account(self, role: Role) -> Account {
        Account {
            id: self.id,
            role,
            full_name: self.full_name,
            email: self.email,
            password_hash: self.password_hash,
            phone: self.phone,
            license_number: self.license_number,
            agency: self.agency,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_id(&self, role: Role, id: i64) -> Result<Option<Account>, AppError> {
        let sql = format!("{} WHERE id = $1", Self::select_sql(role));
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_account(role)))
    }

    async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, AppError> {
        let sql = format!("{} WHERE email = $1", Self::select_sql(role));
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_account(role)))
    }

    /// Create a new account.
    ///
    /// The ID should be a pre-generated Snowflake ID from the application layer.
    async fn create(&self, account: &Account) -> Result<Account, AppError> {
        let row = match account.role {
            Role::Agent => {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    INSERT INTO agents (id, full_name, email, password_hash, phone, license_number, agency)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING id, full_name, email, password_hash, phone,
                              license_number, agency, created_at, updated_at
                    "#,
                )
                .bind(account.id)
                .bind(&account.full_name)
                .bind(&account.email)
                .bind(&account.password_hash)
                .bind(&account.phone)
                .bind(&account.license_number)
                .bind(&account.agency)
                .fetch_one(&self.pool)
                .await?
            }
            role => {
                let sql = format!(
                    r#"
                    INSERT INTO {} (id, full_name, email, password_hash, phone)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, full_name, email, password_hash, phone,
                              NULL::varchar AS license_number, NULL::varchar AS agency,
                              created_at, updated_at
                    "#,
                    role.table()
                );
                sqlx::query_as::<_, AccountRow>(&sql)
                    .bind(account.id)
                    .bind(&account.full_name)
                    .bind(&account.email)
                    .bind(&account.password_hash)
                    .bind(&account.phone)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(row.into_account(account.role))
    }

    async fn update(&self, account: &Account) -> Result<Account, AppError> {
        let row = match account.role {
            Role::Agent => {
                sqlx::query_as::<_, AccountRow>(
                    r#"
                    UPDATE agents
                    SET full_name = $2, phone = $3, license_number = $4, agency = $5,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, full_name, email, password_hash, phone,
                              license_number, agency, created_at, updated_at
                    "#,
                )
                .bind(account.id)
                .bind(&account.full_name)
                .bind(&account.phone)
                .bind(&account.license_number)
                .bind(&account.agency)
                .fetch_one(&self.pool)
                .await?
            }
            role => {
                let sql = format!(
                    r#"
                    UPDATE {}
                    SET full_name = $2, phone = $3, updated_at = NOW()
                    WHERE id = $1
                    RETURNING id, full_name, email, password_hash, phone,
                              NULL::varchar AS license_number, NULL::varchar AS agency,
                              created_at, updated_at
                    "#,
                    role.table()
                );
                sqlx::query_as::<_, AccountRow>(&sql)
                    .bind(account.id)
                    .bind(&account.full_name)
                    .bind(&account.phone)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(row.into_account(account.role))
    }

    async fn update_password(
        &self,
        role: Role,
        id: i64,
        password_hash: &str,
    ) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE {} SET password_hash = $2, updated_at = NOW() WHERE id = $1",
            role.table()
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", role, id)));
        }

        Ok(())
    }

    async fn email_exists(&self, role: Role, email: &str) -> Result<bool, AppError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE email = $1)",
            role.table()
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}
