/// Account database models and operations
use crate::error::{PlatformError, PlatformResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row, Sqlite};
use std::{fmt, str::FromStr};

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Blocked,
    Deleted,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Blocked => "blocked",
            AccountStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = PlatformError;

    fn from_str(s: &str) -> PlatformResult<Self> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "blocked" => Ok(AccountStatus::Blocked),
            "deleted" => Ok(AccountStatus::Deleted),
            _ => Err(PlatformError::Validation(format!("Invalid account status: {}", s))),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender recorded on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl FromStr for Gender {
    type Err = PlatformError;

    fn from_str(s: &str) -> PlatformResult<Self> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            _ => Err(PlatformError::Validation(format!("Invalid gender: {}", s))),
        }
    }
}

/// Descriptive account type tag. Never consulted for admin permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Student,
    Teacher,
    Visitor,
    Worker,
    #[default]
    User,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Student => "STUDENT",
            UserType::Teacher => "TEACHER",
            UserType::Visitor => "VISITOR",
            UserType::Worker => "WORKER",
            UserType::User => "USER",
            UserType::Admin => "ADMIN",
        }
    }
}

impl FromStr for UserType {
    type Err = PlatformError;

    fn from_str(s: &str) -> PlatformResult<Self> {
        match s {
            "STUDENT" => Ok(UserType::Student),
            "TEACHER" => Ok(UserType::Teacher),
            "VISITOR" => Ok(UserType::Visitor),
            "WORKER" => Ok(UserType::Worker),
            "USER" => Ok(UserType::User),
            "ADMIN" => Ok(UserType::Admin),
            _ => Err(PlatformError::Validation(format!("Invalid user type: {}", s))),
        }
    }
}

/// Account record in the database
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub profile_icon: Option<String>,
    pub gender: Option<Gender>,
    pub user_type: UserType,
    pub status: AccountStatus,
    pub last_profile_update: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

fn decode_column<T: FromStr<Err = PlatformError>>(
    column: &str,
    value: &str,
) -> Result<T, sqlx::Error> {
    value.parse().map_err(|e: PlatformError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, SqliteRow> for Account {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let user_type: String = row.try_get("user_type")?;
        let gender: Option<String> = row.try_get("gender")?;

        Ok(Account {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            display_name: row.try_get("display_name")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            birth_date: row.try_get("birth_date")?,
            profile_icon: row.try_get("profile_icon")?,
            gender: gender
                .map(|g| decode_column("gender", &g))
                .transpose()?,
            user_type: decode_column("user_type", &user_type)?,
            status: decode_column("status", &status)?,
            last_profile_update: row.try_get("last_profile_update")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Fields for a freshly registered account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Self-service profile changes. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub profile_icon: Option<String>,
    pub gender: Option<Gender>,
    pub user_type: Option<UserType>,
}

/// Insert a new account with status `active`
pub async fn insert<'e, E>(executor: E, account: &NewAccount) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO account (id, email, password_hash, display_name, user_type, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&account.id)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(&account.display_name)
    .bind(UserType::default().as_str())
    .bind(AccountStatus::Active.as_str())
    .bind(account.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Get account by id
pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Account>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Account>(
        "SELECT id, email, password_hash, display_name, first_name, last_name, birth_date,
                profile_icon, gender, user_type, status, last_profile_update, created_at
         FROM account WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Get account by email (exact, case-sensitive match)
pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Account>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Account>(
        "SELECT id, email, password_hash, display_name, first_name, last_name, birth_date,
                profile_icon, gender, user_type, status, last_profile_update, created_at
         FROM account WHERE email = ?1",
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

/// List accounts ordered by id, starting after `cursor`
pub async fn list<'e, E>(
    executor: E,
    cursor: Option<&str>,
    limit: i64,
) -> Result<Vec<Account>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    match cursor {
        Some(cursor_id) => {
            sqlx::query_as::<_, Account>(
                "SELECT id, email, password_hash, display_name, first_name, last_name, birth_date,
                        profile_icon, gender, user_type, status, last_profile_update, created_at
                 FROM account
                 WHERE id > ?1
                 ORDER BY id
                 LIMIT ?2",
            )
            .bind(cursor_id)
            .bind(limit)
            .fetch_all(executor)
            .await
        }
        None => {
            sqlx::query_as::<_, Account>(
                "SELECT id, email, password_hash, display_name, first_name, last_name, birth_date,
                        profile_icon, gender, user_type, status, last_profile_update, created_at
                 FROM account
                 ORDER BY id
                 LIMIT ?1",
            )
            .bind(limit)
            .fetch_all(executor)
            .await
        }
    }
}

/// Count all accounts regardless of status
pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM account")
        .fetch_one(executor)
        .await
}

/// Move an account from `expected` to `next`.
///
/// Returns the number of rows changed; zero means the account is gone or its
/// status no longer matches `expected`.
pub async fn compare_and_set_status<'e, E>(
    executor: E,
    id: &str,
    expected: AccountStatus,
    next: AccountStatus,
) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE account SET status = ?1 WHERE id = ?2 AND status = ?3")
        .bind(next.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Apply profile changes and stamp `last_profile_update`, unless the account
/// edited its profile after `window_start`.
///
/// Returns the number of rows changed; zero means the account is gone or a
/// newer edit landed first. Timestamps are written by the same encoder, so
/// the text comparison orders them chronologically.
pub async fn update_profile<'e, E>(
    executor: E,
    id: &str,
    changes: &ProfileChanges,
    updated_at: DateTime<Utc>,
    window_start: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE account SET
            first_name = COALESCE(?1, first_name),
            last_name = COALESCE(?2, last_name),
            display_name = COALESCE(?3, display_name),
            birth_date = COALESCE(?4, birth_date),
            profile_icon = COALESCE(?5, profile_icon),
            gender = COALESCE(?6, gender),
            user_type = COALESCE(?7, user_type),
            last_profile_update = ?8
         WHERE id = ?9
           AND (last_profile_update IS NULL OR last_profile_update <= ?10)",
    )
    .bind(&changes.first_name)
    .bind(&changes.last_name)
    .bind(&changes.display_name)
    .bind(changes.birth_date)
    .bind(&changes.profile_icon)
    .bind(changes.gender.map(|g| g.as_str()))
    .bind(changes.user_type.map(|t| t.as_str()))
    .bind(updated_at)
    .bind(id)
    .bind(window_start)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Delete the account row. Owned rows must already be gone.
pub async fn delete<'e, E>(executor: E, id: &str) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM account WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
