/// Account management system
///
/// Handles registration, credential checks, token issuance and self-service
/// profile edits.

mod manager;
pub mod password;
pub mod throttle;
pub mod token;

pub use manager::{AccountManager, MAX_PAGE_SIZE};
pub use password::PasswordHasher;
pub use throttle::ProfileMutationThrottle;
pub use token::{Claims, IssuedToken, TokenService};

use crate::db::account::{Account, AccountStatus, Gender, UserType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: AccountView,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Account as exposed over the API (never includes the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub email: String,
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

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            display_name: account.display_name,
            first_name: account.first_name,
            last_name: account.last_name,
            birth_date: account.birth_date,
            profile_icon: account.profile_icon,
            gender: account.gender,
            user_type: account.user_type,
            status: account.status,
            last_profile_update: account.last_profile_update,
            created_at: account.created_at,
        }
    }
}

/// Response for mutations that return the affected account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMessageResponse {
    pub message: String,
    pub user: AccountView,
}

/// Paginated account listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAccountsResponse {
    pub users: Vec<AccountView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}
