/// Admin authorization policy
use crate::{
    db::account::Account,
    error::{PlatformError, PlatformResult},
};
use std::collections::HashSet;

/// Proof that the policy accepted a caller as admin.
///
/// Only [`AuthorizationPolicy::authorize`] constructs one, and every
/// admin-only operation takes it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminGrant {
    admin_id: String,
}

impl AdminGrant {
    pub fn admin_id(&self) -> &str {
        &self.admin_id
    }
}

/// Decides admin permission from a fixed set of account ids
#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    admin_ids: HashSet<String>,
}

impl AuthorizationPolicy {
    pub fn new<I, S>(admin_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admin_ids: admin_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Ids compare verbatim
    pub fn is_admin(&self, account_id: &str) -> bool {
        self.admin_ids.contains(account_id)
    }

    /// Grant admin rights to an already authenticated account
    pub fn authorize(&self, account: &Account) -> PlatformResult<AdminGrant> {
        if self.is_admin(&account.id) {
            Ok(AdminGrant {
                admin_id: account.id.clone(),
            })
        } else {
            tracing::warn!(account_id = %account.id, "Admin action refused");
            Err(PlatformError::Unauthorized(
                "Only admin can perform this action".to_string(),
            ))
        }
    }

    #[cfg(test)]
    pub(crate) fn grant_for_tests(admin_id: &str) -> AdminGrant {
        AdminGrant {
            admin_id: admin_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::account::{AccountStatus, UserType};
    use chrono::Utc;

    fn account(id: &str, user_type: UserType) -> Account {
        Account {
            id: id.to_string(),
            email: format!("{}@x.com", id),
            password_hash: String::new(),
            display_name: id.to_string(),
            first_name: None,
            last_name: None,
            birth_date: None,
            profile_icon: None,
            gender: None,
            user_type,
            status: AccountStatus::Active,
            last_profile_update: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_configured_admin_is_authorized() {
        let policy = AuthorizationPolicy::new(["root", "ops"]);
        let grant = policy.authorize(&account("ops", UserType::User)).unwrap();
        assert_eq!(grant.admin_id(), "ops");
    }

    #[test]
    fn test_other_accounts_are_unauthorized() {
        let policy = AuthorizationPolicy::new(["root"]);
        assert!(matches!(
            policy.authorize(&account("alice", UserType::User)),
            Err(PlatformError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_user_type_tag_grants_nothing() {
        let policy = AuthorizationPolicy::new(["root"]);
        assert!(policy.authorize(&account("mallory", UserType::Admin)).is_err());
    }

    #[test]
    fn test_ids_compare_verbatim() {
        let policy = AuthorizationPolicy::new(["Root"]);
        assert!(policy.is_admin("Root"));
        assert!(!policy.is_admin("root"));
        assert!(!policy.is_admin(" Root"));
    }

    #[test]
    fn test_empty_policy_denies_everyone() {
        let policy = AuthorizationPolicy::default();
        assert!(!policy.is_admin(""));
    }
}
