/// Account lifecycle state machine
///
/// active <-> blocked, any -> deleted, deleted -> active, and an irreversible
/// hard delete that removes the account together with everything it owns.
use crate::{
    admin::AdminGrant,
    db::{
        account::{self as account_db, Account, AccountStatus},
        owned::{self, CascadeReport},
    },
    error::{PlatformError, PlatformResult},
};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

/// Admin-initiated status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Block,
    Unblock,
    SoftDelete,
    Restore,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Block => "block",
            LifecycleAction::Unblock => "unblock",
            LifecycleAction::SoftDelete => "soft_delete",
            LifecycleAction::Restore => "restore",
        }
    }

    /// Status reached by applying this action to `from`
    pub fn apply(self, from: AccountStatus) -> PlatformResult<AccountStatus> {
        use AccountStatus::*;

        match (self, from) {
            (LifecycleAction::Block, Active | Blocked) => Ok(Blocked),
            (LifecycleAction::Unblock, Blocked | Active) => Ok(Active),
            (LifecycleAction::SoftDelete, _) => Ok(Deleted),
            (LifecycleAction::Restore, Deleted) => Ok(Active),
            (LifecycleAction::Restore, _) => {
                Err(PlatformError::InvalidState("User is not deleted".to_string()))
            }
            (LifecycleAction::Block | LifecycleAction::Unblock, Deleted) => {
                Err(PlatformError::InvalidState(format!(
                    "Cannot {} a deleted user, restore it first",
                    self.as_str()
                )))
            }
        }
    }
}

/// Applies lifecycle transitions against the account store
#[derive(Clone)]
pub struct AccountLifecycleManager {
    db: SqlitePool,
}

impl AccountLifecycleManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// active | blocked -> blocked
    pub async fn block(&self, grant: &AdminGrant, account_id: &str) -> PlatformResult<Account> {
        self.transition(grant, account_id, LifecycleAction::Block).await
    }

    /// blocked | active -> active
    pub async fn unblock(&self, grant: &AdminGrant, account_id: &str) -> PlatformResult<Account> {
        self.transition(grant, account_id, LifecycleAction::Unblock).await
    }

    /// any -> deleted
    pub async fn soft_delete(&self, grant: &AdminGrant, account_id: &str) -> PlatformResult<Account> {
        self.transition(grant, account_id, LifecycleAction::SoftDelete).await
    }

    /// deleted -> active
    pub async fn restore(&self, grant: &AdminGrant, account_id: &str) -> PlatformResult<Account> {
        self.transition(grant, account_id, LifecycleAction::Restore).await
    }

    /// Apply `action` to an account.
    ///
    /// The write only lands if the status is still the one the decision was
    /// based on; otherwise the caller gets InvalidState and nothing changes.
    pub async fn transition(
        &self,
        grant: &AdminGrant,
        account_id: &str,
        action: LifecycleAction,
    ) -> PlatformResult<Account> {
        let account = self.load(account_id).await?;
        let from = account.status;
        let to = action.apply(from)?;

        if from == to {
            tracing::debug!(
                admin_id = grant.admin_id(),
                account_id,
                action = action.as_str(),
                status = %from,
                "Lifecycle action is a no-op"
            );
            return Ok(account);
        }

        let changed = account_db::compare_and_set_status(&self.db, account_id, from, to).await?;
        if changed == 0 {
            let current = self.load(account_id).await?;
            tracing::warn!(
                admin_id = grant.admin_id(),
                account_id,
                action = action.as_str(),
                expected = %from,
                found = %current.status,
                "Lifecycle action lost a concurrent update"
            );
            return Err(PlatformError::InvalidState(format!(
                "Account status changed concurrently (now {})",
                current.status
            )));
        }

        tracing::info!(
            admin_id = grant.admin_id(),
            account_id,
            action = action.as_str(),
            from = %from,
            to = %to,
            "Account status changed"
        );

        self.load(account_id).await
    }

    /// Irreversibly delete an account and every row it owns.
    ///
    /// Runs in one transaction; on any failure the transaction is rolled back
    /// and Internal is reported with nothing removed.
    ///
    /// The first statement must be a write. A transaction that reads first
    /// fails with BUSY_SNAPSHOT if another connection commits before it writes.
    pub async fn hard_delete(&self, grant: &AdminGrant, account_id: &str) -> PlatformResult<CascadeReport> {
        let mut tx = self.db.begin().await?;

        match Self::cascade(&mut tx, account_id).await {
            Ok(None) => {
                tx.rollback().await?;
                Err(PlatformError::NotFound("Account not found".to_string()))
            }
            Ok(Some(report)) => {
                tx.commit().await.map_err(|e| {
                    tracing::error!(account_id, error = %e, "Hard delete commit failed");
                    PlatformError::Internal("Failed to hard delete user".to_string())
                })?;

                tracing::info!(
                    admin_id = grant.admin_id(),
                    account_id,
                    comments = report.comments,
                    likes = report.likes,
                    playlist_entries = report.playlist_entries,
                    admin_profiles = report.admin_profiles,
                    "Account hard deleted"
                );

                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(account_id, error = %rollback_err, "Hard delete rollback failed");
                }
                tracing::error!(
                    admin_id = grant.admin_id(),
                    account_id,
                    error = %e,
                    "Hard delete failed, rolled back"
                );
                Err(PlatformError::Internal("Failed to hard delete user".to_string()))
            }
        }
    }

    /// Owned rows first, then the account, so no foreign key ever dangles.
    /// `None` when there was no account to delete.
    async fn cascade(
        conn: &mut SqliteConnection,
        account_id: &str,
    ) -> Result<Option<CascadeReport>, sqlx::Error> {
        let report = CascadeReport {
            comments: owned::delete_comments_by_owner(&mut *conn, account_id).await?,
            likes: owned::delete_likes_by_owner(&mut *conn, account_id).await?,
            playlist_entries: owned::delete_playlist_entries_by_owner(&mut *conn, account_id).await?,
            admin_profiles: owned::delete_admin_profiles_by_owner(&mut *conn, account_id).await?,
        };

        if account_db::delete(&mut *conn, account_id).await? == 0 {
            return Ok(None);
        }

        Ok(Some(report))
    }

    async fn load(&self, account_id: &str) -> PlatformResult<Account> {
        account_db::find_by_id(&self.db, account_id)
            .await?
            .ok_or_else(|| PlatformError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        admin::AuthorizationPolicy,
        db::{account::NewAccount, create_in_memory_pool, create_pool, run_migrations, DatabaseOptions},
    };
    use chrono::Utc;

    async fn setup() -> (SqlitePool, AccountLifecycleManager, AdminGrant) {
        let db = create_in_memory_pool().await.unwrap();
        let manager = AccountLifecycleManager::new(db.clone());
        let grant = AuthorizationPolicy::grant_for_tests("admin-account-id");
        (db, manager, grant)
    }

    async fn insert_account(db: &SqlitePool, id: &str) {
        account_db::insert(
            db,
            &NewAccount {
                id: id.to_string(),
                email: format!("{}@x.com", id),
                password_hash: "hash".to_string(),
                display_name: id.to_string(),
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    }

    /// One post plus a comment, like, playlist entry and admin profile owned by `user_id`
    async fn seed_owned_rows(db: &SqlitePool, user_id: &str) {
        let now = Utc::now();
        let post_id = format!("post-{}", user_id);

        sqlx::query("INSERT INTO post (id, title, created_at) VALUES (?1, 'A post', ?2)")
            .bind(&post_id)
            .bind(now)
            .execute(db)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO comment (id, post_id, user_id, content, created_at) VALUES (?1, ?2, ?3, 'hi', ?4)",
        )
        .bind(format!("comment-{}", user_id))
        .bind(&post_id)
        .bind(user_id)
        .bind(now)
        .execute(db)
        .await
        .unwrap();
        sqlx::query("INSERT INTO post_like (id, post_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(format!("like-{}", user_id))
            .bind(&post_id)
            .bind(user_id)
            .bind(now)
            .execute(db)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO playlist_entry (id, post_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(format!("playlist-{}", user_id))
        .bind(&post_id)
        .bind(user_id)
        .bind(now)
        .execute(db)
        .await
        .unwrap();
        sqlx::query("INSERT INTO admin_profile (id, user_id, updated_at) VALUES (?1, ?2, ?3)")
            .bind(format!("profile-{}", user_id))
            .bind(user_id)
            .bind(now)
            .execute(db)
            .await
            .unwrap();
    }

    #[test]
    fn test_transition_table() {
        use AccountStatus::*;
        use LifecycleAction::*;

        assert_eq!(Block.apply(Active).unwrap(), Blocked);
        assert_eq!(Block.apply(Blocked).unwrap(), Blocked);
        assert!(Block.apply(Deleted).is_err());

        assert_eq!(Unblock.apply(Blocked).unwrap(), Active);
        assert_eq!(Unblock.apply(Active).unwrap(), Active);
        assert!(Unblock.apply(Deleted).is_err());

        for from in [Active, Blocked, Deleted] {
            assert_eq!(SoftDelete.apply(from).unwrap(), Deleted);
        }

        assert_eq!(Restore.apply(Deleted).unwrap(), Active);
        assert!(matches!(Restore.apply(Active), Err(PlatformError::InvalidState(_))));
        assert!(matches!(Restore.apply(Blocked), Err(PlatformError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_block_and_unblock_are_idempotent() {
        let (db, manager, grant) = setup().await;
        insert_account(&db, "alice").await;

        assert_eq!(manager.block(&grant, "alice").await.unwrap().status, AccountStatus::Blocked);
        assert_eq!(manager.block(&grant, "alice").await.unwrap().status, AccountStatus::Blocked);

        assert_eq!(manager.unblock(&grant, "alice").await.unwrap().status, AccountStatus::Active);
        assert_eq!(manager.unblock(&grant, "alice").await.unwrap().status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_restore_only_from_deleted() {
        let (db, manager, grant) = setup().await;
        insert_account(&db, "alice").await;

        // Blocked, not deleted
        manager.block(&grant, "alice").await.unwrap();
        assert!(matches!(
            manager.restore(&grant, "alice").await,
            Err(PlatformError::InvalidState(_))
        ));

        manager.soft_delete(&grant, "alice").await.unwrap();
        assert_eq!(manager.restore(&grant, "alice").await.unwrap().status, AccountStatus::Active);

        // Second restore in a row fails
        assert!(matches!(
            manager.restore(&grant, "alice").await,
            Err(PlatformError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_deleted_account_cannot_be_blocked() {
        let (db, manager, grant) = setup().await;
        insert_account(&db, "alice").await;

        manager.soft_delete(&grant, "alice").await.unwrap();
        assert!(matches!(
            manager.block(&grant, "alice").await,
            Err(PlatformError::InvalidState(_))
        ));
        assert!(matches!(
            manager.unblock(&grant, "alice").await,
            Err(PlatformError::InvalidState(_))
        ));

        let stored = account_db::find_by_id(&db, "alice").await.unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::Deleted);
    }

    #[tokio::test]
    async fn test_admin_transitions_leave_profile_timestamp_alone() {
        let (db, manager, grant) = setup().await;
        insert_account(&db, "alice").await;

        manager.block(&grant, "alice").await.unwrap();
        manager.soft_delete(&grant, "alice").await.unwrap();
        let restored = manager.restore(&grant, "alice").await.unwrap();

        assert!(restored.last_profile_update.is_none());
    }

    #[tokio::test]
    async fn test_transition_on_missing_account() {
        let (_db, manager, grant) = setup().await;
        assert!(matches!(
            manager.block(&grant, "ghost").await,
            Err(PlatformError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_hard_delete_removes_owned_rows() {
        let (db, manager, grant) = setup().await;
        insert_account(&db, "alice").await;
        insert_account(&db, "bob").await;
        seed_owned_rows(&db, "alice").await;
        seed_owned_rows(&db, "bob").await;

        let report = manager.hard_delete(&grant, "alice").await.unwrap();
        assert_eq!(
            report,
            CascadeReport {
                comments: 1,
                likes: 1,
                playlist_entries: 1,
                admin_profiles: 1,
            }
        );

        assert!(account_db::find_by_id(&db, "alice").await.unwrap().is_none());
        assert_eq!(owned::count_by_owner(&db, "alice").await.unwrap().total(), 0);

        // Other accounts are untouched
        assert!(account_db::find_by_id(&db, "bob").await.unwrap().is_some());
        assert_eq!(owned::count_by_owner(&db, "bob").await.unwrap().total(), 4);
    }

    #[tokio::test]
    async fn test_hard_delete_works_from_any_status() {
        let (db, manager, grant) = setup().await;
        insert_account(&db, "alice").await;
        manager.soft_delete(&grant, "alice").await.unwrap();

        let report = manager.hard_delete(&grant, "alice").await.unwrap();
        assert_eq!(report.total(), 0);
        assert!(account_db::find_by_id(&db, "alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hard_delete_rolls_back_on_failure() {
        let (db, manager, grant) = setup().await;
        insert_account(&db, "alice").await;
        seed_owned_rows(&db, "alice").await;

        // Fail the final step, after every owned row has been deleted
        sqlx::query(
            "CREATE TRIGGER fail_account_delete BEFORE DELETE ON account
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END",
        )
        .execute(&db)
        .await
        .unwrap();

        let result = manager.hard_delete(&grant, "alice").await;
        assert!(matches!(result, Err(PlatformError::Internal(_))));

        assert!(account_db::find_by_id(&db, "alice").await.unwrap().is_some());
        assert_eq!(
            owned::count_by_owner(&db, "alice").await.unwrap(),
            CascadeReport {
                comments: 1,
                likes: 1,
                playlist_entries: 1,
                admin_profiles: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_hard_delete_alongside_other_admin_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = create_pool(&dir.path().join("accounts.sqlite"), DatabaseOptions::default())
            .await
            .unwrap();
        run_migrations(&db).await.unwrap();
        let manager = AccountLifecycleManager::new(db.clone());
        let grant = AuthorizationPolicy::grant_for_tests("admin-account-id");

        for i in 0..30 {
            let id = format!("user-{}", i);
            insert_account(&db, &id).await;
            seed_owned_rows(&db, &id).await;
        }

        // Even accounts are hard deleted while odd ones are blocked
        let handles: Vec<_> = (0..30)
            .map(|i| {
                let manager = manager.clone();
                let grant = grant.clone();
                tokio::spawn(async move {
                    let id = format!("user-{}", i);
                    if i % 2 == 0 {
                        manager.hard_delete(&grant, &id).await.map(|_| ())
                    } else {
                        manager.block(&grant, &id).await.map(|_| ())
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(account_db::count(&db).await.unwrap(), 15);
        for i in 0..30 {
            let id = format!("user-{}", i);
            let stored = account_db::find_by_id(&db, &id).await.unwrap();
            if i % 2 == 0 {
                assert!(stored.is_none());
                assert_eq!(owned::count_by_owner(&db, &id).await.unwrap().total(), 0);
            } else {
                assert_eq!(stored.unwrap().status, AccountStatus::Blocked);
                assert_eq!(owned::count_by_owner(&db, &id).await.unwrap().total(), 4);
            }
        }
    }

    #[tokio::test]
    async fn test_hard_delete_missing_account() {
        let (_db, manager, grant) = setup().await;
        assert!(matches!(
            manager.hard_delete(&grant, "ghost").await,
            Err(PlatformError::NotFound(_))
        ));
    }
}
