/// Bulk removal of account-owned rows
///
/// These only run as part of an account hard delete; each owned entity keeps
/// its own CRUD path elsewhere. Every function takes a generic executor so the
/// caller can run them inside one transaction.
use serde::Serialize;
use sqlx::Sqlite;

/// Rows removed by a cascading account delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub comments: u64,
    pub likes: u64,
    pub playlist_entries: u64,
    pub admin_profiles: u64,
}

impl CascadeReport {
    pub fn total(&self) -> u64 {
        self.comments + self.likes + self.playlist_entries + self.admin_profiles
    }
}

pub async fn delete_comments_by_owner<'e, E>(executor: E, user_id: &str) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM comment WHERE user_id = ?1")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_likes_by_owner<'e, E>(executor: E, user_id: &str) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM post_like WHERE user_id = ?1")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_playlist_entries_by_owner<'e, E>(
    executor: E,
    user_id: &str,
) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM playlist_entry WHERE user_id = ?1")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_admin_profiles_by_owner<'e, E>(
    executor: E,
    user_id: &str,
) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM admin_profile WHERE user_id = ?1")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Count rows of every owned entity referencing `user_id`
pub async fn count_by_owner<'e, E>(executor: E, user_id: &str) -> Result<CascadeReport, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let (comments, likes, playlist_entries, admin_profiles): (i64, i64, i64, i64) =
        sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM comment WHERE user_id = ?1),
                (SELECT COUNT(*) FROM post_like WHERE user_id = ?1),
                (SELECT COUNT(*) FROM playlist_entry WHERE user_id = ?1),
                (SELECT COUNT(*) FROM admin_profile WHERE user_id = ?1)",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;

    Ok(CascadeReport {
        comments: comments as u64,
        likes: likes as u64,
        playlist_entries: playlist_entries as u64,
        admin_profiles: admin_profiles as u64,
    })
}
