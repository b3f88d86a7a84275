/// Public-facing profile of an admin account
use crate::{
    admin::AdminGrant,
    error::{PlatformError, PlatformResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub user_id: String,
    pub cover_image: Option<String>,
    pub profile_icon: Option<String>,
    pub description: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub website: Option<String>,
    pub linked_in: Option<String>,
    pub followers: i64,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfileChanges {
    pub cover_image: Option<String>,
    pub profile_icon: Option<String>,
    pub description: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub website: Option<String>,
    pub linked_in: Option<String>,
}

#[derive(Clone)]
pub struct AdminProfileManager {
    db: SqlitePool,
}

impl AdminProfileManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Profile owned by `user_id`, if one was ever created
    pub async fn get(&self, user_id: &str) -> PlatformResult<AdminProfile> {
        sqlx::query_as::<_, AdminProfile>(
            "SELECT id, user_id, cover_image, profile_icon, description, facebook, twitter,
                    instagram, youtube, website, linked_in, followers, updated_at
             FROM admin_profile WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| PlatformError::NotFound("Admin profile not found".to_string()))
    }

    /// Create or update the calling admin's own profile.
    ///
    /// A new profile starts with zero followers; updates never touch the count.
    pub async fn upsert(&self, grant: &AdminGrant, changes: &AdminProfileChanges) -> PlatformResult<AdminProfile> {
        sqlx::query(
            "INSERT INTO admin_profile (id, user_id, cover_image, profile_icon, description, facebook,
                                        twitter, instagram, youtube, website, linked_in, followers, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12)
             ON CONFLICT(user_id) DO UPDATE SET
                cover_image = COALESCE(excluded.cover_image, admin_profile.cover_image),
                profile_icon = COALESCE(excluded.profile_icon, admin_profile.profile_icon),
                description = COALESCE(excluded.description, admin_profile.description),
                facebook = COALESCE(excluded.facebook, admin_profile.facebook),
                twitter = COALESCE(excluded.twitter, admin_profile.twitter),
                instagram = COALESCE(excluded.instagram, admin_profile.instagram),
                youtube = COALESCE(excluded.youtube, admin_profile.youtube),
                website = COALESCE(excluded.website, admin_profile.website),
                linked_in = COALESCE(excluded.linked_in, admin_profile.linked_in),
                updated_at = excluded.updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(grant.admin_id())
        .bind(&changes.cover_image)
        .bind(&changes.profile_icon)
        .bind(&changes.description)
        .bind(&changes.facebook)
        .bind(&changes.twitter)
        .bind(&changes.instagram)
        .bind(&changes.youtube)
        .bind(&changes.website)
        .bind(&changes.linked_in)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        tracing::info!(admin_id = grant.admin_id(), "Admin profile saved");

        self.get(grant.admin_id()).await
    }
}
