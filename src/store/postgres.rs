use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::{AppError, AppResult};
use crate::models::{ListEntry, NewListEntry, Profile, ProfilePatch, User};

use super::Store;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// PostgreSQL-backed store.
///
/// The schema carries `UNIQUE (profile_id, item_id)` on list entries and
/// `ON DELETE CASCADE` from profiles to entries, so uniqueness and
/// cascade semantics hold even when two requests race past the
/// handler-level checks.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> AppResult<User> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, email)
             VALUES ($1, $2, $3)
             RETURNING id, username, password_hash, email",
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Username already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_profiles(&self, user_id: i64) -> AppResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, name, avatar, preferences
             FROM profiles WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn create_profile(
        &self,
        user_id: i64,
        name: &str,
        avatar: Option<&str>,
        preferences: serde_json::Value,
    ) -> AppResult<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_id, name, avatar, preferences)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, name, avatar, preferences",
        )
        .bind(user_id)
        .bind(name)
        .bind(avatar)
        .bind(preferences)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_profile(&self, user_id: i64, profile_id: i64) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, name, avatar, preferences
             FROM profiles WHERE id = $1 AND user_id = $2",
        )
        .bind(profile_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        profile_id: i64,
        patch: ProfilePatch,
    ) -> AppResult<Option<Profile>> {
        // Fetch the ownership-checked row first, then persist the merge
        // and return the updated row itself.
        let Some(current) = self.find_profile(user_id, profile_id).await? else {
            return Ok(None);
        };

        let name = patch.name.unwrap_or(current.name);
        let avatar = patch.avatar.or(current.avatar);
        let preferences = patch.preferences.unwrap_or(current.preferences);

        let profile = sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET name = $1, avatar = $2, preferences = $3
             WHERE id = $4 AND user_id = $5
             RETURNING id, user_id, name, avatar, preferences",
        )
        .bind(name)
        .bind(avatar)
        .bind(preferences)
        .bind(profile_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn delete_profile(&self, user_id: i64, profile_id: i64) -> AppResult<bool> {
        // Entries go with the profile via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1 AND user_id = $2")
            .bind(profile_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_entries(&self, profile_id: i64) -> AppResult<Vec<ListEntry>> {
        let entries = sqlx::query_as::<_, ListEntry>(
            "SELECT id, profile_id, user_id, item_id, title, poster_path, media_type, added_date
             FROM list_entries WHERE profile_id = $1 ORDER BY id",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_entry(&self, profile_id: i64, item_id: i64) -> AppResult<Option<ListEntry>> {
        let entry = sqlx::query_as::<_, ListEntry>(
            "SELECT id, profile_id, user_id, item_id, title, poster_path, media_type, added_date
             FROM list_entries WHERE profile_id = $1 AND item_id = $2",
        )
        .bind(profile_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn add_entry(
        &self,
        user_id: i64,
        profile_id: i64,
        entry: NewListEntry,
    ) -> AppResult<ListEntry> {
        let result = sqlx::query_as::<_, ListEntry>(
            "INSERT INTO list_entries (profile_id, user_id, item_id, title, poster_path, media_type)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, profile_id, user_id, item_id, title, poster_path, media_type, added_date",
        )
        .bind(profile_id)
        .bind(user_id)
        .bind(entry.item_id)
        .bind(entry.title)
        .bind(entry.poster_path)
        .bind(entry.media_type)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(entry) => Ok(entry),
            // Two concurrent adds can both pass the handler's pre-check;
            // the loser hits the unique constraint and reports the same
            // Conflict as the friendly path.
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Item already in list".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_entry(&self, profile_id: i64, item_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM list_entries WHERE profile_id = $1 AND item_id = $2")
                .bind(profile_id)
                .bind(item_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
