use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{ListEntry, NewListEntry, Profile, ProfilePatch, User};

use super::Store;

/// In-memory store used by the test suite and local development.
///
/// A single write lock guards all tables, so the duplicate check inside
/// `add_entry` is atomic here; the uniqueness-constraint race only
/// exists against the SQL store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    profiles: Vec<Profile>,
    entries: Vec<ListEntry>,
    next_user_id: i64,
    next_profile_id: i64,
    next_entry_id: i64,
}

impl Inner {
    fn next_user_id(&mut self) -> i64 {
        self.next_user_id += 1;
        self.next_user_id
    }

    fn next_profile_id(&mut self) -> i64 {
        self.next_profile_id += 1;
        self.next_profile_id
    }

    fn next_entry_id(&mut self) -> i64 {
        self.next_entry_id += 1;
        self.next_entry_id
    }
}

impl MemoryStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let user = User {
            id: inner.next_user_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            email: email.map(str::to_string),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_profiles(&self, user_id: i64) -> AppResult<Vec<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_profile(
        &self,
        user_id: i64,
        name: &str,
        avatar: Option<&str>,
        preferences: serde_json::Value,
    ) -> AppResult<Profile> {
        let mut inner = self.inner.write().await;
        let profile = Profile {
            id: inner.next_profile_id(),
            user_id,
            name: name.to_string(),
            avatar: avatar.map(str::to_string),
            preferences,
        };
        inner.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn find_profile(&self, user_id: i64, profile_id: i64) -> AppResult<Option<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .iter()
            .find(|p| p.id == profile_id && p.user_id == user_id)
            .cloned())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        profile_id: i64,
        patch: ProfilePatch,
    ) -> AppResult<Option<Profile>> {
        let mut inner = self.inner.write().await;
        let profile = inner
            .profiles
            .iter_mut()
            .find(|p| p.id == profile_id && p.user_id == user_id);

        let Some(profile) = profile else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            profile.name = name;
        }
        if let Some(avatar) = patch.avatar {
            profile.avatar = Some(avatar);
        }
        if let Some(preferences) = patch.preferences {
            profile.preferences = preferences;
        }
        Ok(Some(profile.clone()))
    }

    async fn delete_profile(&self, user_id: i64, profile_id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.profiles.len();
        inner
            .profiles
            .retain(|p| !(p.id == profile_id && p.user_id == user_id));

        if inner.profiles.len() == before {
            return Ok(false);
        }

        // Entries cannot outlive their profile
        inner.entries.retain(|e| e.profile_id != profile_id);
        Ok(true)
    }

    async fn list_entries(&self, profile_id: i64) -> AppResult<Vec<ListEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .iter()
            .filter(|e| e.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn find_entry(&self, profile_id: i64, item_id: i64) -> AppResult<Option<ListEntry>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .iter()
            .find(|e| e.profile_id == profile_id && e.item_id == item_id)
            .cloned())
    }

    async fn add_entry(
        &self,
        user_id: i64,
        profile_id: i64,
        entry: NewListEntry,
    ) -> AppResult<ListEntry> {
        let mut inner = self.inner.write().await;
        if inner
            .entries
            .iter()
            .any(|e| e.profile_id == profile_id && e.item_id == entry.item_id)
        {
            return Err(AppError::Conflict("Item already in list".to_string()));
        }

        let entry = ListEntry {
            id: inner.next_entry_id(),
            profile_id,
            user_id,
            item_id: entry.item_id,
            title: entry.title,
            poster_path: entry.poster_path,
            media_type: entry.media_type,
            added_date: Utc::now(),
        };
        inner.entries.push(entry.clone());
        Ok(entry)
    }

    async fn remove_entry(&self, profile_id: i64, item_id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|e| !(e.profile_id == profile_id && e.item_id == item_id));
        Ok(inner.entries.len() != before)
    }
}
