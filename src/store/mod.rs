pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{ListEntry, NewListEntry, Profile, ProfilePatch, User};

/// Persistence seam for accounts, profiles and list entries.
///
/// Profile and entry lookups take the caller's account id and are scoped
/// at the query level, so a profile owned by someone else is
/// indistinguishable from one that does not exist. The store also holds
/// the uniqueness backstop for `(profile_id, item_id)`: `add_entry` must
/// fail with a Conflict when a concurrent insert wins the race, even
/// though handlers pre-check for duplicates.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts an account; Conflict if the username is taken.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> AppResult<User>;

    async fn find_user(&self, id: i64) -> AppResult<Option<User>>;

    /// All profiles owned by the account, in insertion order.
    async fn list_profiles(&self, user_id: i64) -> AppResult<Vec<Profile>>;

    async fn create_profile(
        &self,
        user_id: i64,
        name: &str,
        avatar: Option<&str>,
        preferences: serde_json::Value,
    ) -> AppResult<Profile>;

    /// Looks up a profile owned by the account; `None` covers both
    /// absence and foreign ownership.
    async fn find_profile(&self, user_id: i64, profile_id: i64) -> AppResult<Option<Profile>>;

    /// Applies the patch to an owned profile and returns the updated row,
    /// or `None` under the same ownership condition as `find_profile`.
    async fn update_profile(
        &self,
        user_id: i64,
        profile_id: i64,
        patch: ProfilePatch,
    ) -> AppResult<Option<Profile>>;

    /// Deletes an owned profile and all its list entries. Returns whether
    /// a row was deleted.
    async fn delete_profile(&self, user_id: i64, profile_id: i64) -> AppResult<bool>;

    /// All entries for the profile, in insertion order.
    async fn list_entries(&self, profile_id: i64) -> AppResult<Vec<ListEntry>>;

    async fn find_entry(&self, profile_id: i64, item_id: i64) -> AppResult<Option<ListEntry>>;

    /// Inserts an entry; Conflict if the profile already holds the item.
    async fn add_entry(
        &self,
        user_id: i64,
        profile_id: i64,
        entry: NewListEntry,
    ) -> AppResult<ListEntry>;

    /// Removes the entry for the item within the profile's scope. Returns
    /// whether a row was deleted.
    async fn remove_entry(&self, profile_id: i64, item_id: i64) -> AppResult<bool>;
}
