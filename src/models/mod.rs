use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. Owns zero or more profiles.
///
/// The password digest never leaves the store layer; user-facing
/// responses are built field-by-field in the handlers.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
}

/// A named sub-identity under an account, with its own watchlist.
///
/// `user_id` is set once at creation from the authenticated caller and
/// never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub avatar: Option<String>,
    /// Free-form JSON object of viewer preferences (defaults to `{}`).
    pub preferences: serde_json::Value,
}

/// Maximum length of a profile display name
pub const MAX_PROFILE_NAME_LEN: usize = 50;

/// Partial update for a profile; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

/// One saved catalog item on a profile's watchlist.
///
/// `(profile_id, item_id)` is unique: a profile never holds two entries
/// for the same catalog item. Entries are created and deleted, never
/// updated in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ListEntry {
    pub id: i64,
    pub profile_id: i64,
    pub user_id: i64,
    /// Externally-defined catalog id for the movie/show; opaque here.
    pub item_id: i64,
    pub title: String,
    pub poster_path: String,
    pub media_type: Option<String>,
    /// Server-assigned creation timestamp.
    pub added_date: DateTime<Utc>,
}

/// Attributes for a new list entry, before the server assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewListEntry {
    pub item_id: i64,
    pub title: String,
    pub poster_path: String,
    pub media_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_serializes_preferences_object() {
        let profile = Profile {
            id: 1,
            user_id: 7,
            name: "Kids".to_string(),
            avatar: None,
            preferences: serde_json::json!({ "autoplay": false }),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["name"], "Kids");
        assert_eq!(json["preferences"]["autoplay"], false);
        assert!(json["avatar"].is_null());
    }

    #[test]
    fn test_list_entry_serializes_added_date() {
        let entry = ListEntry {
            id: 3,
            profile_id: 1,
            user_id: 7,
            item_id: 42,
            title: "Movie A".to_string(),
            poster_path: "/poster.jpg".to_string(),
            media_type: Some("movie".to_string()),
            added_date: Utc::now(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["item_id"], 42);
        assert_eq!(json["media_type"], "movie");
        assert!(json["added_date"].is_string());
    }
}
