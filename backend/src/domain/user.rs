//! User and item identifiers plus the owned-items read model.
//!
//! Identifiers are thin wrappers. Structural constraints (presence, length)
//! are enforced by [`crate::domain::Validator`] before an identifier reaches
//! the store, so these types never re-check them.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque user identifier (a UUID-v4 string when generated by the service).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier supplied by a caller.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Identifier of a reference item seeded outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap an item identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A user as returned by the create-user operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(example = "foo")]
    name: String,
}

impl User {
    /// Build a user from its parts.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Name supplied at creation.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// One owned item, joined with the owner's name.
///
/// This is both the store's read result and the cached projection, so the
/// field names double as the cache payload format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserItemRow {
    /// Name of the owning user.
    #[schema(example = "foo")]
    pub user_name: String,
    /// Display name of the item.
    #[schema(example = "Iron Sword")]
    pub item_name: String,
    /// Item identifier.
    #[schema(example = "item-1")]
    pub item_id: String,
}

impl UserItemRow {
    /// Build a row from borrowed parts.
    pub fn new(
        user_name: impl Into<String>,
        item_name: impl Into<String>,
        item_id: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            item_name: item_name.into(),
            item_id: item_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn random_user_ids_are_uuid_v4() {
        let id = UserId::random();
        let parsed = Uuid::parse_str(id.as_str()).expect("random id is a UUID");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[rstest]
    fn user_serialises_as_id_and_name() {
        let user = User::new(UserId::new("u-1"), "foo");
        let value = serde_json::to_value(&user).expect("serialise user");
        assert_eq!(value, json!({ "id": "u-1", "name": "foo" }));
    }

    #[rstest]
    fn user_item_row_uses_snake_case_fields() {
        let row = UserItemRow::new("foo", "Iron Sword", "item-1");
        let value = serde_json::to_value(&row).expect("serialise row");
        assert_eq!(
            value,
            json!({ "user_name": "foo", "item_name": "Iron Sword", "item_id": "item-1" })
        );
    }
}
