use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::User;

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Partial update payload. For the display names an absent field (`None`)
/// leaves the value untouched while an explicit `null` (`Some(None)`)
/// clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Public projection of a user. The `User` entity itself is not
/// serializable, so the password hash cannot leak through this type.
#[derive(Debug, Serialize)]
pub struct UserRead {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            hashed_password: "$2b$12$abcdefghijklmnopqrstuv".into(),
            first_name: Some("Alice".into()),
            last_name: None,
            is_active: true,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn projection_never_contains_password_fields() {
        let json = serde_json::to_string(&UserRead::from(sample_user())).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("$2b$"));
        assert!(json.contains("alice@example.com"));
    }

    #[test]
    fn projection_contains_public_fields() {
        let json = serde_json::to_value(UserRead::from(sample_user())).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["first_name"], "Alice");
        assert_eq!(json["last_name"], serde_json::Value::Null);
        assert_eq!(json["is_active"], true);
        assert_eq!(json["is_superuser"], false);
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let absent: UpdateUser = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(absent.first_name.is_none());

        let cleared: UpdateUser = serde_json::from_str(r#"{"first_name":null}"#).unwrap();
        assert_eq!(cleared.first_name, Some(None));

        let set: UpdateUser = serde_json::from_str(r#"{"first_name":"X"}"#).unwrap();
        assert_eq!(set.first_name, Some(Some("X".into())));
    }

    #[test]
    fn create_accepts_minimal_payload() {
        let payload: CreateUser =
            serde_json::from_str(r#"{"email":"a@b.co","password":"pw123"}"#).unwrap();
        assert_eq!(payload.email, "a@b.co");
        assert!(payload.first_name.is_none());
        assert!(payload.last_name.is_none());
    }
}
