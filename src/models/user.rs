use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::datetime;

/// Role granted to every registered account.
pub const ROLE_USER: &str = "ROLE_USER";

/// A user account as stored. The password hash never leaves the server;
/// responses go through [`UserView`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// A user ready to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            roles: user.roles.clone(),
            created_at: Some(datetime::format(&user.created_at)),
            updated_at: datetime::format_opt(user.updated_at.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_hides_password_and_uses_camel_case() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
            roles: vec![ROLE_USER.to_string()],
            created_at: datetime::parse("2024-05-01T10:00:00").unwrap(),
            updated_at: None,
        };

        let json = serde_json::to_value(UserView::from(&user)).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["firstName"], "Alice");
        assert!(json["lastName"].is_null());
        assert_eq!(json["roles"][0], ROLE_USER);
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00");
        assert!(json["updatedAt"].is_null());
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("secret"));
    }
}
