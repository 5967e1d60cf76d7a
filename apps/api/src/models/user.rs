use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub screen_name: Option<String>,
    pub phone: Option<String>,
    pub email_address: Option<String>,
    pub about_me: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: UserProfileFields,
}

/// Profile fields a user may edit on their own account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub screen_name: Option<String>,
    pub phone: Option<String>,
    pub email_address: Option<String>,
    pub about_me: Option<String>,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: 1,
            username: "eli".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            first_name: Some("Eli".to_string()),
            last_name: None,
            screen_name: None,
            phone: None,
            email_address: None,
            about_me: None,
            location: None,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["firstName"], "Eli");
    }

    #[test]
    fn test_new_user_flattens_profile_fields() {
        let user: NewUser = serde_json::from_str(
            r#"{"username":"eli","password":"hunter22","screenName":"E.","location":"Berlin"}"#,
        )
        .unwrap();
        assert_eq!(user.profile.screen_name.as_deref(), Some("E."));
        assert_eq!(user.profile.location.as_deref(), Some("Berlin"));
    }
}
