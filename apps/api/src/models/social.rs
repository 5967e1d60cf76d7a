use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SocialService {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialServicePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Flat join of `social_networking` with its service.
#[derive(Debug, Clone, FromRow)]
pub struct SocialLinkRecord {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub service_id: i64,
    pub service_name: String,
    pub service_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub service: SocialService,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SocialLinkRecord> for SocialLink {
    fn from(record: SocialLinkRecord) -> Self {
        SocialLink {
            id: record.id,
            user_id: record.user_id,
            url: record.url,
            service: SocialService {
                id: record.service_id,
                name: record.service_name,
                kind: record.service_type,
            },
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinkPayload {
    pub url: String,
    pub service_id: i64,
}
