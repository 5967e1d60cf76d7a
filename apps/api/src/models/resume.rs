use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Industry {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndustryPayload {
    pub title: String,
}

/// An industry attached to an experience, as read from the join table.
#[derive(Debug, Clone, FromRow)]
pub struct ExperienceIndustryLink {
    pub experience_id: i64,
    pub id: i64,
    pub title: String,
}

impl From<ExperienceIndustryLink> for Industry {
    fn from(link: ExperienceIndustryLink) -> Self {
        Industry {
            id: link.id,
            title: link.title,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: i64,
    pub user_id: i64,
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub grade: Option<String>,
    pub activities: Vec<String>,
    pub accomplishments: Vec<String>,
    pub media: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationPayload {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub grade: Option<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub accomplishments: Vec<String>,
    pub media: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub headline: Option<String>,
    pub responsibilities: Vec<String>,
    pub media: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Experience {
    #[serde(flatten)]
    pub row: ExperienceRow,
    pub industries: Vec<Industry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePayload {
    pub title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub headline: Option<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    pub media: Option<String>,
    /// Ids of existing industries.
    #[serde(default)]
    pub industries: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: i64,
    pub user_id: i64,
    pub professional: Vec<String>,
    pub workflow: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillPayload {
    #[serde(default)]
    pub professional: Vec<String>,
    #[serde(default)]
    pub workflow: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    App,
    Website,
    Library,
    #[default]
    Other,
}

impl ProjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::App => "app",
            ProjectKind::Website => "website",
            ProjectKind::Library => "library",
            ProjectKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub note: Option<String>,
    pub kind: String,
    pub visibility: String,
    pub summary: String,
    pub artwork_url: Option<String>,
    pub screenshot_urls: Vec<String>,
    pub track_view_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub name: String,
    pub note: Option<String>,
    #[serde(default)]
    pub kind: ProjectKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub summary: String,
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub screenshot_urls: Vec<String>,
    pub track_view_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_payload_defaults() {
        let payload: ProjectPayload = serde_json::from_str(r#"{"name":"Website"}"#).unwrap();
        assert_eq!(payload.kind, ProjectKind::Other);
        assert_eq!(payload.visibility, Visibility::Private);
        assert!(payload.screenshot_urls.is_empty());
    }

    #[test]
    fn test_project_kind_wire_names_match_column_values() {
        for kind in [
            ProjectKind::App,
            ProjectKind::Website,
            ProjectKind::Library,
            ProjectKind::Other,
        ] {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, kind.as_str());
        }
    }

    #[test]
    fn test_experience_payload_parses_dates_and_industries() {
        let payload: ExperiencePayload = serde_json::from_str(
            r#"{"title":"Engineer","companyName":"Acme","startDate":"2019-03-01","industries":[2,5]}"#,
        )
        .unwrap();
        assert_eq!(payload.start_date, NaiveDate::from_ymd_opt(2019, 3, 1).unwrap());
        assert_eq!(payload.industries, vec![2, 5]);
        assert!(payload.end_date.is_none());
    }
}
