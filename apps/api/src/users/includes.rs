//! Optional eager loading of a user's related collections, driven by the
//! `incl_*` query flags.

use serde::{Deserialize, Serialize};

use crate::db::group_by;
use crate::errors::AppError;
use crate::models::blog::BlogArticle;
use crate::models::resume::{Education, Experience, Project, Skill};
use crate::models::social::SocialLink;
use crate::models::user::User;
use crate::resume::{education, experience, projects, skills};
use crate::social::links;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct IncludeQuery {
    #[serde(default)]
    pub incl_wrk_exp: bool,
    #[serde(default)]
    pub incl_edu_exp: bool,
    #[serde(default)]
    pub incl_sns: bool,
    #[serde(default)]
    pub incl_projs: bool,
    #[serde(default)]
    pub incl_skill: bool,
    #[serde(default)]
    pub incl_blog: bool,
}

impl IncludeQuery {
    pub fn everything() -> Self {
        IncludeQuery {
            incl_wrk_exp: true,
            incl_edu_exp: true,
            incl_sns: true,
            incl_projs: true,
            incl_skill: true,
            incl_blog: true,
        }
    }
}

/// A user plus whichever collections were requested. Collections that were
/// not requested are absent from the JSON, not empty.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiences: Option<Vec<Experience>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social: Option<Vec<SocialLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<Skill>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog: Option<Vec<BlogArticle>>,
}

impl UserProfile {
    fn bare(user: User) -> Self {
        UserProfile {
            user,
            experiences: None,
            education: None,
            social: None,
            projects: None,
            skills: None,
            blog: None,
        }
    }
}

/// Loads each requested collection with one query per collection, then
/// hands every user its share.
pub async fn load_profiles(
    state: &AppState,
    users: Vec<User>,
    include: IncludeQuery,
) -> Result<Vec<UserProfile>, AppError> {
    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    let mut profiles: Vec<UserProfile> = users.into_iter().map(UserProfile::bare).collect();
    if ids.is_empty() {
        return Ok(profiles);
    }

    if include.incl_wrk_exp {
        let mut by_user = experience::for_users(&state.db, &ids).await?;
        for p in &mut profiles {
            p.experiences = Some(by_user.remove(&p.user.id).unwrap_or_default());
        }
    }
    if include.incl_edu_exp {
        let mut by_user = education::for_users(&state.db, &ids).await?;
        for p in &mut profiles {
            p.education = Some(by_user.remove(&p.user.id).unwrap_or_default());
        }
    }
    if include.incl_sns {
        let mut by_user = links::links_for_users(&state.db, &ids).await?;
        for p in &mut profiles {
            p.social = Some(by_user.remove(&p.user.id).unwrap_or_default());
        }
    }
    if include.incl_projs {
        let mut by_user = projects::for_users(&state.db, &ids).await?;
        for p in &mut profiles {
            p.projects = Some(by_user.remove(&p.user.id).unwrap_or_default());
        }
    }
    if include.incl_skill {
        let mut by_user = skills::for_users(&state.db, &ids).await?;
        for p in &mut profiles {
            p.skills = Some(by_user.remove(&p.user.id).unwrap_or_default());
        }
    }
    if include.incl_blog {
        let articles = state.blog.list_by_owners(&ids).await?;
        let mut by_user = group_by(articles, |a| a.user_id);
        for p in &mut profiles {
            p.blog = Some(by_user.remove(&p.user.id).unwrap_or_default());
        }
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user() -> User {
        User {
            id: 3,
            username: "eli".to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
            screen_name: None,
            phone: None,
            email_address: None,
            about_me: None,
            location: None,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_flags_default_to_off() {
        let query: IncludeQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.incl_blog && !query.incl_sns && !query.incl_wrk_exp);
    }

    #[test]
    fn test_unrequested_collections_are_omitted() {
        let mut profile = UserProfile::bare(user());
        profile.projects = Some(vec![]);
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["username"], "eli");
        assert_eq!(json["projects"], serde_json::json!([]));
        assert!(json.get("blog").is_none());
        assert!(json.get("education").is_none());
    }
}
