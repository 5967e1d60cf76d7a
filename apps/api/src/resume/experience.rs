//! Axum route handlers for work experience. Industries are attached by id and
//! reconciled against the stored set on every write.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use futures::future::{try_join, try_join_all};
use sqlx::PgPool;

use crate::auth::AuthUser;
use crate::db::group_by;
use crate::errors::AppError;
use crate::models::parse_id;
use crate::models::resume::{
    Experience, ExperienceIndustryLink, ExperiencePayload, ExperienceRow, Industry,
};
use crate::reconcile::diff_by_key;
use crate::resume::{not_found, require_text};
use crate::state::AppState;

fn validate(payload: &ExperiencePayload) -> Result<(), AppError> {
    require_text(&payload.title, "title")?;
    require_text(&payload.company_name, "companyName")?;
    if let Some(end) = payload.end_date {
        if end < payload.start_date {
            return Err(AppError::UnprocessableEntity(
                "Value for key 'endDate' must not precede 'startDate'.".to_string(),
            ));
        }
    }
    Ok(())
}

async fn industries_of(
    db: &PgPool,
    experience_ids: &[i64],
) -> Result<HashMap<i64, Vec<Industry>>, AppError> {
    let links = sqlx::query_as::<_, ExperienceIndustryLink>(
        r#"
        SELECT ei.experience_id, i.id, i.title
        FROM experience_industries ei
        JOIN industries i ON i.id = ei.industry_id
        WHERE ei.experience_id = ANY($1)
        ORDER BY i.id
        "#,
    )
    .bind(experience_ids)
    .fetch_all(db)
    .await?;

    Ok(group_by(links, |l| l.experience_id)
        .into_iter()
        .map(|(id, links)| (id, links.into_iter().map(Industry::from).collect()))
        .collect())
}

async fn with_industries(
    db: &PgPool,
    rows: Vec<ExperienceRow>,
) -> Result<Vec<Experience>, AppError> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut industries = industries_of(db, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| Experience {
            industries: industries.remove(&row.id).unwrap_or_default(),
            row,
        })
        .collect())
}

/// Every submitted id must name an existing industry.
async fn resolve_industries(db: &PgPool, ids: &[i64]) -> Result<Vec<Industry>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let known = sqlx::query_as::<_, Industry>("SELECT * FROM industries WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(db)
        .await?;
    ids.iter()
        .map(|id| {
            known.iter().find(|i| i.id == *id).cloned().ok_or_else(|| {
                AppError::UnprocessableEntity(format!("Industry '{id}' does not exist."))
            })
        })
        .collect()
}

async fn reconcile_industries(
    db: &PgPool,
    experience_id: i64,
    desired: &[Industry],
) -> Result<Vec<Industry>, AppError> {
    let current = industries_of(db, &[experience_id])
        .await?
        .remove(&experience_id)
        .unwrap_or_default();
    let diff = diff_by_key(&current, desired, |i| i.id);

    let attaches = diff.added.iter().map(|industry| {
        sqlx::query(
            "INSERT INTO experience_industries (experience_id, industry_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(experience_id)
        .bind(industry.id)
        .execute(db)
    });
    let detaches = diff.removed.iter().map(|industry| {
        sqlx::query(
            "DELETE FROM experience_industries WHERE experience_id = $1 AND industry_id = $2",
        )
        .bind(experience_id)
        .bind(industry.id)
        .execute(db)
    });
    try_join(try_join_all(attaches), try_join_all(detaches)).await?;

    Ok(industries_of(db, &[experience_id])
        .await?
        .remove(&experience_id)
        .unwrap_or_default())
}

pub async fn for_users(
    db: &PgPool,
    user_ids: &[i64],
) -> Result<HashMap<i64, Vec<Experience>>, AppError> {
    let rows = sqlx::query_as::<_, ExperienceRow>(
        "SELECT * FROM experiences WHERE user_id = ANY($1) ORDER BY start_date DESC, id",
    )
    .bind(user_ids)
    .fetch_all(db)
    .await?;
    let experiences = with_industries(db, rows).await?;
    Ok(group_by(experiences, |e| e.row.user_id))
}

/// GET /experiences
pub async fn handle_list_experiences(
    State(state): State<AppState>,
) -> Result<Json<Vec<Experience>>, AppError> {
    let rows = sqlx::query_as::<_, ExperienceRow>("SELECT * FROM experiences ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(with_industries(&state.db, rows).await?))
}

/// GET /experiences/:id
pub async fn handle_get_experience(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Experience>, AppError> {
    let id = parse_id(&id)?;
    let row = sqlx::query_as::<_, ExperienceRow>("SELECT * FROM experiences WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| not_found("Experience", id))?;
    let industries = industries_of(&state.db, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default();
    Ok(Json(Experience { row, industries }))
}

/// POST /experiences
pub async fn handle_create_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ExperiencePayload>,
) -> Result<Json<Experience>, AppError> {
    validate(&payload)?;
    let industries = resolve_industries(&state.db, &payload.industries).await?;

    let row = sqlx::query_as::<_, ExperienceRow>(
        r#"
        INSERT INTO experiences
            (user_id, title, company_name, location, start_date, end_date,
             headline, responsibilities, media)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(&payload.title)
    .bind(&payload.company_name)
    .bind(&payload.location)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.headline)
    .bind(&payload.responsibilities)
    .bind(&payload.media)
    .fetch_one(&state.db)
    .await?;

    let industries = reconcile_industries(&state.db, row.id, &industries).await?;
    Ok(Json(Experience { row, industries }))
}

/// PUT /experiences/:id
pub async fn handle_update_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<ExperiencePayload>,
) -> Result<Json<Experience>, AppError> {
    let id = parse_id(&id)?;
    validate(&payload)?;
    let industries = resolve_industries(&state.db, &payload.industries).await?;

    let row = sqlx::query_as::<_, ExperienceRow>(
        r#"
        UPDATE experiences
        SET title = $3, company_name = $4, location = $5, start_date = $6,
            end_date = $7, headline = $8, responsibilities = $9, media = $10,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(&payload.title)
    .bind(&payload.company_name)
    .bind(&payload.location)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.headline)
    .bind(&payload.responsibilities)
    .bind(&payload.media)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| not_found("Experience", id))?;

    let industries = reconcile_industries(&state.db, row.id, &industries).await?;
    Ok(Json(Experience { row, industries }))
}

/// DELETE /experiences/:id
pub async fn handle_delete_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let result = sqlx::query("DELETE FROM experiences WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found("Experience", id));
    }
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn payload() -> ExperiencePayload {
        ExperiencePayload {
            title: "Engineer".to_string(),
            company_name: "Acme".to_string(),
            location: None,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: None,
            headline: None,
            responsibilities: vec![],
            media: None,
            industries: vec![],
        }
    }

    #[test]
    fn test_open_ended_role_is_valid() {
        assert!(validate(&payload()).is_ok());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut p = payload();
        p.end_date = NaiveDate::from_ymd_opt(2019, 12, 31);
        assert!(matches!(validate(&p), Err(AppError::UnprocessableEntity(ref m)) if m.contains("endDate")));
    }

    #[test]
    fn test_blank_company_is_rejected() {
        let mut p = payload();
        p.company_name = " ".to_string();
        assert!(validate(&p).is_err());
    }
}
