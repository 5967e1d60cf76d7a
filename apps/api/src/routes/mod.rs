pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::blog::{categories, handlers as blog};
use crate::resume::{education, experience, industries, projects, skills};
use crate::social::{links, services};
use crate::state::AppState;
use crate::users::{avatar, handlers as users};

/// Multipart framing on top of the image itself; the image limit is checked
/// separately so oversized files get a 413 with a useful message.
const UPLOAD_BODY_LIMIT: usize = avatar::MAX_AVATAR_BYTES + 16 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session
        .route("/login", post(auth::handle_login))
        .route("/logout", post(auth::handle_logout))
        // Users
        .route(
            "/users",
            get(users::handle_list_users).post(users::handle_create_user),
        )
        .route(
            "/users/:id_or_username",
            get(users::handle_get_user)
                .put(users::handle_update_user)
                .delete(users::handle_delete_user),
        )
        .route(
            "/users/:id_or_username/blog",
            get(users::handle_list_user_blogs),
        )
        .route(
            "/users/:id_or_username/resume",
            get(users::handle_get_resume),
        )
        .route(
            "/users/:id_or_username/social_networking",
            post(users::handle_create_user_social_link),
        )
        .route(
            "/users/:id_or_username/profile_image",
            patch(avatar::handle_upload_profile_image)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/images/:file", get(avatar::handle_get_image))
        // Blog
        .route(
            "/blog",
            get(blog::handle_list_blogs).post(blog::handle_create_blog),
        )
        .route("/blog/categories", get(blog::handle_blog_categories))
        .route("/blog/categories/:id", get(blog::handle_blog_category))
        .route(
            "/blog/:id_or_alias",
            get(blog::handle_get_blog)
                .put(blog::handle_update_blog)
                .delete(blog::handle_delete_blog),
        )
        .route(
            "/categories",
            get(categories::handle_list_categories).post(categories::handle_create_category),
        )
        .route(
            "/categories/:id",
            get(categories::handle_get_category)
                .put(categories::handle_update_category)
                .delete(categories::handle_delete_category),
        )
        // Résumé
        .route(
            "/industries",
            get(industries::handle_list_industries).post(industries::handle_create_industry),
        )
        .route(
            "/industries/:id",
            get(industries::handle_get_industry)
                .put(industries::handle_update_industry)
                .delete(industries::handle_delete_industry),
        )
        .route(
            "/education",
            get(education::handle_list_education).post(education::handle_create_education),
        )
        .route(
            "/education/:id",
            get(education::handle_get_education)
                .put(education::handle_update_education)
                .delete(education::handle_delete_education),
        )
        .route(
            "/experiences",
            get(experience::handle_list_experiences).post(experience::handle_create_experience),
        )
        .route(
            "/experiences/:id",
            get(experience::handle_get_experience)
                .put(experience::handle_update_experience)
                .delete(experience::handle_delete_experience),
        )
        .route(
            "/skills",
            get(skills::handle_list_skills).post(skills::handle_create_skill),
        )
        .route(
            "/skills/:id",
            get(skills::handle_get_skill)
                .put(skills::handle_update_skill)
                .delete(skills::handle_delete_skill),
        )
        .route(
            "/projects",
            get(projects::handle_list_projects).post(projects::handle_create_project),
        )
        .route(
            "/projects/:id",
            get(projects::handle_get_project)
                .put(projects::handle_update_project)
                .delete(projects::handle_delete_project),
        )
        // Social networking
        .route(
            "/social/services",
            get(services::handle_list_services).post(services::handle_create_service),
        )
        .route(
            "/social/services/:id",
            get(services::handle_get_service)
                .put(services::handle_update_service)
                .delete(services::handle_delete_service),
        )
        .route(
            "/social",
            get(links::handle_list_links).post(links::handle_create_link),
        )
        .route(
            "/social/:id",
            get(links::handle_get_link)
                .put(links::handle_update_link)
                .delete(links::handle_delete_link),
        )
        .with_state(state)
}
