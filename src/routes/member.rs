use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use super::{error_json, helper_error_response, ok_json};
use crate::helper::discussion_helpers::{self, NewPost};
use crate::helper::member_helpers::{self, ProfileUpdate};
use crate::helper::movie_db_helpers::TmdbClient;
use crate::helper::{schedule_helpers, suggestion_helpers, HelperError};
use crate::middleware::AuthenticatedMember;
use crate::models::SuggestionKind;
use crate::DbPool;

#[derive(Deserialize)]
struct CommentForm {
    body: String,
}

#[derive(Deserialize)]
struct RatingForm {
    score: u8,
}

#[derive(Deserialize)]
struct SuggestionForm {
    #[serde(rename = "type")]
    kind: SuggestionKind,
    title: String,
    description: Option<String>,
}

#[derive(Deserialize)]
pub struct MovieSearchQuery {
    pub q: String,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/member")
            .route("/posts", web::post().to(create_post))
            .route("/posts/{id}/comments", web::post().to(create_comment))
            .route("/films/{id}/rating", web::get().to(get_rating))
            .route("/films/{id}/rating", web::put().to(rate_film))
            .route("/suggestions", web::post().to(create_suggestion))
            .route("/suggestions/{id}/vote", web::post().to(toggle_vote))
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile))
            .route("/movies/search", web::get().to(search_movies)),
    );
}

async fn create_post(
    member: AuthenticatedMember,
    pool: web::Data<DbPool>,
    form: web::Json<NewPost>,
) -> impl Responder {
    match discussion_helpers::create_post(&pool, member.id, form.into_inner()) {
        Ok(post) => ok_json(post),
        Err(e) => helper_error_response(&format!("Failed to create post for '{}'", member.username), e),
    }
}

async fn create_comment(
    member: AuthenticatedMember,
    pool: web::Data<DbPool>,
    post_id: web::Path<String>,
    form: web::Json<CommentForm>,
) -> impl Responder {
    match discussion_helpers::add_comment(&pool, member.id, &post_id, &form.body) {
        Ok(comment) => ok_json(comment),
        Err(e) => helper_error_response(&format!("Failed to comment on post {}", post_id), e),
    }
}

async fn get_rating(
    member: AuthenticatedMember,
    pool: web::Data<DbPool>,
    film_id: web::Path<String>,
) -> impl Responder {
    match schedule_helpers::member_rating(&pool, member.id, &film_id) {
        Ok(score) => ok_json(json!({ "score": score })),
        Err(e) => helper_error_response("Failed to read rating", e),
    }
}

async fn rate_film(
    member: AuthenticatedMember,
    pool: web::Data<DbPool>,
    film_id: web::Path<String>,
    form: web::Json<RatingForm>,
) -> impl Responder {
    match schedule_helpers::rate_film(&pool, member.id, &film_id, form.score) {
        Ok(summary) => ok_json(summary),
        Err(e) => helper_error_response(&format!("Failed to rate film {}", film_id), e),
    }
}

async fn create_suggestion(
    member: AuthenticatedMember,
    pool: web::Data<DbPool>,
    form: web::Json<SuggestionForm>,
) -> impl Responder {
    match suggestion_helpers::submit_suggestion(&pool, member.id, form.kind, &form.title, form.description.as_deref()) {
        Ok(suggestion) => ok_json(suggestion),
        Err(e) => helper_error_response("Failed to create suggestion", e),
    }
}

async fn toggle_vote(
    member: AuthenticatedMember,
    pool: web::Data<DbPool>,
    suggestion_id: web::Path<String>,
) -> impl Responder {
    match suggestion_helpers::toggle_vote(&pool, member.id, &suggestion_id) {
        Ok(state) => ok_json(state),
        Err(e) => helper_error_response(&format!("Failed to toggle vote on {}", suggestion_id), e),
    }
}

async fn get_profile(member: AuthenticatedMember, pool: web::Data<DbPool>) -> impl Responder {
    match member_helpers::get_profile(&pool, member.id) {
        Ok(profile) => ok_json(profile),
        Err(e) => helper_error_response("Failed to read profile", e),
    }
}

async fn update_profile(
    member: AuthenticatedMember,
    pool: web::Data<DbPool>,
    form: web::Json<ProfileUpdate>,
) -> impl Responder {
    match member_helpers::update_profile(&pool, member.id, form.into_inner()) {
        Ok(profile) => ok_json(profile),
        Err(e) => helper_error_response("Failed to update profile", e),
    }
}

/// Movie picker for the profile page.
async fn search_movies(
    _member: AuthenticatedMember,
    client: web::Data<TmdbClient>,
    query: web::Query<MovieSearchQuery>,
) -> impl Responder {
    run_movie_search(&client, &query.q).await
}

pub(crate) async fn run_movie_search(client: &TmdbClient, query: &str) -> HttpResponse {
    if !client.is_configured() {
        return error_json(HttpResponse::ServiceUnavailable(), "Movie lookup is not configured.");
    }
    match client.search_movies(query).await {
        Ok(candidates) => ok_json(candidates),
        Err(e) => helper_error_response(&format!("Movie search for '{}' failed", query), HelperError::from(e)),
    }
}
