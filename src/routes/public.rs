use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::{error_json, helper_error_response, ok_json, DateQuery};
use crate::helper::{discussion_helpers, schedule_helpers, suggestion_helpers};
use crate::middleware::AuthenticatedMember;
use crate::models::SuggestionKind;
use crate::DbPool;

#[derive(Deserialize)]
pub struct WeekPostsQuery {
    month: String,
    week: u32,
}

#[derive(Deserialize)]
pub struct RecentQuery {
    limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct SuggestionQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/home", web::get().to(get_home))
            .route("/films", web::get().to(get_month_schedule))
            .route("/discussion", web::get().to(get_month_discussion))
            .route("/discussion/posts", web::get().to(get_week_posts))
            .route("/posts/recent", web::get().to(get_recent_posts))
            .route("/posts/{id}", web::get().to(get_post_by_id))
            .route("/suggestions", web::get().to(get_suggestions)),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn get_home(pool: web::Data<DbPool>, query: web::Query<DateQuery>) -> impl Responder {
    match schedule_helpers::home_view(&pool, query.today()) {
        Ok(home) => ok_json(home),
        Err(e) => helper_error_response("Failed to build home view", e),
    }
}

async fn get_month_schedule(pool: web::Data<DbPool>, query: web::Query<DateQuery>) -> impl Responder {
    let month = query.month_label();
    match schedule_helpers::month_schedule(&pool, &month, query.today()) {
        Ok(schedule) => ok_json(schedule),
        Err(e) => helper_error_response(&format!("Failed to fetch films for '{}'", month), e),
    }
}

async fn get_month_discussion(pool: web::Data<DbPool>, query: web::Query<DateQuery>) -> impl Responder {
    let month = query.month_label();
    match discussion_helpers::month_discussion(&pool, &month, query.today()) {
        Ok(discussion) => ok_json(discussion),
        Err(e) => helper_error_response(&format!("Failed to fetch discussion for '{}'", month), e),
    }
}

async fn get_week_posts(pool: web::Data<DbPool>, query: web::Query<WeekPostsQuery>) -> impl Responder {
    match discussion_helpers::week_posts(&pool, query.month.trim(), query.week) {
        Ok(posts) => ok_json(posts),
        Err(e) => helper_error_response("Failed to fetch week posts", e),
    }
}

async fn get_recent_posts(pool: web::Data<DbPool>, query: web::Query<RecentQuery>) -> impl Responder {
    let limit = query.limit.unwrap_or(schedule_helpers::RECENT_POSTS_LIMIT).min(50);
    match discussion_helpers::recent_posts(&pool, limit) {
        Ok(posts) => ok_json(posts),
        Err(e) => helper_error_response("Failed to fetch recent posts", e),
    }
}

async fn get_post_by_id(id: web::Path<String>, pool: web::Data<DbPool>) -> impl Responder {
    match discussion_helpers::post_detail(&pool, &id) {
        Ok(detail) => ok_json(detail),
        Err(e) => helper_error_response(&format!("Failed to fetch post {}", id), e),
    }
}

async fn get_suggestions(
    pool: web::Data<DbPool>,
    query: web::Query<SuggestionQuery>,
    member: Option<AuthenticatedMember>,
) -> impl Responder {
    let kind = match query.kind.as_deref() {
        None => SuggestionKind::Film,
        Some(value) => match SuggestionKind::parse(value) {
            Some(kind) => kind,
            None => return error_json(HttpResponse::BadRequest(), "Suggestion type must be 'film' or 'theme'."),
        },
    };
    match suggestion_helpers::list_suggestions(&pool, kind, member.map(|m| m.id)) {
        Ok(suggestions) => ok_json(suggestions),
        Err(e) => helper_error_response("Failed to fetch suggestions", e),
    }
}
