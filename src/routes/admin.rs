use actix_web::{web, Responder};
use serde::Deserialize;
use serde_json::json;

use super::member::{run_movie_search, MovieSearchQuery};
use super::{helper_error_response, ok_json, DateQuery};
use crate::helper::admin_helpers;
use crate::helper::movie_db_helpers::TmdbClient;
use crate::middleware::AdminMember;
use crate::models::FilmForm;
use crate::DbPool;

#[derive(Deserialize)]
struct AdminFlagForm {
    is_admin: bool,
}

/// Every handler takes `AdminMember`, which checks the stored profile on each request.
pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/films", web::get().to(list_films))
            .route("/films", web::post().to(create_film))
            .route("/films/{id}", web::put().to(update_film))
            .route("/films/{id}", web::delete().to(delete_film))
            .route("/films/{id}/toggle_current", web::post().to(toggle_current))
            .route("/movies/search", web::get().to(search_movies))
            .route("/movies/{tmdb_id}/draft", web::get().to(draft_film))
            .route("/members", web::get().to(list_members))
            .route("/members/{username}/admin", web::put().to(set_admin_flag)),
    );
}

async fn list_films(_admin: AdminMember, pool: web::Data<DbPool>, query: web::Query<DateQuery>) -> impl Responder {
    let month = query.month_label();
    match admin_helpers::list_films(&pool, &month) {
        Ok(films) => ok_json(films),
        Err(e) => helper_error_response(&format!("Failed to list films for '{}'", month), e),
    }
}

async fn create_film(admin: AdminMember, pool: web::Data<DbPool>, form: web::Json<FilmForm>) -> impl Responder {
    match admin_helpers::create_film(&pool, form.into_inner()) {
        Ok(film) => ok_json(film),
        Err(e) => helper_error_response(&format!("Failed to create film for '{}'", admin.0.username), e),
    }
}

async fn update_film(
    _admin: AdminMember,
    pool: web::Data<DbPool>,
    film_id: web::Path<String>,
    form: web::Json<FilmForm>,
) -> impl Responder {
    match admin_helpers::update_film(&pool, &film_id, form.into_inner()) {
        Ok(film) => ok_json(film),
        Err(e) => helper_error_response(&format!("Failed to update film {}", film_id), e),
    }
}

async fn delete_film(_admin: AdminMember, pool: web::Data<DbPool>, film_id: web::Path<String>) -> impl Responder {
    match admin_helpers::delete_film(&pool, &film_id) {
        Ok(()) => ok_json(json!({ "deleted": film_id.as_str() })),
        Err(e) => helper_error_response(&format!("Failed to delete film {}", film_id), e),
    }
}

async fn toggle_current(_admin: AdminMember, pool: web::Data<DbPool>, film_id: web::Path<String>) -> impl Responder {
    match admin_helpers::toggle_current(&pool, &film_id) {
        Ok(is_current) => ok_json(json!({ "is_current": is_current })),
        Err(e) => helper_error_response(&format!("Failed to toggle film {}", film_id), e),
    }
}

async fn search_movies(
    _admin: AdminMember,
    client: web::Data<TmdbClient>,
    query: web::Query<MovieSearchQuery>,
) -> impl Responder {
    run_movie_search(&client, &query.q).await
}

async fn draft_film(
    _admin: AdminMember,
    client: web::Data<TmdbClient>,
    tmdb_id: web::Path<i64>,
    query: web::Query<DateQuery>,
) -> impl Responder {
    match admin_helpers::draft_from_movie_db(&client, *tmdb_id, query.today()).await {
        Ok(draft) => ok_json(draft),
        Err(e) => helper_error_response(&format!("Failed to draft film from movie {}", tmdb_id), e),
    }
}

async fn list_members(_admin: AdminMember, pool: web::Data<DbPool>) -> impl Responder {
    match admin_helpers::list_members(&pool) {
        Ok(members) => ok_json(members),
        Err(e) => helper_error_response("Failed to list members", e),
    }
}

async fn set_admin_flag(
    _admin: AdminMember,
    pool: web::Data<DbPool>,
    username: web::Path<String>,
    form: web::Json<AdminFlagForm>,
) -> impl Responder {
    match admin_helpers::promote_member(&pool, &username, form.is_admin) {
        Ok(()) => ok_json(json!({ "username": username.as_str(), "is_admin": form.is_admin })),
        Err(e) => helper_error_response(&format!("Failed to change admin flag of '{}'", username), e),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::models::db_operations::members_db_operations;
    use crate::test_support::{seed_admin, seed_member, session_cookie, test_app, test_pool};

    fn login(username: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": format!("{}@example.com", username), "password": "password" }))
    }

    #[actix_web::test]
    async fn visitors_and_members_are_turned_away() {
        let pool = test_pool();
        {
            let mut conn = pool.get().unwrap();
            seed_member(&mut conn, "ana");
        }
        let app = test::init_service(test_app(&pool)).await;

        let req = test::TestRequest::get().uri("/api/admin/members").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);

        let cookie = session_cookie(&test::call_service(&app, login("ana").to_request()).await);
        let req = test::TestRequest::get().uri("/api/admin/members").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn admins_schedule_and_toggle_films() {
        let pool = test_pool();
        {
            let mut conn = pool.get().unwrap();
            seed_admin(&mut conn, "root");
        }
        let app = test::init_service(test_app(&pool)).await;
        let cookie = session_cookie(&test::call_service(&app, login("root").to_request()).await);

        let req = test::TestRequest::post()
            .uri("/api/admin/films")
            .cookie(cookie.clone())
            .set_json(json!({ "title": " Heat ", "month_year": "March 2026", "week_number": 4 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["title"], "Heat");
        let film_id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/admin/films")
            .cookie(cookie.clone())
            .set_json(json!({ "title": "Thief", "month_year": "March 2026", "week_number": 5 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri(&format!("/api/admin/films/{}/toggle_current", film_id))
            .cookie(cookie.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["is_current"], true);

        let req = test::TestRequest::get()
            .uri("/api/admin/films?month=March%202026")
            .cookie(cookie.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["is_current"], true);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/admin/films/{}", film_id))
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/admin/films/{}", film_id))
            .cookie(cookie)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn admins_promote_members_and_need_a_movie_key_for_drafts() {
        let pool = test_pool();
        {
            let mut conn = pool.get().unwrap();
            seed_admin(&mut conn, "root");
            seed_member(&mut conn, "ana");
        }
        let app = test::init_service(test_app(&pool)).await;
        let cookie = session_cookie(&test::call_service(&app, login("root").to_request()).await);

        let req = test::TestRequest::put()
            .uri("/api/admin/members/ana/admin")
            .cookie(cookie.clone())
            .set_json(json!({ "is_admin": true }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get().uri("/api/admin/members").cookie(cookie.clone()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let members = body["data"].as_array().unwrap();
        assert!(members.iter().all(|m| m["is_admin"] == true));

        let req = test::TestRequest::get()
            .uri("/api/admin/movies/949/draft?date=2026-03-05")
            .cookie(cookie)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 503);
    }

    #[actix_web::test]
    async fn demoted_admins_lose_access_on_their_next_request() {
        let pool = test_pool();
        {
            let mut conn = pool.get().unwrap();
            seed_admin(&mut conn, "root");
            seed_admin(&mut conn, "ana");
        }
        let app = test::init_service(test_app(&pool)).await;
        let root = session_cookie(&test::call_service(&app, login("root").to_request()).await);
        let ana = session_cookie(&test::call_service(&app, login("ana").to_request()).await);

        {
            let conn = pool.get().unwrap();
            members_db_operations::set_admin(&conn, "root", false).unwrap();
        }
        let req = test::TestRequest::post()
            .uri("/api/admin/films")
            .cookie(root)
            .set_json(json!({ "title": "Heat", "month_year": "March 2026", "week_number": 4 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let req = test::TestRequest::put()
            .uri("/api/admin/members/ana/admin")
            .cookie(ana.clone())
            .set_json(json!({ "is_admin": false }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get().uri("/api/admin/members").cookie(ana).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);
    }
}
