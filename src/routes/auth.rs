use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::{error_json, helper_error_response, ok_json};
use crate::config::Config;
use crate::helper::{member_helpers, HelperError};
use crate::middleware::{refresh_member_session, start_member_session, AuthenticatedMember};
use crate::models::Member;
use crate::DbPool;

#[derive(Deserialize)]
struct RegisterForm {
    email: String,
    password: String,
    username: String,
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct ResetRequestForm {
    email: String,
}

#[derive(Deserialize)]
struct ResetConfirmForm {
    token: String,
    password: String,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(handle_register))
            .route("/login", web::post().to(handle_login))
            .route("/logout", web::post().to(handle_logout))
            .route("/session", web::get().to(get_session))
            .route("/password_reset/request", web::post().to(handle_reset_request))
            .route("/password_reset/confirm", web::post().to(handle_reset_confirm)),
    );
}

fn signed_in(session: &Session, member: Member) -> HttpResponse {
    match start_member_session(session, &member) {
        Ok(()) => ok_json(member),
        Err(e) => {
            log::error!("Failed to store session for member {}: {}", member.id, e);
            error_json(HttpResponse::InternalServerError(), "Could not start a session.")
        }
    }
}

async fn handle_register(
    session: Session,
    pool: web::Data<DbPool>,
    form: web::Json<RegisterForm>,
) -> impl Responder {
    match member_helpers::register(&pool, &form.email, &form.password, &form.username) {
        Ok(member) => signed_in(&session, member),
        Err(e) => helper_error_response("Failed to register member", e),
    }
}

async fn handle_login(
    session: Session,
    pool: web::Data<DbPool>,
    form: web::Json<LoginForm>,
) -> impl Responder {
    match member_helpers::login(&pool, &form.email, &form.password) {
        Ok(member) => signed_in(&session, member),
        Err(e) => helper_error_response("Failed to sign in", e),
    }
}

async fn handle_logout(session: Session) -> impl Responder {
    session.purge();
    ok_json(json!({ "signed_out": true }))
}

/// The signed-in member, or `null` data for visitors.
async fn get_session(
    session: Session,
    pool: web::Data<DbPool>,
    member: Option<AuthenticatedMember>,
) -> impl Responder {
    let Some(member) = member else {
        return ok_json(Option::<Member>::None);
    };
    match member_helpers::current_member(&pool, member.id) {
        Ok(current) => {
            if let Err(e) = refresh_member_session(&session, &current) {
                log::warn!("Could not refresh session for member {}: {}", current.id, e);
            }
            ok_json(Some(current))
        }
        Err(HelperError::NotFound(_)) => {
            // The account is gone; drop the stale cookie.
            session.purge();
            ok_json(Option::<Member>::None)
        }
        Err(e) => helper_error_response("Failed to read session member", e),
    }
}

/// Answers the same whether or not the email belongs to a member.
async fn handle_reset_request(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    form: web::Json<ResetRequestForm>,
) -> impl Responder {
    if let Err(e) = member_helpers::request_password_reset(&pool, &form.email, &config.public_base_url(), Utc::now()) {
        log::error!("Failed to issue password reset: {}", e);
    }
    ok_json(json!({ "message": "If that email belongs to a member, a reset link is on its way." }))
}

async fn handle_reset_confirm(pool: web::Data<DbPool>, form: web::Json<ResetConfirmForm>) -> impl Responder {
    match member_helpers::confirm_password_reset(&pool, &form.token, &form.password, Utc::now()) {
        Ok(()) => ok_json(json!({ "password_updated": true })),
        Err(e) => helper_error_response("Failed to reset password", e),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::test_support::{session_cookie, test_app, test_pool};

    #[actix_web::test]
    async fn registering_signs_the_member_in() {
        let pool = test_pool();
        let app = test::init_service(test_app(&pool)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": "ana@example.com", "password": "secret1", "username": "ana" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let cookie = session_cookie(&resp);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["username"], "ana");

        let req = test::TestRequest::get().uri("/api/auth/session").cookie(cookie.clone()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["email"], "ana@example.com");

        let req = test::TestRequest::get().uri("/api/auth/session").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], Value::Null);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let pool = test_pool();
        let app = test::init_service(test_app(&pool)).await;
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": "ana@example.com", "password": "secret1", "username": "ana" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ana@example.com", "password": "wrong!" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": "ana@example.com", "password": "secret1" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    #[actix_web::test]
    async fn duplicate_sign_up_conflicts() {
        let pool = test_pool();
        let app = test::init_service(test_app(&pool)).await;
        for expected in [200, 409] {
            let req = test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({ "email": "ana@example.com", "password": "secret1", "username": "ana" }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }

    #[actix_web::test]
    async fn reset_request_never_reveals_membership() {
        let pool = test_pool();
        let app = test::init_service(test_app(&pool)).await;
        let req = test::TestRequest::post()
            .uri("/api/auth/password_reset/request")
            .set_json(json!({ "email": "ghost@example.com" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = test::TestRequest::post()
            .uri("/api/auth/password_reset/confirm")
            .set_json(json!({ "token": "made-up", "password": "brandnew" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
