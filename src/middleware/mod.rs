use actix_session::{storage::CookieSessionStore, Session, SessionExt, SessionInsertError, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::error::InternalError;
use actix_web::{dev, web, FromRequest, HttpRequest, HttpResponse};
use serde::Serialize;
use std::future::{ready, Ready};

use crate::helper::{member_helpers, HelperError};
use crate::models::Member;
use crate::routes::{error_json, helper_error_response};
use crate::DbPool;

const MEMBER_ID_KEY: &str = "member_id";
const USERNAME_KEY: &str = "username";
const IS_ADMIN_KEY: &str = "is_admin";

/// The signed-in member, read from the session cookie.
/// Use `Option<AuthenticatedMember>` for endpoints open to visitors.
#[derive(Serialize, Debug, Clone)]
pub struct AuthenticatedMember {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl FromRequest for AuthenticatedMember {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let session = req.get_session();
        if let (Ok(Some(id)), Ok(Some(username))) = (session.get::<i64>(MEMBER_ID_KEY), session.get::<String>(USERNAME_KEY)) {
            let is_admin = session.get::<bool>(IS_ADMIN_KEY).unwrap_or(None).unwrap_or(false);
            ready(Ok(AuthenticatedMember { id, username, is_admin }))
        } else {
            ready(Err(actix_web::error::ErrorUnauthorized("Not logged in.")))
        }
    }
}

/// A signed-in member whose stored profile is currently admin.
/// Answers 401 without a session and 403 otherwise.
#[derive(Debug, Clone)]
pub struct AdminMember(pub Member);

fn reject(response: HttpResponse) -> actix_web::Error {
    InternalError::from_response("admin access denied", response).into()
}

impl FromRequest for AdminMember {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let session = req.get_session();
        let Ok(Some(member_id)) = session.get::<i64>(MEMBER_ID_KEY) else {
            return ready(Err(reject(error_json(HttpResponse::Unauthorized(), "Not logged in."))));
        };
        let Some(pool) = req.app_data::<web::Data<DbPool>>() else {
            log::error!("Database pool is not registered");
            return ready(Err(reject(error_json(HttpResponse::InternalServerError(), "An internal error occurred."))));
        };
        match member_helpers::require_admin(pool, member_id) {
            Ok(member) => ready(Ok(AdminMember(member))),
            Err(e) => {
                if matches!(e, HelperError::Forbidden) {
                    // The cached flag is stale.
                    if let Err(err) = session.insert(IS_ADMIN_KEY, false) {
                        log::warn!("Could not clear admin flag for member {}: {}", member_id, err);
                    }
                }
                ready(Err(reject(helper_error_response("Failed to check admin access", e))))
            }
        }
    }
}

/// Starts a fresh session for `member`, discarding any previous session id.
pub fn start_member_session(session: &Session, member: &Member) -> Result<(), SessionInsertError> {
    session.renew();
    session.insert(MEMBER_ID_KEY, member.id)?;
    session.insert(USERNAME_KEY, &member.username)?;
    session.insert(IS_ADMIN_KEY, member.is_admin)?;
    Ok(())
}

/// Brings the cached admin flag in line with the stored profile.
pub fn refresh_member_session(session: &Session, member: &Member) -> Result<(), SessionInsertError> {
    session.insert(USERNAME_KEY, &member.username)?;
    session.insert(IS_ADMIN_KEY, member.is_admin)?;
    Ok(())
}

/// Cookie-backed sessions, shared by the server and the route tests.
pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}
