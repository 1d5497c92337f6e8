//! Fixtures shared by the unit tests.

use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use chrono::Utc;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::config::{Config, MovieDbConfig, WebConfig};
use crate::helper::movie_db_helpers::TmdbClient;
use crate::middleware::session_middleware;
use crate::models::db_operations::members_db_operations;
use crate::models::{Film, FilmForm, Member, Suggestion, SuggestionKind};
use crate::setup::db_setup;
use crate::DbPool;

/// A fresh in-memory database with the full schema. One connection only, so
/// every checkout sees the same database.
pub fn test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory().with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = r2d2::Pool::builder().max_size(1).build(manager).unwrap();
    {
        let mut conn = pool.get().unwrap();
        db_setup::setup_club_db(&mut conn).unwrap();
    }
    pool
}

/// Movie lookups stay unconfigured so no test reaches the network.
pub fn test_config() -> Config {
    Config {
        web: WebConfig { host: "127.0.0.1".to_string(), port: 8080 },
        movie_db: MovieDbConfig {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            api_key: None,
        },
        database_path: "/tmp/film_club_test".to_string(),
        allowed_origins: "*".to_string(),
        log_level: "warn".to_string(),
        session_secret_key: String::new(),
        use_secure_cookies: false,
        public_base_url: Some("http://localhost:5173".to_string()),
    }
}

/// The full API, wired the way the server wires it.
pub fn test_app(
    pool: &DbPool,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = test_config();
    let client = TmdbClient::new(config.movie_db.clone());
    App::new()
        .wrap(session_middleware(Key::generate(), false))
        .app_data(web::Data::new(pool.clone()))
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(client))
        .configure(crate::routes::config_routes)
}

/// The session cookie set by a sign-in response.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response().cookies().next().expect("response sets a session cookie").into_owned()
}

pub fn seed_member(conn: &mut Connection, username: &str) -> Member {
    members_db_operations::create_member(conn, &format!("{}@example.com", username), "password", username).unwrap()
}

pub fn seed_admin(conn: &mut Connection, username: &str) -> Member {
    let member = seed_member(conn, username);
    members_db_operations::set_admin(conn, username, true).unwrap();
    Member { is_admin: true, ..member }
}

pub fn film(title: &str, week_number: u32) -> Film {
    Film {
        id: format!("film-{}", title.to_lowercase().replace(' ', "-")),
        title: title.to_string(),
        description: None,
        director: None,
        writer: None,
        cinematographer: None,
        poster_url: None,
        trailer_url: None,
        where_to_watch: None,
        month_year: "March 2026".to_string(),
        week_number,
        week_theme: None,
        discussion_points: None,
        is_current: false,
        created_at: Utc::now(),
    }
}

pub fn film_form(title: &str, month_year: &str, week_number: u32) -> FilmForm {
    FilmForm {
        title: title.to_string(),
        month_year: month_year.to_string(),
        week_number,
        ..FilmForm::default()
    }
}

pub fn suggestion(id: &str, kind: SuggestionKind) -> Suggestion {
    Suggestion {
        id: id.to_string(),
        user_id: 1,
        author_username: None,
        kind,
        title: id.to_string(),
        description: None,
        created_at: Utc::now(),
    }
}
