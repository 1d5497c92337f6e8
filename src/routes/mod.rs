use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::helper::movie_db_helpers::MovieDbError;
use crate::helper::HelperError;

pub mod admin;
pub mod auth;
pub mod member;
pub mod public;

/// Registers every API scope. More specific prefixes go first, since the
/// first scope whose prefix matches handles the request.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(admin::config_api)
        .configure(auth::config_api)
        .configure(member::config_api)
        .configure(public::config_api);
}

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

pub fn ok_json<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse { success: true, data: Some(data), error: None })
}

pub fn error_json(mut builder: actix_web::HttpResponseBuilder, message: &str) -> HttpResponse {
    builder.json(ApiResponse::<()> { success: false, data: None, error: Some(message.to_string()) })
}

/// Maps a helper failure to a status code. Internal failures are logged with
/// `context` and answered with a generic message.
pub fn helper_error_response(context: &str, e: HelperError) -> HttpResponse {
    match &e {
        HelperError::Validation(message) => error_json(HttpResponse::BadRequest(), message),
        HelperError::Calendar(err) => error_json(HttpResponse::BadRequest(), &err.to_string()),
        HelperError::NotFound(_) => error_json(HttpResponse::NotFound(), &e.to_string()),
        HelperError::Unauthorized => error_json(HttpResponse::Unauthorized(), "Invalid email or password."),
        HelperError::Forbidden => error_json(HttpResponse::Forbidden(), &e.to_string()),
        HelperError::Conflict(message) => error_json(HttpResponse::Conflict(), message),
        HelperError::MovieDb(MovieDbError::NotConfigured) => {
            error_json(HttpResponse::ServiceUnavailable(), "Movie lookup is not configured.")
        }
        HelperError::MovieDb(err) => {
            log::error!("{}: {}", context, err);
            error_json(HttpResponse::BadGateway(), "The movie database could not be reached.")
        }
        HelperError::Database(err) => {
            log::error!("{}: {}", context, err);
            error_json(HttpResponse::InternalServerError(), "An internal error occurred.")
        }
    }
}

/// `?date=YYYY-MM-DD` pins "today" for a request; it defaults to the server's local date.
#[derive(Deserialize, Default)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
    pub month: Option<String>,
}

impl DateQuery {
    pub fn today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// The requested month label, or the label of `today`.
    pub fn month_label(&self) -> String {
        match &self.month {
            Some(month) => month.trim().to_string(),
            None => crate::club::calendar_weeks::month_label(self.today()),
        }
    }
}
