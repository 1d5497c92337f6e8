use thiserror::Error;

use crate::club::calendar_weeks::CalendarError;
use crate::models::db_operations::DbError;
use crate::DbPool;

pub mod admin_helpers;
pub mod discussion_helpers;
pub mod member_helpers;
pub mod movie_db_helpers;
pub mod sanitization_helpers;
pub mod schedule_helpers;
pub mod suggestion_helpers;

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
    #[error("Movie database error: {0}")]
    MovieDb(#[from] movie_db_helpers::MovieDbError),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("Admin access required")]
    Forbidden,
    #[error("{0}")]
    Conflict(String),
}

impl From<r2d2::Error> for HelperError {
    fn from(e: r2d2::Error) -> Self {
        HelperError::Database(DbError::Pool(e))
    }
}

impl From<rusqlite::Error> for HelperError {
    fn from(e: rusqlite::Error) -> Self {
        HelperError::Database(DbError::Rusqlite(e))
    }
}

/// Lifts `DbError::NotFound` to the helper level so routes answer 404.
pub(crate) fn lift_not_found(e: DbError) -> HelperError {
    match e {
        DbError::NotFound(what) => HelperError::NotFound(what),
        other => HelperError::Database(other),
    }
}

pub(crate) type PooledConn = r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>;

pub(crate) fn get_conn(pool: &DbPool) -> Result<PooledConn, HelperError> {
    Ok(pool.get()?)
}
