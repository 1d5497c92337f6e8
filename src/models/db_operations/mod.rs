use thiserror::Error;

pub mod films_db_operations;
pub mod members_db_operations;
pub mod posts_db_operations;
pub mod ratings_db_operations;
pub mod suggestions_db_operations;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Password hashing error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Item not found in database: {0}")]
    NotFound(String),
}

/// Maps "no rows" to `NotFound`, keeping every other failure as is.
pub(crate) fn not_found_if_missing<T>(
    result: rusqlite::Result<T>,
    what: impl FnOnce() -> String,
) -> Result<T, DbError> {
    match result {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(DbError::NotFound(what())),
        Err(e) => Err(DbError::Rusqlite(e)),
    }
}
