use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{not_found_if_missing, DbError};
use crate::models::{Film, FilmForm};

const FILM_COLUMNS: &str = "id, title, description, director, writer, cinematographer, poster_url, \
     trailer_url, where_to_watch, month_year, week_number, week_theme, discussion_points, \
     is_current, created_at";

fn film_from_row(row: &Row) -> rusqlite::Result<Film> {
    Ok(Film {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        director: row.get(3)?,
        writer: row.get(4)?,
        cinematographer: row.get(5)?,
        poster_url: row.get(6)?,
        trailer_url: row.get(7)?,
        where_to_watch: row.get(8)?,
        month_year: row.get(9)?,
        week_number: row.get(10)?,
        week_theme: row.get(11)?,
        discussion_points: row.get(12)?,
        is_current: row.get(13)?,
        created_at: row.get(14)?,
    })
}

pub fn create_film(conn: &Connection, form: &FilmForm) -> Result<Film, DbError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO films (id, title, description, director, writer, cinematographer, poster_url,
            trailer_url, where_to_watch, month_year, week_number, week_theme, discussion_points,
            is_current, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            id,
            form.title,
            form.description,
            form.director,
            form.writer,
            form.cinematographer,
            form.poster_url,
            form.trailer_url,
            form.where_to_watch,
            form.month_year,
            form.week_number,
            form.week_theme,
            form.discussion_points,
            form.is_current,
            Utc::now(),
        ],
    )?;
    read_film(conn, &id)
}

pub fn read_film(conn: &Connection, film_id: &str) -> Result<Film, DbError> {
    let result = conn.query_row(
        &format!("SELECT {} FROM films WHERE id = ?1", FILM_COLUMNS),
        [film_id],
        film_from_row,
    );
    not_found_if_missing(result, || format!("film {}", film_id))
}

/// Every film of a month, by week and then by creation.
pub fn read_films_for_month(conn: &Connection, month_year: &str) -> Result<Vec<Film>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM films WHERE month_year = ?1 ORDER BY week_number ASC, created_at ASC, rowid ASC",
        FILM_COLUMNS
    ))?;
    let films = stmt
        .query_map([month_year], film_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(films)
}

pub fn read_films_for_week(conn: &Connection, month_year: &str, week_number: u32) -> Result<Vec<Film>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM films WHERE month_year = ?1 AND week_number = ?2 ORDER BY created_at ASC, rowid ASC",
        FILM_COLUMNS
    ))?;
    let films = stmt
        .query_map(params![month_year, week_number], film_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(films)
}

pub fn update_film(conn: &Connection, film_id: &str, form: &FilmForm) -> Result<Film, DbError> {
    let updated = conn.execute(
        "UPDATE films SET title = ?1, description = ?2, director = ?3, writer = ?4,
            cinematographer = ?5, poster_url = ?6, trailer_url = ?7, where_to_watch = ?8,
            month_year = ?9, week_number = ?10, week_theme = ?11, discussion_points = ?12,
            is_current = ?13
         WHERE id = ?14",
        params![
            form.title,
            form.description,
            form.director,
            form.writer,
            form.cinematographer,
            form.poster_url,
            form.trailer_url,
            form.where_to_watch,
            form.month_year,
            form.week_number,
            form.week_theme,
            form.discussion_points,
            form.is_current,
            film_id,
        ],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("film {}", film_id)));
    }
    read_film(conn, film_id)
}

/// Flips the `is_current` flag and returns its new value.
pub fn toggle_current(conn: &Connection, film_id: &str) -> Result<bool, DbError> {
    let updated = conn.execute(
        "UPDATE films SET is_current = NOT is_current WHERE id = ?1",
        [film_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("film {}", film_id)));
    }
    Ok(read_film(conn, film_id)?.is_current)
}

/// Ratings go with the film via `ON DELETE CASCADE`.
pub fn delete_film(conn: &Connection, film_id: &str) -> Result<(), DbError> {
    let deleted = conn.execute("DELETE FROM films WHERE id = ?1", [film_id])?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("film {}", film_id)));
    }
    Ok(())
}
