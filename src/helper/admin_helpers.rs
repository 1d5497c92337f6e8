use chrono::NaiveDate;
use log::info;

use super::movie_db_helpers::TmdbClient;
use super::sanitization_helpers::{clean_optional, strip_all_html};
use super::{get_conn, lift_not_found, HelperError};
use crate::club::calendar_weeks::{self, WEEKS_PER_MONTH};
use crate::models::db_operations::{films_db_operations, members_db_operations};
use crate::models::{Film, FilmForm, Member};
use crate::DbPool;

/// Trims every field and checks the month label and week number.
pub fn validate_film_form(form: FilmForm) -> Result<FilmForm, HelperError> {
    let title = strip_all_html(&form.title);
    if title.is_empty() {
        return Err(HelperError::Validation("Film title cannot be empty.".to_string()));
    }
    let month_year = form.month_year.trim().to_string();
    calendar_weeks::parse_month_label(&month_year)
        .map_err(|e| HelperError::Validation(e.to_string()))?;
    if !(1..=WEEKS_PER_MONTH).contains(&form.week_number) {
        return Err(HelperError::Validation(format!("Week number must be between 1 and {}.", WEEKS_PER_MONTH)));
    }

    Ok(FilmForm {
        title,
        description: clean_optional(form.description.as_deref()),
        director: clean_optional(form.director.as_deref()),
        writer: clean_optional(form.writer.as_deref()),
        cinematographer: clean_optional(form.cinematographer.as_deref()),
        poster_url: clean_optional(form.poster_url.as_deref()),
        trailer_url: clean_optional(form.trailer_url.as_deref()),
        where_to_watch: clean_optional(form.where_to_watch.as_deref()),
        month_year,
        week_number: form.week_number,
        week_theme: clean_optional(form.week_theme.as_deref()),
        discussion_points: clean_optional(form.discussion_points.as_deref()),
        is_current: form.is_current,
    })
}

pub fn list_films(pool: &DbPool, month_label: &str) -> Result<Vec<Film>, HelperError> {
    calendar_weeks::parse_month_label(month_label)?;
    let conn = get_conn(pool)?;
    Ok(films_db_operations::read_films_for_month(&conn, month_label)?)
}

pub fn create_film(pool: &DbPool, form: FilmForm) -> Result<Film, HelperError> {
    let form = validate_film_form(form)?;
    let conn = get_conn(pool)?;
    let film = films_db_operations::create_film(&conn, &form)?;
    info!("Film '{}' scheduled for {} week {}", film.title, film.month_year, film.week_number);
    Ok(film)
}

pub fn update_film(pool: &DbPool, film_id: &str, form: FilmForm) -> Result<Film, HelperError> {
    let form = validate_film_form(form)?;
    let conn = get_conn(pool)?;
    films_db_operations::update_film(&conn, film_id, &form).map_err(lift_not_found)
}

pub fn delete_film(pool: &DbPool, film_id: &str) -> Result<(), HelperError> {
    let conn = get_conn(pool)?;
    films_db_operations::delete_film(&conn, film_id).map_err(lift_not_found)?;
    info!("Film {} deleted", film_id);
    Ok(())
}

pub fn toggle_current(pool: &DbPool, film_id: &str) -> Result<bool, HelperError> {
    let conn = get_conn(pool)?;
    films_db_operations::toggle_current(&conn, film_id).map_err(lift_not_found)
}

/// Pre-fills a film form from the movie database, scheduled in week 1 of
/// `today`'s month until the admin says otherwise.
pub async fn draft_from_movie_db(client: &TmdbClient, movie_id: i64, today: NaiveDate) -> Result<FilmForm, HelperError> {
    let details = client.movie_details(movie_id).await?;
    Ok(FilmForm {
        title: details.title,
        description: details.overview,
        director: details.director,
        writer: details.writer,
        cinematographer: details.cinematographer,
        poster_url: details.poster_url,
        trailer_url: details.trailer_url,
        where_to_watch: None,
        month_year: calendar_weeks::month_label(today),
        week_number: 1,
        week_theme: None,
        discussion_points: None,
        is_current: false,
    })
}

pub fn promote_member(pool: &DbPool, username: &str, is_admin: bool) -> Result<(), HelperError> {
    let conn = get_conn(pool)?;
    members_db_operations::set_admin(&conn, username, is_admin).map_err(lift_not_found)
}

pub fn list_members(pool: &DbPool) -> Result<Vec<Member>, HelperError> {
    let conn = get_conn(pool)?;
    Ok(members_db_operations::read_all_members(&conn)?)
}
