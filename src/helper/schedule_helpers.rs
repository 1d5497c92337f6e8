use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;

use super::{get_conn, lift_not_found, HelperError};
use crate::club::calendar_weeks::{self, WEEKS_PER_MONTH};
use crate::club::ratings::{self, RatingSummary};
use crate::models::db_operations::{films_db_operations, posts_db_operations, ratings_db_operations};
use crate::models::{Film, FilmWithRating, HomeView, MonthSchedule, PostView, ScheduledWeek};
use crate::DbPool;

pub const RECENT_POSTS_LIMIT: u32 = 3;

fn with_ratings(conn: &Connection, films: Vec<Film>) -> Result<Vec<FilmWithRating>, HelperError> {
    films
        .into_iter()
        .map(|film| -> Result<FilmWithRating, HelperError> {
            let scores = ratings_db_operations::read_scores_for_film(conn, &film.id)?;
            Ok(FilmWithRating { rating: ratings::summarize(&scores), film })
        })
        .collect()
}

/// Splits a month's films (already ordered by week, then creation) into weeks.
/// Weeks without films are left out.
pub fn group_by_week(films: Vec<Film>) -> Vec<(u32, Vec<Film>)> {
    let mut weeks: Vec<(u32, Vec<Film>)> = (1..=WEEKS_PER_MONTH).map(|week| (week, Vec::new())).collect();
    for film in films {
        if let Some((_, week_films)) = weeks.iter_mut().find(|(week, _)| *week == film.week_number) {
            week_films.push(film);
        }
    }
    weeks.retain(|(_, week_films)| !week_films.is_empty());
    weeks
}

/// Theme of a week comes from its first film.
pub fn week_theme(week_films: &[Film]) -> Option<String> {
    week_films.first().and_then(|film| film.week_theme.clone())
}

pub fn is_now_viewing(month: NaiveDate, week_number: u32, today: NaiveDate) -> bool {
    calendar_weeks::is_same_month(month, today) && week_number == calendar_weeks::current_week_number(today)
}

pub fn month_schedule(pool: &DbPool, month_label: &str, today: NaiveDate) -> Result<MonthSchedule, HelperError> {
    let month = calendar_weeks::parse_month_label(month_label)?;
    let conn = get_conn(pool)?;
    let films = films_db_operations::read_films_for_month(&conn, month_label)?;

    let mut weeks = Vec::new();
    for (week_number, week_films) in group_by_week(films) {
        let range = calendar_weeks::calendar_week(week_number, month)?;
        weeks.push(ScheduledWeek {
            week_number,
            date_range: calendar_weeks::format_week_range(week_number, month)?,
            start_day: range.start_day,
            end_day: range.end_day,
            week_theme: week_theme(&week_films),
            is_now_viewing: is_now_viewing(month, week_number, today),
            films: with_ratings(&conn, week_films)?,
        });
    }

    Ok(MonthSchedule {
        month_year: calendar_weeks::month_label(month),
        is_current_month: calendar_weeks::is_same_month(month, today),
        previous_month: calendar_weeks::month_label(calendar_weeks::previous_month(month)),
        next_month: calendar_weeks::month_label(calendar_weeks::next_month(month)),
        weeks,
    })
}

/// What is showing this week, plus the latest posts across all weeks.
pub fn home_view(pool: &DbPool, today: NaiveDate) -> Result<HomeView, HelperError> {
    let month_year = calendar_weeks::month_label(today);
    let current_week = calendar_weeks::current_week_number(today);
    let conn = get_conn(pool)?;

    let films = films_db_operations::read_films_for_week(&conn, &month_year, current_week)?;
    let recent_posts = posts_db_operations::read_recent_posts(&conn, RECENT_POSTS_LIMIT)?
        .into_iter()
        .map(PostView::from)
        .collect();

    Ok(HomeView {
        date_range: calendar_weeks::format_week_range(current_week, today)?,
        week_theme: week_theme(&films),
        films: with_ratings(&conn, films)?,
        month_year,
        current_week,
        recent_posts,
    })
}

pub fn rate_film(pool: &DbPool, user_id: i64, film_id: &str, score: u8) -> Result<RatingSummary, HelperError> {
    if !ratings::is_valid_score(score) {
        return Err(HelperError::Validation(format!(
            "Score must be between {} and {}.",
            ratings::MIN_SCORE,
            ratings::MAX_SCORE
        )));
    }
    let conn = get_conn(pool)?;
    films_db_operations::read_film(&conn, film_id).map_err(lift_not_found)?;
    ratings_db_operations::upsert_rating(&conn, user_id, film_id, score)?;
    info!("Member {} rated film {} with {}", user_id, film_id, score);

    let scores = ratings_db_operations::read_scores_for_film(&conn, film_id)?;
    ratings::summarize(&scores).ok_or_else(|| HelperError::NotFound(format!("ratings for film {}", film_id)))
}

pub fn member_rating(pool: &DbPool, user_id: i64, film_id: &str) -> Result<Option<u8>, HelperError> {
    let conn = get_conn(pool)?;
    Ok(ratings_db_operations::read_member_score(&conn, user_id, film_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{film, film_form, seed_member, test_pool};

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn grouping_skips_empty_weeks_and_keeps_order() {
        let grouped = group_by_week(vec![film("Heat", 1), film("Thief", 1), film("Alien", 4)]);
        let weeks: Vec<u32> = grouped.iter().map(|(week, _)| *week).collect();
        assert_eq!(weeks, vec![1, 4]);
        assert_eq!(grouped[0].1[1].title, "Thief");
    }

    #[test]
    fn theme_comes_from_the_first_film() {
        let mut heat = film("Heat", 1);
        heat.week_theme = Some("Crime".to_string());
        let mut thief = film("Thief", 1);
        thief.week_theme = Some("Ignored".to_string());
        assert_eq!(week_theme(&[heat, thief]), Some("Crime".to_string()));
        assert_eq!(week_theme(&[]), None);
    }

    #[test]
    fn now_viewing_needs_the_same_month() {
        let march = ymd(2026, 3, 1);
        assert!(is_now_viewing(march, 4, ymd(2026, 3, 22)));
        assert!(!is_now_viewing(march, 3, ymd(2026, 3, 22)));
        assert!(!is_now_viewing(march, 4, ymd(2026, 4, 22)));
        assert!(!is_now_viewing(march, 4, ymd(2025, 3, 22)));
    }

    #[test]
    fn month_schedule_reports_weeks_and_ratings() {
        let pool = test_pool();
        let heat_id = {
            let mut conn = pool.get().unwrap();
            let ana = seed_member(&mut conn, "ana");
            let bob = seed_member(&mut conn, "bob");
            let mut heat = film_form("Heat", "March 2026", 4);
            heat.week_theme = Some("Michael Mann".to_string());
            let heat = films_db_operations::create_film(&conn, &heat).unwrap();
            films_db_operations::create_film(&conn, &film_form("Thief", "March 2026", 4)).unwrap();
            films_db_operations::create_film(&conn, &film_form("Alien", "March 2026", 1)).unwrap();
            ratings_db_operations::upsert_rating(&conn, ana.id, &heat.id, 8).unwrap();
            ratings_db_operations::upsert_rating(&conn, bob.id, &heat.id, 7).unwrap();
            heat.id
        };

        let schedule = month_schedule(&pool, "March 2026", ymd(2026, 3, 22)).unwrap();
        assert!(schedule.is_current_month);
        assert_eq!(schedule.previous_month, "February 2026");
        assert_eq!(schedule.next_month, "April 2026");
        assert_eq!(schedule.weeks.len(), 2);

        let last = &schedule.weeks[1];
        assert_eq!(last.week_number, 4);
        assert_eq!(last.date_range, "3/22 - 3/31");
        assert_eq!((last.start_day, last.end_day), (22, 31));
        assert!(last.is_now_viewing);
        assert!(!schedule.weeks[0].is_now_viewing);
        assert_eq!(last.week_theme.as_deref(), Some("Michael Mann"));
        assert_eq!(last.films[0].film.id, heat_id);

        let rating = last.films[0].rating.unwrap();
        assert_eq!(rating.average, 7.5);
        assert_eq!(rating.count, 2);
        assert!(last.films[1].rating.is_none());
    }

    #[test]
    fn unknown_month_labels_are_rejected() {
        let pool = test_pool();
        assert!(matches!(
            month_schedule(&pool, "Smarch 2026", ymd(2026, 3, 1)),
            Err(HelperError::Calendar(_))
        ));
    }

    #[test]
    fn home_shows_the_current_week_only() {
        let pool = test_pool();
        {
            let conn = pool.get().unwrap();
            films_db_operations::create_film(&conn, &film_form("Heat", "March 2026", 2)).unwrap();
            films_db_operations::create_film(&conn, &film_form("Alien", "March 2026", 3)).unwrap();
        }
        let home = home_view(&pool, ymd(2026, 3, 9)).unwrap();
        assert_eq!(home.current_week, 2);
        assert_eq!(home.date_range, "3/8 - 3/14");
        assert_eq!(home.films.len(), 1);
        assert_eq!(home.films[0].film.title, "Heat");
        assert!(home.recent_posts.is_empty());
    }

    #[test]
    fn rating_validates_score_and_film() {
        let pool = test_pool();
        let (ana, film_id) = {
            let mut conn = pool.get().unwrap();
            let ana = seed_member(&mut conn, "ana");
            let heat = films_db_operations::create_film(&conn, &film_form("Heat", "March 2026", 2)).unwrap();
            (ana, heat.id)
        };
        assert!(matches!(rate_film(&pool, ana.id, &film_id, 11), Err(HelperError::Validation(_))));
        assert!(matches!(rate_film(&pool, ana.id, "missing", 5), Err(HelperError::NotFound(_))));

        rate_film(&pool, ana.id, &film_id, 4).unwrap();
        let summary = rate_film(&pool, ana.id, &film_id, 9).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.average, 9.0);
        assert_eq!(member_rating(&pool, ana.id, &film_id).unwrap(), Some(9));
    }
}
