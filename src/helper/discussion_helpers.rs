use chrono::NaiveDate;
use log::{info, warn};
use serde::Deserialize;

use super::sanitization_helpers::{sanitize_member_text, strip_all_html};
use super::schedule_helpers::{group_by_week, is_now_viewing, week_theme};
use super::{get_conn, lift_not_found, HelperError};
use crate::club::calendar_weeks::{self, WEEKS_PER_MONTH};
use crate::club::discussion_points::week_discussion_points;
use crate::club::post_tags::{self, PostTag};
use crate::models::db_operations::{films_db_operations, posts_db_operations};
use crate::models::{Comment, Film, MonthDiscussion, PostDetail, PostView, WeekDiscussion};
use crate::DbPool;

#[derive(Debug, Deserialize)]
pub struct NewPost {
    pub month_year: String,
    pub week_number: u32,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Omitted means a general post for the week.
    pub tag: Option<PostTag>,
}

fn check_week_number(week_number: u32) -> Result<(), HelperError> {
    if (1..=WEEKS_PER_MONTH).contains(&week_number) {
        Ok(())
    } else {
        Err(HelperError::Validation(format!("Week number must be between 1 and {}.", WEEKS_PER_MONTH)))
    }
}

/// A tag must point at the week it is posted in and read back unchanged
/// from the stored title.
pub fn validate_tag(tag: &PostTag, week_films: &[Film]) -> Result<(), HelperError> {
    match tag {
        PostTag::None => Ok(()),
        PostTag::Film(title) if post_tags::decode(&post_tags::encode(tag, "")).0 != *tag => Err(
            HelperError::Validation(format!("Posts cannot be tagged with '{}'.", title)),
        ),
        PostTag::Film(title) if tag.resolve(week_films).is_empty() => Err(HelperError::Validation(
            format!("'{}' is not scheduled for this week.", title),
        )),
        PostTag::Film(_) => Ok(()),
        PostTag::Comparison if week_films.len() == 2 => Ok(()),
        PostTag::Comparison => Err(HelperError::Validation(
            "Comparison posts need a head-to-head week.".to_string(),
        )),
    }
}

fn posts_for_week(conn: &rusqlite::Connection, month_year: &str, week_number: u32) -> Result<Vec<PostView>, HelperError> {
    Ok(posts_db_operations::read_posts_for_week(conn, month_year, week_number)?
        .into_iter()
        .map(PostView::from)
        .collect())
}

pub fn month_discussion(pool: &DbPool, month_label: &str, today: NaiveDate) -> Result<MonthDiscussion, HelperError> {
    let month = calendar_weeks::parse_month_label(month_label)?;
    let is_current_month = calendar_weeks::is_same_month(month, today);
    let conn = get_conn(pool)?;
    let films = films_db_operations::read_films_for_month(&conn, month_label)?;

    let mut weeks = Vec::new();
    for (week_number, week_films) in group_by_week(films) {
        weeks.push(WeekDiscussion {
            week_number,
            date_range: calendar_weeks::format_week_range(week_number, month)?,
            week_theme: week_theme(&week_films),
            is_now_viewing: is_now_viewing(month, week_number, today),
            is_head_to_head: week_films.len() == 2,
            discussion_points: week_discussion_points(&week_films),
            posts: posts_for_week(&conn, month_label, week_number)?,
            films: week_films,
        });
    }

    Ok(MonthDiscussion {
        month_year: calendar_weeks::month_label(month),
        is_current_month,
        previous_month: calendar_weeks::month_label(calendar_weeks::previous_month(month)),
        next_month: calendar_weeks::month_label(calendar_weeks::next_month(month)),
        expanded_week: Some(calendar_weeks::current_week_number(today)),
        weeks,
    })
}

pub fn week_posts(pool: &DbPool, month_label: &str, week_number: u32) -> Result<Vec<PostView>, HelperError> {
    calendar_weeks::parse_month_label(month_label)?;
    check_week_number(week_number)?;
    let conn = get_conn(pool)?;
    posts_for_week(&conn, month_label, week_number)
}

pub fn recent_posts(pool: &DbPool, limit: u32) -> Result<Vec<PostView>, HelperError> {
    let conn = get_conn(pool)?;
    Ok(posts_db_operations::read_recent_posts(&conn, limit)?
        .into_iter()
        .map(PostView::from)
        .collect())
}

pub fn post_detail(pool: &DbPool, post_id: &str) -> Result<PostDetail, HelperError> {
    let conn = get_conn(pool)?;
    let post = posts_db_operations::read_post(&conn, post_id).map_err(lift_not_found)?;
    let comments = posts_db_operations::read_comments_for_post(&conn, post_id)?;
    Ok(PostDetail { post: PostView::from(post), comments })
}

pub fn create_post(pool: &DbPool, member_id: i64, new_post: NewPost) -> Result<PostView, HelperError> {
    calendar_weeks::parse_month_label(&new_post.month_year)?;
    check_week_number(new_post.week_number)?;

    let title = strip_all_html(&new_post.title);
    if title.is_empty() {
        return Err(HelperError::Validation("Post title cannot be empty.".to_string()));
    }
    let body = sanitize_member_text(new_post.body.trim());
    let tag = new_post.tag.unwrap_or(PostTag::None);

    let conn = get_conn(pool)?;
    let week_films = films_db_operations::read_films_for_week(&conn, &new_post.month_year, new_post.week_number)?;
    if let Err(e) = validate_tag(&tag, &week_films) {
        warn!("Rejected post tag {:?} for {} week {}", tag, new_post.month_year, new_post.week_number);
        return Err(e);
    }

    let encoded_title = post_tags::encode(&tag, &title);
    let post = posts_db_operations::create_post(
        &conn,
        member_id,
        &encoded_title,
        &body,
        new_post.week_number,
        &new_post.month_year,
    )?;
    info!("Member {} posted in {} week {}", member_id, post.month_year, post.week_number);
    Ok(PostView::from(post))
}

pub fn add_comment(pool: &DbPool, member_id: i64, post_id: &str, body: &str) -> Result<Comment, HelperError> {
    let body = sanitize_member_text(body.trim());
    if body.is_empty() {
        return Err(HelperError::Validation("Comment cannot be empty.".to_string()));
    }
    let conn = get_conn(pool)?;
    posts_db_operations::read_post(&conn, post_id).map_err(lift_not_found)?;
    Ok(posts_db_operations::create_comment(&conn, post_id, member_id, &body)?)
}
