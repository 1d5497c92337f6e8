use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::club::post_tags::{self, PostTag};
use crate::club::ratings::RatingSummary;

/// One scheduled viewing. Films sharing `(month_year, week_number)` form a week;
/// one film is a solo week, two a head-to-head week.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Film {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub cinematographer: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub where_to_watch: Option<String>,
    pub month_year: String,
    pub week_number: u32,
    pub week_theme: Option<String>,
    pub discussion_points: Option<String>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}

/// Editable film fields, used for creation, edits and movie-database drafts.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct FilmForm {
    pub title: String,
    pub description: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub cinematographer: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub where_to_watch: Option<String>,
    pub month_year: String,
    pub week_number: u32,
    pub week_theme: Option<String>,
    pub discussion_points: Option<String>,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct FilmWithRating {
    #[serde(flatten)]
    pub film: Film,
    pub rating: Option<RatingSummary>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ScheduledWeek {
    pub week_number: u32,
    pub date_range: String,
    pub start_day: u32,
    pub end_day: u32,
    pub week_theme: Option<String>,
    pub is_now_viewing: bool,
    pub films: Vec<FilmWithRating>,
}

#[derive(Debug, Serialize, Clone)]
pub struct MonthSchedule {
    pub month_year: String,
    pub is_current_month: bool,
    pub previous_month: String,
    pub next_month: String,
    pub weeks: Vec<ScheduledWeek>,
}

/// Identity kept in the session and returned by the auth endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
    pub favorite_quote: Option<String>,
    pub favorite_movie: Option<String>,
    pub is_admin: bool,
}

/// A post row as stored; `title` still carries its tag prefix.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiscussionPost {
    pub id: String,
    pub user_id: i64,
    pub author_username: Option<String>,
    pub title: String,
    pub body: String,
    pub week_number: u32,
    pub month_year: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct PostView {
    pub id: String,
    pub tag: PostTag,
    pub display_title: String,
    pub raw_title: String,
    pub body: String,
    pub week_number: u32,
    pub month_year: String,
    pub author_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DiscussionPost> for PostView {
    fn from(post: DiscussionPost) -> Self {
        let (tag, display_title) = post_tags::decode(&post.title);
        PostView {
            id: post.id,
            tag,
            display_title,
            raw_title: post.title,
            body: post.body,
            week_number: post.week_number,
            month_year: post.month_year,
            author_username: post.author_username,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: i64,
    pub author_username: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct WeekDiscussion {
    pub week_number: u32,
    pub date_range: String,
    pub week_theme: Option<String>,
    pub is_now_viewing: bool,
    pub is_head_to_head: bool,
    pub films: Vec<Film>,
    pub discussion_points: Vec<String>,
    pub posts: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct MonthDiscussion {
    pub month_year: String,
    pub is_current_month: bool,
    pub previous_month: String,
    pub next_month: String,
    /// Week whose posts are loaded first: the current week in the current month.
    pub expanded_week: Option<u32>,
    pub weeks: Vec<WeekDiscussion>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Film,
    Theme,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Film => "film",
            SuggestionKind::Theme => "theme",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "film" => Some(SuggestionKind::Film),
            "theme" => Some(SuggestionKind::Theme),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Suggestion {
    pub id: String,
    pub user_id: i64,
    pub author_username: Option<String>,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct RankedSuggestion {
    #[serde(flatten)]
    pub suggestion: Suggestion,
    pub votes: usize,
    pub has_voted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct VoteState {
    pub has_voted: bool,
    pub votes: usize,
}

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub month_year: String,
    pub current_week: u32,
    pub date_range: String,
    pub week_theme: Option<String>,
    pub films: Vec<FilmWithRating>,
    pub recent_posts: Vec<PostView>,
}

pub mod db_operations;
pub mod movie_db_models;
