//! Club rules that need no storage or network: calendar weeks, post tags,
//! discussion prompts, rating summaries and suggestion ordering.

pub mod calendar_weeks;
pub mod discussion_points;
pub mod post_tags;
pub mod ratings;
pub mod suggestion_ranking;
