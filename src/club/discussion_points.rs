use crate::models::Film;

pub const POINTS_PER_WEEK: usize = 5;

/// Prompts used to fill a week that has fewer curated points than `POINTS_PER_WEEK`.
pub const FALLBACK_PROMPTS: [&str; POINTS_PER_WEEK] = [
    "What were your first impressions?",
    "Which scene stood out the most to you?",
    "How did this film make you feel?",
    "Would you recommend this to others?",
    "How does it compare to other films you have seen recently?",
];

/// Curated points from every film of the week (pipe-separated), topped up with
/// fallback prompts. Curated points are never truncated.
pub fn week_discussion_points(week_films: &[Film]) -> Vec<String> {
    let mut points: Vec<String> = week_films
        .iter()
        .filter_map(|film| film.discussion_points.as_deref())
        .flat_map(|raw| raw.split('|'))
        .map(str::trim)
        .filter(|point| !point.is_empty())
        .map(str::to_string)
        .collect();

    let needed = POINTS_PER_WEEK.saturating_sub(points.len());
    points.extend(FALLBACK_PROMPTS.iter().take(needed).map(|p| p.to_string()));
    points
}
