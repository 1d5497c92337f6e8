//! Film tags carried in a discussion post's title.
//!
//! Posts have no tag column. A post about one film is stored as
//! `"[Film Title] rest of title"` and a head-to-head comparison post as
//! `"[VS] rest of title"`. A title that merely starts with bracketed text is
//! indistinguishable from a tagged one; that ambiguity is part of the format.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Film;

pub const COMPARISON_MARKER: &str = "VS";

static TAG_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(.*?)\]\s*").expect("tag prefix pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "film_title", rename_all = "snake_case")]
pub enum PostTag {
    /// General discussion for the week.
    None,
    /// Scoped to the week's film whose title matches exactly.
    Film(String),
    /// Compares both films of a head-to-head week.
    Comparison,
}

impl PostTag {
    /// Films of the week this tag refers to. Matching is exact title equality.
    pub fn resolve<'a>(&self, week_films: &'a [Film]) -> Vec<&'a Film> {
        match self {
            PostTag::None => Vec::new(),
            PostTag::Film(title) => week_films.iter().filter(|film| film.title == *title).collect(),
            PostTag::Comparison => week_films.iter().collect(),
        }
    }
}

pub fn encode(tag: &PostTag, title: &str) -> String {
    match tag {
        PostTag::None => title.to_string(),
        PostTag::Film(film_title) => format!("[{}] {}", film_title, title),
        PostTag::Comparison => format!("[{}] {}", COMPARISON_MARKER, title),
    }
}

/// Splits a stored title into its tag and the title shown to readers.
pub fn decode(raw_title: &str) -> (PostTag, String) {
    let Some(captures) = TAG_PREFIX.captures(raw_title) else {
        return (PostTag::None, raw_title.to_string());
    };
    let prefix_end = captures.get(0).map_or(0, |m| m.end());
    let contents = captures.get(1).map_or("", |m| m.as_str());
    let clean_title = raw_title[prefix_end..].to_string();

    if contents == COMPARISON_MARKER {
        (PostTag::Comparison, clean_title)
    } else {
        (PostTag::Film(contents.to_string()), clean_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_titles_pass_through() {
        assert_eq!(
            decode("Great opening scene"),
            (PostTag::None, "Great opening scene".to_string())
        );
        assert_eq!(decode("").0, PostTag::None);
        // No closing bracket, so no tag.
        assert_eq!(decode("[Unclosed thoughts").0, PostTag::None);
        // The prefix must be at the very start.
        assert_eq!(decode("About [Heat]").0, PostTag::None);
    }

    #[test]
    fn comparison_marker_decodes() {
        assert_eq!(
            decode("[VS] Which was better?"),
            (PostTag::Comparison, "Which was better?".to_string())
        );
    }

    #[test]
    fn film_tag_decodes() {
        assert_eq!(
            decode("[Oppenheimer] Loved the score"),
            (PostTag::Film("Oppenheimer".to_string()), "Loved the score".to_string())
        );
        assert_eq!(
            decode("[vs] lowercase is a film title"),
            (PostTag::Film("vs".to_string()), "lowercase is a film title".to_string())
        );
    }

    #[test]
    fn prefix_match_is_non_greedy_and_eats_whitespace() {
        assert_eq!(
            decode("[Heat]   [spoilers] the ending"),
            (PostTag::Film("Heat".to_string()), "[spoilers] the ending".to_string())
        );
        assert_eq!(decode("[Heat]no space"), (PostTag::Film("Heat".to_string()), "no space".to_string()));
        assert_eq!(decode("[] empty"), (PostTag::Film(String::new()), "empty".to_string()));
    }

    #[test]
    fn encoding_round_trips_for_every_variant() {
        let tags = [
            PostTag::None,
            PostTag::Film("Oppenheimer".to_string()),
            PostTag::Film("2001: A Space Odyssey".to_string()),
            PostTag::Comparison,
        ];
        for tag in tags {
            for title in ["Loved the score", "", "What did [the ending] mean?"] {
                let encoded = encode(&tag, title);
                assert_eq!(decode(&encoded), (tag.clone(), title.to_string()), "{:?}", encoded);
            }
        }
    }

    #[test]
    fn encoded_form_matches_storage_format() {
        assert_eq!(encode(&PostTag::Comparison, "Which was better?"), "[VS] Which was better?");
        assert_eq!(encode(&PostTag::Film("Heat".to_string()), "Shootout"), "[Heat] Shootout");
        assert_eq!(encode(&PostTag::None, "Plain"), "Plain");
    }

    #[test]
    fn tag_serializes_with_a_kind_field() {
        let json = serde_json::to_value(PostTag::Film("Heat".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "film", "film_title": "Heat" }));
        let parsed: PostTag = serde_json::from_value(serde_json::json!({ "kind": "comparison" })).unwrap();
        assert_eq!(parsed, PostTag::Comparison);
    }
}
