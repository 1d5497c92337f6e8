use std::collections::{HashMap, HashSet};

use crate::models::{RankedSuggestion, Suggestion, SuggestionKind};

/// Suggestions of one kind, most-voted first. `suggestions` is expected newest
/// first; the sort is stable, so ties stay newest first.
pub fn rank_suggestions(
    suggestions: Vec<Suggestion>,
    kind: SuggestionKind,
    vote_counts: &HashMap<String, usize>,
    voted_by_viewer: &HashSet<String>,
) -> Vec<RankedSuggestion> {
    let mut ranked: Vec<RankedSuggestion> = suggestions
        .into_iter()
        .filter(|s| s.kind == kind)
        .map(|suggestion| RankedSuggestion {
            votes: vote_counts.get(&suggestion.id).copied().unwrap_or(0),
            has_voted: voted_by_viewer.contains(&suggestion.id),
            suggestion,
        })
        .collect();
    ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
    ranked
}
