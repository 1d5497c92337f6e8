use std::collections::HashSet;

use log::info;

use super::sanitization_helpers::{clean_optional, strip_all_html};
use super::{get_conn, HelperError};
use crate::club::suggestion_ranking::rank_suggestions;
use crate::models::db_operations::suggestions_db_operations;
use crate::models::{RankedSuggestion, Suggestion, SuggestionKind, VoteState};
use crate::DbPool;

/// Ranked suggestions of one type. `viewer` marks the caller's own votes.
pub fn list_suggestions(
    pool: &DbPool,
    kind: SuggestionKind,
    viewer: Option<i64>,
) -> Result<Vec<RankedSuggestion>, HelperError> {
    let conn = get_conn(pool)?;
    let suggestions = suggestions_db_operations::read_suggestions(&conn, kind)?;
    let counts = suggestions_db_operations::read_vote_counts(&conn)?;
    let own_votes = match viewer {
        Some(member_id) => suggestions_db_operations::read_member_votes(&conn, member_id)?,
        None => HashSet::new(),
    };
    Ok(rank_suggestions(suggestions, kind, &counts, &own_votes))
}

pub fn submit_suggestion(
    pool: &DbPool,
    member_id: i64,
    kind: SuggestionKind,
    title: &str,
    description: Option<&str>,
) -> Result<Suggestion, HelperError> {
    let title = strip_all_html(title);
    if title.is_empty() {
        return Err(HelperError::Validation("Suggestion title cannot be empty.".to_string()));
    }
    let description = clean_optional(description);

    let conn = get_conn(pool)?;
    let suggestion = suggestions_db_operations::create_suggestion(&conn, member_id, kind, &title, description.as_deref())?;
    info!("Member {} suggested {} '{}'", member_id, kind.as_str(), suggestion.title);
    Ok(suggestion)
}

pub fn toggle_vote(pool: &DbPool, member_id: i64, suggestion_id: &str) -> Result<VoteState, HelperError> {
    let conn = get_conn(pool)?;
    if !suggestions_db_operations::suggestion_exists(&conn, suggestion_id)? {
        return Err(HelperError::NotFound(format!("suggestion {}", suggestion_id)));
    }
    Ok(suggestions_db_operations::toggle_vote(&conn, member_id, suggestion_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_member, test_pool};

    #[test]
    fn most_voted_first_then_newest() {
        let pool = test_pool();
        let (ana, bob) = {
            let mut conn = pool.get().unwrap();
            (seed_member(&mut conn, "ana"), seed_member(&mut conn, "bob"))
        };
        let heat = submit_suggestion(&pool, ana.id, SuggestionKind::Film, "Heat", None).unwrap();
        let thief = submit_suggestion(&pool, ana.id, SuggestionKind::Film, "Thief", Some("  ")).unwrap();
        let alien = submit_suggestion(&pool, bob.id, SuggestionKind::Film, "Alien", None).unwrap();
        submit_suggestion(&pool, bob.id, SuggestionKind::Theme, "Heists", None).unwrap();
        assert_eq!(thief.description, None);

        toggle_vote(&pool, ana.id, &heat.id).unwrap();
        toggle_vote(&pool, bob.id, &heat.id).unwrap();
        toggle_vote(&pool, bob.id, &thief.id).unwrap();

        let ranked = list_suggestions(&pool, SuggestionKind::Film, Some(ana.id)).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|r| r.suggestion.id.as_str()).collect();
        assert_eq!(ids, vec![heat.id.as_str(), thief.id.as_str(), alien.id.as_str()]);
        assert_eq!(ranked[0].votes, 2);
        assert!(ranked[0].has_voted);
        assert!(!ranked[1].has_voted);

        let anonymous = list_suggestions(&pool, SuggestionKind::Theme, None).unwrap();
        assert_eq!(anonymous.len(), 1);
        assert!(!anonymous[0].has_voted);
    }

    #[test]
    fn votes_toggle_and_need_a_target() {
        let pool = test_pool();
        let ana = {
            let mut conn = pool.get().unwrap();
            seed_member(&mut conn, "ana")
        };
        let heat = submit_suggestion(&pool, ana.id, SuggestionKind::Film, "Heat", None).unwrap();
        assert_eq!(toggle_vote(&pool, ana.id, &heat.id).unwrap(), VoteState { has_voted: true, votes: 1 });
        assert_eq!(toggle_vote(&pool, ana.id, &heat.id).unwrap(), VoteState { has_voted: false, votes: 0 });
        assert!(matches!(toggle_vote(&pool, ana.id, "missing"), Err(HelperError::NotFound(_))));
        assert!(matches!(
            submit_suggestion(&pool, ana.id, SuggestionKind::Theme, "<p></p>", None),
            Err(HelperError::Validation(_))
        ));
    }
}
