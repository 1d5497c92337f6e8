use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{not_found_if_missing, DbError};
use crate::models::{Suggestion, SuggestionKind, VoteState};

const SUGGESTION_SELECT: &str = "SELECT s.id, s.user_id, pr.username, s.type, s.title, s.description, s.created_at
     FROM suggestions s LEFT JOIN profiles pr ON pr.id = s.user_id";

fn suggestion_from_row(row: &Row) -> rusqlite::Result<Suggestion> {
    let kind: String = row.get(3)?;
    let kind = SuggestionKind::parse(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown suggestion type '{}'", kind).into(),
        )
    })?;
    Ok(Suggestion {
        id: row.get(0)?,
        user_id: row.get(1)?,
        author_username: row.get(2)?,
        kind,
        title: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn create_suggestion(
    conn: &Connection,
    user_id: i64,
    kind: SuggestionKind,
    title: &str,
    description: Option<&str>,
) -> Result<Suggestion, DbError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO suggestions (id, user_id, type, title, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, user_id, kind.as_str(), title, description, Utc::now()],
    )?;
    let result = conn.query_row(
        &format!("{} WHERE s.id = ?1", SUGGESTION_SELECT),
        [&id],
        suggestion_from_row,
    );
    not_found_if_missing(result, || format!("suggestion {}", id))
}

/// Suggestions of one type, newest first.
pub fn read_suggestions(conn: &Connection, kind: SuggestionKind) -> Result<Vec<Suggestion>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE s.type = ?1 ORDER BY s.created_at DESC, s.rowid DESC",
        SUGGESTION_SELECT
    ))?;
    let suggestions = stmt
        .query_map([kind.as_str()], suggestion_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(suggestions)
}

pub fn suggestion_exists(conn: &Connection, suggestion_id: &str) -> Result<bool, DbError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM suggestions WHERE id = ?1)",
        [suggestion_id],
        |row| row.get(0),
    )?)
}

/// Vote count per suggestion id. Suggestions without votes are absent.
pub fn read_vote_counts(conn: &Connection) -> Result<HashMap<String, usize>, DbError> {
    let mut stmt = conn.prepare("SELECT suggestion_id, COUNT(*) FROM suggestion_votes GROUP BY suggestion_id")?;
    let counts = stmt
        .query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok((row.get(0)?, usize::try_from(count).unwrap_or(0)))
        })?
        .collect::<rusqlite::Result<HashMap<_, _>>>()?;
    Ok(counts)
}

pub fn read_member_votes(conn: &Connection, user_id: i64) -> Result<HashSet<String>, DbError> {
    let mut stmt = conn.prepare("SELECT suggestion_id FROM suggestion_votes WHERE user_id = ?1")?;
    let votes = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(votes)
}

fn count_votes(conn: &Connection, suggestion_id: &str) -> Result<usize, DbError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM suggestion_votes WHERE suggestion_id = ?1",
        [suggestion_id],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or(0))
}

/// Adds the member's vote, or removes it if it was already there.
pub fn toggle_vote(conn: &Connection, user_id: i64, suggestion_id: &str) -> Result<VoteState, DbError> {
    let removed = conn.execute(
        "DELETE FROM suggestion_votes WHERE user_id = ?1 AND suggestion_id = ?2",
        params![user_id, suggestion_id],
    )?;
    if removed == 0 {
        conn.execute(
            "INSERT INTO suggestion_votes (user_id, suggestion_id) VALUES (?1, ?2)",
            params![user_id, suggestion_id],
        )?;
    }
    Ok(VoteState {
        has_voted: removed == 0,
        votes: count_votes(conn, suggestion_id)?,
    })
}
