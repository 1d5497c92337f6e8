use rusqlite::{params, Connection, OptionalExtension};

use super::DbError;

/// Re-rating replaces the member's previous score for the film.
pub fn upsert_rating(conn: &Connection, user_id: i64, film_id: &str, score: u8) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO ratings (user_id, film_id, score) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, film_id) DO UPDATE SET score = excluded.score",
        params![user_id, film_id, score],
    )?;
    Ok(())
}

pub fn read_scores_for_film(conn: &Connection, film_id: &str) -> Result<Vec<u8>, DbError> {
    let mut stmt = conn.prepare("SELECT score FROM ratings WHERE film_id = ?1")?;
    let scores = stmt
        .query_map([film_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<u8>>>()?;
    Ok(scores)
}

pub fn read_member_score(conn: &Connection, user_id: i64, film_id: &str) -> Result<Option<u8>, DbError> {
    Ok(conn
        .query_row(
            "SELECT score FROM ratings WHERE user_id = ?1 AND film_id = ?2",
            params![user_id, film_id],
            |row| row.get(0),
        )
        .optional()?)
}
