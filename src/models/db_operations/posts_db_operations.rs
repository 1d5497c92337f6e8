use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{not_found_if_missing, DbError};
use crate::models::{Comment, DiscussionPost};

const POST_SELECT: &str = "SELECT po.id, po.user_id, pr.username, po.title, po.body, po.week_number,
            po.month_year, po.created_at
     FROM posts po LEFT JOIN profiles pr ON pr.id = po.user_id";

fn post_from_row(row: &Row) -> rusqlite::Result<DiscussionPost> {
    Ok(DiscussionPost {
        id: row.get(0)?,
        user_id: row.get(1)?,
        author_username: row.get(2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        week_number: row.get(5)?,
        month_year: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn collect_posts(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<DiscussionPost>, DbError> {
    let mut stmt = conn.prepare(sql)?;
    let posts = stmt
        .query_map(params, post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

/// `encoded_title` is stored exactly as given, tag prefix included.
pub fn create_post(
    conn: &Connection,
    user_id: i64,
    encoded_title: &str,
    body: &str,
    week_number: u32,
    month_year: &str,
) -> Result<DiscussionPost, DbError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO posts (id, user_id, title, body, week_number, month_year, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![id, user_id, encoded_title, body, week_number, month_year, Utc::now()],
    )?;
    read_post(conn, &id)
}

pub fn read_post(conn: &Connection, post_id: &str) -> Result<DiscussionPost, DbError> {
    let result = conn.query_row(&format!("{} WHERE po.id = ?1", POST_SELECT), [post_id], post_from_row);
    not_found_if_missing(result, || format!("post {}", post_id))
}

/// Posts of one week, newest first.
pub fn read_posts_for_week(conn: &Connection, month_year: &str, week_number: u32) -> Result<Vec<DiscussionPost>, DbError> {
    collect_posts(
        conn,
        &format!(
            "{} WHERE po.month_year = ?1 AND po.week_number = ?2 ORDER BY po.created_at DESC, po.rowid DESC",
            POST_SELECT
        ),
        params![month_year, week_number],
    )
}

pub fn read_recent_posts(conn: &Connection, limit: u32) -> Result<Vec<DiscussionPost>, DbError> {
    collect_posts(
        conn,
        &format!("{} ORDER BY po.created_at DESC, po.rowid DESC LIMIT ?1", POST_SELECT),
        [limit],
    )
}

// --- Comments ---

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.user_id, pr.username, c.body, c.created_at
     FROM comments c LEFT JOIN profiles pr ON pr.id = c.user_id";

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        user_id: row.get(2)?,
        author_username: row.get(3)?,
        body: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn create_comment(conn: &Connection, post_id: &str, user_id: i64, body: &str) -> Result<Comment, DbError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO comments (id, post_id, user_id, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, post_id, user_id, body, Utc::now()],
    )?;
    let result = conn.query_row(&format!("{} WHERE c.id = ?1", COMMENT_SELECT), [&id], comment_from_row);
    not_found_if_missing(result, || format!("comment {}", id))
}

/// Comments of a post, oldest first.
pub fn read_comments_for_post(conn: &Connection, post_id: &str) -> Result<Vec<Comment>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE c.post_id = ?1 ORDER BY c.created_at ASC, c.rowid ASC",
        COMMENT_SELECT
    ))?;
    let comments = stmt
        .query_map([post_id], comment_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_member, test_pool};

    #[test]
    fn titles_are_stored_verbatim() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let author = seed_member(&mut conn, "ana");
        let post = create_post(&conn, author.id, "[VS] Which was better?", "Body", 4, "March 2026").unwrap();
        assert_eq!(read_post(&conn, &post.id).unwrap().title, "[VS] Which was better?");
        assert_eq!(post.author_username.as_deref(), Some("ana"));
    }

    #[test]
    fn week_posts_are_newest_first_and_scoped() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let author = seed_member(&mut conn, "ana");
        create_post(&conn, author.id, "first", "", 2, "March 2026").unwrap();
        create_post(&conn, author.id, "second", "", 2, "March 2026").unwrap();
        create_post(&conn, author.id, "other week", "", 3, "March 2026").unwrap();
        create_post(&conn, author.id, "other month", "", 2, "April 2026").unwrap();

        let titles: Vec<String> = read_posts_for_week(&conn, "March 2026", 2)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);

        let recent = read_recent_posts(&conn, 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].title, "other month");
    }

    #[test]
    fn comments_are_oldest_first_and_need_a_post() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let author = seed_member(&mut conn, "ana");
        let post = create_post(&conn, author.id, "Heat", "", 1, "March 2026").unwrap();
        create_comment(&conn, &post.id, author.id, "one").unwrap();
        create_comment(&conn, &post.id, author.id, "two").unwrap();

        let bodies: Vec<String> = read_comments_for_post(&conn, &post.id)
            .unwrap()
            .into_iter()
            .map(|c| c.body)
            .collect();
        assert_eq!(bodies, vec!["one", "two"]);
        assert!(create_comment(&conn, "missing", author.id, "orphan").is_err());
    }
}
