use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{not_found_if_missing, DbError};
use crate::models::{Member, Profile};

// bcrypt's minimum cost keeps the test suite fast.
const HASH_COST: u32 = if cfg!(test) { 4 } else { bcrypt::DEFAULT_COST };

const MEMBER_SELECT: &str = "SELECT m.id, m.email, p.username, p.is_admin
     FROM members m JOIN profiles p ON p.id = m.id";

fn member_from_row(row: &Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        is_admin: row.get(3)?,
    })
}

/// Inserts the credentials row and its profile together.
pub fn create_member(
    conn: &mut Connection,
    email: &str,
    password: &str,
    username: &str,
) -> Result<Member, DbError> {
    let hashed_password = hash(password, HASH_COST)?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO members (email, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![email, hashed_password, Utc::now()],
    )?;
    let member_id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO profiles (id, username) VALUES (?1, ?2)",
        params![member_id, username],
    )?;
    tx.commit()?;
    read_member(conn, member_id)
}

pub fn read_member(conn: &Connection, member_id: i64) -> Result<Member, DbError> {
    let result = conn.query_row(
        &format!("{} WHERE m.id = ?1", MEMBER_SELECT),
        [member_id],
        member_from_row,
    );
    not_found_if_missing(result, || format!("member {}", member_id))
}

pub fn read_member_by_username(conn: &Connection, username: &str) -> Result<Member, DbError> {
    let result = conn.query_row(
        &format!("{} WHERE p.username = ?1", MEMBER_SELECT),
        [username],
        member_from_row,
    );
    not_found_if_missing(result, || format!("member '{}'", username))
}

pub fn read_member_by_email(conn: &Connection, email: &str) -> Result<Option<Member>, DbError> {
    Ok(conn
        .query_row(&format!("{} WHERE m.email = ?1", MEMBER_SELECT), [email], member_from_row)
        .optional()?)
}

pub fn read_all_members(conn: &Connection) -> Result<Vec<Member>, DbError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY m.id", MEMBER_SELECT))?;
    let members = stmt
        .query_map([], member_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(members)
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool, DbError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM members WHERE email = ?1)",
        [email],
        |row| row.get(0),
    )?)
}

pub fn username_exists(conn: &Connection, username: &str) -> Result<bool, DbError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM profiles WHERE username = ?1)",
        [username],
        |row| row.get(0),
    )?)
}

/// Returns the member when the email exists and the password matches its hash.
pub fn verify_credentials(conn: &Connection, email: &str, password: &str) -> Result<Option<Member>, DbError> {
    let stored: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, password_hash FROM members WHERE email = ?1",
            [email],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match stored {
        Some((member_id, password_hash)) if verify(password, &password_hash).unwrap_or(false) => {
            Ok(Some(read_member(conn, member_id)?))
        }
        _ => Ok(None),
    }
}

pub fn update_last_login_time(conn: &Connection, member_id: i64) -> Result<(), DbError> {
    conn.execute(
        "UPDATE members SET last_login_time = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), member_id],
    )?;
    Ok(())
}

pub fn set_admin(conn: &Connection, username: &str, is_admin: bool) -> Result<(), DbError> {
    let updated = conn.execute(
        "UPDATE profiles SET is_admin = ?1 WHERE username = ?2",
        params![is_admin, username],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("member '{}'", username)));
    }
    Ok(())
}

// --- Profiles ---

pub fn read_profile(conn: &Connection, member_id: i64) -> Result<Profile, DbError> {
    let result = conn.query_row(
        "SELECT id, username, avatar_url, favorite_quote, favorite_movie, is_admin
         FROM profiles WHERE id = ?1",
        [member_id],
        |row| {
            Ok(Profile {
                id: row.get(0)?,
                username: row.get(1)?,
                avatar_url: row.get(2)?,
                favorite_quote: row.get(3)?,
                favorite_movie: row.get(4)?,
                is_admin: row.get(5)?,
            })
        },
    );
    not_found_if_missing(result, || format!("profile {}", member_id))
}

pub fn update_profile(
    conn: &Connection,
    member_id: i64,
    avatar_url: Option<&str>,
    favorite_quote: Option<&str>,
    favorite_movie: Option<&str>,
) -> Result<Profile, DbError> {
    let updated = conn.execute(
        "UPDATE profiles SET avatar_url = ?1, favorite_quote = ?2, favorite_movie = ?3 WHERE id = ?4",
        params![avatar_url, favorite_quote, favorite_movie, member_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("profile {}", member_id)));
    }
    read_profile(conn, member_id)
}

// --- Password resets ---

pub fn create_password_reset(
    conn: &Connection,
    member_id: i64,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO password_resets (token, member_id, expires_at) VALUES (?1, ?2, ?3)",
        params![token, member_id, expires_at],
    )?;
    Ok(())
}

/// Spends a reset token. The token is removed whether or not it has expired;
/// `Ok(false)` means it was unknown or expired and the password is unchanged.
pub fn consume_password_reset(
    conn: &mut Connection,
    token: &str,
    new_password: &str,
    now: DateTime<Utc>,
) -> Result<bool, DbError> {
    let tx = conn.transaction()?;
    let reset: Option<(i64, DateTime<Utc>)> = tx
        .query_row(
            "SELECT member_id, expires_at FROM password_resets WHERE token = ?1",
            [token],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((member_id, expires_at)) = reset else {
        return Ok(false);
    };
    tx.execute("DELETE FROM password_resets WHERE token = ?1", [token])?;

    if expires_at <= now {
        tx.commit()?;
        return Ok(false);
    }

    let hashed_password = hash(new_password, HASH_COST)?;
    tx.execute(
        "UPDATE members SET password_hash = ?1 WHERE id = ?2",
        params![hashed_password, member_id],
    )?;
    tx.commit()?;
    Ok(true)
}
