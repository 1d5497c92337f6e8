use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Creates every club table. Safe to run against an existing database.
pub fn setup_club_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;

    println!("- Creating 'members' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_login_time TEXT
        )",
        [],
    )?;

    println!("- Creating 'profiles' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            avatar_url TEXT,
            favorite_quote TEXT,
            favorite_movie TEXT,
            is_admin INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (id) REFERENCES members(id) ON DELETE CASCADE
        )",
        [],
    )?;

    println!("- Creating 'password_resets' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS password_resets (
            token TEXT PRIMARY KEY,
            member_id INTEGER NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY (member_id) REFERENCES members(id) ON DELETE CASCADE
        )",
        [],
    )?;

    println!("- Creating 'films' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS films (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            director TEXT,
            writer TEXT,
            cinematographer TEXT,
            poster_url TEXT,
            trailer_url TEXT,
            where_to_watch TEXT,
            month_year TEXT NOT NULL,
            week_number INTEGER NOT NULL CHECK(week_number BETWEEN 1 AND 4),
            week_theme TEXT,
            discussion_points TEXT,
            is_current INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_films_month_week ON films (month_year, week_number)",
        [],
    )?;

    println!("- Creating 'ratings' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS ratings (
            user_id INTEGER NOT NULL,
            film_id TEXT NOT NULL,
            score INTEGER NOT NULL CHECK(score BETWEEN 1 AND 10),
            PRIMARY KEY (user_id, film_id),
            FOREIGN KEY (user_id) REFERENCES members(id) ON DELETE CASCADE,
            FOREIGN KEY (film_id) REFERENCES films(id) ON DELETE CASCADE
        )",
        [],
    )?;

    println!("- Creating 'posts' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            week_number INTEGER NOT NULL CHECK(week_number BETWEEN 1 AND 4),
            month_year TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES members(id) ON DELETE CASCADE
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_posts_month_week ON posts (month_year, week_number)",
        [],
    )?;

    println!("- Creating 'comments' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            post_id TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
            FOREIGN KEY (user_id) REFERENCES members(id) ON DELETE CASCADE
        )",
        [],
    )?;

    println!("- Creating 'suggestions' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS suggestions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            type TEXT NOT NULL CHECK(type IN ('film', 'theme')),
            title TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES members(id) ON DELETE CASCADE
        )",
        [],
    )?;

    println!("- Creating 'suggestion_votes' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS suggestion_votes (
            user_id INTEGER NOT NULL,
            suggestion_id TEXT NOT NULL,
            PRIMARY KEY (user_id, suggestion_id),
            FOREIGN KEY (user_id) REFERENCES members(id) ON DELETE CASCADE,
            FOREIGN KEY (suggestion_id) REFERENCES suggestions(id) ON DELETE CASCADE
        )",
        [],
    )?;

    tx.commit()?;
    Ok(())
}
