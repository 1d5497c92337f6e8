use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use rand::RngCore;
use serde::Deserialize;

use super::sanitization_helpers::{clean_optional, strip_all_html};
use super::{get_conn, lift_not_found, HelperError};
use crate::models::db_operations::{members_db_operations, DbError};
use crate::models::{Member, Profile};
use crate::DbPool;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const RESET_TOKEN_BYTES: usize = 32;
pub const RESET_TOKEN_LIFETIME_HOURS: i64 = 1;

#[derive(Debug, Deserialize)]
pub struct SelectedMovie {
    pub title: String,
    pub poster_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub favorite_quote: Option<String>,
    /// Only a movie with a poster replaces the avatar and favourite movie.
    pub selected_movie: Option<SelectedMovie>,
}

fn check_password(password: &str) -> Result<(), HelperError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(HelperError::Validation(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn register(pool: &DbPool, email: &str, password: &str, username: &str) -> Result<Member, HelperError> {
    let email = normalize_email(email);
    let username = strip_all_html(username);
    if !email.contains('@') {
        return Err(HelperError::Validation("A valid email address is required.".to_string()));
    }
    if username.is_empty() {
        return Err(HelperError::Validation("Username cannot be empty.".to_string()));
    }
    check_password(password)?;

    let mut conn = get_conn(pool)?;
    if members_db_operations::email_exists(&conn, &email)? {
        return Err(HelperError::Conflict("An account with this email already exists.".to_string()));
    }
    if members_db_operations::username_exists(&conn, &username)? {
        return Err(HelperError::Conflict(format!("Username '{}' is already taken.", username)));
    }

    let member = members_db_operations::create_member(&mut conn, &email, password, &username)?;
    info!("New member '{}' signed up", member.username);
    Ok(member)
}

pub fn login(pool: &DbPool, email: &str, password: &str) -> Result<Member, HelperError> {
    let email = normalize_email(email);
    let conn = get_conn(pool)?;
    match members_db_operations::verify_credentials(&conn, &email, password)? {
        Some(member) => {
            members_db_operations::update_last_login_time(&conn, member.id)?;
            Ok(member)
        }
        None => {
            warn!("Failed sign-in attempt for '{}'", email);
            Err(HelperError::Unauthorized)
        }
    }
}

/// Re-reads the member so admin promotions show up without a new sign-in.
pub fn current_member(pool: &DbPool, member_id: i64) -> Result<Member, HelperError> {
    let conn = get_conn(pool)?;
    members_db_operations::read_member(&conn, member_id).map_err(lift_not_found)
}

/// The stored profile decides admin access, whatever the session says.
pub fn require_admin(pool: &DbPool, member_id: i64) -> Result<Member, HelperError> {
    let conn = get_conn(pool)?;
    match members_db_operations::read_member(&conn, member_id) {
        Ok(member) if member.is_admin => Ok(member),
        Ok(member) => {
            warn!("Member '{}' tried to reach an admin endpoint", member.username);
            Err(HelperError::Forbidden)
        }
        Err(DbError::NotFound(_)) => Err(HelperError::Forbidden),
        Err(e) => Err(e.into()),
    }
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn reset_link(public_base_url: &str, token: &str) -> String {
    format!("{}/reset?token={}", public_base_url.trim_end_matches('/'), token)
}

/// Issues a reset token when the email belongs to a member. Unknown emails
/// return `Ok(None)` so callers answer the same either way.
pub fn request_password_reset(
    pool: &DbPool,
    email: &str,
    public_base_url: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>, HelperError> {
    let email = normalize_email(email);
    let conn = get_conn(pool)?;
    let Some(member) = members_db_operations::read_member_by_email(&conn, &email)? else {
        info!("Password reset requested for unknown email");
        return Ok(None);
    };

    let token = generate_reset_token();
    let expires_at = now + Duration::hours(RESET_TOKEN_LIFETIME_HOURS);
    members_db_operations::create_password_reset(&conn, member.id, &token, expires_at)?;
    info!(
        "Password reset for '{}' issued, valid until {}: {}",
        member.username,
        expires_at.to_rfc3339(),
        reset_link(public_base_url, &token)
    );
    Ok(Some(token))
}

pub fn confirm_password_reset(
    pool: &DbPool,
    token: &str,
    new_password: &str,
    now: DateTime<Utc>,
) -> Result<(), HelperError> {
    check_password(new_password)?;
    let mut conn = get_conn(pool)?;
    if members_db_operations::consume_password_reset(&mut conn, token.trim(), new_password, now)? {
        Ok(())
    } else {
        Err(HelperError::Validation("This reset link is invalid or has expired.".to_string()))
    }
}

pub fn get_profile(pool: &DbPool, member_id: i64) -> Result<Profile, HelperError> {
    let conn = get_conn(pool)?;
    members_db_operations::read_profile(&conn, member_id).map_err(lift_not_found)
}

pub fn update_profile(pool: &DbPool, member_id: i64, update: ProfileUpdate) -> Result<Profile, HelperError> {
    let conn = get_conn(pool)?;
    let current = members_db_operations::read_profile(&conn, member_id).map_err(lift_not_found)?;

    let favorite_quote = clean_optional(update.favorite_quote.as_deref());
    let (avatar_url, favorite_movie) = match update.selected_movie {
        Some(SelectedMovie { title, poster_url: Some(poster_url) }) => (Some(poster_url), Some(title)),
        _ => (current.avatar_url, current.favorite_movie),
    };

    Ok(members_db_operations::update_profile(
        &conn,
        member_id,
        avatar_url.as_deref(),
        favorite_quote.as_deref(),
        favorite_movie.as_deref(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_admin, test_pool};

    #[test]
    fn registration_validates_and_rejects_duplicates() {
        let pool = test_pool();
        let member = register(&pool, " Ana@Example.com ", "secret1", "ana").unwrap();
        assert_eq!(member.email, "ana@example.com");

        assert!(matches!(register(&pool, "ana@example.com", "secret1", "other"), Err(HelperError::Conflict(_))));
        assert!(matches!(register(&pool, "new@example.com", "secret1", "ana"), Err(HelperError::Conflict(_))));
        assert!(matches!(register(&pool, "new@example.com", "short", "new"), Err(HelperError::Validation(_))));
        assert!(matches!(register(&pool, "not-an-email", "secret1", "new"), Err(HelperError::Validation(_))));
        assert!(matches!(register(&pool, "new@example.com", "secret1", " "), Err(HelperError::Validation(_))));
    }

    #[test]
    fn login_checks_credentials() {
        let pool = test_pool();
        register(&pool, "ana@example.com", "secret1", "ana").unwrap();
        assert_eq!(login(&pool, "ANA@example.com", "secret1").unwrap().username, "ana");
        assert!(matches!(login(&pool, "ana@example.com", "nope"), Err(HelperError::Unauthorized)));
    }

    #[test]
    fn password_reset_flow() {
        let pool = test_pool();
        register(&pool, "ana@example.com", "secret1", "ana").unwrap();
        let now = Utc::now();

        assert_eq!(request_password_reset(&pool, "ghost@example.com", "http://club", now).unwrap(), None);
        let token = request_password_reset(&pool, "ana@example.com", "http://club", now)
            .unwrap()
            .unwrap();
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);

        assert!(matches!(confirm_password_reset(&pool, &token, "tiny", now), Err(HelperError::Validation(_))));
        confirm_password_reset(&pool, &token, "brandnew", now).unwrap();
        assert!(confirm_password_reset(&pool, &token, "brandnew", now).is_err());
        login(&pool, "ana@example.com", "brandnew").unwrap();
    }

    #[test]
    fn expired_tokens_are_refused() {
        let pool = test_pool();
        register(&pool, "ana@example.com", "secret1", "ana").unwrap();
        let issued = Utc::now();
        let token = request_password_reset(&pool, "ana@example.com", "http://club", issued)
            .unwrap()
            .unwrap();
        let later = issued + Duration::hours(2);
        assert!(confirm_password_reset(&pool, &token, "brandnew", later).is_err());
        login(&pool, "ana@example.com", "secret1").unwrap();
    }

    #[test]
    fn reset_link_uses_the_public_base() {
        assert_eq!(reset_link("https://club.example/", "abc"), "https://club.example/reset?token=abc");
    }

    #[test]
    fn profile_update_needs_a_poster_to_change_the_avatar() {
        let pool = test_pool();
        let ana = register(&pool, "ana@example.com", "secret1", "ana").unwrap();

        let profile = update_profile(&pool, ana.id, ProfileUpdate {
            favorite_quote: Some("  Say hello to my little friend  ".to_string()),
            selected_movie: Some(SelectedMovie {
                title: "Scarface".to_string(),
                poster_url: Some("https://image.tmdb.org/t/p/w342/s.jpg".to_string()),
            }),
        })
        .unwrap();
        assert_eq!(profile.favorite_quote.as_deref(), Some("Say hello to my little friend"));
        assert_eq!(profile.favorite_movie.as_deref(), Some("Scarface"));

        let profile = update_profile(&pool, ana.id, ProfileUpdate {
            favorite_quote: Some("".to_string()),
            selected_movie: Some(SelectedMovie { title: "No Poster".to_string(), poster_url: None }),
        })
        .unwrap();
        assert_eq!(profile.favorite_quote, None);
        assert_eq!(profile.favorite_movie.as_deref(), Some("Scarface"));
        assert_eq!(profile.avatar_url.as_deref(), Some("https://image.tmdb.org/t/p/w342/s.jpg"));
    }

    #[test]
    fn admin_access_follows_the_stored_flag() {
        let pool = test_pool();
        let root = {
            let mut conn = pool.get().unwrap();
            seed_admin(&mut conn, "root")
        };
        assert_eq!(require_admin(&pool, root.id).unwrap().username, "root");

        {
            let conn = pool.get().unwrap();
            members_db_operations::set_admin(&conn, "root", false).unwrap();
        }
        assert!(matches!(require_admin(&pool, root.id), Err(HelperError::Forbidden)));
        assert!(matches!(require_admin(&pool, 9999), Err(HelperError::Forbidden)));
    }
}
