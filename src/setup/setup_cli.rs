use chrono::Local;
use clap::{Parser, Subcommand};
use film_club_backend::club::calendar_weeks;
use film_club_backend::config::Config;
use film_club_backend::helper::admin_helpers;
use film_club_backend::helper::movie_db_helpers::TmdbClient;
use film_club_backend::setup::db_setup;
use film_club_backend::{open_pool, DbPool};
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for film club setup and scheduling.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    Film {
        #[command(subcommand)]
        action: FilmAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    Setup,
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    /// Grants admin rights to an existing member.
    Promote {
        #[arg(long)]
        username: String,
    },
    Demote {
        #[arg(long)]
        username: String,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum FilmAction {
    Search {
        #[arg(long)]
        query: String,
    },
    /// Schedules a film using details from the movie database.
    Add {
        #[arg(long)]
        tmdb_id: i64,
        /// Month label such as "March 2026". Defaults to the current month.
        #[arg(long)]
        month_year: Option<String>,
        #[arg(long, default_value_t = 1)]
        week: u32,
        #[arg(long)]
        theme: Option<String>,
        /// Pipe-separated prompts, e.g. "Opening scene|The score".
        #[arg(long)]
        discussion_points: Option<String>,
    },
}

#[actix_web::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    match cli.command {
        Commands::Db { action: DbAction::Setup } => setup_database(&config),
        Commands::Admin { action } => {
            let Some(pool) = existing_pool(&config) else { return };
            match action {
                AdminAction::Promote { username } => set_admin(&pool, &username, true),
                AdminAction::Demote { username } => set_admin(&pool, &username, false),
                AdminAction::List => list_admins(&pool),
            }
        }
        Commands::Film { action } => match action {
            FilmAction::Search { query } => search_films(&config, &query).await,
            FilmAction::Add { tmdb_id, month_year, week, theme, discussion_points } => {
                let Some(pool) = existing_pool(&config) else { return };
                add_film(&config, &pool, tmdb_id, month_year, week, theme, discussion_points).await;
            }
        },
    }
}

fn setup_database(config: &Config) {
    let db_path = config.db_path();
    println!("\nSetting up club database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        if let Err(e) = fs::create_dir_all(parent_dir) {
            eprintln!("❌ Error: Could not create database directory: {}", e);
            return;
        }
    }

    let mut conn = match Connection::open(&db_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Error: Could not open club database file: {}", e);
            return;
        }
    };
    match db_setup::setup_club_db(&mut conn) {
        Ok(()) => println!("✅ Club database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up club database: {}", e),
    }
}

fn existing_pool(config: &Config) -> Option<DbPool> {
    let db_path = config.db_path();
    if !db_path.exists() {
        eprintln!("❌ Error: Club database not found at '{}'. Please run `setup_cli db setup` first.", db_path.display());
        return None;
    }
    match open_pool(&db_path) {
        Ok(pool) => Some(pool),
        Err(e) => {
            eprintln!("❌ Error opening club database: {}", e);
            None
        }
    }
}

fn set_admin(pool: &DbPool, username: &str, is_admin: bool) {
    match admin_helpers::promote_member(pool, username, is_admin) {
        Ok(()) if is_admin => println!("✅ '{}' is now an admin.", username),
        Ok(()) => println!("✅ '{}' is no longer an admin.", username),
        Err(e) => eprintln!("❌ Error: {}. Members must sign up before they can be promoted.", e),
    }
}

fn list_admins(pool: &DbPool) {
    match admin_helpers::list_members(pool) {
        Ok(members) => {
            println!("Listing Admins:");
            for member in members.iter().filter(|m| m.is_admin) {
                println!("- {} <{}>", member.username, member.email);
            }
        }
        Err(e) => eprintln!("❌ Error fetching admins: {}", e),
    }
}

async fn search_films(config: &Config, query: &str) {
    let client = TmdbClient::new(config.movie_db.clone());
    match client.search_movies(query).await {
        Ok(candidates) if candidates.is_empty() => println!("No movies found for '{}'.", query),
        Ok(candidates) => {
            for candidate in candidates {
                println!("{:>8}  {} ({})", candidate.id, candidate.title, candidate.release_year);
            }
        }
        Err(e) => eprintln!("❌ Error searching the movie database: {}", e),
    }
}

async fn add_film(
    config: &Config,
    pool: &DbPool,
    tmdb_id: i64,
    month_year: Option<String>,
    week: u32,
    theme: Option<String>,
    discussion_points: Option<String>,
) {
    let client = TmdbClient::new(config.movie_db.clone());
    let today = Local::now().date_naive();
    let mut draft = match admin_helpers::draft_from_movie_db(&client, tmdb_id, today).await {
        Ok(draft) => draft,
        Err(e) => {
            eprintln!("❌ Error fetching movie {}: {}", tmdb_id, e);
            return;
        }
    };

    draft.month_year = month_year.unwrap_or_else(|| calendar_weeks::month_label(today));
    draft.week_number = week;
    draft.week_theme = theme;
    draft.discussion_points = discussion_points;

    match admin_helpers::create_film(pool, draft) {
        Ok(film) => println!(
            "✅ Added '{}' to {} week {} ({}).",
            film.title, film.month_year, film.week_number, film.id
        ),
        Err(e) => eprintln!("❌ Error adding film: {}", e),
    }
}
