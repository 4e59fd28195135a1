//! CLI administration tool for the shortlink platform.
//!
//! Bootstraps administrator accounts and inspects the database without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create an administrator account (interactive)
//! cargo run --bin admin -- user create-admin
//!
//! # Non-interactive
//! cargo run --bin admin -- user create-admin --username root --email root@example.com --yes
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `AUTH_SIGNING_SECRET` (required for `user create-admin`)

use shortlink_platform::application::services::AuthService;
use shortlink_platform::domain::entities::{NewUser, ROLE_ADMIN};
use shortlink_platform::domain::repositories::{LinkRepository, UserRepository};
use shortlink_platform::infrastructure::persistence::{
    PgLinkRepository, PgTokenRepository, PgUserRepository,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing the shortlink platform.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Create an administrator account
    CreateAdmin {
        /// Username (prompted if omitted)
        #[arg(short, long)]
        username: Option<String>,

        /// Email address (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    match action {
        UserAction::CreateAdmin {
            username,
            email,
            yes,
        } => create_admin(username, email, yes, pool).await,
    }
}

/// Creates an administrator account interactively.
async fn create_admin(
    username: Option<String>,
    email: Option<String>,
    yes: bool,
    pool: &PgPool,
) -> Result<()> {
    let signing_secret = std::env::var("AUTH_SIGNING_SECRET")
        .context("AUTH_SIGNING_SECRET must be set to hash the password")?;

    let username = match username {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Administrator username")
            .default("admin".to_string())
            .interact_text()?,
    };

    let email = match email {
        Some(addr) => addr,
        None => Input::<String>::new()
            .with_prompt("Administrator email")
            .interact_text()?,
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    if password.len() < 6 {
        anyhow::bail!("Password must be at least 6 characters");
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Create administrator '{}'?", username))
            .default(true)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    let pool = Arc::new(pool.clone());
    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let tokens = Arc::new(PgTokenRepository::new(pool));

    let auth = AuthService::new(users.clone(), tokens, signing_secret, 24);
    let password_hash = auth
        .hash_password(&password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    let user = users
        .create(NewUser {
            username,
            email,
            password_hash,
            role: ROLE_ADMIN.to_string(),
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create administrator: {}", e))?;

    println!(
        "{} Administrator '{}' created (id: {})",
        "✓".green().bold(),
        user.username.cyan(),
        user.id
    );

    Ok(())
}

/// Prints aggregate statistics.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    let links = PgLinkRepository::new(Arc::new(pool.clone()));

    let stats = links
        .aggregate_stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!("{}", "Statistics".bold().underline());
    println!("  Total links:  {}", stats.total_links.to_string().cyan());
    println!("  Active links: {}", stats.active_links.to_string().cyan());
    println!("  Total clicks: {}", stats.total_clicks.to_string().cyan());

    Ok(())
}

/// Dispatches database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await
                .context("Database query failed")?;

            println!("{} Database connection OK", "✓".green().bold());
            println!("  {}", version.dimmed());

            Ok(())
        }
    }
}
