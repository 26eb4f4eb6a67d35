//! CLI administration tool for secure-api.
//!
//! Provides commands for managing user roles, issuing bearer tokens and
//! performing database checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List users
//! cargo run --bin admin -- user list
//!
//! # Grant or revoke the Admin role
//! cargo run --bin admin -- user promote alice
//! cargo run --bin admin -- user demote alice
//!
//! # Print a bearer token for a user
//! cargo run --bin admin -- token issue alice
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! The same variables as the server (see `secure_api::config`). A database
//! must be configured; `JWT_SECRET` is required for `token issue`.

use secure_api::application::services::UserService;
use secure_api::config::Config;
use secure_api::domain::entities::{ROLE_ADMIN, User};
use secure_api::infrastructure::persistence::PgUserRepository;
use secure_api::server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing secure-api.
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
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Issue bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List active users
    List {
        /// Maximum number of users to show
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },

    /// Grant the Admin role
    Promote {
        username: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Revoke the Admin role
    Demote {
        username: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Print a bearer token signed with the configured key
    Issue { username: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.validate()?;
    if !config.is_database_enabled() {
        anyhow::bail!("DATABASE_URL (or DB_USER, DB_PASSWORD, DB_NAME) must be set");
    }

    let pool = server::connect(&config).await?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &config, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn user_service(pool: &PgPool) -> UserService<PgUserRepository> {
    UserService::new(Arc::new(PgUserRepository::new(Arc::new(pool.clone()))))
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let service = user_service(pool);

    match action {
        UserAction::List { limit } => list_users(&service, limit).await?,
        UserAction::Promote { username, yes } => set_admin(&service, &username, true, yes).await?,
        UserAction::Demote { username, yes } => set_admin(&service, &username, false, yes).await?,
    }

    Ok(())
}

/// Lists active users with their roles.
///
/// # Output Format
///
/// ```text
/// Users
///
///   ID   Username             Email                          Roles
///   ---------------------------------------------------------------------------
///   1    alice                alice@example.com              User, Admin
/// ```
async fn list_users(service: &UserService<PgUserRepository>, limit: i64) -> Result<()> {
    println!("{}", "Users".bright_blue().bold());
    println!();

    let (users, total) = service
        .list(0, limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<20} {:<30} {}",
        "ID".bright_white().bold(),
        "Username".bright_white().bold(),
        "Email".bright_white().bold(),
        "Roles".bright_white().bold()
    );
    println!("  {}", "-".repeat(75).bright_black());

    for user in &users {
        let roles = user.roles.join(", ");
        let roles = if user.has_role(ROLE_ADMIN) {
            roles.bright_magenta()
        } else {
            roles.normal()
        };

        println!(
            "  {:<4} {:<20} {:<30} {}",
            user.id.to_string().bright_black(),
            user.username.cyan(),
            user.email,
            roles
        );
    }

    println!();
    println!(
        "  Showing {} of {}",
        users.len().to_string().bright_white().bold(),
        total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Grants or revokes the Admin role after confirmation.
async fn set_admin(
    service: &UserService<PgUserRepository>,
    username: &str,
    admin: bool,
    skip_confirm: bool,
) -> Result<()> {
    let user = service
        .get_by_username(username)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("User '{username}' not found"))?;

    if user.has_role(ROLE_ADMIN) == admin {
        let state = if admin { "already an admin" } else { "not an admin" };
        println!("{}", format!("  {} is {}", user.username, state).yellow());
        return Ok(());
    }

    let verb = if admin { "Grant Admin to" } else { "Revoke Admin from" };

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("{verb} {}?", user.username))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let updated = service
        .set_admin(username, admin)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update roles: {}", e))?;

    println!();
    println!(
        "{} {} now has roles: {}",
        "Done.".green().bold(),
        updated.username.cyan(),
        updated.roles.join(", ").bright_white()
    );
    println!();

    Ok(())
}

/// Dispatches token commands.
async fn handle_token_action(action: TokenAction, config: &Config, pool: &PgPool) -> Result<()> {
    match action {
        TokenAction::Issue { username } => {
            let user = user_service(pool)
                .get_by_username(&username)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("User '{username}' not found"))?;

            issue_token(config, &user)?;
        }
    }

    Ok(())
}

/// Prints a freshly signed bearer token for `user`.
fn issue_token(config: &Config, user: &User) -> Result<()> {
    let issued = server::token_service(config)
        .issue(user)
        .context("Failed to sign token")?;

    println!("{}", "Bearer token".bright_blue().bold());
    println!();
    println!("  User:    {}", user.username.cyan());
    println!("  Roles:   {}", user.roles.join(", "));
    println!(
        "  Expires: {}",
        issued.expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().bright_black()
    );
    println!();
    println!("  {}", issued.token.bright_yellow());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/v1/auth/profile",
        issued.token
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active")
                .fetch_one(pool)
                .await?;
            let products: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active")
                    .fetch_one(pool)
                    .await?;
            let files: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM file_uploads WHERE NOT is_deleted")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Users:      {}", users.to_string().bright_green().bold());
            println!("  Products:   {}", products.to_string().bright_green().bold());
            println!("  Files:      {}", files.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
