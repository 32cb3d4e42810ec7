//! CLI administration tool for quicklink.
//!
//! Lists, inspects and deletes short links directly against the database,
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List stored links
//! cargo run --bin admin -- list --page 0 --size 20
//!
//! # Most clicked links
//! cargo run --bin admin -- top
//!
//! # Totals
//! cargo run --bin admin -- summary
//!
//! # Delete one link
//! cargo run --bin admin -- delete openai
//!
//! # Remove expired links now
//! cargo run --bin admin -- purge-expired
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `REDIS_URL` (optional): evict deleted keys from the cache as well
//! - `BASE_URL` (optional): prefix used when printing short URLs

use quicklink::application::services::AdminService;
use quicklink::config::mask_connection_string;
use quicklink::domain::entities::UrlMapping;
use quicklink::infrastructure::cache::{BestEffortCache, CacheService, NullCache, RedisCache};
use quicklink::infrastructure::persistence::PgUrlMappingRepository;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing quicklink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Links(LinkCommand),

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Short link commands, run through the admin service.
#[derive(Subcommand)]
enum LinkCommand {
    /// List links in creation order
    List(PageArgs),

    /// List links by click count
    Top(PageArgs),

    /// Show totals
    Summary,

    /// Delete a link by short key
    Delete {
        /// Short key exactly as stored
        short_key: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Delete every expired link
    PurgeExpired {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Args)]
struct PageArgs {
    /// Zero-based page number
    #[arg(short, long, default_value_t = 0)]
    page: u32,

    /// Page size
    #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=1000))]
    size: u32,
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

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", mask_connection_string(&database_url)))?;

    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000/".to_string());

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Links(command) => {
            let admin = admin_service(pool).await;
            handle_command(command, &admin, &base_url).await?;
        }
    }

    Ok(())
}

/// Builds the admin service, with Redis eviction when `REDIS_URL` is set.
async fn admin_service(pool: PgPool) -> AdminService {
    let repository = Arc::new(PgUrlMappingRepository::new(Arc::new(pool)));

    let cache: Arc<dyn CacheService> = match std::env::var("REDIS_URL") {
        Ok(url) => match RedisCache::connect(&url, 3600).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                println!(
                    "{}",
                    format!("⚠️  Redis unavailable ({}), cache will not be evicted", e).yellow()
                );
                Arc::new(NullCache::new())
            }
        },
        Err(_) => Arc::new(NullCache::new()),
    };

    AdminService::new(repository, BestEffortCache::new(cache))
}

async fn handle_command(command: LinkCommand, admin: &AdminService, base_url: &str) -> Result<()> {
    match command {
        LinkCommand::List(args) => {
            println!("{}", "📋 Short links".bright_blue().bold());
            let urls = admin.list_urls(args.page, args.size).await?;
            print_mappings(&urls, base_url);
        }
        LinkCommand::Top(args) => {
            println!("{}", "🏆 Most clicked".bright_blue().bold());
            let urls = admin.top_clicked(args.page, args.size).await?;
            print_mappings(&urls, base_url);
        }
        LinkCommand::Summary => {
            println!("{}", "📊 Statistics".bright_blue().bold());
            println!();

            let summary = admin.summary().await?;
            println!(
                "  Links:  {}",
                summary.total_urls.to_string().bright_green().bold()
            );
            println!(
                "  Clicks: {}",
                summary.total_clicks.to_string().bright_green().bold()
            );
            println!();
        }
        LinkCommand::Delete { short_key, yes } => {
            println!("{}", "🗑  Delete short link".bright_blue().bold());
            println!();
            println!("  Key: {}", short_key.cyan());
            println!();

            if !yes && !confirm("Delete this link?")? {
                println!("{}", "❌ Cancelled".red());
                return Ok(());
            }

            admin
                .delete_by_short_key(&short_key)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete {}: {}", short_key, e))?;

            println!("{}", "✅ Link deleted".green().bold());
        }
        LinkCommand::PurgeExpired { yes } => {
            if !yes && !confirm("Delete every expired link?")? {
                println!("{}", "❌ Cancelled".red());
                return Ok(());
            }

            let count = admin.delete_expired().await?;
            println!(
                "{} {}",
                "✅ Deleted expired entries:".green().bold(),
                count.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Prints mappings as a table.
///
/// ```text
///   Key        Clicks  Expires            Short URL
///   ──────────────────────────────────────────────────────────────
///   openai     12      2026-02-01 10:30   http://localhost:3000/openai
/// ```
fn print_mappings(urls: &[UrlMapping], base_url: &str) {
    println!();

    if urls.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        return;
    }

    println!(
        "  {:<12} {:<8} {:<18} {}",
        "Key".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Short URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for m in urls {
        let expires = m.expires_at.format("%Y-%m-%d %H:%M").to_string();
        let expires = if m.is_expired() {
            expires.red()
        } else {
            expires.bright_black()
        };

        println!(
            "  {:<12} {:<8} {:<18} {}",
            m.short_key.cyan(),
            m.click_count.to_string().bright_green(),
            expires,
            format!("{}{}", base_url, m.short_key)
        );
        println!("  {:<12} {}", "", m.long_url.bright_black());
    }

    println!();
    println!("  Shown: {}", urls.len().to_string().bright_white().bold());
    println!();
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_mapping")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  url_mapping rows: {}", rows.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
