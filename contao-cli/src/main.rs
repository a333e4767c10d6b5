// Contao - front-end rendering core for the Contao CMS
// Copyright (C) 2025 Contao Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use contao_core::models::member::Member;
use contao_db::repositories::{
    MemberGroupRepository, MemberRepository, MemberSessionRepository, ModuleRepository,
    OptInRepository,
};
use contao_web::modules::backend_preview;
use sqlx::SqlitePool;
use std::io::Write;

#[derive(Parser)]
#[command(name = "contao")]
#[command(about = "Contao CLI tool for members and maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database (create tables)
    Init,

    /// Member management commands
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Remove expired sessions, opt-in tokens and stale registrations
    Purge {
        /// Age in hours after which unactivated registrations are removed
        #[arg(long, default_value_t = 24)]
        registrations_older_than: i64,
    },

    /// Front-end module commands
    Modules {
        #[command(subcommand)]
        command: ModuleCommands,
    },
}

#[derive(Subcommand)]
enum MemberCommands {
    /// Create a new member
    Create {
        /// Username
        username: String,
        /// Email address
        email: String,
        /// Member group ids
        #[arg(long = "group")]
        groups: Vec<i64>,
        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },

    /// Change a member's password
    Password {
        /// Username or email
        member: String,
        /// New password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },

    /// List all members
    List,
}

#[derive(Subcommand)]
enum ModuleCommands {
    /// List modules as the back end shows them
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:contao.db".to_string());

    match cli.command {
        Commands::Init => init_database(&database_url).await,
        Commands::Member { command } => {
            let pool = contao_db::init_database(&database_url).await?;
            handle_member_command(command, pool).await
        }
        Commands::Purge {
            registrations_older_than,
        } => {
            let pool = contao_db::init_database(&database_url).await?;
            let report = purge(&pool, Duration::hours(registrations_older_than)).await?;
            println!("Expired sessions removed: {}", report.sessions);
            println!("Expired opt-in tokens removed: {}", report.opt_in_tokens);
            println!("Unactivated registrations removed: {}", report.registrations);
            Ok(())
        }
        Commands::Modules {
            command: ModuleCommands::List,
        } => {
            let pool = contao_db::init_database(&database_url).await?;
            for line in list_modules(&pool).await? {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

async fn init_database(database_url: &str) -> Result<()> {
    println!("Initializing database at: {}", database_url);

    let _pool = contao_db::init_database(database_url).await?;

    println!("Database initialized successfully!");
    Ok(())
}

fn read_password(password: Option<String>, prompt: &str) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => {
            print!("{}", prompt);
            std::io::stdout().flush()?;
            Ok(rpassword::read_password()?)
        }
    }
}

async fn handle_member_command(command: MemberCommands, pool: SqlitePool) -> Result<()> {
    let member_repo = MemberRepository::new(pool.clone());

    match command {
        MemberCommands::Create {
            username,
            email,
            groups,
            password,
        } => {
            println!("Creating member: {} ({})", username, email);
            let password = read_password(password, "Password: ")?;
            let id = create_member(&pool, &username, &email, &password, groups).await?;
            println!("Member created successfully! (ID {})", id);
            Ok(())
        }

        MemberCommands::Password { member, password } => {
            println!("Changing password for {}", member);
            let found = if member.contains('@') {
                member_repo.find_by_email(&member).await?
            } else {
                member_repo.find_by_username(&member).await?
            };
            let mut found = found.ok_or_else(|| anyhow!("Member not found"))?;

            let password = read_password(password, "New password: ")?;
            Member::validate_password(&password).map_err(|e| anyhow!(e))?;
            found.set_password(&password)?;
            found.locked_until = None;
            found.login_attempts = 0;
            member_repo.update(&found).await?;

            println!("Password changed successfully!");
            Ok(())
        }

        MemberCommands::List => {
            let now = Utc::now();
            for member in member_repo.list().await? {
                println!(
                    "{:>5}  {:<20} {:<30} {}",
                    member.id(),
                    member.username,
                    member.email,
                    if member.is_active(now) { "active" } else { "inactive" }
                );
            }
            Ok(())
        }
    }
}

/// Create an active member, checking the groups exist and the login is free.
async fn create_member(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
    groups: Vec<i64>,
) -> Result<i64> {
    Member::validate_password(password).map_err(|e| anyhow!(e))?;

    let member_repo = MemberRepository::new(pool.clone());
    if member_repo.username_exists(username, None).await? {
        anyhow::bail!("Username {} is already taken", username);
    }
    if member_repo.email_exists(email, None).await? {
        anyhow::bail!("Email {} is already registered", email);
    }

    let known = MemberGroupRepository::new(pool.clone())
        .find_by_ids(&groups)
        .await?;
    if let Some(missing) = groups
        .iter()
        .find(|id| !known.iter().any(|g| g.id == Some(**id)))
    {
        anyhow::bail!("Member group {} does not exist", missing);
    }

    let mut member = Member::new(username.to_string(), email.to_string(), password)?;
    member.groups = groups;
    member_repo
        .create(&member)
        .await
        .context("Failed to create member")
}

#[derive(Debug, Default, PartialEq, Eq)]
struct PurgeReport {
    sessions: u64,
    opt_in_tokens: u64,
    registrations: u64,
}

async fn purge(pool: &SqlitePool, registration_age: Duration) -> Result<PurgeReport> {
    let now = Utc::now();
    Ok(PurgeReport {
        sessions: MemberSessionRepository::new(pool.clone())
            .delete_expired()
            .await?,
        opt_in_tokens: OptInRepository::new(pool.clone())
            .delete_expired(now)
            .await?,
        registrations: MemberRepository::new(pool.clone())
            .delete_unactivated(now - registration_age)
            .await?,
    })
}

/// One line per module with its back-end representation.
async fn list_modules(pool: &SqlitePool) -> Result<Vec<String>> {
    let modules = ModuleRepository::new(pool.clone()).find_all().await?;
    Ok(modules
        .iter()
        .map(|config| {
            let preview = backend_preview(config)
                .unwrap_or_else(|| "(unknown module type)".to_string());
            format!(
                "{:>5}  {:<15} {}\n{}",
                config.id(),
                config.module_type,
                config.name,
                preview
            )
        })
        .collect())
}
