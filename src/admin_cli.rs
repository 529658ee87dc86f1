// src/admin_cli.rs
use crate::auth::AuthConfig;
use crate::core::{ConfigManager, Database};
use crate::models::{Authority, ProfessionPayload};
use crate::repository::UserRepository;
use crate::service::ProfessionService;
use crate::web::start_web_server;
use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "jobposting")]
#[command(about = "Job posting board API server and administration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Overrides the configured database file
    #[arg(long, global = true)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Create the database and its tables
    Init,
    /// Manage user accounts
    #[command(subcommand)]
    User(UserCommand),
    /// Manage professions
    #[command(subcommand)]
    Profession(ProfessionCommand),
    /// Print a bearer token for a user
    Token {
        login: String,
        #[arg(long)]
        hours: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Add an account
    Add {
        login: String,
        #[arg(long)]
        email: Option<String>,
        /// Comma separated, e.g. ROLE_ADMIN,ROLE_EMPLOYER
        #[arg(long, value_delimiter = ',', default_value = "ROLE_EMPLOYER")]
        authorities: Vec<Authority>,
    },
    /// List all accounts
    List,
    /// Allow an account to sign in again
    Activate { login: String },
    /// Block an account; its tokens stop working
    Deactivate { login: String },
}

#[derive(Subcommand, Debug)]
pub enum ProfessionCommand {
    /// Add a profession
    Add { name: String },
    /// List all professions
    List,
    /// Import professions from a CSV file with a `name` column
    Import { csv_file: PathBuf },
}

/// Run a command against the configured database
pub async fn handle_command(command: Command, config: &ConfigManager) -> Result<()> {
    let env = &config.environment;
    let db = match Database::new(&env.database_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e);
        }
    };

    match command {
        Command::Serve => return start_web_server(config, db).await,

        Command::Init => {
            info!("Database initialized at: {}", env.database_path.display());
            info!("Tables: users, professions, advertisements, candidates, job_applications");
        }

        Command::User(UserCommand::Add {
            login,
            email,
            authorities,
        }) => {
            if authorities.is_empty() {
                anyhow::bail!("at least one authority is required");
            }
            match UserRepository::create(db.pool(), &login, email.as_deref(), &authorities).await {
                Ok(user) => {
                    info!("User created: {} (id {}, {})", user.login, user.id, user.authorities);
                }
                Err(e) if is_unique_violation(&e) => {
                    anyhow::bail!("login '{}' already exists", login);
                }
                Err(e) => {
                    error!("Failed to create user: {}", e);
                    return Err(e.into());
                }
            }
        }

        Command::User(UserCommand::List) => {
            let users = UserRepository::list(db.pool()).await?;
            if users.is_empty() {
                info!("No users found.");
            }
            for user in users {
                println!(
                    "{:<5} {:<20} {:<30} {:<28} {}",
                    user.id,
                    user.login,
                    user.email.as_deref().unwrap_or("-"),
                    user.authorities,
                    if user.activated { "active" } else { "inactive" }
                );
            }
        }

        Command::User(UserCommand::Activate { login }) => set_activated(&db, &login, true).await?,
        Command::User(UserCommand::Deactivate { login }) => set_activated(&db, &login, false).await?,

        Command::Profession(ProfessionCommand::Add { name }) => {
            let payload = ProfessionPayload {
                id: None,
                name: Some(name),
            };
            let profession = ProfessionService::new(&db).create(&payload).await?;
            info!("Profession created: {} (id {})", profession.name, profession.id);
        }

        Command::Profession(ProfessionCommand::List) => {
            for profession in ProfessionService::new(&db).find_all().await? {
                println!("{:<5} {}", profession.id, profession.name);
            }
        }

        Command::Profession(ProfessionCommand::Import { csv_file }) => {
            if !csv_file.exists() {
                anyhow::bail!("CSV file not found: {}", csv_file.display());
            }
            let summary = ProfessionService::new(&db).import_csv(&csv_file).await?;
            info!(
                "Import completed: {} added, {} skipped, {} errors",
                summary.added, summary.skipped, summary.errors
            );
        }

        Command::Token { login, hours } => {
            let user = UserRepository::find_by_login(db.pool(), &login)
                .await?
                .with_context(|| format!("unknown user '{}'", login))?;
            if !user.activated {
                anyhow::bail!("user '{}' is deactivated", login);
            }
            let auth = AuthConfig::new(env.jwt_secret.clone(), env.token_validity_hours);
            let validity = Duration::hours(hours.unwrap_or(env.token_validity_hours));
            println!("{}", auth.issue_token_for(&user, validity)?);
        }
    }

    Ok(())
}

async fn set_activated(db: &Database, login: &str, activated: bool) -> Result<()> {
    if UserRepository::set_activated(db.pool(), login, activated).await? {
        info!("User {} {}", login, if activated { "activated" } else { "deactivated" });
        Ok(())
    } else {
        anyhow::bail!("unknown user '{}'", login)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}
