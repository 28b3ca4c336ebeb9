use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, EngineError, Role};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

mod prompt;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "coown_admin")]
#[command(about = "Admin utilities for the co-ownership backend (bootstrap users and roles)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./coown.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account with explicit roles.
    Create(UserCreateArgs),
    /// Add a role to an existing account.
    GrantRole(GrantRoleArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    /// Repeatable. ADMIN, STAFF or CO_OWNER.
    #[arg(long = "role", value_parser = parse_role, default_value = "CO_OWNER")]
    roles: Vec<Role>,
    /// Skips the interactive prompt. Prefer the environment variable over the flag.
    #[arg(long, env = "COOWN_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct GrantRoleArgs {
    #[arg(long)]
    email: String,
    #[arg(long, value_parser = parse_role)]
    role: Role,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::try_from(raw.trim().to_uppercase().as_str()).map_err(|err| err.to_string())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn roles_label(user: &engine::User) -> String {
    user.roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = match args.password {
                Some(password) => password,
                None => prompt::new_password()?,
            };

            match engine
                .create_user(&args.username, &args.email, &password, &args.roles)
                .await
            {
                Ok(user) => {
                    println!(
                        "created user: {} <{}> [{}] ({})",
                        user.username,
                        user.email,
                        roles_label(&user),
                        user.id
                    );
                }
                Err(EngineError::ExistingKey(_)) => {
                    eprintln!("user already exists: {}", args.email);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::User(User {
            command: UserCommand::GrantRole(args),
        }) => match engine.grant_role(&args.email, args.role).await {
            Ok(user) => println!("{} now has roles [{}]", user.email, roles_label(&user)),
            Err(EngineError::KeyNotFound(_)) => {
                eprintln!("user not found: {}", args.email);
                std::process::exit(1);
            }
            Err(err) => return Err(err.into()),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!(parse_role("admin"), Ok(Role::Admin));
        assert_eq!(parse_role(" co_owner "), Ok(Role::CoOwner));
        assert!(parse_role("root").is_err());
    }

    #[test]
    fn create_defaults_to_co_owner() {
        let cli = Cli::try_parse_from([
            "coown_admin",
            "user",
            "create",
            "--username",
            "ops",
            "--email",
            "ops@example.com",
            "--password",
            "secret12",
        ])
        .unwrap();
        let Command::User(User {
            command: UserCommand::Create(args),
        }) = cli.command
        else {
            panic!("expected user create");
        };
        assert_eq!(args.roles, vec![Role::CoOwner]);
        assert_eq!(args.password.as_deref(), Some("secret12"));
    }
}
