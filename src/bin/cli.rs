use std::process;

use academia::cli::{AddUserOutcome, add_user, reset_password};
use academia::modules::users::repository::PgUserRepository;
use academia_core::SystemClock;
use academia_db::{init_db_pool, run_migrations};
use clap::{Parser, Subcommand};
use dialoguer::Password;
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "academia-cli")]
#[command(about = "Academia CLI - Administrative tools for Academia", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user, or update the existing one. One of username or email is required
    AddUser {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Grant every role
        #[arg(long)]
        admin: bool,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Set a new password for a user
    ResetPassword {
        /// Username or email
        #[arg(short = 'u', long)]
        username: String,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

fn prompt_password(password: Option<String>) -> String {
    password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail(format!("Failed to read password: {e}")))
    })
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {message}");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| fail("DATABASE_URL must be set"));
    let pool = init_db_pool(&database_url)
        .await
        .unwrap_or_else(|e| fail(format!("Failed to connect to database: {e}")));
    if let Err(e) = run_migrations(&pool).await {
        fail(format!("Failed to run migrations: {e}"));
    }

    let repo = PgUserRepository::new(pool);
    let clock = SystemClock;

    match cli.command {
        Commands::AddUser {
            username,
            email,
            admin,
            password,
        } => {
            if username.is_none() && email.is_none() {
                fail("One of --username or --email is required");
            }
            let password = prompt_password(password);
            match add_user(
                &repo,
                &clock,
                username.as_deref(),
                email.as_deref(),
                &password,
                admin,
            )
            .await
            {
                Ok(AddUserOutcome::Created(user)) => {
                    println!("\n✅ User created: {}", user.display_name());
                }
                Ok(AddUserOutcome::Updated(user)) => {
                    println!("\n✅ User updated: {}", user.display_name());
                }
                Err(e) => fail(format!("Error adding user: {e}")),
            }
        }
        Commands::ResetPassword { username, password } => {
            let password = prompt_password(password);
            match reset_password(&repo, &clock, &username, &password).await {
                Ok(user) => println!("\n✅ Password reset for {}", user.display_name()),
                Err(e) => fail(format!("Error resetting password: {e}")),
            }
        }
    }
}
