use athenaeum_cli::admin::{self, Outcome};
use athenaeum_config::DatabaseConfig;
use athenaeum_db::{PgStore, init_db_pool};
use chrono::Utc;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "athenaeum-cli")]
#[command(about = "Athenaeum CLI - Account administration for the digital library", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Promote an existing account to the admin role
    MakeAdmin {
        /// Email address of the account (prompted if not provided)
        email: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Activate or deactivate an account
    SetActive {
        /// Email address of the account
        #[arg(short = 'e', long)]
        email: String,

        /// New status
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
    let store = PgStore::new(pool);

    match cli.command {
        Commands::MakeAdmin { email, yes } => {
            let email = match email {
                Some(email) => email,
                None => Input::new().with_prompt("Email address").interact_text()?,
            };

            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Grant admin rights to {}?", email))
                    .default(false)
                    .interact()?
            {
                println!("Aborted.");
                return Ok(());
            }

            let (user, outcome) = admin::make_admin(&store, &email, Utc::now()).await?;
            match outcome {
                Outcome::Changed => {
                    println!("\n✅ {} is now an admin", user.email);
                    println!("   Name: {}", user.full_name());
                }
                Outcome::Unchanged => println!("ℹ️  {} is already an admin", user.email),
            }
        }
        Commands::SetActive { email, active } => {
            let (user, outcome) = admin::set_active(&store, &email, active, Utc::now()).await?;
            let status = if user.is_active { "active" } else { "deactivated" };
            match outcome {
                Outcome::Changed => println!("✅ {} is now {}", user.email, status),
                Outcome::Unchanged => println!("ℹ️  {} is already {}", user.email, status),
            }
        }
    }

    Ok(())
}
