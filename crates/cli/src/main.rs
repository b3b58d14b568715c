//! `pollctl` CLI entry-point.
//!
//! Available sub-commands:
//! - `migrate`: apply the schema.
//! - `create`:  create a poll with its choices.
//! - `show`:    print a poll and its choices.
//! - `close`:   stop a poll from accepting responses.
//! - `vote`:    record a response.
//! - `summary`: print response counts per choice.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use poll_db::pool::{create_pool, run_migrations};
use poll_db::repository::{close_poll, create_poll, create_response, get_poll, get_poll_summaries};
use poll_db::{NewPoll, StoreConfig};

#[derive(Parser)]
#[command(name = "pollctl", about = "Create, vote on and tally polls", version)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://polls.db", global = true)]
    database_url: String,

    #[arg(long, env = "POLL_DB_MAX_CONNECTIONS", default_value_t = 5, global = true)]
    max_connections: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run pending database migrations.
    Migrate,
    /// Create a poll.
    Create {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        question: String,
        /// Repeat once per choice, in display order.
        #[arg(long = "choice", required = true)]
        choices: Vec<String>,
    },
    /// Print a poll with its choices.
    Show { poll_id: i64 },
    /// Close a poll to further responses.
    Close { poll_id: i64 },
    /// Record a response.
    Vote {
        #[arg(long)]
        poll: i64,
        #[arg(long)]
        choice: i64,
        #[arg(long)]
        user: i64,
    },
    /// Print response counts for every choice of a poll.
    Summary { poll_id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::new(cli.database_url).with_max_connections(cli.max_connections);

    let pool = create_pool(&config)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;

    match cli.command {
        Command::Migrate => {
            run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::Create { user, question, choices } => {
            let poll = create_poll(&pool, NewPoll::new(user, question, choices))
                .await
                .context("could not create poll")?;
            print_json(&poll)?;
        }
        Command::Show { poll_id } => {
            let poll = get_poll(&pool, poll_id)
                .await
                .with_context(|| format!("could not load poll {poll_id}"))?;
            print_json(&poll)?;
        }
        Command::Close { poll_id } => {
            close_poll(&pool, poll_id)
                .await
                .with_context(|| format!("could not close poll {poll_id}"))?;
            print_json(&close_ack(poll_id))?;
        }
        Command::Vote { poll, choice, user } => {
            let response = create_response(&pool, poll, choice, user)
                .await
                .with_context(|| format!("could not record response to poll {poll}"))?;
            print_json(&response)?;
        }
        Command::Summary { poll_id } => {
            let summaries = get_poll_summaries(&pool, poll_id)
                .await
                .with_context(|| format!("could not summarise poll {poll_id}"))?;
            print_json(&summaries)?;
        }
    }

    pool.close().await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// What `close` prints once the poll stops accepting responses.
fn close_ack(poll_id: i64) -> serde_json::Value {
    json!({ "poll_id": poll_id, "is_closed": true })
}
