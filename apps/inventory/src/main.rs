use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{EditSession, WineListClient};
use shared::domain::{WineDraft, WineListId, WinePatch, WineServerId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod report;

use config::{load_settings, normalize_api_base_url};

#[derive(Parser, Debug)]
#[command(about = "Manage the wines on a wine list")]
struct Cli {
    /// Base URL of the wine-list API (overrides inventory.toml and env).
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every wine on the list.
    List { list_id: i64 },
    /// Add a wine. Missing fields are reported instead of sent.
    Add {
        list_id: i64,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        vintage: Option<i32>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long, default_value = "")]
        origin: String,
    },
    /// Change fields of an existing wine.
    Edit {
        list_id: i64,
        wine_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        vintage: Option<i32>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        origin: Option<String>,
    },
    /// Remove a wine from the list.
    Delete {
        list_id: i64,
        wine_id: i64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

impl Command {
    fn list_id(&self) -> WineListId {
        match self {
            Command::List { list_id }
            | Command::Add { list_id, .. }
            | Command::Edit { list_id, .. }
            | Command::Delete { list_id, .. } => WineListId(*list_id),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    let api_base_url = normalize_api_base_url(&settings.api_base_url)?;
    info!(%api_base_url, "inventory: using wine api");

    let client = WineListClient::new(api_base_url);
    let list_id = cli.command.list_id();
    client
        .fetch_wines(Some(list_id))
        .await
        .map_err(|err| anyhow!(report::describe_failure(&err)))
        .with_context(|| format!("failed to load wine list {}", list_id.0))?;

    let outcome = run(&client, list_id, cli.command).await;
    print_list(&client, list_id).await;
    outcome
}

async fn run(client: &WineListClient, list_id: WineListId, command: Command) -> Result<()> {
    match command {
        Command::List { .. } => {}
        Command::Add {
            name,
            vintage,
            price,
            quantity,
            origin,
            ..
        } => {
            let draft = WineDraft {
                name,
                vintage,
                price,
                quantity,
                origin,
            };
            let created = client
                .create_wine(list_id, draft)
                .await
                .map_err(|err| anyhow!(report::describe_failure(&err)))?;
            println!("created wine {}", created.id);
        }
        Command::Edit {
            wine_id,
            name,
            vintage,
            price,
            quantity,
            origin,
            ..
        } => {
            let mut session = EditSession::new();
            session.record_edit(WinePatch {
                id: WineServerId(wine_id),
                name,
                vintage,
                price,
                quantity,
                origin,
            });
            if let Some(summary) = session.error_summary() {
                eprint!("{}", render::validation_errors(session.errors()));
                return Err(anyhow!(summary));
            }
            let sent = client
                .save_edits(list_id, &mut session)
                .await
                .map_err(|err| anyhow!(report::describe_failure(&err)))?;
            if sent == 0 {
                println!("nothing to update");
            } else {
                println!("updated wine {wine_id}");
            }
        }
        Command::Delete { wine_id, yes, .. } => {
            if !yes && !confirm("Are you sure you want to delete this wine?")? {
                println!("delete cancelled");
                return Ok(());
            }
            client
                .delete_wine(list_id, WineServerId(wine_id))
                .await
                .map_err(|err| anyhow!(report::describe_failure(&err)))?;
            println!("deleted wine {wine_id}");
        }
    }
    Ok(())
}

async fn print_list(client: &WineListClient, list_id: WineListId) {
    let state = client.query_state(list_id).await;
    println!("{}", render::navbar());
    if let Some(status) = render::status(&state) {
        println!("{status}");
    }
    print!("{}", render::table(state.rows()));
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
