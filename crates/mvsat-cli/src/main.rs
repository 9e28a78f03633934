use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mvsat_core::MvsatConfig;
use mvsat_core::app::{App, AppBuilder};
use mvsat_core::domain::{
    ActorCredential, CapabilityKey, InvoiceStatus, StatusBadge, days_until_due, display,
};
use mvsat_core::impls::{FocusBroadcaster, InMemoryAuth};
use mvsat_core::ports::{Clock, SystemClock};

#[derive(Parser)]
#[command(name = "mvsat", version)]
struct Cli {
    /// Path to mvsat.toml (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive an invoice's status from its due date
    Classify {
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,
        /// Override "today" (YYYY-MM-DD); defaults to today in the billing zone
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },

    /// Show the badge for a status label
    Badge { label: String },

    /// Run a permission revalidation session against an in-memory backend.
    ///
    /// stdin commands: empty line or `focus` (focus regained), `logout`,
    /// `login`, `show`, `quit`.
    Watch {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        secret: String,
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Capabilities granted by the backend (comma separated; all when omitted)
        #[arg(long, value_delimiter = ',')]
        grant: Vec<String>,
    },
}

#[derive(Serialize)]
struct ClassifyOutput {
    today: NaiveDate,
    due_date: NaiveDate,
    days_until_due: i64,
    status: InvoiceStatus,
    badge: StatusBadge,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MvsatConfig::load_from(path)?,
        None => MvsatConfig::default(),
    };

    match cli.cmd {
        Command::Classify { due, today, json } => classify(&config, due, today, json)?,
        Command::Badge { label } => {
            let badge = display(&label);
            println!("{} ({:?})", badge.label, badge.variant);
        }
        Command::Watch {
            identifier,
            secret,
            interval_secs,
            grant,
        } => {
            let mut config = config;
            if let Some(secs) = interval_secs {
                config.revalidation.interval_secs = secs;
            }
            watch(config, ActorCredential::new(identifier, secret), grant).await?;
        }
    }
    Ok(())
}

fn classify(
    config: &MvsatConfig,
    due: NaiveDate,
    today: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let policy = config.status_policy()?;
    let today = today.unwrap_or_else(|| SystemClock.today(&policy.zone()));
    let status = policy.classify(today, due);

    let out = ClassifyOutput {
        today,
        due_date: due,
        days_until_due: days_until_due(today, due),
        status,
        badge: status.badge(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "{} -> {} ({} days): {}",
            out.today, out.due_date, out.days_until_due, out.badge.label
        );
    }
    Ok(())
}

async fn watch(
    config: MvsatConfig,
    actor: ActorCredential,
    grant: Vec<String>,
) -> anyhow::Result<()> {
    let auth = Arc::new(InMemoryAuth::signed_in(actor.clone()));
    let granted = if grant.is_empty() {
        CapabilityKey::all()
    } else {
        grant.iter().map(|k| CapabilityKey::new(k.trim())).collect()
    };
    auth.grant(actor.identifier.clone(), granted);

    let focus = FocusBroadcaster::new();
    let app = AppBuilder::new()
        .config(config)
        .auth(auth.clone())
        .focus(Arc::new(focus.clone()))
        .build()
        .context("wiring revalidation session")?;

    let mut revalidator = app.revalidator();
    let state = revalidator.sync();
    info!(?state, identifier = %actor.identifier, "session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" | "focus" => {
                        focus.notify();
                    }
                    "logout" => {
                        auth.sign_out();
                        let state = revalidator.sync();
                        info!(?state, "signed out");
                    }
                    "login" => {
                        auth.sign_in(actor.clone());
                        let state = revalidator.sync();
                        info!(?state, "signed in");
                    }
                    "show" => show_permissions(&app, &auth),
                    "quit" | "exit" => break,
                    other => warn!(command = other, "unknown command"),
                }
            }
        }
    }

    revalidator.stop().await;
    info!(revalidations = auth.revalidation_count(), "session ended");
    Ok(())
}

fn show_permissions(app: &App, auth: &InMemoryAuth) {
    println!("revalidations so far: {}", auth.revalidation_count());
    for key in CapabilityKey::ALL {
        let mark = if app.can(key) { "x" } else { " " };
        println!("  [{mark}] {key}");
    }
}
