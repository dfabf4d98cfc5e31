//! AMBER broadcaster CLI
//!
//! Manage the local alert catalogue, publish the current alert, and run the
//! foreground broadcast loop.

mod config;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use amber_gatt::{BroadcastSession, LoopbackHost, ReloadWatcher, SessionConfig};
use amber_proto::{AlertRecord, Severity, now_epoch, parse_epoch};
use amber_store::AlertStore;
use config::Config;

/// AMBER - chunked public-alert broadcasting over constrained radio links
#[derive(Parser)]
#[command(name = "amber")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the state directory
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the alert catalogue
    Alert {
        #[command(subcommand)]
        command: AlertCommands,
    },

    /// Publish a saved alert as the broadcast current alert
    Publish {
        /// Id of the saved alert to publish
        alert_id: String,
    },

    /// Run the broadcast session in the foreground until Ctrl+C
    Broadcast {
        /// Seconds between current-alert polls
        #[arg(long)]
        poll_interval: Option<f64>,
    },

    /// Show the current alert and state directory
    Status,
}

#[derive(Subcommand)]
enum AlertCommands {
    /// Create an alert
    New(NewAlert),

    /// Edit an existing alert
    Edit(EditAlert),

    /// List saved alerts
    List,

    /// Show one alert as JSON
    Show {
        /// Alert id
        alert_id: String,
    },

    /// Delete one alert
    Delete {
        /// Alert id
        alert_id: String,
    },
}

#[derive(Args)]
struct NewAlert {
    /// Alert id (derived from headline and expiry when omitted)
    #[arg(long)]
    alert_id: Option<String>,

    /// Alert headline
    #[arg(long)]
    headline: String,

    /// Severity: Extreme, Severe, Moderate, Minor or Unknown
    #[arg(long)]
    severity: Severity,

    /// Expiry, unix seconds or ISO-8601
    #[arg(long)]
    expires: String,

    /// Safety instructions
    #[arg(long)]
    instructions: String,

    /// Authoritative source URL
    #[arg(long)]
    source_url: String,

    /// Mark the alert as verified
    #[arg(long)]
    verified: bool,

    /// Fetch time, unix seconds or ISO-8601 (default: now)
    #[arg(long)]
    fetched_at: Option<String>,
}

#[derive(Args)]
struct EditAlert {
    /// Alert id
    alert_id: String,

    /// New headline
    #[arg(long)]
    headline: Option<String>,

    /// New severity
    #[arg(long)]
    severity: Option<Severity>,

    /// New expiry, unix seconds or ISO-8601
    #[arg(long)]
    expires: Option<String>,

    /// New safety instructions
    #[arg(long)]
    instructions: Option<String>,

    /// New source URL
    #[arg(long)]
    source_url: Option<String>,

    /// New verified flag
    #[arg(long)]
    verified: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose { "debug" } else { "info" })
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };
    config.validate()?;

    let state_dir = cli
        .state_dir
        .clone()
        .or_else(|| config.storage.state_dir.clone())
        .unwrap_or_else(AlertStore::default_root);
    let store = AlertStore::open(state_dir).await?;

    match cli.command {
        Commands::Alert { command } => match command {
            AlertCommands::New(args) => new_alert(&store, args).await?,
            AlertCommands::Edit(args) => edit_alert(&store, args).await?,
            AlertCommands::List => list_alerts(&store).await?,
            AlertCommands::Show { alert_id } => show_alert(&store, &alert_id).await?,
            AlertCommands::Delete { alert_id } => delete_alert(&store, &alert_id).await?,
        },
        Commands::Publish { alert_id } => publish_alert(&store, &alert_id).await?,
        Commands::Broadcast { poll_interval } => run_broadcast(store, &config, poll_interval).await?,
        Commands::Status => show_status(&store).await?,
    }

    Ok(())
}

/// Create a new catalogue entry
async fn new_alert(store: &AlertStore, args: NewAlert) -> anyhow::Result<()> {
    let expires = parse_epoch(&args.expires)?;
    let fetched_at = match &args.fetched_at {
        Some(value) => parse_epoch(value)?,
        None => now_epoch(),
    };

    let mut builder = AlertRecord::builder()
        .headline(args.headline)
        .severity(args.severity)
        .expires(expires)
        .instructions(args.instructions)
        .source_url(args.source_url)
        .verified(args.verified)
        .fetched_at(fetched_at);
    if let Some(id) = args.alert_id {
        builder = builder.alert_id(id);
    }

    let alert = builder.build()?;
    store.upsert_alert(alert.clone()).await?;
    println!("Created alert {}", alert.alert_id);
    Ok(())
}

/// Apply field overrides to an existing entry
async fn edit_alert(store: &AlertStore, args: EditAlert) -> anyhow::Result<()> {
    let Some(existing) = store.get_alert(&args.alert_id).await? else {
        anyhow::bail!("Alert not found: {}", args.alert_id);
    };

    let updated = AlertRecord {
        alert_id: existing.alert_id,
        severity: args.severity.unwrap_or(existing.severity),
        headline: args.headline.unwrap_or(existing.headline),
        expires: match &args.expires {
            Some(value) => parse_epoch(value)?,
            None => existing.expires,
        },
        instructions: args.instructions.unwrap_or(existing.instructions),
        source_url: args.source_url.unwrap_or(existing.source_url),
        verified: args.verified.unwrap_or(existing.verified),
        fetched_at: existing.fetched_at,
    };
    updated.validate()?;

    store.upsert_alert(updated.clone()).await?;
    println!("Updated alert {}", updated.alert_id);
    Ok(())
}

/// Print the catalogue, one compact line per alert
async fn list_alerts(store: &AlertStore) -> anyhow::Result<()> {
    let alerts = store.load_alerts().await?;
    if alerts.is_empty() {
        println!("No alerts saved");
        return Ok(());
    }
    for alert in alerts {
        println!(
            "{}\t{}\t{}\tverified={}\t{}",
            alert.alert_id, alert.severity, alert.expires, alert.verified, alert.headline
        );
    }
    Ok(())
}

/// Print one alert as pretty JSON
async fn show_alert(store: &AlertStore, alert_id: &str) -> anyhow::Result<()> {
    let Some(alert) = store.get_alert(alert_id).await? else {
        anyhow::bail!("Alert not found: {alert_id}");
    };
    println!("{}", serde_json::to_string_pretty(&alert)?);
    Ok(())
}

/// Remove one alert from the catalogue
async fn delete_alert(store: &AlertStore, alert_id: &str) -> anyhow::Result<()> {
    if !store.delete_alert(alert_id).await? {
        anyhow::bail!("Alert not found: {alert_id}");
    }
    println!("Deleted alert {alert_id}");
    Ok(())
}

/// Copy a saved alert into the current-alert pointer
async fn publish_alert(store: &AlertStore, alert_id: &str) -> anyhow::Result<()> {
    let alert = store.publish(alert_id).await?;
    println!("Published alert {}: {}", alert.alert_id, alert.headline);
    Ok(())
}

/// Print broadcaster-facing status
async fn show_status(store: &AlertStore) -> anyhow::Result<()> {
    match store.current_alert().await? {
        Some(alert) => println!(
            "Current alert: {} [{}] {}",
            alert.alert_id, alert.severity, alert.headline
        ),
        None => println!("Current alert: none"),
    }
    println!("State dir: {}", store.paths().root.display());
    Ok(())
}

/// Run the broadcast session and reload watcher until Ctrl+C
async fn run_broadcast(
    store: AlertStore,
    config: &Config,
    poll_interval: Option<f64>,
) -> anyhow::Result<()> {
    let Some(record) = store.current_alert().await? else {
        anyhow::bail!(
            "No current alert at {}. Run `amber publish <alert_id>` first.",
            store.paths().current_alert_file.display()
        );
    };

    let session_config = SessionConfig {
        chunk_size: config.broadcast.chunk_size,
        local_name: config.broadcast.local_name.clone(),
        ..SessionConfig::default()
    };

    // The loopback host keeps registrations in process memory; a platform
    // radio backend plugs in behind the same PeripheralHost trait.
    let host = LoopbackHost::new();
    let session = BroadcastSession::start_with_config(host, record, session_config).await?;

    let poll = poll_interval.unwrap_or(config.broadcast.poll_interval_secs);
    let watcher = ReloadWatcher::new(store.clone(), Duration::from_secs_f64(poll));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    tracing::info!(
        "broadcast loop active; watching {}",
        store.paths().current_alert_file.display()
    );
    println!("Broadcasting; press Ctrl+C to stop");

    tokio::select! {
        _ = watcher.run(&session, shutdown_rx) => {}
        _ = tokio::signal::ctrl_c() => {
            let _ = shutdown_tx.send(true);
        }
    }

    session.stop().await;
    Ok(())
}
