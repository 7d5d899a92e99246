use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;

use update_siren::check::checker::{CheckOutcome, UpdateChecker};
use update_siren::check::event::{CheckEvent, Listener};
use update_siren::check::fetcher::HttpFetcher;
use update_siren::check::manifest::InstalledApp;
use update_siren::check::schedule::CheckPolicy;
use update_siren::check::store::{SqliteStore, StateStore};
use update_siren::config::{self, CheckerConfig};
use update_siren::logging::init_logging;
use update_siren::terminal::TerminalPresenter;

#[derive(Parser)]
#[command(name = "update-siren")]
#[command(version, about = "Checks a remote manifest for the minimum supported app version")]
struct Cli {
    /// Directory holding the state database and log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the manifest and prompt if the installed version is too old
    Check {
        /// Manifest URL
        #[arg(long)]
        url: String,

        /// Identifier of the app in the manifest
        #[arg(long)]
        app_id: String,

        /// Installed version name, e.g. 1.4.0.2
        #[arg(long)]
        version_name: String,

        /// Installed build code
        #[arg(long, default_value_t = 0)]
        version_code: u64,

        /// Overrides the configured check policy (immediately, daily, weekly)
        #[arg(long)]
        policy: Option<CheckPolicy>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the persisted check state
    Status,

    /// Forget the last check time and skipped version
    Reset,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(config::data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    let _guard = init_logging(&config::log_path(&data_dir), cli.verbose)?;
    let store = Arc::new(SqliteStore::open(&config::db_path(&data_dir))?);

    match cli.command {
        Command::Check {
            url,
            app_id,
            version_name,
            version_code,
            policy,
            config,
        } => {
            let checker_config = match config {
                Some(path) => CheckerConfig::load(&path)?,
                None => CheckerConfig::default(),
            };
            let installed = InstalledApp {
                app_id,
                version_name,
                version_code,
            };
            let (listener, events) = Listener::channel();
            let checker = UpdateChecker::new(
                checker_config,
                installed,
                store,
                Arc::new(HttpFetcher::new()?),
                listener,
            );
            let policy = policy.unwrap_or(checker.config().check_policy);

            let outcome = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(checker.check_version(policy, &url, &TerminalPresenter));

            drop(checker);
            print_events(events);
            println!("{}", describe_outcome(outcome));
        }
        Command::Status => {
            let last_check = store.last_check_timestamp()?;
            let last_check = match chrono::DateTime::from_timestamp_millis(last_check) {
                Some(at) if last_check > 0 => at.to_rfc3339(),
                _ => "never".to_string(),
            };
            let skipped = store.skipped_version()?;
            println!("Last check:      {last_check}");
            println!(
                "Skipped version: {}",
                if skipped.is_empty() { "none" } else { skipped.as_str() }
            );
        }
        Command::Reset => {
            store.clear()?;
            println!("Update state cleared");
        }
    }

    Ok(())
}

fn print_events(mut events: UnboundedReceiver<CheckEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            CheckEvent::ShowUpdateDialog => {}
            CheckEvent::LaunchStore { url } => println!("Open {url} to update"),
            CheckEvent::SkipVersion { version } => {
                println!("Version {version} will not be offered again")
            }
            CheckEvent::Dismiss => println!("Reminder postponed"),
            CheckEvent::SilentUpdateDetected { message } => println!("{message}"),
            CheckEvent::Error(e) => eprintln!("Error: {e}"),
        }
    }
}

fn describe_outcome(outcome: CheckOutcome) -> &'static str {
    match outcome {
        CheckOutcome::NotDue => "Checked recently; not checking again yet",
        CheckOutcome::NoData => "No manifest data available",
        CheckOutcome::NoUpdate => "Up to date",
        CheckOutcome::Silent | CheckOutcome::Prompted(_) => "Update available",
        CheckOutcome::Failed => "Version check failed",
    }
}
