#![allow(dead_code)]

mod fetcher;
mod presenter;

pub use fetcher::StubFetcher;
pub use presenter::ScriptedPresenter;

use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

use update_siren::check::checker::UpdateChecker;
use update_siren::check::event::{CheckEvent, Listener};
use update_siren::check::manifest::InstalledApp;
use update_siren::check::store::SqliteStore;
use update_siren::config::CheckerConfig;

pub const APP_ID: &str = "com.app";
pub const MANIFEST_URL: &str = "https://example.com/versions.json";

/// Create a state store backed by a temporary database file
pub fn create_test_store() -> (TempDir, Arc<SqliteStore>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("state.db");
    let store = SqliteStore::open(&db_path).unwrap();
    (temp_dir, Arc::new(store))
}

pub fn installed(version_name: &str, version_code: u64) -> InstalledApp {
    InstalledApp {
        app_id: APP_ID.to_string(),
        version_name: version_name.to_string(),
        version_code,
    }
}

/// Build a checker over `store` that fetches through `fetcher`
pub fn create_checker(
    config: CheckerConfig,
    installed: InstalledApp,
    store: Arc<SqliteStore>,
    fetcher: Arc<StubFetcher>,
) -> (UpdateChecker<SqliteStore>, UnboundedReceiver<CheckEvent>) {
    let (listener, events) = Listener::channel();
    let checker = UpdateChecker::new(config, installed, store, fetcher, listener);
    (checker, events)
}

/// Collect every event delivered so far
pub fn drain_events(events: &mut UnboundedReceiver<CheckEvent>) -> Vec<CheckEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}
