//! Runs a full version check: gate, fetch, evaluate, present

use std::sync::Arc;

use futures::future::{AbortHandle, Abortable};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::check::alert::{AlertButton, AlertDirective, Resolution, resolve_final_directive};
use crate::check::error::CheckError;
use crate::check::event::{CheckEvent, Listener};
use crate::check::fetcher::Fetcher;
use crate::check::localizer::{EnglishLocalizer, Localizer};
use crate::check::manifest::{DetectedUpdate, Evaluation, InstalledApp, ManifestEvaluator};
use crate::check::presenter::{Presenter, UpdatePrompt, UserChoice};
use crate::check::schedule::{CheckPolicy, should_check};
use crate::check::skip::SkipRegistry;
use crate::check::store::StateStore;
use crate::config::{CheckerConfig, STORE_PAGE_URL};

/// How a single check ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The check policy said it is too early to check again
    NotDue,
    /// The server answered with a status other than 200/201
    NoData,
    NoUpdate,
    /// An update was reported to the listener without a dialog
    Silent,
    /// The presenter showed a dialog and the user made this choice
    Prompted(UserChoice),
    /// An error was reported to the listener
    Failed,
}

/// Context for version checks of one installed app.
///
/// Built by the caller and shared (typically behind an [`Arc`]) by every
/// check it triggers. Overlapping checks are not coordinated; their writes to
/// the store land in whatever order they finish.
pub struct UpdateChecker<S: StateStore> {
    config: CheckerConfig,
    installed: InstalledApp,
    store: Arc<S>,
    fetcher: Arc<dyn Fetcher>,
    localizer: Arc<dyn Localizer>,
    listener: Listener,
}

impl<S: StateStore> UpdateChecker<S> {
    pub fn new(
        config: CheckerConfig,
        installed: InstalledApp,
        store: Arc<S>,
        fetcher: Arc<dyn Fetcher>,
        listener: Listener,
    ) -> Self {
        Self {
            config,
            installed,
            store,
            fetcher,
            localizer: Arc::new(EnglishLocalizer),
            listener,
        }
    }

    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Fetch the manifest at `url` if `policy` allows it and act on the result.
    ///
    /// Errors never escape: they are logged and sent to the listener as
    /// [`CheckEvent::Error`]. An empty `url` is logged and ignored.
    pub async fn check_version(
        &self,
        policy: CheckPolicy,
        url: &str,
        presenter: &dyn Presenter,
    ) -> CheckOutcome {
        if url.trim().is_empty() {
            error!("No manifest URL configured; skipping version check");
            return CheckOutcome::NoData;
        }

        let last_check = match self.store.last_check_timestamp() {
            Ok(timestamp) => timestamp,
            Err(e) => return self.fail(e.into()),
        };

        if !should_check(policy, last_check, Self::current_timestamp_ms()) {
            debug!(
                "Skipping version check: policy {} and last check at {}",
                policy, last_check
            );
            return CheckOutcome::NotDue;
        }

        match self.fetcher.fetch(url).await {
            Ok(Some(body)) if body.trim().is_empty() => self.fail(CheckError::NullResult),
            Ok(Some(body)) => self.handle_manifest(&body, presenter),
            Ok(None) => {
                debug!("No manifest data returned from {}", url);
                CheckOutcome::NoData
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Run [`Self::check_version`] on a background task that can be cancelled.
    pub fn spawn_check(
        self: &Arc<Self>,
        policy: CheckPolicy,
        url: String,
        presenter: Arc<dyn Presenter>,
    ) -> CheckHandle {
        let (abort_handle, registration) = AbortHandle::new_pair();
        let checker = Arc::clone(self);

        let task = tokio::spawn(async move {
            let check = checker.check_version(policy, &url, presenter.as_ref());
            match Abortable::new(check, registration).await {
                Ok(outcome) => Some(outcome),
                Err(_) => {
                    debug!("Version check for {} cancelled", url);
                    None
                }
            }
        });

        CheckHandle { abort_handle, task }
    }

    /// Evaluate already fetched manifest text and act on the result
    pub fn handle_manifest(&self, text: &str, presenter: &dyn Presenter) -> CheckOutcome {
        let evaluator =
            ManifestEvaluator::new(self.store.as_ref(), &self.installed, &self.config.alerts);

        match evaluator.evaluate(text, Self::current_timestamp_ms()) {
            Ok(Evaluation::NoUpdate) => {
                debug!("{} is up to date", self.installed.app_id);
                CheckOutcome::NoUpdate
            }
            Ok(Evaluation::UpdateDetected(update)) => self.present_update(&update, presenter),
            Err(e) => self.fail(e),
        }
    }

    fn present_update(&self, update: &DetectedUpdate, presenter: &dyn Presenter) -> CheckOutcome {
        let configured_none = update.configured == AlertDirective::None;

        match resolve_final_directive(update.directive, configured_none) {
            Resolution::Silent => {
                let message = self.alert_message(&update.min_version_label);
                info!("Update to {} detected without alert", update.min_version_label);
                self.listener
                    .emit(CheckEvent::SilentUpdateDetected { message });
                CheckOutcome::Silent
            }
            Resolution::Interactive(directive) => {
                let prompt = self.build_prompt(update, directive);
                self.listener.emit(CheckEvent::ShowUpdateDialog);

                let choice = Self::accept_choice(directive, Self::ask(presenter, &prompt));
                info!(
                    "User chose {:?} for update to {}",
                    choice, update.min_version_label
                );
                self.apply_choice(choice, &update.min_version_label)
            }
        }
    }

    fn build_prompt(&self, update: &DetectedUpdate, directive: AlertDirective) -> UpdatePrompt {
        UpdatePrompt {
            directive,
            min_version_label: update.min_version_label.clone(),
            severity: update.severity,
            title: self.localizer.title(),
            message: self.alert_message(&update.min_version_label),
            buttons: directive
                .buttons()
                .iter()
                .map(|&button| (button, self.localizer.button_label(button)))
                .collect(),
        }
    }

    /// Run the blocking presenter without stalling other tasks on a
    /// multi-thread runtime
    fn ask(presenter: &dyn Presenter, prompt: &UpdatePrompt) -> UserChoice {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| presenter.present(prompt))
            }
            _ => presenter.present(prompt),
        }
    }

    /// Replace a choice the dialog never offered
    fn accept_choice(directive: AlertDirective, choice: UserChoice) -> UserChoice {
        if directive.allows(AlertButton::from(choice)) {
            return choice;
        }

        let fallback = if directive.allows(AlertButton::Dismiss) {
            UserChoice::Dismiss
        } else {
            UserChoice::Update
        };
        warn!(
            "Presenter returned {:?} which {:?} does not offer; using {:?}",
            choice, directive, fallback
        );
        fallback
    }

    fn apply_choice(&self, choice: UserChoice, min_version_label: &str) -> CheckOutcome {
        match choice {
            UserChoice::Update => self.listener.emit(CheckEvent::LaunchStore {
                url: self.store_url(),
            }),
            UserChoice::Dismiss => self.listener.emit(CheckEvent::Dismiss),
            UserChoice::Skip => {
                if let Err(e) = SkipRegistry::new(self.store.as_ref()).mark_skipped(min_version_label)
                {
                    return self.fail(e.into());
                }
                self.listener.emit(CheckEvent::SkipVersion {
                    version: min_version_label.to_string(),
                });
            }
        }
        CheckOutcome::Prompted(choice)
    }

    fn alert_message(&self, min_version_label: &str) -> String {
        self.localizer
            .alert_message(self.config.app_name.as_deref(), min_version_label)
    }

    fn store_url(&self) -> String {
        self.config
            .store_url
            .clone()
            .unwrap_or_else(|| format!("{}{}", STORE_PAGE_URL, self.installed.app_id))
    }

    fn fail(&self, error: CheckError) -> CheckOutcome {
        error!("Version check failed: {}", error);
        self.listener.emit(CheckEvent::Error(error));
        CheckOutcome::Failed
    }

    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A check running on a background task
pub struct CheckHandle {
    abort_handle: AbortHandle,
    task: JoinHandle<Option<CheckOutcome>>,
}

impl CheckHandle {
    /// Stop the check. A check cancelled before its fetch completes never
    /// evaluates the manifest and reports nothing.
    pub fn cancel(&self) {
        self.abort_handle.abort();
    }

    /// Wait for the check; `None` if it was cancelled
    pub async fn join(self) -> Option<CheckOutcome> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Version check task failed: {}", e);
                None
            }
        }
    }
}
