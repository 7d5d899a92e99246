//! Rendering of update dialogs

#[cfg(test)]
use mockall::automock;

use crate::check::alert::{AlertButton, AlertDirective, UpdateSeverity};

/// Button the user pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserChoice {
    Update,
    Dismiss,
    Skip,
}

impl From<AlertButton> for UserChoice {
    fn from(button: AlertButton) -> Self {
        match button {
            AlertButton::Update => UserChoice::Update,
            AlertButton::Dismiss => UserChoice::Dismiss,
            AlertButton::Skip => UserChoice::Skip,
        }
    }
}

impl From<UserChoice> for AlertButton {
    fn from(choice: UserChoice) -> Self {
        match choice {
            UserChoice::Update => AlertButton::Update,
            UserChoice::Dismiss => AlertButton::Dismiss,
            UserChoice::Skip => AlertButton::Skip,
        }
    }
}

/// Everything a presenter needs to draw the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrompt {
    pub directive: AlertDirective,
    pub min_version_label: String,
    pub severity: Option<UpdateSeverity>,
    pub title: String,
    pub message: String,
    /// Buttons allowed by the directive with their labels, in display order
    pub buttons: Vec<(AlertButton, String)>,
}

/// Shows a prompt and reports the single button the user pressed.
///
/// Called on the task running the check and allowed to block until the user
/// answers. On a multi-thread runtime the call runs inside
/// `tokio::task::block_in_place`; on a current-thread runtime it holds the
/// runtime until it returns. Implementations must not keep the prompt after
/// returning.
#[cfg_attr(test, automock)]
pub trait Presenter: Send + Sync {
    fn present(&self, prompt: &UpdatePrompt) -> UserChoice;
}
