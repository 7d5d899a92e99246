//! User-facing strings for update prompts

use crate::check::alert::AlertButton;

/// Name used in messages when the caller did not configure one
pub const FALLBACK_APP_NAME: &str = "this app";

pub trait Localizer: Send + Sync {
    fn title(&self) -> String;

    fn button_label(&self, button: AlertButton) -> String;

    /// Body of the prompt, also used as the silent notification message
    fn alert_message(&self, app_name: Option<&str>, min_version: &str) -> String;
}

/// Built-in English strings
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn title(&self) -> String {
        "Update Available".to_string()
    }

    fn button_label(&self, button: AlertButton) -> String {
        match button {
            AlertButton::Update => "Update",
            AlertButton::Dismiss => "Next time",
            AlertButton::Skip => "Skip this version",
        }
        .to_string()
    }

    fn alert_message(&self, app_name: Option<&str>, min_version: &str) -> String {
        let app_name = app_name
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_APP_NAME);
        format!(
            "A new version of {app_name} is available. Please update to version {min_version} now."
        )
    }
}
