//! Mapping from update severity to the response shown to the user

use serde::Deserialize;

/// Which version component first signalled the update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateSeverity {
    /// `A.b.c.d`
    Major,
    /// `a.B.c.d`
    Minor,
    /// `a.b.C.d`
    Patch,
    /// `a.b.c.D`
    Revision,
}

impl UpdateSeverity {
    /// Severity for a component index; indices past the revision have none
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(UpdateSeverity::Major),
            1 => Some(UpdateSeverity::Minor),
            2 => Some(UpdateSeverity::Patch),
            3 => Some(UpdateSeverity::Revision),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateSeverity::Major => "major",
            UpdateSeverity::Minor => "minor",
            UpdateSeverity::Patch => "patch",
            UpdateSeverity::Revision => "revision",
        }
    }
}

/// How an available update is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirective {
    /// No dialog, the listener is notified only
    None,
    /// Update and dismiss buttons
    #[default]
    Option,
    /// Update button only
    Force,
    /// Update, dismiss and "skip this version" buttons
    Skip,
}

/// A button on the update dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertButton {
    Update,
    Dismiss,
    Skip,
}

impl AlertDirective {
    /// Buttons offered for this directive, in display order
    pub fn buttons(&self) -> &'static [AlertButton] {
        match self {
            AlertDirective::None => &[],
            AlertDirective::Force => &[AlertButton::Update],
            AlertDirective::Option => &[AlertButton::Update, AlertButton::Dismiss],
            AlertDirective::Skip => &[AlertButton::Update, AlertButton::Dismiss, AlertButton::Skip],
        }
    }

    pub fn allows(&self, button: AlertButton) -> bool {
        self.buttons().contains(&button)
    }
}

/// Configured directive per severity, plus one for build-code updates
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertConfig {
    pub major: AlertDirective,
    pub minor: AlertDirective,
    pub patch: AlertDirective,
    pub revision: AlertDirective,
    pub version_code: AlertDirective,
}

impl AlertConfig {
    /// Directive configured for an update found at `severity`.
    ///
    /// Components past the revision have no slot and fall back to
    /// [`AlertDirective::Option`].
    pub fn for_severity(&self, severity: Option<UpdateSeverity>) -> AlertDirective {
        match severity {
            Some(UpdateSeverity::Major) => self.major,
            Some(UpdateSeverity::Minor) => self.minor,
            Some(UpdateSeverity::Patch) => self.patch,
            Some(UpdateSeverity::Revision) => self.revision,
            None => AlertDirective::Option,
        }
    }
}

/// Apply the manifest's force flag on top of the configured directive
pub fn select_directive(configured: AlertDirective, force: bool) -> AlertDirective {
    if force {
        AlertDirective::Force
    } else {
        configured
    }
}

/// Final outcome of the alert policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Only the listener is told, with a formatted message
    Silent,
    /// The presenter renders a dialog for the directive
    Interactive(AlertDirective),
}

/// Decide between a silent notification and an interactive dialog.
///
/// `configured_none` is true when the slot configured for the update is
/// [`AlertDirective::None`]; it wins over a forced directive.
pub fn resolve_final_directive(directive: AlertDirective, configured_none: bool) -> Resolution {
    if configured_none || directive == AlertDirective::None {
        Resolution::Silent
    } else {
        Resolution::Interactive(directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, Some(UpdateSeverity::Major))]
    #[case(1, Some(UpdateSeverity::Minor))]
    #[case(2, Some(UpdateSeverity::Patch))]
    #[case(3, Some(UpdateSeverity::Revision))]
    #[case(4, None)]
    fn severity_from_index(#[case] index: usize, #[case] expected: Option<UpdateSeverity>) {
        assert_eq!(UpdateSeverity::from_index(index), expected);
    }

    #[rstest]
    #[case(AlertDirective::Force, vec![AlertButton::Update])]
    #[case(AlertDirective::Option, vec![AlertButton::Update, AlertButton::Dismiss])]
    #[case(AlertDirective::Skip, vec![AlertButton::Update, AlertButton::Dismiss, AlertButton::Skip])]
    #[case(AlertDirective::None, vec![])]
    fn buttons_depend_on_directive(
        #[case] directive: AlertDirective,
        #[case] expected: Vec<AlertButton>,
    ) {
        assert_eq!(directive.buttons(), expected.as_slice());
    }

    #[test]
    fn config_from_partial_object_uses_option_for_missing_slots() {
        let config = serde_json::from_value::<AlertConfig>(json!({
            "major": "force",
            "versionCode": "skip"
        }))
        .unwrap();

        assert_eq!(
            config,
            AlertConfig {
                major: AlertDirective::Force,
                minor: AlertDirective::Option,
                patch: AlertDirective::Option,
                revision: AlertDirective::Option,
                version_code: AlertDirective::Skip,
            }
        );
    }

    #[test]
    fn for_severity_defaults_to_option_past_revision() {
        let config = AlertConfig {
            major: AlertDirective::Force,
            minor: AlertDirective::Skip,
            patch: AlertDirective::None,
            revision: AlertDirective::Skip,
            version_code: AlertDirective::None,
        };

        assert_eq!(config.for_severity(Some(UpdateSeverity::Major)), AlertDirective::Force);
        assert_eq!(config.for_severity(Some(UpdateSeverity::Patch)), AlertDirective::None);
        assert_eq!(config.for_severity(None), AlertDirective::Option);
    }

    #[rstest]
    #[case(AlertDirective::Skip, true, AlertDirective::Force)]
    #[case(AlertDirective::None, true, AlertDirective::Force)]
    #[case(AlertDirective::Skip, false, AlertDirective::Skip)]
    fn select_directive_applies_force_flag(
        #[case] configured: AlertDirective,
        #[case] force: bool,
        #[case] expected: AlertDirective,
    ) {
        assert_eq!(select_directive(configured, force), expected);
    }

    #[rstest]
    #[case(AlertDirective::Force, true, Resolution::Silent)]
    #[case(AlertDirective::None, false, Resolution::Silent)]
    #[case(AlertDirective::Force, false, Resolution::Interactive(AlertDirective::Force))]
    #[case(AlertDirective::Option, false, Resolution::Interactive(AlertDirective::Option))]
    fn resolve_final_directive_prefers_silent_for_none(
        #[case] directive: AlertDirective,
        #[case] configured_none: bool,
        #[case] expected: Resolution,
    ) {
        assert_eq!(resolve_final_directive(directive, configured_none), expected);
    }
}
