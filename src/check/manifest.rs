//! Manifest parsing and the update decision
//!
//! A manifest maps app identifiers to their minimum acceptable version:
//!
//! ```json
//! { "com.example.app": { "minVersionName": "1.0.0.0", "force": false, "enable": true } }
//! ```
//!
//! or, using build codes:
//!
//! ```json
//! { "com.example.app": { "minVersionCode": 7 } }
//! ```
//!
//! When both fields are present the version name is evaluated first and the
//! build code only if the name did not detect an update. Fields are read only
//! when the evaluation reaches them, so a bad `minVersionCode` never hides an
//! update found through `minVersionName`. Values are coerced loosely: `"7"`
//! and `7.0` are build code 7, `"true"` is a flag.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::check::alert::{AlertConfig, AlertDirective, UpdateSeverity, select_directive};
use crate::check::error::CheckError;
use crate::check::skip::SkipRegistry;
use crate::check::store::StateStore;
use crate::check::vector::AppVersion;

const FIELD_MIN_VERSION_NAME: &str = "minVersionName";
const FIELD_MIN_VERSION_CODE: &str = "minVersionCode";
const FIELD_ENABLE: &str = "enable";
const FIELD_FORCE: &str = "force";

/// Per-app record in the manifest
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    fields: Map<String, Value>,
}

impl ManifestEntry {
    /// Parse the manifest text and extract the entry for `app_id`.
    ///
    /// A `null` entry counts as missing.
    pub fn from_manifest(text: &str, app_id: &str) -> Result<Self, CheckError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| CheckError::MalformedManifest(e.to_string()))?;

        let Value::Object(mut apps) = root else {
            return Err(CheckError::MalformedManifest(
                "manifest root is not an object".to_string(),
            ));
        };

        match apps.remove(app_id) {
            None | Some(Value::Null) => Err(CheckError::MalformedManifest(format!(
                "field not found: {app_id}"
            ))),
            Some(Value::Object(fields)) => Ok(Self { fields }),
            Some(other) => Err(CheckError::MalformedManifest(format!(
                "entry for {app_id} is not an object: {other}"
            ))),
        }
    }

    pub fn has_min_version_name(&self) -> bool {
        self.field(FIELD_MIN_VERSION_NAME).is_some()
    }

    pub fn has_min_version_code(&self) -> bool {
        self.field(FIELD_MIN_VERSION_CODE).is_some()
    }

    /// `minVersionName` as text; numbers are accepted and printed as written
    pub fn min_version_name(&self) -> Result<Option<String>, CheckError> {
        match self.field(FIELD_MIN_VERSION_NAME) {
            None => Ok(None),
            Some(Value::String(name)) => Ok(Some(name.clone())),
            Some(Value::Number(number)) => Ok(Some(number.to_string())),
            Some(other) => Err(invalid_field(FIELD_MIN_VERSION_NAME, other)),
        }
    }

    /// `minVersionCode` as a build number; fractional values are truncated
    pub fn min_version_code(&self) -> Result<Option<u64>, CheckError> {
        match self.field(FIELD_MIN_VERSION_CODE) {
            None => Ok(None),
            Some(value) => coerce_code(value)
                .map(Some)
                .ok_or_else(|| invalid_field(FIELD_MIN_VERSION_CODE, value)),
        }
    }

    /// `enable`, defaulting to true
    pub fn version_check_enabled(&self) -> bool {
        self.flag(FIELD_ENABLE, true)
    }

    /// `force`, defaulting to false
    pub fn force_update(&self) -> bool {
        self.flag(FIELD_FORCE, false)
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        let Some(value) = self.field(key) else {
            return default;
        };
        coerce_bool(value).unwrap_or_else(|| {
            warn!("Ignoring invalid {} value {}; using {}", key, value, default);
            default
        })
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn coerce_code(value: &Value) -> Option<u64> {
    let from_float = |float: f64| {
        (float.is_finite() && float >= 0.0 && float < u64::MAX as f64).then(|| float.trunc() as u64)
    };

    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().and_then(from_float)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(from_float))
        }
        _ => None,
    }
}

fn invalid_field(key: &str, value: &Value) -> CheckError {
    CheckError::MalformedManifest(format!("invalid {key}: {value}"))
}

/// The running app as seen by the evaluator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledApp {
    /// Key looked up in the manifest
    pub app_id: String,
    pub version_name: String,
    pub version_code: u64,
}

/// An update the user should hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedUpdate {
    /// Version name or build code that triggered the update, as written in the manifest
    pub min_version_label: String,
    /// `None` for build-code updates and components past the revision
    pub severity: Option<UpdateSeverity>,
    /// Directive configured for the slot that fired, before the force flag
    pub configured: AlertDirective,
    /// Directive after applying the force flag
    pub directive: AlertDirective,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    NoUpdate,
    UpdateDetected(DetectedUpdate),
}

/// Runs the update decision for one manifest against one installed app
pub struct ManifestEvaluator<'a, S: StateStore + ?Sized> {
    store: &'a S,
    installed: &'a InstalledApp,
    alerts: &'a AlertConfig,
}

impl<'a, S: StateStore + ?Sized> ManifestEvaluator<'a, S> {
    pub fn new(store: &'a S, installed: &'a InstalledApp, alerts: &'a AlertConfig) -> Self {
        Self {
            store,
            installed,
            alerts,
        }
    }

    /// Evaluate `text` at `now_ms`.
    ///
    /// The last-check timestamp is written as soon as a version field is
    /// recognised, even when the outcome is [`Evaluation::NoUpdate`]. Nothing is
    /// written when parsing fails before that point.
    pub fn evaluate(&self, text: &str, now_ms: i64) -> Result<Evaluation, CheckError> {
        let entry = ManifestEntry::from_manifest(text, &self.installed.app_id)?;

        if !entry.has_min_version_name() && !entry.has_min_version_code() {
            return Err(CheckError::MissingVersionField);
        }

        if let Some(min_version_name) = entry.min_version_name()? {
            self.store.set_last_check_timestamp(now_ms)?;

            if let Some(update) = self.check_version_name(&entry, &min_version_name)? {
                return Ok(Evaluation::UpdateDetected(update));
            }
        }

        if let Some(min_version_code) = entry.min_version_code()? {
            self.store.set_last_check_timestamp(now_ms)?;

            if let Some(update) = self.check_version_code(&entry, min_version_code)? {
                return Ok(Evaluation::UpdateDetected(update));
            }
        }

        Ok(Evaluation::NoUpdate)
    }

    fn check_version_name(
        &self,
        entry: &ManifestEntry,
        min_version_name: &str,
    ) -> Result<Option<DetectedUpdate>, CheckError> {
        if !entry.version_check_enabled() {
            debug!("Version check disabled for {}", self.installed.app_id);
            return Ok(None);
        }

        let installed_name = &self.installed.version_name;
        if min_version_name.is_empty() || installed_name.is_empty() {
            return Ok(None);
        }

        if SkipRegistry::new(self.store).is_skipped(min_version_name)? {
            debug!("Version {} was skipped by the user", min_version_name);
            return Ok(None);
        }

        let (minimum, installed) = match (
            AppVersion::parse(min_version_name),
            AppVersion::parse(installed_name),
        ) {
            (Ok(minimum), Ok(installed)) => (minimum, installed),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Cannot compare versions: {}", e);
                return Ok(None);
            }
        };

        if minimum.len() != installed.len() {
            debug!(
                "Skipping comparison of {} and {}: component counts differ",
                min_version_name, installed_name
            );
            return Ok(None);
        }

        let Some(index) = minimum.first_greater_component(&installed) else {
            return Ok(None);
        };

        let severity = UpdateSeverity::from_index(index);
        let configured = self.alerts.for_severity(severity);
        info!(
            "Version {} is below minimum {} ({})",
            installed_name,
            min_version_name,
            severity.map_or("component", |s| s.as_str())
        );

        Ok(Some(DetectedUpdate {
            min_version_label: min_version_name.to_string(),
            severity,
            configured,
            directive: select_directive(configured, entry.force_update()),
        }))
    }

    fn check_version_code(
        &self,
        entry: &ManifestEntry,
        min_version_code: u64,
    ) -> Result<Option<DetectedUpdate>, CheckError> {
        if !entry.version_check_enabled() {
            debug!("Version check disabled for {}", self.installed.app_id);
            return Ok(None);
        }

        let label = min_version_code.to_string();
        if self.installed.version_code >= min_version_code {
            return Ok(None);
        }

        if SkipRegistry::new(self.store).is_skipped(&label)? {
            debug!("Build {} was skipped by the user", label);
            return Ok(None);
        }

        info!(
            "Build {} is below minimum build {}",
            self.installed.version_code, label
        );

        let configured = self.alerts.version_code;
        Ok(Some(DetectedUpdate {
            min_version_label: label,
            severity: None,
            configured,
            directive: select_directive(configured, entry.force_update()),
        }))
    }
}
