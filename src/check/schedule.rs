//! Throttling of remote checks

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::MS_PER_DAY;

/// How often the manifest is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckPolicy {
    /// Every trigger performs a check
    #[default]
    Immediately,
    /// At most once per calendar day
    Daily,
    /// At most once every seven days
    Weekly,
}

impl CheckPolicy {
    /// Minimum number of whole days between two checks
    pub fn min_days(&self) -> i64 {
        match self {
            CheckPolicy::Immediately => 0,
            CheckPolicy::Daily => 1,
            CheckPolicy::Weekly => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckPolicy::Immediately => "immediately",
            CheckPolicy::Daily => "daily",
            CheckPolicy::Weekly => "weekly",
        }
    }
}

impl FromStr for CheckPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediately" | "immediate" => Ok(CheckPolicy::Immediately),
            "daily" => Ok(CheckPolicy::Daily),
            "weekly" => Ok(CheckPolicy::Weekly),
            other => Err(format!(
                "unknown check policy '{other}' (expected immediately, daily or weekly)"
            )),
        }
    }
}

impl fmt::Display for CheckPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days between `last_check_ms` and `now_ms`.
///
/// Both instants are truncated to their UTC day before subtracting, so a check
/// at 23:59 followed by one at 00:01 is one day apart. Returns `0` when no
/// check was ever recorded.
pub fn days_since(last_check_ms: i64, now_ms: i64) -> i64 {
    if last_check_ms <= 0 {
        return 0;
    }
    now_ms.div_euclid(MS_PER_DAY) - last_check_ms.div_euclid(MS_PER_DAY)
}

/// Decide whether a remote check should run now
pub fn should_check(policy: CheckPolicy, last_check_ms: i64, now_ms: i64) -> bool {
    match policy {
        CheckPolicy::Immediately => true,
        _ => last_check_ms == 0 || policy.min_days() <= days_since(last_check_ms, now_ms),
    }
}
