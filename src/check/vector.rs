//! Dotted numeric version strings and positional comparison

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,

    #[error("component {index} of {version:?} is not a non-negative integer")]
    InvalidComponent { version: String, index: usize },
}

/// Result of comparing a single component of two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentOrdering {
    Greater,
    Equal,
    Less,
    /// The index is past the end of at least one version
    Incomparable,
}

impl From<Ordering> for ComponentOrdering {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => ComponentOrdering::Greater,
            Ordering::Equal => ComponentOrdering::Equal,
            Ordering::Less => ComponentOrdering::Less,
        }
    }
}

/// A version such as `1.2.0.7`, kept as its numeric components in order.
///
/// No padding is applied: `1.2` and `1.2.0` have different lengths and the
/// update check never compares them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppVersion {
    components: Vec<u64>,
}

impl AppVersion {
    /// Split `version` on `.` and parse every piece as an unsigned integer.
    ///
    /// Only ASCII digits are accepted, so signs, whitespace and suffixes such
    /// as `-beta` are rejected.
    pub fn parse(version: &str) -> Result<Self, VersionParseError> {
        if version.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let components = version
            .split('.')
            .enumerate()
            .map(|(index, part)| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionParseError::InvalidComponent {
                        version: version.to_string(),
                        index,
                    });
                }
                part.parse::<u64>()
                    .map_err(|_| VersionParseError::InvalidComponent {
                        version: version.to_string(),
                        index,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Compare the component at `index` of `self` against `other`.
    pub fn compare_component(&self, other: &AppVersion, index: usize) -> ComponentOrdering {
        match (self.components.get(index), other.components.get(index)) {
            (Some(a), Some(b)) => a.cmp(b).into(),
            _ => ComponentOrdering::Incomparable,
        }
    }

    /// Index of the first component where `self` is strictly greater than
    /// `installed`, walking from the most significant component.
    ///
    /// Stops with `None` at the first component where `self` is lower, when
    /// the versions are equal, or when the component counts differ.
    pub fn first_greater_component(&self, installed: &AppVersion) -> Option<usize> {
        if self.len() != installed.len() {
            return None;
        }

        for index in 0..self.len() {
            match self.compare_component(installed, index) {
                ComponentOrdering::Greater => return Some(index),
                ComponentOrdering::Less => return None,
                ComponentOrdering::Equal => continue,
                ComponentOrdering::Incomparable => return None,
            }
        }

        None
    }
}

impl FromStr for AppVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}
