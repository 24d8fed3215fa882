//! Dotted version numbers with wildcard components
//!
//! A `Version` has up to four components. Components that were never given
//! (`"1.2"` has no build or revision) act as wildcards when comparing with
//! [`versions_equal`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Version with optional major, minor, build and revision components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub build: Option<u32>,
    pub revision: Option<u32>,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major: Some(major),
            minor: Some(minor),
            build: None,
            revision: None,
        }
    }

    pub const fn with_build(mut self, build: u32) -> Self {
        self.build = Some(build);
        self
    }

    pub const fn with_revision(mut self, revision: u32) -> Self {
        self.revision = Some(revision);
        self
    }

    fn components(&self) -> [Option<u32>; 4] {
        [self.major, self.minor, self.build, self.revision]
    }
}

/// Compare two versions, ignoring any component that is unset on either side.
///
/// `1.2` equals `1.2.3.4`, `1.2.3.4` does not equal `1.2.3.5`.
pub fn versions_equal(v1: &Version, v2: &Version) -> bool {
    v1.components()
        .iter()
        .zip(v2.components().iter())
        .all(|pair| match pair {
            (Some(a), Some(b)) => a == b,
            _ => true,
        })
}

/// Error parsing a dotted version string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("Version string is empty")]
    Empty,

    #[error("Version has more than four components: {0}")]
    TooManyComponents(String),

    #[error("Invalid version component '{component}' in '{input}'")]
    InvalidComponent { input: String, component: String },
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() > 4 {
            return Err(VersionParseError::TooManyComponents(trimmed.to_string()));
        }

        let mut components = [None; 4];
        for (slot, part) in components.iter_mut().zip(parts.iter()) {
            let value = part
                .parse::<u32>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    input: trimmed.to_string(),
                    component: part.to_string(),
                })?;
            *slot = Some(value);
        }

        let [major, minor, build, revision] = components;
        Ok(Self {
            major,
            minor,
            build,
            revision,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .components()
            .iter()
            .map_while(|c| c.map(|v| v.to_string()))
            .collect();
        if parts.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", parts.join("."))
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
