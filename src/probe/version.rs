//! Version strings and numeric comparison.
//!
//! Versions compare component by component as numbers, so `3.9` is older
//! than `3.12`. Missing trailing components count as zero. A pin such as
//! `20` or `3.12` matches any version that starts with its components.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// A dotted numeric version such as `3.12.1`.
#[derive(Debug, Clone, Eq)]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    /// Numeric components.
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    /// Whether this version is at least `minimum`.
    pub fn at_least(&self, minimum: &Version) -> bool {
        self >= minimum
    }

    /// Whether this version satisfies `pin`: every component of the pin
    /// equals the corresponding component here.
    pub fn matches_pin(&self, pin: &Version) -> bool {
        pin.parts
            .iter()
            .enumerate()
            .all(|(i, want)| self.component(i) == *want)
    }

    fn component(&self, index: usize) -> u64 {
        self.parts.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('v');
        let parts = trimmed
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| format!("not a numeric version: {}", s))?;
        if parts.is_empty() {
            return Err(format!("not a numeric version: {}", s));
        }
        Ok(Self { parts })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.parts.iter().map(u64::to_string).collect();
        write!(f, "{}", rendered.join("."))
    }
}

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)*").unwrap());

/// Pull the first version-looking token out of tool output.
///
/// `"Python 3.12.1"` yields `3.12.1`, `"v20.11.0"` yields `20.11.0`.
pub fn extract_version(output: &str) -> Option<Version> {
    VERSION_REGEX
        .find(output)
        .and_then(|m| m.as_str().parse().ok())
}
