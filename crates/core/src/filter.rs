//! Owner-based exclusion of shared files.

use crate::types::{DriveFile, Owner};

/// Substrings of owner addresses whose files are never consolidated.
///
/// Matching is case-sensitive `contains`. Rules keep their configured order
/// so the first matching rule is the one reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipRules {
    substrings: Vec<String>,
}

impl SkipRules {
    /// Build from individual substrings. Blank entries are dropped (an empty
    /// substring would match every address) and duplicates collapse to their
    /// first occurrence.
    pub fn new<I, S>(substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules: Vec<String> = Vec::new();
        for substring in substrings {
            let trimmed = substring.as_ref().trim();
            if trimmed.is_empty() || rules.iter().any(|rule| rule == trimmed) {
                continue;
            }
            rules.push(trimmed.to_string());
        }
        Self { substrings: rules }
    }

    /// Parse a comma-separated list such as `"spammer.com,partner.org"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.substrings.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.substrings
    }

    /// First (owner, substring) pair that excludes `file`, scanning owners in
    /// order and, for each owner, substrings in order.
    pub fn first_match<'a>(&'a self, file: &'a DriveFile) -> Option<(&'a Owner, &'a str)> {
        file.owners.iter().find_map(|owner| {
            self.substrings
                .iter()
                .find(|substring| owner.email_address.contains(substring.as_str()))
                .map(|substring| (owner, substring.as_str()))
        })
    }
}

/// True when any owner's address of `file` contains any of `rules`.
pub fn should_skip(file: &DriveFile, rules: &SkipRules) -> bool {
    rules.first_match(file).is_some()
}
