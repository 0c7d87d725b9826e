//! Target host list parsing

use std::collections::HashSet;

use crate::error::ExecError;

/// Environment variable naming the target host list
pub const HOSTS_VAR: &str = "SSH_HOST";

/// Ordered, deduplicated set of target hosts
///
/// Order is the first-occurrence order of the raw list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet {
    hosts: Vec<String>,
}

impl HostSet {
    /// Parse a raw host list
    ///
    /// Any run of whitespace, `,` or `;` separates entries.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut seen = HashSet::new();
        let hosts = raw
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .filter(|host| seen.insert(*host))
            .map(str::to_string)
            .collect();

        Self { hosts }
    }

    /// Parse a raw host list, rejecting an empty result
    ///
    /// # Errors
    /// Returns `ExecError::Config` if no host remains after parsing
    pub fn require(raw: &str) -> Result<Self, ExecError> {
        let set = Self::parse(raw);
        if set.is_empty() {
            return Err(ExecError::Config(format!("{HOSTS_VAR} is required")));
        }
        Ok(set)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.hosts
    }
}

impl<'a> IntoIterator for &'a HostSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.iter()
    }
}
