//! The coverage gate: every required icon name must be mapped before any
//! external tool runs.

use crate::mapping::{IconName, Mapping};
use std::collections::BTreeSet;

const BUILTIN: &str = include_str!("../resources/required-icons.list");

/// The set of icon names a complete theme must provide.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct RequiredNames(BTreeSet<IconName>);

impl RequiredNames {
    /// The required names compiled into the binary.
    pub fn builtin() -> RequiredNames {
        RequiredNames::parse(BUILTIN)
    }

    /// Parses a required-names list: one name per line, blank lines and
    /// `#` comments ignored.
    pub fn parse(s: &str) -> RequiredNames {
        let names = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| IconName(line.to_owned()))
            .collect();
        RequiredNames(names)
    }

    pub fn extend(&mut self, names: impl IntoIterator<Item = IconName>) {
        self.0.extend(names);
    }

    pub fn contains(&self, name: &IconName) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IconName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<IconName> for RequiredNames {
    fn from_iter<I: IntoIterator<Item = IconName>>(iter: I) -> Self {
        RequiredNames(iter.into_iter().collect())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("mapping is missing {} required icon names: {}", .missing.len(), join_names(.missing))]
pub struct CoverageError {
    pub missing: BTreeSet<IconName>,
}

fn join_names(names: &BTreeSet<IconName>) -> String {
    let mut joined = String::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            joined.push_str(", ");
        }
        joined.push_str(&name.0);
    }
    joined
}

/// Returns the required names that the mapping does not provide, in
/// deterministic order.
pub fn check(mapping: &Mapping, required: &RequiredNames) -> BTreeSet<IconName> {
    let present: BTreeSet<&IconName> = mapping.names().collect();
    required
        .iter()
        .filter(|name| !present.contains(name))
        .cloned()
        .collect()
}

/// Like [`check`], but turns an incomplete mapping into a hard error.
pub fn verify(mapping: &Mapping, required: &RequiredNames) -> Result<(), CoverageError> {
    let missing = check(mapping, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoverageError { missing })
    }
}
