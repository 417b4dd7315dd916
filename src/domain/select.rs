//! Name-based selection: `select` a subset, then act on it with `for_each`

use regex::Regex;

use crate::domain::{DomainError, DomainResult};

/// Anything that can be selected by name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Compiled name pattern.
///
/// [`NamePattern::new`] anchors at the start of the name: `build-.*` matches
/// `build-main` but not `nightly-build-main`. The end is never anchored, so
/// `build` also matches `build-main`. [`NamePattern::search`] matches anywhere.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    pub fn new(pattern: &str) -> DomainResult<Self> {
        Self::compile(pattern, &format!("^(?:{pattern})"))
    }

    /// Pattern that matches anywhere in the name.
    pub fn search(pattern: &str) -> DomainResult<Self> {
        Self::compile(pattern, pattern)
    }

    fn compile(pattern: &str, regex: &str) -> DomainResult<Self> {
        let regex = Regex::new(regex).map_err(|source| DomainError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Pattern as supplied by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Regex substitution applied to a name, replacing every match.
///
/// The replacement uses `$1` / `${name}` group references.
#[derive(Debug, Clone)]
pub struct Substitution {
    regex: Regex,
    replacement: String,
}

impl Substitution {
    pub fn new(pattern: &str, replacement: &str) -> DomainResult<Self> {
        let regex = Regex::new(pattern).map_err(|source| DomainError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            regex,
            replacement: replacement.to_string(),
        })
    }

    pub fn apply(&self, name: &str) -> String {
        self.regex
            .replace_all(name, self.replacement.as_str())
            .into_owned()
    }
}

/// Keep the items whose name matches `pattern`, preserving order.
pub fn select<T, I>(items: I, pattern: &NamePattern) -> Vec<T>
where
    T: Named,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .filter(|item| pattern.matches(item.name()))
        .collect()
}

/// Apply `action` to every item in order, stopping at the first error.
///
/// Effects of earlier items are kept. Returns the number of items acted on.
pub fn for_each<T, E, F>(subset: &[T], mut action: F) -> Result<usize, E>
where
    F: FnMut(&T) -> Result<(), E>,
{
    for item in subset {
        action(item)?;
    }
    Ok(subset.len())
}
