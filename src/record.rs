//! Typed model for search-index shards.
//!
//! A shard file assigns one ordered array of records to one variable. Each
//! record maps a mangled key to a display label and one or more references
//! into the generated HTML pages. Records are write-once: a documentation
//! build replaces shard files wholesale, so the model offers construction and
//! inspection but no mutation beyond plain field access.

use crate::escape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Relative documentation location of the form `<page>.html#<anchor>`.
///
/// The anchor is optional at the model level so that lenient parsing can
/// represent page-only links; the checker enforces the anchored form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentUrl {
    /// Relative page path, e.g. `classstan_1_1mcmc_1_1chains.html`.
    pub page: String,
    /// In-page fragment identifier locating the documented symbol.
    pub anchor: Option<String>,
}

impl FragmentUrl {
    /// Builds an anchored url.
    pub fn new(page: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            anchor: Some(anchor.into()),
        }
    }
}

impl fmt::Display for FragmentUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.anchor {
            Some(anchor) => write!(f, "{}#{}", self.page, anchor),
            None => write!(f, "{}", self.page),
        }
    }
}

/// Error for url strings that cannot be split into page and anchor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseUrlError {
    #[error("url has an empty page component")]
    EmptyPage,
}

impl FromStr for FragmentUrl {
    type Err = ParseUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (page, anchor) = match s.split_once('#') {
            Some((page, anchor)) => (page, Some(anchor.to_string())),
            None => (s, None),
        };
        if page.is_empty() {
            return Err(ParseUrlError::EmptyPage);
        }
        Ok(Self {
            page: page.to_string(),
            anchor,
        })
    }
}

/// One documentation anchor for a symbol, with the label of the scope that
/// contains it (`stan::math` for a member of that namespace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRef {
    pub url: FragmentUrl,
    /// Numeric marker some producers insert between url and scope
    /// (`['url',1,'scope']`). Preserved verbatim, never synthesized.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub marker: Option<u32>,
    pub scope: String,
}

impl SearchRef {
    pub fn new(url: FragmentUrl, scope: impl Into<String>) -> Self {
        Self {
            url,
            marker: None,
            scope: scope.into(),
        }
    }
}

/// One entry of a shard array: key, display label, references.
///
/// An overloaded symbol resolves to multiple anchors, hence `refs` is a list;
/// it is never empty in a well-formed shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub key: String,
    pub label: String,
    pub refs: Vec<SearchRef>,
}

impl SearchRecord {
    /// Key with the ordinal suffix stripped, or the whole key when no
    /// suffix is present.
    pub fn stem(&self) -> &str {
        escape::split_key(&self.key).map_or(self.key.as_str(), |(stem, _)| stem)
    }

    /// Position suffix of the key, when present.
    pub fn ordinal(&self) -> Option<usize> {
        escape::split_key(&self.key).map(|(_, ordinal)| ordinal)
    }
}

/// A parsed shard file: one variable, one ordered array of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Name of the assigned variable, canonically `searchData`.
    pub variable: String,
    pub records: Vec<SearchRecord>,
}

impl Shard {
    /// The canonical variable name used by generated shards.
    pub const VARIABLE: &'static str = "searchData";

    pub fn new(records: Vec<SearchRecord>) -> Self {
        Self {
            variable: Self::VARIABLE.to_string(),
            records,
        }
    }
}
