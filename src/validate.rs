//! Invariant checker for shards and whole search directories.
//!
//! Shard-level checks cover the record invariants: non-empty unique keys,
//! non-empty reference lists, anchored urls, and canonical-form properties
//! (ordinal suffixes contiguous in array order, stem consistent with the
//! label). Directory-level checks cross the master index against the shard
//! files actually present.
//!
//! Canonical-form deviations are warnings: foreign producers disagree on
//! them and the consuming UI tolerates them. Everything the UI would choke
//! on is an error.

use crate::corpus::Corpus;
use crate::escape;
use crate::record::Shard;
use crate::sections::MasterIndex;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Anchored-url shape every reference must satisfy.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^#]+\.html#[^#]+$").expect("url pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A single invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("record {index}: key is empty")]
    EmptyKey { index: usize },
    #[error("record {index}: duplicate key '{key}' (first seen at record {first})")]
    DuplicateKey {
        index: usize,
        key: String,
        first: usize,
    },
    #[error("record {index} ('{key}'): reference list is empty")]
    NoRefs { index: usize, key: String },
    #[error("record {index} ('{key}'): url '{url}' does not match '<page>.html#<anchor>'")]
    BadUrl {
        index: usize,
        key: String,
        url: String,
    },
    #[error("record {index}: key '{key}' lacks an ordinal suffix")]
    MissingOrdinal { index: usize, key: String },
    #[error("record {index}: ordinal suffix {found} does not match array position")]
    OrdinalMismatch { index: usize, found: usize },
    #[error("record {index}: stem '{stem}' is not the mangled form of label '{label}'")]
    StemMismatch {
        index: usize,
        stem: String,
        label: String,
    },
    #[error("shard file exists but the master index does not list its bucket")]
    OrphanShard,
    #[error("master index lists bucket '{bucket}' of section '{section}' but no shard file exists")]
    MissingShard { section: String, bucket: String },
    #[error("record {index} ('{key}') belongs in bucket '{expected}', not this shard")]
    BucketMismatch {
        index: usize,
        key: String,
        expected: String,
    },
}

impl Violation {
    pub fn severity(&self) -> Severity {
        match self {
            Self::EmptyKey { .. }
            | Self::DuplicateKey { .. }
            | Self::NoRefs { .. }
            | Self::BadUrl { .. }
            | Self::MissingShard { .. } => Severity::Error,
            Self::MissingOrdinal { .. }
            | Self::OrdinalMismatch { .. }
            | Self::StemMismatch { .. }
            | Self::OrphanShard
            | Self::BucketMismatch { .. } => Severity::Warning,
        }
    }
}

/// A violation tied to the file it was found in.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub file: String,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn new(file: &str, violation: &Violation) -> Self {
        Self {
            file: file.to_string(),
            severity: violation.severity(),
            message: violation.to_string(),
        }
    }
}

/// Outcome of checking a shard, directory, or corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.error_count()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    fn extend(&mut self, file: &str, violations: &[Violation]) {
        self.findings
            .extend(violations.iter().map(|v| Finding::new(file, v)));
    }
}

/// Checks a single shard's record invariants.
pub fn check_shard(shard: &Shard) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (index, record) in shard.records.iter().enumerate() {
        if record.key.is_empty() {
            violations.push(Violation::EmptyKey { index });
            continue;
        }

        match seen.get(record.key.as_str()) {
            Some(&first) => violations.push(Violation::DuplicateKey {
                index,
                key: record.key.clone(),
                first,
            }),
            None => {
                seen.insert(&record.key, index);
            }
        }

        if record.refs.is_empty() {
            violations.push(Violation::NoRefs {
                index,
                key: record.key.clone(),
            });
        }

        for r in &record.refs {
            let url = r.url.to_string();
            if !URL_RE.is_match(&url) {
                violations.push(Violation::BadUrl {
                    index,
                    key: record.key.clone(),
                    url,
                });
            }
        }

        match record.ordinal() {
            None => violations.push(Violation::MissingOrdinal {
                index,
                key: record.key.clone(),
            }),
            Some(found) if found != index => {
                violations.push(Violation::OrdinalMismatch { index, found });
            }
            Some(_) => {}
        }

        let expected_stem = escape::encode_stem(&record.label);
        if record.stem() != expected_stem {
            violations.push(Violation::StemMismatch {
                index,
                stem: record.stem().to_string(),
                label: record.label.clone(),
            });
        }
    }

    violations
}

/// Checks a single named shard file, producing a report.
pub fn check_file(file_name: &str, shard: &Shard) -> Report {
    let mut report = Report::default();
    report.extend(file_name, &check_shard(shard));
    report
}

/// Checks every shard in a corpus plus master/file-system consistency.
pub fn check_corpus(corpus: &Corpus) -> Report {
    let mut report = Report::default();

    for shard_file in &corpus.shards {
        report.extend(&shard_file.file_name, &check_shard(&shard_file.shard));

        // Records must open with the character the shard's bucket is named by.
        if let Some(expected) = escape::token_to_bucket_key(&shard_file.bucket) {
            for (index, record) in shard_file.shard.records.iter().enumerate() {
                let Some(actual) = escape::bucket_key(record.stem()) else {
                    continue;
                };
                if actual != expected {
                    report.extend(
                        &shard_file.file_name,
                        &[Violation::BucketMismatch {
                            index,
                            key: record.key.clone(),
                            expected: escape::bucket_token(actual),
                        }],
                    );
                }
            }
        }
    }

    if let Some(master) = &corpus.master {
        check_master(corpus, master, &mut report);
    }

    report
}

fn check_master(corpus: &Corpus, master: &MasterIndex, report: &mut Report) {
    // Every bucket the master declares must have a shard file on disk.
    for row in &master.sections {
        let Some(section) = row.section() else {
            continue;
        };
        for key in row.contents.chars() {
            let token = escape::bucket_token(key);
            let exists = corpus
                .shards
                .iter()
                .any(|s| s.section == section && s.bucket == token);
            if !exists {
                report.extend(
                    MasterIndex::FILE_NAME,
                    &[Violation::MissingShard {
                        section: section.id().to_string(),
                        bucket: token,
                    }],
                );
            }
        }
    }

    // Every shard on disk must be declared by the master.
    for shard_file in &corpus.shards {
        let declared = master.get(shard_file.section).is_some_and(|row| {
            escape::token_to_bucket_key(&shard_file.bucket)
                .is_some_and(|key| row.contents.contains(key))
        });
        if !declared {
            report.extend(&shard_file.file_name, &[Violation::OrphanShard]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FragmentUrl, SearchRecord, SearchRef, Shard};
    use assert2::check;

    fn record(key: &str, label: &str, url: &str, scope: &str) -> SearchRecord {
        SearchRecord {
            key: key.to_string(),
            label: label.to_string(),
            refs: vec![SearchRef::new(url.parse::<FragmentUrl>().unwrap(), scope)],
        }
    }

    #[test]
    fn test_clean_shard() {
        let shard = Shard::new(vec![
            record("abs_0", "abs", "p.html#a1", "stan::math"),
            record("acos_1", "acos", "p.html#a2", "stan::math"),
        ]);
        check!(check_shard(&shard).is_empty());
    }

    #[test]
    fn test_duplicate_key() {
        let shard = Shard::new(vec![
            record("abs_0", "abs", "p.html#a1", "s"),
            record("abs_0", "abs", "p.html#a2", "s"),
        ]);
        let violations = check_shard(&shard);
        check!(violations.iter().any(|v| matches!(
            v,
            Violation::DuplicateKey { index: 1, first: 0, .. }
        )));
    }

    #[test]
    fn test_empty_refs() {
        let shard = Shard::new(vec![SearchRecord {
            key: "abs_0".to_string(),
            label: "abs".to_string(),
            refs: vec![],
        }]);
        let violations = check_shard(&shard);
        check!(violations == vec![Violation::NoRefs {
            index: 0,
            key: "abs_0".to_string()
        }]);
    }

    #[test]
    fn test_unanchored_url_is_error() {
        let shard = Shard::new(vec![record("abs_0", "abs", "p.html", "s")]);
        let violations = check_shard(&shard);
        check!(violations.iter().any(|v| matches!(v, Violation::BadUrl { .. })));
        check!(violations[0].severity() == Severity::Error);
    }

    #[test]
    fn test_non_html_page_is_error() {
        let shard = Shard::new(vec![record("abs_0", "abs", "p.htm#a", "s")]);
        check!(
            check_shard(&shard)
                .iter()
                .any(|v| matches!(v, Violation::BadUrl { .. }))
        );
    }

    #[test]
    fn test_ordinal_gap_is_warning() {
        let shard = Shard::new(vec![
            record("abs_0", "abs", "p.html#a", "s"),
            record("acos_5", "acos", "p.html#b", "s"),
        ]);
        let violations = check_shard(&shard);
        check!(violations == vec![Violation::OrdinalMismatch { index: 1, found: 5 }]);
        check!(violations[0].severity() == Severity::Warning);
    }

    #[test]
    fn test_stem_mismatch() {
        let shard = Shard::new(vec![record("abs_0", "acos", "p.html#a", "s")]);
        let violations = check_shard(&shard);
        check!(violations.iter().any(|v| matches!(v, Violation::StemMismatch { .. })));
    }

    #[test]
    fn test_mangled_stem_accepted() {
        let shard = Shard::new(vec![record(
            "accept_5fstat_0",
            "accept_stat",
            "p.html#a",
            "s",
        )]);
        check!(check_shard(&shard).is_empty());
    }

    #[test]
    fn test_report_counts() {
        let mut report = Report::default();
        report.extend(
            "all_a.js",
            &[
                Violation::EmptyKey { index: 0 },
                Violation::OrdinalMismatch { index: 1, found: 3 },
            ],
        );
        check!(report.error_count() == 1);
        check!(report.warning_count() == 1);
        check!(!report.is_clean());
    }
}
