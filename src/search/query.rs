//! Query execution over a loaded corpus.
//!
//! Queries resolve the way the shipped UI resolves keystrokes: normalize,
//! match labels by relevance, rank overloads by scope canonicality. A `::`
//! in the query switches to scoped matching against `scope::label` paths.
//! Queries that match nothing fall back to fuzzy suggestions.

use crate::corpus::Corpus;
use crate::record::{SearchRecord, SearchRef};
use crate::sections::Section;
use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use super::scoring::{label_relevance, scope_canonicality, scope_relevance};
use super::terms::TermIndex;

/// Minimum similarity for a fuzzy suggestion to be offered.
const SUGGESTION_CUTOFF: f64 = 0.5;

/// How many fuzzy suggestions a zero-hit query returns.
const SUGGESTION_LIMIT: usize = 5;

/// Options for a single query.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Section searched; `All` covers every symbol category.
    pub section: Section,
    pub limit: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            section: Section::All,
            limit: 25,
        }
    }
}

/// One matching reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub label: String,
    pub scope: String,
    pub url: String,
    pub relevance: u32,
}

/// One ranked match from the term index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHit {
    pub label: String,
    pub scope: String,
    pub url: String,
    pub score: f32,
}

/// A fuzzy alternative offered when a query matches nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub score: f64,
}

/// What a query produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOutcome {
    Hits(Vec<SearchHit>),
    Suggestions(Vec<Suggestion>),
}

/// Executes queries against one corpus.
pub struct QueryEngine<'a> {
    corpus: &'a Corpus,
}

impl<'a> QueryEngine<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }

    /// Runs a label or scoped query.
    pub fn search(&self, query: &str, options: &QueryOptions) -> QueryOutcome {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return QueryOutcome::Hits(Vec::new());
        }

        let mut hits = if normalized.contains("::") {
            self.scoped_hits(&normalized, options.section)
        } else {
            self.label_hits(&normalized, options.section)
        };

        if hits.is_empty() {
            tracing::debug!("No hits for '{}', generating suggestions", query);
            return QueryOutcome::Suggestions(self.suggestions(&normalized, options.section));
        }

        hits.sort_by(|a, b| {
            b.relevance
                .cmp(&a.relevance)
                .then_with(|| scope_canonicality(&b.scope).cmp(&scope_canonicality(&a.scope)))
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.scope.cmp(&b.scope))
        });
        hits.truncate(options.limit);
        QueryOutcome::Hits(hits)
    }

    /// Runs a ranked query through a term index built over this corpus.
    pub fn ranked(&self, index: &TermIndex, query: &str, limit: usize) -> Vec<RankedHit> {
        index
            .search(query, limit)
            .into_iter()
            .filter_map(|((shard_idx, record_idx), score)| {
                let record = self
                    .corpus
                    .shards
                    .get(shard_idx as usize)?
                    .shard
                    .records
                    .get(record_idx as usize)?;
                let first = record.refs.first()?;
                Some(RankedHit {
                    label: record.label.clone(),
                    scope: first.scope.clone(),
                    url: first.url.to_string(),
                    score,
                })
            })
            .collect()
    }

    fn label_hits(&self, query: &str, section: Section) -> Vec<SearchHit> {
        self.corpus
            .section_records(section)
            .filter_map(|record| {
                let relevance = label_relevance(&record.label.to_lowercase(), query)?;
                Some(record_hits(record, relevance))
            })
            .flatten()
            .collect()
    }

    fn scoped_hits(&self, query: &str, section: Section) -> Vec<SearchHit> {
        let components: Vec<&str> = query
            .split("::")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if components.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for record in self.corpus.section_records(section) {
            for r in &record.refs {
                let path = scoped_path(record, r);
                if let Some(relevance) = scope_relevance(&path, &components) {
                    hits.push(hit(record, r, relevance));
                }
            }
        }
        hits
    }

    fn suggestions(&self, query: &str, section: Section) -> Vec<Suggestion> {
        let mut seen = std::collections::HashSet::new();
        let mut suggestions: Vec<Suggestion> = self
            .corpus
            .section_records(section)
            .filter(|record| seen.insert(record.label.clone()))
            .map(|record| Suggestion {
                score: jaro_winkler::similarity(
                    query.chars(),
                    record.label.to_lowercase().chars(),
                ),
                label: record.label.clone(),
            })
            .filter(|s| s.score >= SUGGESTION_CUTOFF)
            .collect();

        suggestions.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.label.cmp(&b.label))
        });
        suggestions.truncate(SUGGESTION_LIMIT);
        suggestions
    }
}

/// Lowercased `scope::label` path of one reference.
fn scoped_path(record: &SearchRecord, r: &SearchRef) -> Vec<String> {
    let mut path: Vec<String> = if r.scope.is_empty() {
        Vec::new()
    } else {
        r.scope.split("::").map(str::to_lowercase).collect()
    };
    path.push(record.label.to_lowercase());
    path
}

fn hit(record: &SearchRecord, r: &SearchRef, relevance: u32) -> SearchHit {
    SearchHit {
        label: record.label.clone(),
        scope: r.scope.clone(),
        url: r.url.to_string(),
        relevance,
    }
}

fn record_hits(record: &SearchRecord, relevance: u32) -> Vec<SearchHit> {
    record.refs.iter().map(|r| hit(record, r, relevance)).collect()
}
