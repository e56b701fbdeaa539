//! TF-IDF inverted index over record labels and scopes.

use crate::corpus::Corpus;
use crate::sections::Section;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tokenize::{hash_term, tokenize_and_stem};
use rust_stemmers::{Algorithm, Stemmer};

/// Term hash for fast lookup
type TermHash = u64;

/// Location of an indexed record: (shard index, record index) within the
/// corpus the index was built from.
pub type DocId = (u32, u32);

/// A searchable term index with TF-IDF scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermIndex {
    /// Map from term hash to (doc ordinal, tf-idf score), sorted by score
    /// descending.
    terms: HashMap<TermHash, Vec<(usize, f32)>>,
    /// Doc ordinal to corpus location.
    docs: Vec<DocId>,
}

impl TermIndex {
    /// Builds an index over a corpus.
    ///
    /// When the corpus carries an `all` section only that section is
    /// indexed, since it already aggregates every other one; otherwise all
    /// shards contribute. Duplicate hits across sections would otherwise
    /// drown the ranking.
    pub fn build(corpus: &Corpus) -> Self {
        let has_all = corpus.shards.iter().any(|s| s.section == Section::All);

        let mut builder = TermBuilder::default();
        for (shard_idx, shard_file) in corpus.shards.iter().enumerate() {
            if has_all && shard_file.section != Section::All {
                continue;
            }
            for (record_idx, record) in shard_file.shard.records.iter().enumerate() {
                let doc = (shard_idx as u32, record_idx as u32);
                builder.add_document(
                    doc,
                    &record.label,
                    record.refs.iter().map(|r| r.scope.as_str()),
                );
            }
        }

        let index = builder.finalize();
        tracing::info!(
            "Built term index: {} unique terms, {} documents",
            index.term_count(),
            index.document_count()
        );
        index
    }

    /// Searches for records matching the query, best score first.
    ///
    /// The query is tokenized and stemmed exactly like indexed text, so
    /// `AcceptStat`, `accept_stat` and `accept stat` resolve to the same
    /// terms; multi-token queries sum per-token scores.
    pub fn search(&self, query: &str, limit: usize) -> Vec<(DocId, f32)> {
        let stemmer = Stemmer::create(Algorithm::English);
        let tokens = tokenize_and_stem(query, &stemmer);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut combined: HashMap<usize, f32> = HashMap::new();
        for token in &tokens {
            if let Some(postings) = self.terms.get(&hash_term(token)) {
                for (doc, score) in postings {
                    *combined.entry(*doc).or_insert(0.0) += score;
                }
            }
        }

        let mut results: Vec<_> = combined.into_iter().collect();
        results.sort_by(|(da, a), (db, b)| b.total_cmp(a).then(da.cmp(db)));

        results
            .into_iter()
            .take(limit)
            .map(|(doc, score)| (self.docs[doc], score))
            .collect()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn document_count(&self) -> usize {
        self.docs.len()
    }
}

/// Accumulates term frequencies before TF-IDF finalization.
struct TermBuilder {
    /// Flat map from (term hash, doc) to raw TF score.
    term_docs: HashMap<(TermHash, DocId), f32>,
    /// Total term count per doc, for length normalization.
    doc_lengths: HashMap<DocId, usize>,
    docs: Vec<DocId>,
    stemmer: Stemmer,
}

impl Default for TermBuilder {
    fn default() -> Self {
        Self {
            term_docs: HashMap::default(),
            doc_lengths: HashMap::default(),
            docs: Vec::new(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl TermBuilder {
    /// Indexes one record: its label weighted double, each scope single.
    fn add_document<'a>(
        &mut self,
        doc: DocId,
        label: &str,
        scopes: impl Iterator<Item = &'a str>,
    ) {
        self.docs.push(doc);
        self.add_terms(label, doc, 2.0);
        for scope in scopes {
            self.add_terms(scope, doc, 1.0);
        }
    }

    fn add_terms(&mut self, text: &str, doc: DocId, base_score: f32) {
        let words = tokenize_and_stem(text, &self.stemmer);

        let mut counts: HashMap<String, usize> = HashMap::with_capacity(words.len());
        for word in words {
            *counts.entry(word).or_insert(0) += 1;
        }

        let length: usize = counts.values().sum();
        *self.doc_lengths.entry(doc).or_insert(0) += length;

        for (word, count) in counts {
            let tf_score = (count as f32) * base_score;
            *self
                .term_docs
                .entry((hash_term(&word), doc))
                .or_insert(0.0) += tf_score;
        }
    }

    /// Computes IDF and produces the final searchable index.
    ///
    /// TF-IDF = (1 + ln(tf_normalized)) * ln(total_docs / doc_freq), with
    /// tf normalized by document length relative to the average.
    fn finalize(mut self) -> TermIndex {
        self.docs.sort_unstable();
        self.docs.dedup();
        let total_docs = self.docs.len() as f32;

        let total_length: usize = self.doc_lengths.values().sum();
        let avg_doc_length = if self.doc_lengths.is_empty() {
            1.0
        } else {
            total_length as f32 / self.doc_lengths.len() as f32
        };

        let ordinal_of: HashMap<DocId, usize> = self
            .docs
            .iter()
            .enumerate()
            .map(|(i, doc)| (*doc, i))
            .collect();

        let mut grouped: HashMap<TermHash, Vec<(DocId, f32)>> = HashMap::new();
        for ((term_hash, doc), tf_score) in self.term_docs {
            grouped.entry(term_hash).or_default().push((doc, tf_score));
        }

        let mut terms: HashMap<TermHash, Vec<(usize, f32)>> = HashMap::new();
        for (term_hash, doc_scores) in grouped {
            let doc_freq = doc_scores.len() as f32;
            let idf = (total_docs / doc_freq).ln();

            let mut postings: Vec<_> = doc_scores
                .into_iter()
                .map(|(doc, tf_score)| {
                    let doc_length = self.doc_lengths.get(&doc).copied().unwrap_or(1) as f32;
                    // Clamp the norm so very short labels are not over-boosted.
                    let length_norm = (doc_length / avg_doc_length).max(0.5);
                    let tf_normalized = tf_score / length_norm;
                    (ordinal_of[&doc], (1.0 + tf_normalized.ln()) * idf)
                })
                .collect();

            postings.sort_by(|(da, a), (db, b)| b.total_cmp(a).then(da.cmp(db)));
            terms.insert(term_hash, postings);
        }

        TermIndex {
            terms,
            docs: self.docs,
        }
    }
}
