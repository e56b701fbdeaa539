//! Search over a loaded corpus.
//!
//! Two query paths share this module: direct label matching with the same
//! relevance rules the shipped UI applies (exact/prefix/substring), and a
//! ranked path over a TF-IDF term index built from tokenized labels and
//! scopes. The term index is expensive to build, so it is persisted beside
//! the shards and revalidated by content digest.

pub(crate) mod cache;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod terms;
pub(crate) mod tokenize;

pub use cache::{CACHE_FILE, load_or_build};
pub use query::{QueryEngine, QueryOptions, QueryOutcome, RankedHit, SearchHit, Suggestion};
pub use terms::{DocId, TermIndex};
