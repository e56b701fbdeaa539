//! Toolkit for Doxygen-style client-side search indexes: parse, validate,
//! generate and query the `searchData` shard files and their master index.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod digest;
pub mod emit;
pub mod error;
pub mod escape;
pub mod generate;
pub mod parse;
pub mod record;
pub mod search;
pub mod sections;
pub mod tracing;
pub mod validate;

pub use corpus::Corpus;
pub use record::{FragmentUrl, SearchRecord, SearchRef, Shard};
pub use search::{QueryEngine, QueryOptions, QueryOutcome, TermIndex};
pub use sections::{MasterIndex, Section};
