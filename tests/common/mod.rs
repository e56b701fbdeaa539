//! Shared test fixtures and utilities for integration tests.
//!
//! Each test gets a fresh temporary search directory so index caches and
//! generated files never leak between tests. The fixture directory mimics a
//! small but realistic documentation build of a C++ statistics library:
//! `all` shards plus per-category shards and a master index, with overloads
//! that resolve to more than one anchor.

use doxidx::emit::emit_shard;
use doxidx::escape;
use doxidx::generate::{Symbol, SymbolKind};
use doxidx::record::{FragmentUrl, SearchRecord, SearchRef, Shard};
use doxidx::sections::{MasterIndex, MasterSection, emit_master};
use rstest::fixture;
use std::path::Path;
use tempfile::TempDir;

/// A temporary search directory that cleans up on drop.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct SearchDir {
    temp: TempDir,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl SearchDir {
    pub fn empty() -> Self {
        Self {
            temp: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Writes a file with the given content into the directory.
    pub fn write(&self, name: &str, content: &str) {
        std::fs::write(self.path().join(name), content)
            .unwrap_or_else(|e| panic!("Failed to write '{}': {}", name, e));
    }

    /// Writes a canonical shard built from `(label, scopes)` rows.
    pub fn write_shard(&self, name: &str, rows: &[(&str, &[&str])]) {
        self.write(name, &emit_shard(&shard(rows)));
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name))
            .unwrap_or_else(|e| panic!("Failed to read '{}': {}", name, e))
    }
}

/// Builds a canonical shard from `(label, scopes)` rows; each scope becomes
/// one reference with a synthetic page and anchor.
#[allow(dead_code)] // Not every test binary uses every helper
pub fn shard(rows: &[(&str, &[&str])]) -> Shard {
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, (label, scopes))| SearchRecord {
            key: escape::encode_key(label, index),
            label: (*label).to_string(),
            refs: scopes
                .iter()
                .enumerate()
                .map(|(i, scope)| {
                    SearchRef::new(
                        FragmentUrl::new(page_for(scope), format!("a{}{}", index, i)),
                        *scope,
                    )
                })
                .collect(),
        })
        .collect();
    Shard::new(records)
}

fn page_for(scope: &str) -> String {
    if scope.is_empty() {
        "globals.html".to_string()
    } else {
        format!("namespace{}.html", scope.replace("::", "_1_1"))
    }
}

/// A populated search directory: two `all` buckets, category shards and a
/// consistent master index.
#[allow(dead_code)] // Not every test binary uses every fixture
#[fixture]
pub fn search_dir() -> SearchDir {
    let dir = SearchDir::empty();

    dir.write_shard(
        "all_a.js",
        &[
            ("abs", &["stan::agrad", "stan::math"]),
            ("accept_stat", &["stan::mcmc::sample"]),
            ("acos", &["stan::math"]),
        ],
    );
    dir.write_shard("all_c.js", &[("chains", &["stan::mcmc"])]);
    dir.write_shard(
        "functions_a.js",
        &[("abs", &["stan::agrad", "stan::math"]), ("acos", &["stan::math"])],
    );
    dir.write_shard("classes_c.js", &[("chains", &["stan::mcmc"])]);
    dir.write_shard("variables_a.js", &[("accept_stat", &["stan::mcmc::sample"])]);

    dir.write(
        "searchdata.js",
        &emit_master(&MasterIndex {
            sections: vec![
                master_row("all", "All", "ac"),
                master_row("classes", "Classes", "c"),
                master_row("functions", "Functions", "a"),
                master_row("variables", "Variables", "a"),
            ],
        }),
    );

    dir
}

#[allow(dead_code)] // Not every test binary uses every helper
pub fn master_row(id: &str, label: &str, contents: &str) -> MasterSection {
    MasterSection {
        id: id.to_string(),
        label: label.to_string(),
        contents: contents.to_string(),
    }
}

/// Symbol table matching the `search_dir` fixture, for generator tests.
#[allow(dead_code)] // Used in generate_test.rs
pub fn sample_symbols() -> Vec<Symbol> {
    fn symbol(name: &str, kind: SymbolKind, scope: &str, anchor: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            scope: scope.to_string(),
            page: page_for(scope),
            anchor: anchor.to_string(),
        }
    }

    vec![
        symbol("abs", SymbolKind::Function, "stan::agrad", "a00"),
        symbol("abs", SymbolKind::Function, "stan::math", "a01"),
        symbol("acos", SymbolKind::Function, "stan::math", "a02"),
        symbol("accept_stat", SymbolKind::Variable, "stan::mcmc::sample", "a03"),
        symbol("chains", SymbolKind::Class, "stan::mcmc", "a04"),
    ]
}
