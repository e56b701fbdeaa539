mod common;

use assert2::{check, let_assert};
use common::{SearchDir, search_dir};
use doxidx::corpus::Corpus;
use doxidx::search::{CACHE_FILE, QueryEngine, QueryOptions, QueryOutcome, load_or_build};
use doxidx::sections::Section;
use rstest::rstest;

/// Test: an exact label query finds the record and returns every overload.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exact_query_finds_overloads(search_dir: SearchDir) {
    let corpus = Corpus::load(search_dir.path()).await.unwrap();
    let engine = QueryEngine::new(&corpus);

    let_assert!(QueryOutcome::Hits(hits) = engine.search("abs", &QueryOptions::default()));
    check!(hits.len() >= 2);
    check!(hits[0].relevance == 100);
    check!(hits.iter().any(|h| h.scope == "stan::agrad"));
    check!(hits.iter().any(|h| h.scope == "stan::math"));
}

/// Test: prefix matches rank below the exact match but are returned.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn prefix_ranks_below_exact(search_dir: SearchDir) {
    let corpus = Corpus::load(search_dir.path()).await.unwrap();
    let engine = QueryEngine::new(&corpus);

    let_assert!(QueryOutcome::Hits(hits) = engine.search("ac", &QueryOptions::default()));
    check!(!hits.is_empty());
    check!(hits.iter().all(|h| h.relevance == 50));
    check!(hits.iter().any(|h| h.label == "accept_stat"));
    check!(hits.iter().any(|h| h.label == "acos"));
}

/// Test: restricting the section hides symbols of other categories.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn section_filter(search_dir: SearchDir) {
    let corpus = Corpus::load(search_dir.path()).await.unwrap();
    let engine = QueryEngine::new(&corpus);
    let options = QueryOptions {
        section: Section::Classes,
        limit: 25,
    };

    let_assert!(QueryOutcome::Hits(hits) = engine.search("chains", &options));
    check!(hits.len() == 1);

    match engine.search("abs", &options) {
        QueryOutcome::Hits(hits) => {
            check!(hits.is_empty());
        }
        QueryOutcome::Suggestions(_) => {}
    }
}

/// Test: scope-qualified queries resolve through containing scopes.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scoped_query(search_dir: SearchDir) {
    let corpus = Corpus::load(search_dir.path()).await.unwrap();
    let engine = QueryEngine::new(&corpus);

    let_assert!(
        QueryOutcome::Hits(hits) = engine.search("math::abs", &QueryOptions::default())
    );
    check!(hits.len() == 1);
    check!(hits[0].scope == "stan::math");

    let_assert!(
        QueryOutcome::Hits(hits) =
            engine.search("stan::mcmc::sample::accept_stat", &QueryOptions::default())
    );
    check!(hits[0].relevance == 100);
}

/// Test: a typo produces suggestions instead of silence.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn typo_produces_suggestions(search_dir: SearchDir) {
    let corpus = Corpus::load(search_dir.path()).await.unwrap();
    let engine = QueryEngine::new(&corpus);

    let_assert!(
        QueryOutcome::Suggestions(suggestions) =
            engine.search("chans", &QueryOptions::default())
    );
    check!(suggestions.first().is_some_and(|s| s.label == "chains"));
}

/// Test: ranked search over the term index finds case-style variants and
/// persists its cache beside the shards.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ranked_search_and_cache(search_dir: SearchDir) {
    let corpus = Corpus::load(search_dir.path()).await.unwrap();
    let engine = QueryEngine::new(&corpus);

    let index = load_or_build(&corpus).await.unwrap();
    check!(search_dir.path().join(CACHE_FILE).exists());

    let hits = engine.ranked(&index, "AcceptStat", 10);
    check!(hits.first().is_some_and(|h| h.label == "accept_stat"));

    // Warm path returns an equivalent index.
    let warm = load_or_build(&corpus).await.unwrap();
    check!(warm.document_count() == index.document_count());
}

/// Test: ranked search tokenizes scope components, so namespace terms hit.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ranked_search_matches_scope_terms(search_dir: SearchDir) {
    let corpus = Corpus::load(search_dir.path()).await.unwrap();
    let engine = QueryEngine::new(&corpus);
    let index = load_or_build(&corpus).await.unwrap();

    let hits = engine.ranked(&index, "mcmc chains", 10);
    check!(hits.first().is_some_and(|h| h.label == "chains"));
}
