//! Relevance and ranking rules.
//!
//! Matching mirrors what the shipped search UI does with a typed query:
//! exact label match first, then prefix, then substring. Scope-qualified
//! queries compare path components from the right, and ties between
//! overloads break toward the more canonical scope.

/// Relevance of a label against a (lowercased) query.
///
/// - 100: exact match
/// - 50: label starts with the query
/// - 10: label contains the query
/// - `None`: no match
pub(crate) fn label_relevance(label: &str, query: &str) -> Option<u32> {
    if label == query {
        Some(100)
    } else if label.starts_with(query) {
        Some(50)
    } else if label.contains(query) {
        Some(10)
    } else {
        None
    }
}

/// Relevance of a scoped path against query components.
///
/// The path is the record's containing scope split on `::` with the label
/// appended; it matches when it ends with the queried components, so
/// `mcmc::chains` finds `stan::mcmc::chains`. An exact-length match outranks
/// a suffix match on a deeper path.
pub(crate) fn scope_relevance(path: &[String], query_components: &[&str]) -> Option<u32> {
    if query_components.is_empty() || path.len() < query_components.len() {
        return None;
    }

    let suffix = &path[path.len() - query_components.len()..];
    let matches = suffix
        .iter()
        .zip(query_components)
        .all(|(path_seg, query_seg)| path_seg == query_seg);

    if !matches {
        return None;
    }

    if path.len() == query_components.len() {
        Some(100)
    } else {
        Some(90)
    }
}

/// Canonicality score of a containing scope.
///
/// Shorter scopes and scopes without implementation-detail markers score
/// higher, so `stan::math::abs` ranks above `stan::math::detail::abs` when
/// both match.
pub(crate) fn scope_canonicality(scope: &str) -> i32 {
    if scope.is_empty() {
        return 100;
    }

    let segments: Vec<&str> = scope.split("::").collect();
    let mut score = 100;

    score -= (segments.len() as i32 - 1) * 8;

    let internal_markers = ["detail", "internal", "impl", "anon", "__"];
    for segment in &segments {
        if internal_markers.iter().any(|m| segment.contains(m)) {
            score -= 40;
        }
    }

    score
}
