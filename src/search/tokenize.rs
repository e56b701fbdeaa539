//! Tokenization and stemming for the term index.
//!
//! Labels and scopes are C++-flavored identifiers, so tokens come from a
//! boundary-splitting pass rather than plain whitespace: `AcceptStat`,
//! `accept_stat` and `accept-stat` all yield `accept` and `stat`, plus the
//! compound itself so an exact spelling still ranks highest.

use ahash::AHasher;
use rust_stemmers::Stemmer;
use std::hash::{Hash, Hasher};

/// Minimum token length. Single letters stay indexed so short C++ names
/// (`T`, `mu`) remain searchable.
const MIN_TOKEN_LENGTH: usize = 1;

/// Splits `text` into searchable tokens, lowercased and stemmed.
///
/// The splitter walks the text with two pointers: `word_start` marks the
/// current run of identifier characters, `subword_start` the current
/// component inside it. Components end at `_`/`-` delimiters and at
/// lowercase-to-uppercase case changes; anything that is not alphanumeric
/// ends the whole word. Both the components and the full word are emitted.
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<String> {
    let mut tokens = Vec::new();

    let mut last_was_lower = false;
    let mut word_start: Option<usize> = None;
    let mut subword_start = 0;

    for (i, c) in text.char_indices() {
        let is_word_char = c.is_alphanumeric();

        if is_word_char && word_start.is_none() {
            word_start = Some(i);
            subword_start = i;
        }

        if c == '_' || c == '-' {
            // Delimiter inside an identifier: close the component, keep the
            // word running so the compound is still emitted at the end.
            if word_start.is_some() && i - subword_start >= MIN_TOKEN_LENGTH {
                push_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            subword_start = i + c.len_utf8();
        } else if !is_word_char {
            flush_word(text, word_start.take(), subword_start, i, &mut tokens, stemmer);
        } else if c.is_uppercase() && last_was_lower {
            // Case change boundary: "AcceptStat" splits before "Stat".
            if i - subword_start >= MIN_TOKEN_LENGTH {
                push_token(&text[subword_start..i], &mut tokens, stemmer);
            }
            subword_start = i;
        }

        last_was_lower = c.is_lowercase();
    }

    flush_word(
        text,
        word_start,
        subword_start,
        text.len(),
        &mut tokens,
        stemmer,
    );

    tokens
}

fn flush_word(
    text: &str,
    word_start: Option<usize>,
    subword_start: usize,
    end: usize,
    tokens: &mut Vec<String>,
    stemmer: &Stemmer,
) {
    let Some(start) = word_start else {
        return;
    };
    if subword_start > start && end - subword_start >= MIN_TOKEN_LENGTH {
        push_token(&text[subword_start..end], tokens, stemmer);
    }
    if end - start >= MIN_TOKEN_LENGTH {
        push_token(&text[start..end], tokens, stemmer);
    }
}

fn push_token(token: &str, tokens: &mut Vec<String>, stemmer: &Stemmer) {
    let lowered = token.to_lowercase();
    let stemmed = stemmer.stem(&lowered);
    tokens.push(stemmed.into_owned());
}

/// Hashes a term for posting-list lookup (case-insensitive).
pub(crate) fn hash_term(term: &str) -> u64 {
    let mut hasher = AHasher::default();
    term.to_lowercase().hash(&mut hasher);
    hasher.finish()
}
