//! Parser for shard files.
//!
//! Shard files are a narrow JavaScript subset: a single `var <name> =`
//! assignment of a nested array literal of quoted strings and small
//! integers. The parser is a hand-rolled recursive descent over that
//! subset, insensitive to whitespace, and reports failures with line and
//! column positions.
//!
//! Parsing is deliberately lenient about content-level invariants (empty
//! reference lists, malformed keys): those are the checker's concern, so
//! that a damaged file can still be inspected.

use crate::record::{FragmentUrl, SearchRecord, SearchRef, Shard};
use thiserror::Error;

/// Parse failure with source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected end of input while parsing {0}")]
    UnexpectedEof(String),
    #[error("expected {0}")]
    Expected(String),
    #[error("invalid string escape")]
    BadEscape,
    #[error("invalid number")]
    BadNumber,
    #[error("url has an empty page component")]
    BadUrl,
    #[error("trailing content after array")]
    TrailingContent,
}

/// Parses the contents of a shard file.
pub fn parse_shard(src: &str) -> Result<Shard, ParseError> {
    let mut cur = Cursor::new(src);

    cur.skip_ws();
    cur.keyword("var")?;
    cur.skip_ws();
    let variable = cur.ident()?;
    cur.skip_ws();
    cur.expect('=')?;
    cur.skip_ws();

    let records = parse_array(&mut cur)?;

    cur.skip_ws();
    cur.eat(';');
    cur.skip_ws();
    if !cur.at_eof() {
        return Err(cur.error(ParseErrorKind::TrailingContent));
    }

    Ok(Shard { variable, records })
}

fn parse_array(cur: &mut Cursor<'_>) -> Result<Vec<SearchRecord>, ParseError> {
    cur.expect('[')?;
    cur.skip_ws();

    let mut records = Vec::new();
    if cur.eat(']') {
        return Ok(records);
    }

    loop {
        records.push(parse_record(cur)?);
        cur.skip_ws();
        if cur.eat(',') {
            cur.skip_ws();
            continue;
        }
        cur.expect(']')?;
        return Ok(records);
    }
}

fn parse_record(cur: &mut Cursor<'_>) -> Result<SearchRecord, ParseError> {
    cur.expect('[')?;
    cur.skip_ws();
    let key = cur.string()?;
    cur.skip_ws();
    cur.expect(',')?;
    cur.skip_ws();

    cur.expect('[')?;
    cur.skip_ws();
    let label = cur.string()?;
    cur.skip_ws();

    let mut refs = Vec::new();
    while cur.eat(',') {
        cur.skip_ws();
        refs.push(parse_ref(cur)?);
        cur.skip_ws();
    }
    cur.expect(']')?;
    cur.skip_ws();
    cur.expect(']')?;

    Ok(SearchRecord { key, label, refs })
}

fn parse_ref(cur: &mut Cursor<'_>) -> Result<SearchRef, ParseError> {
    cur.expect('[')?;
    cur.skip_ws();
    let url_text = cur.string()?;
    let url: FragmentUrl = url_text
        .parse()
        .map_err(|_| cur.error(ParseErrorKind::BadUrl))?;
    cur.skip_ws();
    cur.expect(',')?;
    cur.skip_ws();

    // Tolerate the optional numeric marker between url and scope.
    let (marker, scope) = if cur.peek().is_some_and(|c| c.is_ascii_digit()) {
        let marker = cur.number()?;
        cur.skip_ws();
        cur.expect(',')?;
        cur.skip_ws();
        (Some(marker), cur.string()?)
    } else {
        (None, cur.string()?)
    };
    cur.skip_ws();
    cur.expect(']')?;

    Ok(SearchRef { url, marker, scope })
}

/// Character cursor with line/column tracking, shared with the master-index
/// parser.
pub(crate) struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            kind,
        }
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    pub(crate) fn at_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub(crate) fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Consumes `expected` if it is next; returns whether it was.
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::Expected(format!("'{}'", expected))))
        }
    }

    pub(crate) fn keyword(&mut self, word: &str) -> Result<(), ParseError> {
        let ident = self.ident()?;
        if ident == word {
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::Expected(format!("keyword '{}'", word))))
        }
    }

    pub(crate) fn ident(&mut self) -> Result<String, ParseError> {
        let mut out = String::new();
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            out.push(self.advance().unwrap());
        }
        if out.is_empty() {
            Err(self.error(ParseErrorKind::Expected("identifier".to_string())))
        } else {
            Ok(out)
        }
    }

    /// Quoted string, single or double quotes, with backslash escapes.
    pub(crate) fn string(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return Err(self.error(ParseErrorKind::Expected("string".to_string()))),
            None => {
                return Err(self.error(ParseErrorKind::UnexpectedEof("string".to_string())));
            }
        };
        self.advance();

        let mut out = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(self.error(ParseErrorKind::UnexpectedEof("string".to_string())));
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.advance() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('u') => out.push(self.unicode_escape()?),
                    Some(c @ ('\'' | '"' | '\\' | '/')) => out.push(c),
                    _ => return Err(self.error(ParseErrorKind::BadEscape)),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error(ParseErrorKind::BadEscape))?;
            value = value * 16 + digit;
        }
        char::from_u32(value).ok_or_else(|| self.error(ParseErrorKind::BadEscape))
    }

    pub(crate) fn number(&mut self) -> Result<u32, ParseError> {
        let mut digits = String::new();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            digits.push(self.advance().unwrap());
        }
        digits
            .parse()
            .map_err(|_| self.error(ParseErrorKind::BadNumber))
    }
}
