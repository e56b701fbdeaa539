//! Index sections and the master index file.
//!
//! A search directory is split into sections, one per symbol category, and
//! each section into first-character buckets. The master index
//! (`searchdata.js`) declares which sections exist and which bucket
//! characters carry content, so the consuming UI knows which shard file to
//! fetch for a given query without probing the server.

use crate::parse::{Cursor, ParseError, ParseErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol categories a search directory is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    All,
    Classes,
    Namespaces,
    Files,
    Functions,
    Variables,
    Typedefs,
    Enums,
    EnumValues,
    Related,
    Defines,
    Groups,
    Pages,
}

impl Section {
    /// Every section, in the order the master index lists them.
    pub const ALL: [Self; 13] = [
        Self::All,
        Self::Classes,
        Self::Namespaces,
        Self::Files,
        Self::Functions,
        Self::Variables,
        Self::Typedefs,
        Self::Enums,
        Self::EnumValues,
        Self::Related,
        Self::Defines,
        Self::Groups,
        Self::Pages,
    ];

    /// Identifier used in shard file names and the master name table.
    pub fn id(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Classes => "classes",
            Self::Namespaces => "namespaces",
            Self::Files => "files",
            Self::Functions => "functions",
            Self::Variables => "variables",
            Self::Typedefs => "typedefs",
            Self::Enums => "enums",
            Self::EnumValues => "enumvalues",
            Self::Related => "related",
            Self::Defines => "defines",
            Self::Groups => "groups",
            Self::Pages => "pages",
        }
    }

    /// Display label shown by the consuming UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Classes => "Classes",
            Self::Namespaces => "Namespaces",
            Self::Files => "Files",
            Self::Functions => "Functions",
            Self::Variables => "Variables",
            Self::Typedefs => "Typedefs",
            Self::Enums => "Enumerations",
            Self::EnumValues => "Enumerator",
            Self::Related => "Friends",
            Self::Defines => "Macros",
            Self::Groups => "Modules",
            Self::Pages => "Pages",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One row of the master index tables.
///
/// `id` and `label` are kept as parsed so that a foreign section (one this
/// tool does not generate) survives a parse/serialize cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSection {
    pub id: String,
    pub label: String,
    /// Bucket key characters that have content, sorted by code point.
    pub contents: String,
}

impl MasterSection {
    pub fn section(&self) -> Option<Section> {
        Section::from_id(&self.id)
    }
}

/// The parsed master index file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MasterIndex {
    pub sections: Vec<MasterSection>,
}

impl MasterIndex {
    /// File name the master index is stored under.
    pub const FILE_NAME: &'static str = "searchdata.js";

    /// Finds a row by section.
    pub fn get(&self, section: Section) -> Option<&MasterSection> {
        self.sections.iter().find(|s| s.section() == Some(section))
    }
}

/// Parses a master index file: three keyed object literals holding, per
/// section ordinal, the content characters, the section id, and the
/// display label.
pub fn parse_master(src: &str) -> Result<MasterIndex, ParseError> {
    let mut cur = Cursor::new(src);

    let contents = parse_table(&mut cur, "indexSectionsWithContent")?;
    let names = parse_table(&mut cur, "indexSectionNames")?;
    let labels = parse_table(&mut cur, "indexSectionLabels")?;

    cur.skip_ws();
    if !cur.at_eof() {
        return Err(cur.error(ParseErrorKind::TrailingContent));
    }

    if contents.len() != names.len() || names.len() != labels.len() {
        return Err(cur.error(ParseErrorKind::Expected(
            "matching row counts across index tables".to_string(),
        )));
    }

    let sections = contents
        .into_iter()
        .zip(names)
        .zip(labels)
        .map(|((contents, id), label)| MasterSection {
            id,
            label,
            contents,
        })
        .collect();

    Ok(MasterIndex { sections })
}

/// Parses `var <name> =\n{ 0: "...", 1: "..." };`, returning values in key
/// order. Keys must be dense from zero, matching what the serializer emits.
fn parse_table(cur: &mut Cursor<'_>, name: &str) -> Result<Vec<String>, ParseError> {
    cur.skip_ws();
    cur.keyword("var")?;
    cur.skip_ws();
    cur.keyword(name)?;
    cur.skip_ws();
    cur.expect('=')?;
    cur.skip_ws();
    cur.expect('{')?;
    cur.skip_ws();

    let mut rows = Vec::new();
    if cur.eat('}') {
        cur.skip_ws();
        cur.eat(';');
        return Ok(rows);
    }

    loop {
        let key = cur.number()?;
        if key as usize != rows.len() {
            return Err(cur.error(ParseErrorKind::Expected(format!(
                "table key {}",
                rows.len()
            ))));
        }
        cur.skip_ws();
        cur.expect(':')?;
        cur.skip_ws();
        rows.push(cur.string()?);
        cur.skip_ws();
        if cur.eat(',') {
            cur.skip_ws();
            continue;
        }
        cur.expect('}')?;
        cur.skip_ws();
        cur.eat(';');
        return Ok(rows);
    }
}

/// Renders a master index in canonical form.
pub fn emit_master(master: &MasterIndex) -> String {
    let mut out = String::new();
    emit_table(&mut out, "indexSectionsWithContent", master, |s| &s.contents);
    out.push('\n');
    emit_table(&mut out, "indexSectionNames", master, |s| &s.id);
    out.push('\n');
    emit_table(&mut out, "indexSectionLabels", master, |s| &s.label);
    out
}

fn emit_table<'a>(
    out: &mut String,
    name: &str,
    master: &'a MasterIndex,
    field: impl Fn(&'a MasterSection) -> &'a str,
) {
    out.push_str("var ");
    out.push_str(name);
    out.push_str(" =\n{\n");
    for (i, section) in master.sections.iter().enumerate() {
        out.push_str(&format!("  {}: \"", i));
        for ch in field(section).chars() {
            match ch {
                '\\' | '"' => {
                    out.push('\\');
                    out.push(ch);
                }
                _ => out.push(ch),
            }
        }
        out.push('"');
        if i + 1 < master.sections.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("};\n");
}
