//! Canonical serializer for shard files.
//!
//! The output layout is fixed: header line, one record per line indented by
//! two spaces, comma-separated, closing `];`. Strings are single-quoted with
//! backslash escapes for `\` and `'`. Serializing a value parsed from a file
//! in this canonical form reproduces the file byte-for-byte, which is what
//! makes regenerated indexes diffable.

use crate::record::{SearchRecord, SearchRef, Shard};

/// Renders a shard in canonical form.
pub fn emit_shard(shard: &Shard) -> String {
    let mut out = String::new();
    out.push_str("var ");
    out.push_str(&shard.variable);
    out.push_str("=\n[\n");

    for (i, record) in shard.records.iter().enumerate() {
        out.push_str("  ");
        emit_record(&mut out, record);
        if i + 1 < shard.records.len() {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("];\n");
    out
}

fn emit_record(out: &mut String, record: &SearchRecord) {
    out.push('[');
    quote(out, &record.key);
    out.push_str(",[");
    quote(out, &record.label);
    for r in &record.refs {
        out.push(',');
        emit_ref(out, r);
    }
    out.push_str("]]");
}

fn emit_ref(out: &mut String, r: &SearchRef) {
    out.push('[');
    quote(out, &r.url.to_string());
    if let Some(marker) = r.marker {
        out.push(',');
        out.push_str(&marker.to_string());
    }
    out.push(',');
    quote(out, &r.scope);
    out.push(']');
}

/// Single-quotes a string, escaping backslashes and quotes.
pub(crate) fn quote(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' | '\'' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out.push('\'');
}
