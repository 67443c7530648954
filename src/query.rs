//! Query compiler
//!
//! Turns the textual DSL into a list of typed predicates the store can
//! evaluate. Clauses are joined by the literal token `" AND "`; there is no
//! OR, NOT, grouping, or precedence. Classification per clause, in priority
//! order:
//!
//! 1. `field:[start TO end]`  range (empty `end` = open upper bound)
//! 2. `field:"value"`         quoted field match
//! 3. `field:value`           bare field match
//! 4. anything else           free-text over the whole clause
//!
//! Compilation never fails: a malformed clause (e.g. a non-numeric
//! `size_bytes` bound) degrades to a free-text predicate instead of
//! aborting the query.

use once_cell::sync::Lazy;
use regex::Regex;

/// Columns stored directly on the files table. Field-match predicates on
/// anything else are evaluated against the composite text blob.
pub const DIRECT_COLUMNS: [&str; 5] = ["name", "size_bytes", "created", "modified", "extension"];

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\w+):\[(.+?)\s+TO\s*(.*?)\]$"#).unwrap());

static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\w+):"([^"]+)"$"#).unwrap());

static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(\w+):(\S+)$"#).unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field:[low TO high]`. `clause` keeps the literal clause text, which
    /// is what gets substring-matched when `field` is not a range column.
    Range {
        field: String,
        low: String,
        high: Option<String>,
        clause: String,
    },
    /// `field:value` or `field:"value"`. `direct` records whether the field
    /// is a real column; otherwise the match runs against composite text as
    /// the literal `field:value` string.
    FieldMatch {
        field: String,
        value: String,
        direct: bool,
    },
    /// Substring match over name or composite text.
    FreeText { value: String },
}

pub fn compile(query: &str) -> Vec<Predicate> {
    query
        .split(" AND ")
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .map(classify)
        .collect()
}

fn classify(clause: &str) -> Predicate {
    if let Some(caps) = RANGE_RE.captures(clause) {
        let field = caps[1].to_string();
        let low = caps[2].trim().to_string();
        let high = {
            let h = caps[3].trim();
            if h.is_empty() {
                None
            } else {
                Some(h.to_string())
            }
        };

        // Numeric bounds are required for size ranges; a bad bound fails
        // only this clause, never the whole query.
        if field == "size_bytes" {
            let low_ok = low.parse::<f64>().is_ok();
            let high_ok = high.as_deref().map_or(true, |h| h.parse::<f64>().is_ok());
            if !low_ok || !high_ok {
                tracing::debug!("Non-numeric size bound in {:?}, matching as text", clause);
                return Predicate::FreeText {
                    value: clause.to_string(),
                };
            }
        }

        return Predicate::Range {
            field,
            low,
            high,
            clause: clause.to_string(),
        };
    }

    if let Some(caps) = QUOTED_RE.captures(clause) {
        return field_match(&caps[1], &caps[2]);
    }

    if let Some(caps) = BARE_RE.captures(clause) {
        return field_match(&caps[1], &caps[2]);
    }

    Predicate::FreeText {
        value: clause.to_string(),
    }
}

fn field_match(field: &str, value: &str) -> Predicate {
    Predicate::FieldMatch {
        field: field.to_string(),
        value: value.to_string(),
        direct: DIRECT_COLUMNS.contains(&field),
    }
}
