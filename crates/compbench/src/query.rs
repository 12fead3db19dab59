//! Query specs and predicate evaluation.
//!
//! The nine queries are fixed shapes over the synthetic customer documents.
//! A [`Predicate`] renders to a MongoDB filter document for the server and
//! can also be evaluated locally, which the in-memory store relies on.

use std::cmp::Ordering;

use mongodb::bson::{doc, Bson, Document};

/// Pattern for text matching, rendered as an anchored regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPattern {
    /// Value ends with the literal (`literal$`).
    Suffix(String),
    /// Value contains the literal anywhere (unanchored).
    Contains(String),
}

impl TextPattern {
    /// Regex form of the pattern, with the literal escaped.
    pub fn to_regex(&self) -> String {
        match self {
            TextPattern::Suffix(lit) => format!("{}$", escape_regex(lit)),
            TextPattern::Contains(lit) => escape_regex(lit),
        }
    }

    /// Check a string against the pattern.
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            TextPattern::Suffix(lit) => value.ends_with(lit.as_str()),
            TextPattern::Contains(lit) => value.contains(lit.as_str()),
        }
    }
}

/// A filter predicate over customer documents.
///
/// Field names use dotted paths for nested documents (`Address.City`).
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Numeric field greater than value.
    Gt { field: String, value: i64 },
    /// Numeric field greater than or equal to value.
    Gte { field: String, value: i64 },
    /// String field equals value.
    Eq { field: String, value: String },
    /// String field matches a text pattern.
    Matches { field: String, pattern: TextPattern },
    /// All predicates must hold.
    And(Vec<Predicate>),
}

impl Predicate {
    /// Create a greater-than predicate.
    pub fn gt(field: impl Into<String>, value: i64) -> Self {
        Predicate::Gt {
            field: field.into(),
            value,
        }
    }

    /// Create a greater-than-or-equal predicate.
    pub fn gte(field: impl Into<String>, value: i64) -> Self {
        Predicate::Gte {
            field: field.into(),
            value,
        }
    }

    /// Create a string equality predicate.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a pattern-match predicate.
    pub fn matches(field: impl Into<String>, pattern: TextPattern) -> Self {
        Predicate::Matches {
            field: field.into(),
            pattern,
        }
    }

    /// Create a conjunction.
    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    /// Render as a MongoDB filter document.
    pub fn to_filter(&self) -> Document {
        match self {
            Predicate::Gt { field, value } => doc! { field.as_str(): { "$gt": *value } },
            Predicate::Gte { field, value } => doc! { field.as_str(): { "$gte": *value } },
            Predicate::Eq { field, value } => doc! { field.as_str(): value.as_str() },
            Predicate::Matches { field, pattern } => {
                doc! { field.as_str(): { "$regex": pattern.to_regex() } }
            }
            Predicate::And(predicates) => {
                let clauses: Vec<Bson> = predicates
                    .iter()
                    .map(|p| Bson::Document(p.to_filter()))
                    .collect();
                doc! { "$and": clauses }
            }
        }
    }

    /// Evaluate against a document.
    ///
    /// Missing fields and type mismatches never match.
    pub fn matches_document(&self, doc: &Document) -> bool {
        match self {
            Predicate::Gt { field, value } => lookup(doc, field)
                .and_then(|v| compare_number(v, *value))
                .map(Ordering::is_gt)
                .unwrap_or(false),
            Predicate::Gte { field, value } => lookup(doc, field)
                .and_then(|v| compare_number(v, *value))
                .map(Ordering::is_ge)
                .unwrap_or(false),
            Predicate::Eq { field, value } => {
                matches!(lookup(doc, field), Some(Bson::String(s)) if s == value)
            }
            Predicate::Matches { field, pattern } => match lookup(doc, field) {
                Some(Bson::String(s)) => pattern.is_match(s),
                _ => false,
            },
            Predicate::And(predicates) => predicates.iter().all(|p| p.matches_document(doc)),
        }
    }
}

/// A numbered query in the benchmark suite.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Query number, 1 through 9.
    pub id: u8,
    /// Human-readable form of the predicate.
    pub description: &'static str,
    /// The filter.
    pub predicate: Predicate,
}

/// The nine benchmark queries, in execution order.
pub fn query_suite() -> Vec<QuerySpec> {
    vec![
        QuerySpec {
            id: 1,
            description: "OrderCount > 5000",
            predicate: Predicate::gt("OrderCount", 5000),
        },
        QuerySpec {
            id: 2,
            description: "Address.Country == \"Country 5000\"",
            predicate: Predicate::eq("Address.Country", "Country 5000"),
        },
        QuerySpec {
            id: 3,
            description: "TotalSpent > 500000",
            predicate: Predicate::gt("TotalSpent", 500_000),
        },
        QuerySpec {
            id: 4,
            description: "Address.City ~ /00$/ AND TotalSpent > 20000",
            predicate: Predicate::and(vec![
                Predicate::matches("Address.City", TextPattern::Suffix("00".into())),
                Predicate::gt("TotalSpent", 20_000),
            ]),
        },
        QuerySpec {
            id: 5,
            description: "OrderCount > 7000",
            predicate: Predicate::gt("OrderCount", 7000),
        },
        QuerySpec {
            id: 6,
            description: "Address.City == \"City 5000\"",
            predicate: Predicate::eq("Address.City", "City 5000"),
        },
        QuerySpec {
            id: 7,
            description: "TotalSpent > 80000",
            predicate: Predicate::gt("TotalSpent", 80_000),
        },
        QuerySpec {
            id: 8,
            description: "Name ~ /Customer/",
            predicate: Predicate::matches("Name", TextPattern::Contains("Customer".into())),
        },
        QuerySpec {
            id: 9,
            description: "Address.Street == \"Street 5000\"",
            predicate: Predicate::eq("Address.Street", "Street 5000"),
        },
    ]
}

/// Predicate matching every generated document.
pub fn clear_predicate() -> Predicate {
    Predicate::gte("OrderCount", 0)
}

/// Resolve a dotted path through nested documents.
fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        match current {
            Bson::Document(inner) => current = inner.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}

fn compare_number(value: &Bson, rhs: i64) -> Option<Ordering> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v).cmp(&rhs)),
        Bson::Int64(v) => Some(v.cmp(&rhs)),
        Bson::Double(v) => v.partial_cmp(&(rhs as f64)),
        _ => None,
    }
}

fn escape_regex(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for ch in literal.chars() {
        if matches!(
            ch,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
