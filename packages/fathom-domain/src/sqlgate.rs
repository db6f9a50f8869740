//! Static safety analysis of generated SQL. Nothing executes a generated
//! statement without passing through [`validate`] first; the returned
//! [`ValidatedQuery`] is the only way to obtain executable text.

use std::fmt;

use regex::Regex;

use crate::{
	catalog::Catalog,
	dialect::{DialectPolicy, StatementShape},
};

/// A single read-only statement, allow-listed and row-bounded. Constructible
/// only by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
	sql: String,
}
impl ValidatedQuery {
	pub fn as_sql(&self) -> &str {
		&self.sql
	}

	pub fn into_sql(self) -> String {
		self.sql
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
	Empty,
	MultipleStatements,
	NotReadOnly,
	ForbiddenKeyword(String),
	SelectInto,
	DatabaseLink,
	ObjectNotAllowed(String),
}
impl fmt::Display for Rejection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => write!(f, "Statement is empty."),
			Self::MultipleStatements => write!(f, "Multiple statements are not allowed."),
			Self::NotReadOnly => write!(f, "Only a single SELECT statement is allowed."),
			Self::ForbiddenKeyword(kw) => write!(f, "Forbidden keyword: {kw}."),
			Self::SelectInto => write!(f, "SELECT INTO is not allowed."),
			Self::DatabaseLink => write!(f, "Database links are not allowed."),
			Self::ObjectNotAllowed(obj) => write!(f, "Object is not allow-listed: {obj}."),
		}
	}
}

const FORBIDDEN_KEYWORDS: &[&str] = &[
	"INSERT", "UPDATE", "DELETE", "MERGE", "DROP", "ALTER", "CREATE", "RENAME", "EXECUTE",
	"COMMIT", "ROLLBACK", "GRANT", "REVOKE", "TRUNCATE", "CALL", "SYNONYM", "PACKAGE",
	"PROCEDURE", "FUNCTION",
];

// Procedural builtin namespaces are prefixes, not whole words.
const FORBIDDEN_PREFIXES: &[&str] = &["DBMS_", "UTL_"];

const RESERVED_NON_OBJECTS: &[&str] = &["AS", "WHERE", "ORDER", "GROUP", "SELECT", "ON", SUBQUERY_MARKER];

// Stands in for a collapsed parenthetical so a derived-table alias is not
// read as the FROM target.
const SUBQUERY_MARKER: &str = "__SUBQUERY__";

pub fn validate(
	sql: &str,
	catalog: &Catalog,
	dialect: &dyn DialectPolicy,
	limit: u32,
) -> Result<ValidatedQuery, Rejection> {
	if sql.trim().is_empty() {
		return Err(Rejection::Empty);
	}

	let cleaned = strip_comments(sql);
	let cleaned = cleaned.trim().trim_end_matches(';').trim().to_string();

	if cleaned.is_empty() {
		return Err(Rejection::Empty);
	}

	// Keyword and delimiter scans run on a copy with string literals masked
	// out, so a value like 'DELETE NOTICE' never false-flags.
	let masked = mask_string_literals(&cleaned);
	let upper = masked.to_uppercase();

	if upper.contains(';') {
		return Err(Rejection::MultipleStatements);
	}
	if upper.split_whitespace().next() != Some("SELECT") {
		return Err(Rejection::NotReadOnly);
	}

	for keyword in FORBIDDEN_KEYWORDS {
		if word_match(&upper, keyword) {
			return Err(Rejection::ForbiddenKeyword((*keyword).to_string()));
		}
	}
	for prefix in FORBIDDEN_PREFIXES {
		if upper.contains(prefix) {
			return Err(Rejection::ForbiddenKeyword((*prefix).to_string()));
		}
	}

	// BEGIN..END is procedural; CASE..END is ordinary SQL.
	if word_match(&upper, "BEGIN") && !word_match(&upper, "CASE") {
		return Err(Rejection::ForbiddenKeyword("BEGIN".to_string()));
	}
	if matches_pattern(&upper, r"\bSELECT\b[\s\S]*\bINTO\b") {
		return Err(Rejection::SelectInto);
	}
	if upper.contains('@') {
		return Err(Rejection::DatabaseLink);
	}

	// Collapse parenthetical sub-expressions so only top-level FROM/JOIN
	// targets are checked; subquery internals were masked away with them.
	let collapsed = collapse_parens(&upper);

	for object in referenced_objects(&collapsed) {
		if RESERVED_NON_OBJECTS.contains(&object.as_str()) {
			continue;
		}
		if !catalog.is_allowed(&object) {
			return Err(Rejection::ObjectNotAllowed(object));
		}
	}

	let shape = statement_shape(&upper);

	Ok(ValidatedQuery { sql: dialect.apply_row_bound(&cleaned, shape, limit) })
}

fn statement_shape(upper: &str) -> StatementShape {
	let aggregated = ["SUM(", "COUNT(", "AVG(", "MAX(", "MIN("]
		.iter()
		.any(|f| upper.contains(f))
		|| upper.contains("GROUP BY");
	let bounded = upper.contains("ROWNUM")
		|| upper.contains("FETCH FIRST")
		|| matches_pattern(upper, r"\bLIMIT\s+\d");

	StatementShape { aggregated, ordered: upper.contains("ORDER BY"), bounded }
}

fn referenced_objects(collapsed: &str) -> Vec<String> {
	let Ok(re) = Regex::new(r"\b(?:FROM|JOIN)\s+([A-Z0-9_.$#]+)") else {
		return Vec::new();
	};

	re.captures_iter(collapsed).map(|caps| caps[1].trim_matches('.').to_string()).collect()
}

fn strip_comments(sql: &str) -> String {
	let no_line = replace_pattern(sql, r"--[^\n]*", "");

	replace_pattern(&no_line, r"(?s)/\*.*?\*/", "")
}

fn mask_string_literals(sql: &str) -> String {
	let mut out = String::with_capacity(sql.len());
	let mut chars = sql.chars().peekable();

	while let Some(c) = chars.next() {
		if c != '\'' {
			out.push(c);
			continue;
		}

		out.push('\'');

		// Consume until the closing quote; a doubled quote is an escape.
		while let Some(inner) = chars.next() {
			if inner == '\'' {
				if chars.peek() == Some(&'\'') {
					chars.next();
					continue;
				}

				break;
			}
		}

		out.push('\'');
	}

	out
}

fn collapse_parens(sql: &str) -> String {
	let mut current = sql.to_string();

	while current.contains('(') {
		let next = replace_pattern(&current, r"\([^()]*\)", &format!(" {SUBQUERY_MARKER} "));

		if next == current {
			break;
		}

		current = next;
	}

	current
}

fn word_match(haystack: &str, word: &str) -> bool {
	matches_pattern(haystack, &format!(r"\b{word}\b"))
}

fn matches_pattern(haystack: &str, pattern: &str) -> bool {
	Regex::new(pattern).map(|re| re.is_match(haystack)).unwrap_or(false)
}

fn replace_pattern(haystack: &str, pattern: &str, replacement: &str) -> String {
	Regex::new(pattern)
		.map(|re| re.replace_all(haystack, replacement).into_owned())
		.unwrap_or_else(|_| haystack.to_string())
}
