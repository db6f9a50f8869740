use serde_json::{Map, Value};
use sqlx::{Column, PgPool, Row, postgres::PgRow};
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::{Result, models::ExecutionResult};

/// Runs a validated read-only statement and maps the rows to JSON objects.
/// At most `max_rows` rows are kept; the row bound applied at validation
/// keeps the statement itself small, this is the hard backstop.
pub async fn run_query(pool: &PgPool, sql: &str, max_rows: usize) -> Result<ExecutionResult> {
	let fetched: Vec<PgRow> = sqlx::query(sql).fetch_all(pool).await?;
	let truncated = fetched.len() > max_rows;
	let columns = fetched
		.first()
		.map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
		.unwrap_or_default();
	let rows = fetched.iter().take(max_rows).map(row_to_json).collect();

	Ok(ExecutionResult { columns, rows, truncated })
}

fn row_to_json(row: &PgRow) -> Map<String, Value> {
	let mut out = Map::new();

	for (index, column) in row.columns().iter().enumerate() {
		out.insert(column.name().to_string(), column_value(row, index));
	}

	out
}

// Decode attempts run from the most common warehouse types down; anything
// undecodable surfaces as null rather than failing the whole row.
fn column_value(row: &PgRow, index: usize) -> Value {
	if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
		return v.map(Value::from).unwrap_or(Value::Null);
	}
	if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
		return v.map(Value::from).unwrap_or(Value::Null);
	}
	if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
		return v
			.and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
			.unwrap_or(Value::Null);
	}
	if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
		return v.map(Value::from).unwrap_or(Value::Null);
	}
	if let Ok(v) = row.try_get::<Option<String>, _>(index) {
		return v.map(Value::from).unwrap_or(Value::Null);
	}
	if let Ok(v) = row.try_get::<Option<OffsetDateTime>, _>(index) {
		return v
			.and_then(|ts| ts.format(&Rfc3339).ok())
			.map(Value::from)
			.unwrap_or(Value::Null);
	}
	if let Ok(v) = row.try_get::<Option<Date>, _>(index) {
		return v.map(|d| Value::from(d.to_string())).unwrap_or(Value::Null);
	}
	if let Ok(v) = row.try_get::<Option<Uuid>, _>(index) {
		return v.map(|u| Value::from(u.to_string())).unwrap_or(Value::Null);
	}
	if let Ok(v) = row.try_get::<Option<Value>, _>(index) {
		return v.unwrap_or(Value::Null);
	}

	Value::Null
}
