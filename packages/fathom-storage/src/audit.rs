use uuid::Uuid;

use crate::Result;

#[derive(Debug, Clone)]
pub struct AccessRecord {
	pub caller_id: Option<String>,
	pub question: String,
	pub route: String,
	pub sensitivity: String,
	pub confidence: f32,
	pub success: bool,
	pub row_count: Option<i32>,
	pub tokens_used: Option<i64>,
	pub duration_ms: i64,
	/// Chunk ids or executed statement backing the answer.
	pub sources: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DenialRecord {
	pub caller_id: Option<String>,
	pub question: String,
	pub required: String,
	pub clearance: Option<String>,
}

pub async fn record_access(pool: &sqlx::PgPool, record: &AccessRecord) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO access_log
	(id, caller_id, question, route, sensitivity, confidence, success, row_count, tokens_used, duration_ms, sources)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
	)
	.bind(Uuid::new_v4())
	.bind(record.caller_id.as_deref())
	.bind(record.question.as_str())
	.bind(record.route.as_str())
	.bind(record.sensitivity.as_str())
	.bind(record.confidence)
	.bind(record.success)
	.bind(record.row_count)
	.bind(record.tokens_used)
	.bind(record.duration_ms)
	.bind(&record.sources)
	.execute(pool)
	.await?;

	Ok(())
}

pub async fn record_denial(pool: &sqlx::PgPool, record: &DenialRecord) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO denial_log (id, caller_id, question, required, clearance)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(Uuid::new_v4())
	.bind(record.caller_id.as_deref())
	.bind(record.question.as_str())
	.bind(record.required.as_str())
	.bind(record.clearance.as_deref())
	.execute(pool)
	.await?;

	Ok(())
}
