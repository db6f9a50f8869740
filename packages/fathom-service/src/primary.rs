//! Warehouse route: generate a statement, gate it, execute it, and render a
//! tabular preview. Every failure mode degrades into `Outcome::Fallback`
//! instead of surfacing to the caller.

use fathom_domain::{dialect, sensitivity::{Classification, Sensitivity}, sqlgate};
use fathom_providers::{HistoryTurn, sqlgen::SqlOutcome};
use fathom_storage::models::ExecutionResult;

use crate::{FathomService, Route, RouteResponse, retry};

/// Fixed confidence for answers backed by an executed statement.
const SQL_ROUTE_CONFIDENCE: f32 = 0.85;
const PREVIEW_ROWS: usize = 5;

pub(crate) enum Outcome {
	Answered { response: RouteResponse, row_count: i32 },
	OutOfScope,
	Fallback,
}

impl FathomService {
	pub(crate) async fn answer_from_warehouse(
		&self,
		question: &str,
		history: &[HistoryTurn],
		classification: &Classification,
	) -> Outcome {
		let catalog_text = self.catalog.render_for_prompt();
		let outcome = match self
			.providers
			.sqlgen
			.generate(&self.cfg.providers.sqlgen, &catalog_text, history, question)
			.await
		{
			Ok(outcome) => outcome,
			Err(err) => {
				tracing::warn!(error = %err, "Statement generation unavailable.");
				self.metrics.record_error("generation_unavailable");

				return Outcome::Fallback;
			},
		};
		let sql = match outcome {
			SqlOutcome::Sql(sql) => sql,
			SqlOutcome::OutOfScope => return Outcome::OutOfScope,
		};
		let Some(policy) = dialect::policy_for(&self.cfg.storage.warehouse.dialect) else {
			tracing::error!(
				dialect = %self.cfg.storage.warehouse.dialect,
				"No row-bound policy for configured dialect."
			);

			return Outcome::Fallback;
		};
		let validated = match sqlgate::validate(
			&sql,
			&self.catalog,
			policy.as_ref(),
			self.cfg.routing.row_limit,
		) {
			Ok(validated) => validated,
			Err(rejection) => {
				tracing::warn!(%rejection, sql = %sql, "Generated statement rejected.");
				self.metrics.record_error("validation_rejected");

				return Outcome::Fallback;
			},
		};
		let result = match retry::with_retry(
			&self.cfg.retry,
			|err: &fathom_storage::Error| err.is_transient(),
			|| self.backends.executor.run(validated.as_sql()),
		)
		.await
		{
			Ok(result) => result,
			Err(err) => {
				tracing::warn!(error = %err, "Warehouse execution failed.");
				self.metrics.record_error("execution_failed");

				return Outcome::Fallback;
			},
		};

		if result.is_empty() {
			return Outcome::Fallback;
		}

		let row_count = result.row_count() as i32;
		let response = RouteResponse {
			success: true,
			answer: render_preview(&result),
			confidence: SQL_ROUTE_CONFIDENCE,
			route: Route::Sql,
			sensitivity: classification.tier,
			sources: vec![validated.into_sql()],
			processing_ms: 0,
			requires_human_review: classification.tier == Sensitivity::High,
		};

		Outcome::Answered { response, row_count }
	}
}

fn render_preview(result: &ExecutionResult) -> String {
	let mut out = String::new();

	out.push_str(&result.columns.join(" | "));
	out.push('\n');

	for row in result.rows.iter().take(PREVIEW_ROWS) {
		let line = result
			.columns
			.iter()
			.map(|name| render_value(row.get(name)))
			.collect::<Vec<_>>()
			.join(" | ");

		out.push_str(&line);
		out.push('\n');
	}

	let remaining = result.rows.len().saturating_sub(PREVIEW_ROWS);

	if remaining > 0 {
		out.push_str(&format!("... {remaining} more rows\n"));
	}
	if result.truncated {
		out.push_str("(result truncated)\n");
	}

	out
}

fn render_value(value: Option<&serde_json::Value>) -> String {
	match value {
		None | Some(serde_json::Value::Null) => "-".to_string(),
		Some(serde_json::Value::String(text)) => text.clone(),
		Some(other) => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn result(rows: usize) -> ExecutionResult {
		let rows = (0..rows)
			.map(|i| {
				let mut row = Map::new();

				row.insert("ORDER_NO".to_string(), serde_json::json!(i + 1));
				row.insert("NET_AMOUNT".to_string(), serde_json::json!(100.5));

				row
			})
			.collect();

		ExecutionResult {
			columns: vec!["ORDER_NO".to_string(), "NET_AMOUNT".to_string()],
			rows,
			truncated: false,
		}
	}

	#[test]
	fn preview_shows_header_and_rows() {
		let text = render_preview(&result(2));

		assert!(text.starts_with("ORDER_NO | NET_AMOUNT\n"));
		assert!(text.contains("1 | 100.5"));
		assert!(!text.contains("more rows"));
	}

	#[test]
	fn preview_elides_beyond_five_rows() {
		let text = render_preview(&result(9));

		assert!(text.contains("... 4 more rows"));
	}

	#[test]
	fn null_values_render_as_dash() {
		let mut row = Map::new();

		row.insert("ORDER_NO".to_string(), serde_json::Value::Null);

		let result = ExecutionResult {
			columns: vec!["ORDER_NO".to_string()],
			rows: vec![row],
			truncated: false,
		};

		assert!(render_preview(&result).contains("-"));
	}
}
