use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, HistoryTurn, Result};

/// Sentinel the model is instructed to emit when the catalog cannot answer.
const OUT_OF_SCOPE_TOKEN: &str = "OUT_OF_SCOPE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlOutcome {
	Sql(String),
	OutOfScope,
}

pub async fn generate(
	cfg: &fathom_config::LlmProviderConfig,
	catalog_text: &str,
	history: &[HistoryTurn],
	question: &str,
) -> Result<SqlOutcome> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": build_messages(catalog_text, history, question),
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let content = crate::chat_content(&json)
		.ok_or_else(|| Error::invalid_response("Generator response is missing content."))?;

	Ok(extract_sql(content))
}

fn build_messages(catalog_text: &str, history: &[HistoryTurn], question: &str) -> Vec<Value> {
	let system = format!(
		"You translate business questions into a single read-only SQL SELECT statement.\n\
		Rules:\n\
		- Use only the views and columns listed below.\n\
		- Never write data. No INSERT, UPDATE, DELETE, DDL or PL/SQL blocks.\n\
		- One statement, no trailing semicolon, no comments.\n\
		- Use TRUNC() when comparing DATE columns.\n\
		- Filter text columns with UPPER(column) LIKE an uppercase pattern.\n\
		- Answer with the SQL only, inside a ```sql fenced block.\n\
		- If the question cannot be answered from these views, reply with \
		exactly {OUT_OF_SCOPE_TOKEN} and nothing else.\n\n\
		Available views:\n{catalog_text}"
	);
	let mut messages = vec![serde_json::json!({ "role": "system", "content": system })];

	for turn in history {
		messages.push(serde_json::json!({ "role": "user", "content": turn.user }));
		messages.push(serde_json::json!({ "role": "assistant", "content": turn.bot }));
	}

	messages.push(serde_json::json!({ "role": "user", "content": question }));

	messages
}

fn extract_sql(content: &str) -> SqlOutcome {
	if content.to_uppercase().contains(OUT_OF_SCOPE_TOKEN) {
		return SqlOutcome::OutOfScope;
	}

	let trimmed = content.trim();
	let Some(start) = trimmed.find("```") else {
		return SqlOutcome::Sql(trimmed.to_string());
	};
	let after_fence = &trimmed[start + 3..];
	let body = after_fence.find("```").map(|end| &after_fence[..end]).unwrap_or(after_fence);
	let body = body.strip_prefix("sql").or_else(|| body.strip_prefix("SQL")).unwrap_or(body);

	SqlOutcome::Sql(body.trim().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_fenced_sql() {
		let content = "Here you go:\n```sql\nSELECT 1 FROM VW_SALES_FLAT\n```";
		assert_eq!(
			extract_sql(content),
			SqlOutcome::Sql("SELECT 1 FROM VW_SALES_FLAT".to_string())
		);
	}

	#[test]
	fn accepts_bare_sql_without_fences() {
		assert_eq!(
			extract_sql("  SELECT 1 FROM VW_SALES_FLAT  "),
			SqlOutcome::Sql("SELECT 1 FROM VW_SALES_FLAT".to_string())
		);
	}

	#[test]
	fn tolerates_missing_closing_fence() {
		assert_eq!(
			extract_sql("```sql\nSELECT 1 FROM VW_SALES_FLAT"),
			SqlOutcome::Sql("SELECT 1 FROM VW_SALES_FLAT".to_string())
		);
	}

	#[test]
	fn detects_out_of_scope_token() {
		assert_eq!(extract_sql("OUT_OF_SCOPE"), SqlOutcome::OutOfScope);
		assert_eq!(extract_sql("out_of_scope, sorry"), SqlOutcome::OutOfScope);
	}

	#[test]
	fn prompt_carries_catalog_and_history() {
		let history =
			vec![HistoryTurn { user: "sales today?".to_string(), bot: "R$ 10".to_string() }];
		let messages = build_messages("VIEW REPORTING.VW_SALES_FLAT", &history, "and yesterday?");

		assert_eq!(messages.len(), 4);
		assert!(messages[0]["content"].as_str().unwrap().contains("VW_SALES_FLAT"));
		assert!(messages[0]["content"].as_str().unwrap().contains("OUT_OF_SCOPE"));
		assert_eq!(messages[1]["content"], "sales today?");
		assert_eq!(messages[3]["content"], "and yesterday?");
	}
}
