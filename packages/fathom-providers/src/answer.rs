use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
	pub text: String,
	pub tokens_used: Option<u64>,
}

/// Composes a conversational answer from retrieved knowledge-base passages.
pub async fn compose(
	cfg: &fathom_config::LlmProviderConfig,
	question: &str,
	passages: &[String],
) -> Result<Answer> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": build_messages(question, passages),
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let content = crate::chat_content(&json)
		.ok_or_else(|| Error::invalid_response("Answer response is missing content."))?;

	Ok(Answer { text: content.trim().to_string(), tokens_used: crate::usage_tokens(&json) })
}

fn build_messages(question: &str, passages: &[String]) -> Vec<Value> {
	let mut context = String::new();

	for (i, passage) in passages.iter().enumerate() {
		context.push_str(&format!("[{}] {passage}\n\n", i + 1));
	}

	let system = format!(
		"You answer business questions using only the reference passages below. \
		If the passages do not contain the answer, say you could not find it. \
		Keep the answer short and factual.\n\nReference passages:\n{context}"
	);

	vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": question }),
	]
}
