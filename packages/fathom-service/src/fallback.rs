//! Knowledge-base route: embed the question, search the vector store, and
//! compose an answer from the retrieved chunks. An unavailable embedder or
//! vector store exhausts the route; it never fails the request.

use fathom_domain::sensitivity::{Classification, Sensitivity};
use fathom_storage::models::ChunkHit;

use crate::{FathomService, Route, RouteResponse, ask};

/// Similarity-derived confidence is damped: retrieval closeness is weaker
/// evidence than an executed statement.
const SIMILARITY_DAMPING: f32 = 0.7;
const REVIEW_CONFIDENCE_FLOOR: f32 = 0.6;
const UNAVAILABLE_PLACEHOLDER: &str = "[content unavailable]";

pub(crate) struct Answered {
	pub(crate) response: RouteResponse,
	pub(crate) tokens_used: Option<u64>,
}

impl FathomService {
	pub(crate) async fn answer_from_knowledge(
		&self,
		question: &str,
		classification: &Classification,
	) -> Answered {
		let vector = match self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, question)
			.await
		{
			Ok(vector) => vector,
			Err(err) => {
				tracing::warn!(error = %err, "Embedding unavailable.");
				self.metrics.record_error("embedding_unavailable");

				return no_results(classification);
			},
		};
		let hits = match self
			.backends
			.vectors
			.search(
				vector,
				self.cfg.routing.fallback_max_results as u64,
				self.cfg.storage.qdrant.min_similarity,
			)
			.await
		{
			Ok(hits) => hits,
			Err(err) => {
				tracing::warn!(error = %err, "Vector search failed.");
				self.metrics.record_error("vector_search_failed");

				return no_results(classification);
			},
		};

		if hits.is_empty() {
			return no_results(classification);
		}

		let confidence = vector_confidence(&hits);
		let context: Vec<&ChunkHit> = hits.iter().take(self.cfg.routing.context_chunks).collect();
		let sources: Vec<String> = context.iter().map(|hit| hit.chunk_id.clone()).collect();
		let passages: Vec<String> = context.iter().map(|hit| self.resolve_content(hit)).collect();
		let (answer, tokens_used) = match self
			.providers
			.answerer
			.compose(&self.cfg.providers.answerer, question, &passages)
			.await
		{
			Ok(answer) => (answer.text, answer.tokens_used),
			Err(err) => {
				tracing::warn!(error = %err, "Answer composition unavailable, formatting chunks.");
				self.metrics.record_error("answer_composition_failed");

				(simple_format(&passages), None)
			},
		};

		Answered {
			response: RouteResponse {
				success: true,
				answer,
				confidence,
				route: Route::Vector,
				sensitivity: classification.tier,
				sources,
				processing_ms: 0,
				requires_human_review: confidence < REVIEW_CONFIDENCE_FLOOR
					|| classification.tier == Sensitivity::High,
			},
			tokens_used,
		}
	}

	/// Plaintext wins when present; encrypted payloads that cannot be opened
	/// degrade to a placeholder, never to an error.
	fn resolve_content(&self, hit: &ChunkHit) -> String {
		let Some(payload) = hit.encrypted.as_deref() else {
			return hit.content.clone();
		};

		match self.backends.decryptor.decrypt(payload) {
			Ok(text) => text,
			Err(err) => {
				tracing::warn!(error = %err, chunk_id = %hit.chunk_id, "Chunk decryption failed.");

				if hit.content.is_empty() {
					UNAVAILABLE_PLACEHOLDER.to_string()
				} else {
					hit.content.clone()
				}
			},
		}
	}
}

fn no_results(classification: &Classification) -> Answered {
	Answered {
		response: RouteResponse {
			success: true,
			answer: ask::NO_RESULTS_ANSWER.to_string(),
			confidence: 0.0,
			route: Route::Vector,
			sensitivity: classification.tier,
			sources: Vec::new(),
			processing_ms: 0,
			requires_human_review: false,
		},
		tokens_used: None,
	}
}

fn vector_confidence(hits: &[ChunkHit]) -> f32 {
	let top: Vec<f32> = hits.iter().take(3).map(|hit| hit.similarity).collect();

	if top.is_empty() {
		return 0.0;
	}

	let mean = top.iter().sum::<f32>() / top.len() as f32;

	(mean * SIMILARITY_DAMPING).clamp(0.0, 1.0)
}

fn simple_format(passages: &[String]) -> String {
	let mut out = String::from("Here is what I found:\n");

	for passage in passages {
		out.push_str(&format!("- {passage}\n"));
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(similarity: f32) -> ChunkHit {
		ChunkHit {
			chunk_id: "c-1".to_string(),
			content: "refunds take 30 days".to_string(),
			encrypted: None,
			similarity,
			sensitivity: None,
		}
	}

	#[test]
	fn confidence_is_damped_mean_of_top_three() {
		let hits = vec![hit(0.9), hit(0.8), hit(0.7), hit(0.1)];

		assert!((vector_confidence(&hits) - 0.8 * SIMILARITY_DAMPING).abs() < 1e-6);
	}

	#[test]
	fn confidence_of_no_hits_is_zero() {
		assert_eq!(vector_confidence(&[]), 0.0);
	}

	#[test]
	fn simple_format_lists_passages() {
		let text = simple_format(&["a".to_string(), "b".to_string()]);

		assert!(text.contains("- a\n"));
		assert!(text.contains("- b\n"));
	}
}
