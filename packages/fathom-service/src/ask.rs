use std::time::Instant;

use fathom_domain::{
	clearance::{self, CallerContext},
	sensitivity::{Classification, Sensitivity},
};
use fathom_providers::HistoryTurn;
use fathom_storage::audit::{AccessRecord, DenialRecord};

use crate::{FathomService, Result, cache::ResponseCache, fallback, primary};

pub const OUT_OF_SCOPE_ANSWER: &str = "I can only answer questions about sales, accounts \
	payable, accounts receivable, or topics covered by the company knowledge base.";
pub const NO_RESULTS_ANSWER: &str =
	"I could not find information to answer that question. Try rephrasing it.";
pub const INTERNAL_ERROR_ANSWER: &str =
	"Sorry, something went wrong while answering your question. The team has been notified.";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AskRequest {
	pub question: String,
	#[serde(default)]
	pub history: Vec<Turn>,
	pub caller: Option<CallerContext>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Turn {
	pub user: String,
	pub bot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
	Sql,
	Vector,
	Denied,
	OutOfScope,
	Error,
}
impl Route {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Sql => "sql",
			Self::Vector => "vector",
			Self::Denied => "denied",
			Self::OutOfScope => "out_of_scope",
			Self::Error => "error",
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RouteResponse {
	pub success: bool,
	pub answer: String,
	pub confidence: f32,
	pub route: Route,
	pub sensitivity: Sensitivity,
	/// What the answer was built from: chunk ids on the knowledge route, the
	/// executed statement on the warehouse route.
	#[serde(default)]
	pub sources: Vec<String>,
	pub processing_ms: u64,
	pub requires_human_review: bool,
}

pub(crate) struct Routed {
	pub(crate) response: RouteResponse,
	pub(crate) tokens_used: Option<u64>,
	pub(crate) row_count: Option<i32>,
}

impl FathomService {
	/// Answers one business question. Never returns an error: every internal
	/// failure is converted into a generic apology response here.
	pub async fn ask(&self, req: AskRequest) -> RouteResponse {
		let started = Instant::now();
		let question = req.question.trim().to_string();
		let key = ResponseCache::key(&question, req.caller.as_ref());

		if let Some(hit) = self.cache.get(&key) {
			self.metrics.cache_hit();
			tracing::debug!(route = hit.route.as_str(), "Answering from cache.");

			return hit;
		}

		let classification = self.classifier.classify(&question);

		match self.route(&question, &req, &classification).await {
			Ok(mut routed) => {
				routed.response.processing_ms = started.elapsed().as_millis() as u64;

				if matches!(routed.response.route, Route::Sql | Route::Vector) {
					self.cache.put(key, routed.response.clone());
				}
				if routed.response.route != Route::Denied {
					self.record_access(&req, &classification, &routed).await;
				}

				self.metrics.observe(
					routed.response.route,
					classification.tier,
					routed.response.success,
					routed.response.processing_ms,
					routed.tokens_used,
				);

				routed.response
			},
			Err(err) => {
				tracing::error!(error = %err, "Question processing failed.");
				self.metrics.record_error("internal");

				let response = RouteResponse {
					success: false,
					answer: INTERNAL_ERROR_ANSWER.to_string(),
					confidence: 0.0,
					route: Route::Error,
					sensitivity: classification.tier,
					sources: Vec::new(),
					processing_ms: started.elapsed().as_millis() as u64,
					requires_human_review: true,
				};

				self.metrics.observe(
					Route::Error,
					classification.tier,
					false,
					response.processing_ms,
					None,
				);

				response
			},
		}
	}

	async fn route(
		&self,
		question: &str,
		req: &AskRequest,
		classification: &Classification,
	) -> Result<Routed> {
		let caller = req.caller.as_ref();

		// Authorization strictly precedes generation: a denied caller must
		// not be able to trigger a generator call as a side channel.
		if !clearance::authorize(classification.tier, caller) {
			tracing::info!(
				tier = classification.tier.as_str(),
				caller = caller.map(|c| c.id.as_str()).unwrap_or("-"),
				"Question denied by permission gate."
			);

			let record = DenialRecord {
				caller_id: caller.map(|c| c.id.clone()),
				question: question.to_string(),
				required: classification.tier.as_str().to_string(),
				clearance: caller.map(|c| c.clearance.clone()),
			};

			if let Err(err) = self.backends.audit.denial(record).await {
				tracing::warn!(error = %err, "Denial audit write failed.");
			}

			return Ok(Routed {
				response: RouteResponse {
					success: false,
					answer: clearance::denial_message(classification.tier).to_string(),
					confidence: classification.confidence,
					route: Route::Denied,
					sensitivity: classification.tier,
					sources: Vec::new(),
					processing_ms: 0,
					requires_human_review: false,
				},
				tokens_used: None,
				row_count: None,
			});
		}

		let history = self.bounded_history(&req.history);

		match self.answer_from_warehouse(question, &history, classification).await {
			primary::Outcome::Answered { response, row_count } => Ok(Routed {
				response,
				tokens_used: None,
				row_count: Some(row_count),
			}),
			primary::Outcome::OutOfScope => Ok(Routed {
				response: RouteResponse {
					success: false,
					answer: OUT_OF_SCOPE_ANSWER.to_string(),
					confidence: classification.confidence,
					route: Route::OutOfScope,
					sensitivity: classification.tier,
					sources: Vec::new(),
					processing_ms: 0,
					requires_human_review: false,
				},
				tokens_used: None,
				row_count: None,
			}),
			primary::Outcome::Fallback => {
				let fallback::Answered { response, tokens_used } =
					self.answer_from_knowledge(question, classification).await;

				Ok(Routed { response, tokens_used, row_count: None })
			},
		}
	}

	fn bounded_history(&self, turns: &[Turn]) -> Vec<HistoryTurn> {
		let keep = self.cfg.routing.max_history_turns;
		let skip = turns.len().saturating_sub(keep);

		turns
			.iter()
			.skip(skip)
			.map(|turn| HistoryTurn { user: turn.user.clone(), bot: turn.bot.clone() })
			.collect()
	}

	async fn record_access(
		&self,
		req: &AskRequest,
		classification: &Classification,
		routed: &Routed,
	) {
		let record = AccessRecord {
			caller_id: req.caller.as_ref().map(|c| c.id.clone()),
			question: bounded_question(req.question.trim()),
			route: routed.response.route.as_str().to_string(),
			sensitivity: classification.tier.as_str().to_string(),
			confidence: routed.response.confidence,
			success: routed.response.success,
			row_count: routed.row_count,
			tokens_used: routed.tokens_used.map(|t| t as i64),
			duration_ms: routed.response.processing_ms as i64,
			sources: routed.response.sources.clone(),
		};

		if let Err(err) = self.backends.audit.access(record).await {
			tracing::warn!(error = %err, "Access audit write failed.");
		}
	}
}

/// Stored question text is capped so an oversized input cannot bloat the log.
const QUESTION_AUDIT_MAX_CHARS: usize = 1_000;

fn bounded_question(question: &str) -> String {
	question.chars().take(QUESTION_AUDIT_MAX_CHARS).collect()
}
