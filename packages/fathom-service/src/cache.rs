use std::{
	collections::HashMap,
	sync::{Mutex, PoisonError},
	time::{Duration, Instant},
};

use fathom_domain::clearance::CallerContext;

use crate::RouteResponse;

/// In-process response cache with lazy expiry. Keys bind the question to the
/// caller and their clearance, so a cached answer can never leak across
/// permission levels.
pub struct ResponseCache {
	ttl: Duration,
	entries: Mutex<HashMap<String, Entry>>,
}

struct Entry {
	stored_at: Instant,
	response: RouteResponse,
}

impl ResponseCache {
	pub fn new(ttl_secs: u64) -> Self {
		Self { ttl: Duration::from_secs(ttl_secs), entries: Mutex::new(HashMap::new()) }
	}

	pub fn key(question: &str, caller: Option<&CallerContext>) -> String {
		let caller_id = caller.map(|c| c.id.as_str()).unwrap_or("-");
		let clearance = caller.map(|c| c.clearance.as_str()).unwrap_or("-");

		blake3::hash(format!("{question}|{caller_id}|{clearance}").as_bytes())
			.to_hex()
			.to_string()
	}

	pub fn get(&self, key: &str) -> Option<RouteResponse> {
		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		let expired = entries.get(key).map(|e| e.stored_at.elapsed() > self.ttl).unwrap_or(false);

		if expired {
			entries.remove(key);

			return None;
		}

		entries.get(key).map(|e| e.response.clone())
	}

	pub fn put(&self, key: String, response: RouteResponse) {
		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

		entries.insert(key, Entry { stored_at: Instant::now(), response });
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Route;
	use fathom_domain::sensitivity::Sensitivity;

	fn response() -> RouteResponse {
		RouteResponse {
			success: true,
			answer: "42 orders".to_string(),
			confidence: 0.85,
			route: Route::Sql,
			sensitivity: Sensitivity::Low,
			sources: vec!["SELECT COUNT(*) FROM VW_SALES_FLAT".to_string()],
			processing_ms: 12,
			requires_human_review: false,
		}
	}

	fn caller(id: &str, clearance: &str) -> CallerContext {
		CallerContext {
			id: id.to_string(),
			display_name: None,
			clearance: clearance.to_string(),
			enabled: true,
			admin: false,
			department: None,
		}
	}

	#[test]
	fn returns_stored_response_before_ttl() {
		let cache = ResponseCache::new(3_600);
		let key = ResponseCache::key("total sales", None);

		cache.put(key.clone(), response());

		assert_eq!(cache.get(&key), Some(response()));
	}

	#[test]
	fn expires_after_ttl() {
		let cache = ResponseCache::new(0);
		let key = ResponseCache::key("total sales", None);

		cache.put(key.clone(), response());
		std::thread::sleep(Duration::from_millis(5));

		assert_eq!(cache.get(&key), None);
		assert!(cache.is_empty());
	}

	#[test]
	fn key_separates_callers_and_clearances() {
		let anonymous = ResponseCache::key("q", None);
		let low = ResponseCache::key("q", Some(&caller("u-1", "low")));
		let high = ResponseCache::key("q", Some(&caller("u-1", "high")));
		let other = ResponseCache::key("q", Some(&caller("u-2", "high")));

		assert_ne!(anonymous, low);
		assert_ne!(low, high);
		assert_ne!(high, other);
	}
}
