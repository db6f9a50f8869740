use std::{
	collections::BTreeMap,
	sync::{
		Mutex, PoisonError,
		atomic::{AtomicU64, Ordering},
	},
};

use fathom_domain::sensitivity::Sensitivity;

use crate::Route;

/// Process-local counters, exposed through [`Metrics::snapshot`].
#[derive(Default)]
pub struct Metrics {
	total: AtomicU64,
	cache_hits: AtomicU64,
	success: AtomicU64,
	failed: AtomicU64,
	total_duration_ms: AtomicU64,
	tokens_used: AtomicU64,
	routes: Mutex<BTreeMap<String, u64>>,
	tiers: Mutex<BTreeMap<String, u64>>,
	errors: Mutex<BTreeMap<String, u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
	pub total_requests: u64,
	pub cache_hits: u64,
	pub queries_success: u64,
	pub queries_failed: u64,
	pub total_duration_ms: u64,
	pub tokens_used: u64,
	pub routes: BTreeMap<String, u64>,
	pub tiers: BTreeMap<String, u64>,
	pub errors: BTreeMap<String, u64>,
}

impl Metrics {
	pub fn cache_hit(&self) {
		self.total.fetch_add(1, Ordering::Relaxed);
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub fn observe(
		&self,
		route: Route,
		tier: Sensitivity,
		success: bool,
		duration_ms: u64,
		tokens_used: Option<u64>,
	) {
		self.total.fetch_add(1, Ordering::Relaxed);
		self.total_duration_ms.fetch_add(duration_ms, Ordering::Relaxed);

		if success {
			self.success.fetch_add(1, Ordering::Relaxed);
		} else {
			self.failed.fetch_add(1, Ordering::Relaxed);
		}
		if let Some(tokens) = tokens_used {
			self.tokens_used.fetch_add(tokens, Ordering::Relaxed);
		}

		bump(&self.routes, route.as_str());
		bump(&self.tiers, tier.as_str());
	}

	/// Counts a recovered internal failure by class, independent of how the
	/// request itself ends up being answered.
	pub fn record_error(&self, class: &str) {
		bump(&self.errors, class);
	}

	pub fn snapshot(&self) -> MetricsSnapshot {
		MetricsSnapshot {
			total_requests: self.total.load(Ordering::Relaxed),
			cache_hits: self.cache_hits.load(Ordering::Relaxed),
			queries_success: self.success.load(Ordering::Relaxed),
			queries_failed: self.failed.load(Ordering::Relaxed),
			total_duration_ms: self.total_duration_ms.load(Ordering::Relaxed),
			tokens_used: self.tokens_used.load(Ordering::Relaxed),
			routes: self.routes.lock().unwrap_or_else(PoisonError::into_inner).clone(),
			tiers: self.tiers.lock().unwrap_or_else(PoisonError::into_inner).clone(),
			errors: self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone(),
		}
	}
}

fn bump(map: &Mutex<BTreeMap<String, u64>>, key: &str) {
	let mut map = map.lock().unwrap_or_else(PoisonError::into_inner);

	*map.entry(key.to_string()).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_by_route() {
		let metrics = Metrics::default();

		metrics.observe(Route::Sql, Sensitivity::Low, true, 120, Some(40));
		metrics.observe(Route::Sql, Sensitivity::Medium, true, 80, None);
		metrics.observe(Route::Denied, Sensitivity::High, false, 2, None);
		metrics.cache_hit();
		metrics.record_error("execution_failed");
		metrics.record_error("execution_failed");

		let snapshot = metrics.snapshot();

		assert_eq!(snapshot.total_requests, 4);
		assert_eq!(snapshot.cache_hits, 1);
		assert_eq!(snapshot.queries_success, 2);
		assert_eq!(snapshot.queries_failed, 1);
		assert_eq!(snapshot.total_duration_ms, 202);
		assert_eq!(snapshot.tokens_used, 40);
		assert_eq!(snapshot.routes.get("sql"), Some(&2));
		assert_eq!(snapshot.routes.get("denied"), Some(&1));
		assert_eq!(snapshot.tiers.get("low"), Some(&1));
		assert_eq!(snapshot.tiers.get("high"), Some(&1));
		assert_eq!(snapshot.errors.get("execution_failed"), Some(&2));
	}
}
