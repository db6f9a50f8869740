use serde_json::{Map, Value};

/// Row set produced by a warehouse query, columns in statement order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
	pub columns: Vec<String>,
	pub rows: Vec<Map<String, Value>>,
	pub truncated: bool,
}
impl ExecutionResult {
	pub fn row_count(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}
}

/// A knowledge-base chunk returned by vector search.
#[derive(Debug, Clone)]
pub struct ChunkHit {
	pub chunk_id: String,
	pub content: String,
	/// AES-GCM payload when the chunk is stored encrypted at rest.
	pub encrypted: Option<Vec<u8>>,
	pub similarity: f32,
	pub sensitivity: Option<String>,
}
