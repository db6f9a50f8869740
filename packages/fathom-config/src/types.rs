use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub routing: Routing,
	pub cache: Cache,
	pub retry: Retry,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub warehouse: Warehouse,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Warehouse {
	pub dsn: String,
	/// Row-bounding dialect of the target store: "legacy-rownum" or "fetch-first".
	pub dialect: String,
	pub pool_min_conns: u32,
	pub pool_max_conns: u32,
	pub acquire_timeout_ms: u64,
	pub fetch_max_rows: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
	pub min_similarity: f32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub sqlgen: LlmProviderConfig,
	pub answerer: LlmProviderConfig,
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Routing {
	/// Row bound enforced on generated statements without a native one.
	pub row_limit: u32,
	/// Most recent conversation turns forwarded to the generator.
	pub max_history_turns: usize,
	/// Candidate count requested from the vector store on fallback.
	pub fallback_max_results: usize,
	/// Top hits handed to the answer composer as context.
	pub context_chunks: usize,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
	pub ttl_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Security {
	/// Base64 AES-256 key for knowledge-base chunks stored encrypted at
	/// rest. Absent when the collection holds plaintext only.
	pub content_key_base64: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Retry {
	pub max_attempts: u32,
	pub base_delay_ms: u64,
	pub backoff_factor: f64,
	pub max_delay_ms: u64,
}
