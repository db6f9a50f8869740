//! Production wiring of the service seams onto the warehouse pool, the
//! vector store and the audit tables.

use std::sync::Arc;

use fathom_config::Config;
use fathom_domain::cipher::{CipherError, ContentCipher};
use fathom_storage::{
	audit::{self, AccessRecord, DenialRecord},
	db::Db,
	execute,
	models::{ChunkHit, ExecutionResult},
	qdrant::QdrantStore,
};

use crate::{AuditSink, Backends, BoxFuture, ContentDecryptor, QueryExecutor, VectorSearcher};

pub struct WarehouseExecutor {
	pub db: Arc<Db>,
	pub fetch_max_rows: usize,
}
impl QueryExecutor for WarehouseExecutor {
	fn run<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, fathom_storage::Result<ExecutionResult>> {
		Box::pin(execute::run_query(&self.db.pool, sql, self.fetch_max_rows))
	}
}

pub struct QdrantSearcher {
	pub store: Arc<QdrantStore>,
}
impl VectorSearcher for QdrantSearcher {
	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		limit: u64,
		min_similarity: f32,
	) -> BoxFuture<'a, fathom_storage::Result<Vec<ChunkHit>>> {
		Box::pin(self.store.search(vector, limit, min_similarity))
	}
}

pub struct PgAuditSink {
	pub db: Arc<Db>,
}
impl AuditSink for PgAuditSink {
	fn access<'a>(&'a self, record: AccessRecord) -> BoxFuture<'a, fathom_storage::Result<()>> {
		Box::pin(async move { audit::record_access(&self.db.pool, &record).await })
	}

	fn denial<'a>(&'a self, record: DenialRecord) -> BoxFuture<'a, fathom_storage::Result<()>> {
		Box::pin(async move { audit::record_denial(&self.db.pool, &record).await })
	}
}

/// Decrypts chunk payloads when a content key is configured. Without a key
/// every encrypted payload reports a failure and the caller substitutes a
/// placeholder.
pub struct GcmDecryptor {
	cipher: Option<ContentCipher>,
}
impl GcmDecryptor {
	pub fn from_config(cfg: &Config) -> Result<Self, CipherError> {
		let cipher = cfg
			.security
			.content_key_base64
			.as_deref()
			.map(ContentCipher::from_base64_key)
			.transpose()?;

		Ok(Self { cipher })
	}
}
impl ContentDecryptor for GcmDecryptor {
	fn decrypt(&self, payload: &[u8]) -> Result<String, CipherError> {
		match &self.cipher {
			Some(cipher) => cipher.decrypt(payload),
			None => Err(CipherError::InvalidKey),
		}
	}
}

impl Backends {
	pub fn standard(cfg: &Config, db: Arc<Db>, store: Arc<QdrantStore>) -> Result<Self, CipherError> {
		Ok(Self {
			executor: Arc::new(WarehouseExecutor {
				db: db.clone(),
				fetch_max_rows: cfg.storage.warehouse.fetch_max_rows as usize,
			}),
			vectors: Arc::new(QdrantSearcher { store }),
			audit: Arc::new(PgAuditSink { db }),
			decryptor: Arc::new(GcmDecryptor::from_config(cfg)?),
		})
	}
}
