pub mod ask;
pub mod backends;
pub mod cache;
pub mod fallback;
pub mod metrics;
pub mod primary;
pub mod retry;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use ask::{AskRequest, Route, RouteResponse, Turn};
pub use error::{Error, Result};

use fathom_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use fathom_domain::{catalog::Catalog, cipher::CipherError, sensitivity::Classifier};
use fathom_providers::{
	HistoryTurn,
	answer::{self, Answer},
	embedding,
	sqlgen::{self, SqlOutcome},
};
use fathom_storage::{
	audit::{AccessRecord, DenialRecord},
	models::{ChunkHit, ExecutionResult},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SqlGenerator
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		catalog_text: &'a str,
		history: &'a [HistoryTurn],
		question: &'a str,
	) -> BoxFuture<'a, Result<SqlOutcome>>;
}

pub trait AnswerComposer
where
	Self: Send + Sync,
{
	fn compose<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		passages: &'a [String],
	) -> BoxFuture<'a, Result<Answer>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

pub trait QueryExecutor
where
	Self: Send + Sync,
{
	fn run<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, fathom_storage::Result<ExecutionResult>>;
}

pub trait VectorSearcher
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		limit: u64,
		min_similarity: f32,
	) -> BoxFuture<'a, fathom_storage::Result<Vec<ChunkHit>>>;
}

pub trait AuditSink
where
	Self: Send + Sync,
{
	fn access<'a>(&'a self, record: AccessRecord) -> BoxFuture<'a, fathom_storage::Result<()>>;
	fn denial<'a>(&'a self, record: DenialRecord) -> BoxFuture<'a, fathom_storage::Result<()>>;
}

pub trait ContentDecryptor
where
	Self: Send + Sync,
{
	fn decrypt(&self, payload: &[u8]) -> Result<String, CipherError>;
}

#[derive(Clone)]
pub struct Providers {
	pub sqlgen: Arc<dyn SqlGenerator>,
	pub answerer: Arc<dyn AnswerComposer>,
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(
		sqlgen: Arc<dyn SqlGenerator>,
		answerer: Arc<dyn AnswerComposer>,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		Self { sqlgen, answerer, embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { sqlgen: provider.clone(), answerer: provider.clone(), embedding: provider }
	}
}

#[derive(Clone)]
pub struct Backends {
	pub executor: Arc<dyn QueryExecutor>,
	pub vectors: Arc<dyn VectorSearcher>,
	pub audit: Arc<dyn AuditSink>,
	pub decryptor: Arc<dyn ContentDecryptor>,
}

pub struct FathomService {
	pub cfg: Config,
	pub providers: Providers,
	pub backends: Backends,
	pub metrics: metrics::Metrics,
	pub(crate) catalog: Catalog,
	pub(crate) classifier: Classifier,
	pub(crate) cache: cache::ResponseCache,
}
impl FathomService {
	pub fn new(cfg: Config, backends: Backends) -> Self {
		Self::with_providers(cfg, backends, Providers::default())
	}

	pub fn with_providers(cfg: Config, backends: Backends, providers: Providers) -> Self {
		let cache = cache::ResponseCache::new(cfg.cache.ttl_secs);

		Self {
			cfg,
			providers,
			backends,
			metrics: metrics::Metrics::default(),
			catalog: Catalog::standard(),
			classifier: Classifier::new(),
			cache,
		}
	}
}

struct DefaultProviders;

impl SqlGenerator for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		catalog_text: &'a str,
		history: &'a [HistoryTurn],
		question: &'a str,
	) -> BoxFuture<'a, Result<SqlOutcome>> {
		Box::pin(async move {
			sqlgen::generate(cfg, catalog_text, history, question).await.map_err(Into::into)
		})
	}
}

impl AnswerComposer for DefaultProviders {
	fn compose<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		passages: &'a [String],
	) -> BoxFuture<'a, Result<Answer>> {
		Box::pin(async move { answer::compose(cfg, question, passages).await.map_err(Into::into) })
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { embedding::embed(cfg, text).await.map_err(Into::into) })
	}
}
