use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use qdrant_client::qdrant::{Query, QueryPointsBuilder, Value, value::Kind};

use crate::{Result, models::ChunkHit};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &fathom_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub async fn search(
		&self,
		vector: Vec<f32>,
		limit: u64,
		min_similarity: f32,
	) -> Result<Vec<ChunkHit>> {
		if vector.len() != self.vector_dim as usize {
			return Err(crate::Error::InvalidArgument(format!(
				"query vector has {} dimensions, collection expects {}",
				vector.len(),
				self.vector_dim
			)));
		}

		let query = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.with_payload(true)
			.score_threshold(min_similarity)
			.limit(limit);
		let response = self.client.query(query).await?;
		let hits = response
			.result
			.into_iter()
			.map(|point| {
				let payload = &point.payload;

				ChunkHit {
					chunk_id: payload_str(payload, "chunk_id").unwrap_or_default(),
					content: payload_str(payload, "content").unwrap_or_default(),
					encrypted: payload_str(payload, "content_encrypted")
						.and_then(|raw| STANDARD.decode(raw).ok()),
					similarity: point.score,
					sensitivity: payload_str(payload, "sensitivity"),
				}
			})
			.collect();

		Ok(hits)
	}
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}
