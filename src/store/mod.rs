//! Qdrant vector database integration
//!
//! This module wraps the Qdrant client behind [`VectorIndex`] and provides:
//! - Collection management (ensure, reset)
//! - Batched point upserts
//! - Nearest-neighbor search over post vectors

mod payload;

pub use payload::*;

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, GetCollectionInfoResponse, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Points per upsert request
pub const UPSERT_BATCH_SIZE: usize = 100;

/// A nearest-neighbor match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub payload: PostPayload,
}

/// Collection statistics
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    pub collection: String,
    pub points_count: usize,
}

/// Vector index over post embeddings
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if it does not exist
    async fn ensure_ready(&self) -> Result<()>;

    /// Insert or replace points
    async fn upsert(&self, points: Vec<PostPoint>) -> Result<()>;

    /// Top `limit` matches by cosine similarity
    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>>;

    /// Drop every point and recreate the empty collection
    async fn clear(&self) -> Result<()>;

    /// Statistics, or `None` when the collection does not exist yet
    async fn stats(&self) -> Result<Option<CollectionStats>>;
}

/// Qdrant store handle
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantStore {
    /// Connect to Qdrant using config
    pub fn connect(config: &Config) -> Result<Self> {
        Self::new(
            &config.qdrant_url,
            &config.collection_name,
            config.embedding.resolved_dimension(),
            config.qdrant_api_key(),
        )
    }

    /// Create a new store handle directly with URL and collection name
    pub fn new(
        url: &str,
        collection: &str,
        dimension: usize,
        api_key: Option<String>,
    ) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);

        let mut builder = Qdrant::from_url(url).skip_compatibility_check();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder.build().map_err(|e| Error::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
        })
    }

    fn check_dimensions(&self, points: &[PostPoint]) -> Result<()> {
        if let Some(mismatch) = points.iter().find(|p| p.vector.len() != self.dimension) {
            return Err(Error::Qdrant(format!(
                "Vector dimension mismatch for collection '{}': expected {} (got {})",
                self.collection,
                self.dimension,
                mismatch.vector.len()
            )));
        }
        Ok(())
    }

    async fn collection_vector_size(&self) -> Result<Option<u64>> {
        let info = self.client.collection_info(&self.collection).await?;
        Ok(extract_vector_size(&info))
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn ensure_ready(&self) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            debug!("Collection {} already exists", self.collection);

            if let Some(size) = self.collection_vector_size().await? {
                if size as usize != self.dimension {
                    return Err(Error::Qdrant(format!(
                        "Collection '{}' has vector size {}, but the embedder produces {}. Upload the export again to rebuild it.",
                        self.collection, size, self.dimension
                    )));
                }
            }
            return Ok(());
        }

        info!(
            "Creating collection {} with dimension {}",
            self.collection, self.dimension
        );

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await?;

        Ok(())
    }

    async fn upsert(&self, points: Vec<PostPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        self.check_dimensions(&points)?;

        debug!(
            "Upserting {} points to collection {}",
            points.len(),
            self.collection
        );

        let mut remaining = points.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<PointStruct> = remaining
                .by_ref()
                .take(UPSERT_BATCH_SIZE)
                .map(PostPoint::into_point_struct)
                .collect();

            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, batch))
                .await?;
        }

        Ok(())
    }

    async fn search(&self, vector: Vec<f32>, limit: usize) -> Result<Vec<SearchHit>> {
        debug!(
            "Searching collection {} with limit {}",
            self.collection, limit
        );

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, limit as u64).with_payload(true),
            )
            .await?;

        let hits = response
            .result
            .into_iter()
            .filter_map(|p| {
                let id = point_id_to_string(p.id);
                let map: serde_json::Map<String, Value> = p
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, json_from_qdrant_value(v)))
                    .collect();

                match PostPayload::from_map(map) {
                    Some(payload) => Some(SearchHit {
                        id,
                        score: p.score,
                        payload,
                    }),
                    None => {
                        warn!("Skipping point {} with incomplete payload", id);
                        None
                    }
                }
            })
            .collect();

        Ok(hits)
    }

    async fn clear(&self) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            info!("Deleting existing collection {}", self.collection);
            self.client.delete_collection(&self.collection).await?;
        }
        self.ensure_ready().await
    }

    async fn stats(&self) -> Result<Option<CollectionStats>> {
        if !self.client.collection_exists(&self.collection).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(&self.collection).await?;
        let points_count = info
            .result
            .and_then(|r| r.points_count)
            .unwrap_or(0);

        Ok(Some(CollectionStats {
            collection: self.collection.clone(),
            points_count: points_count as usize,
        }))
    }
}

fn extract_vector_size(info: &GetCollectionInfoResponse) -> Option<u64> {
    let config = info
        .result
        .as_ref()?
        .config
        .as_ref()?
        .params
        .as_ref()?
        .vectors_config
        .as_ref()?
        .config
        .as_ref()?;

    match config {
        qdrant_client::qdrant::vectors_config::Config::Params(params) => Some(params.size),
        qdrant_client::qdrant::vectors_config::Config::ParamsMap(_) => None,
    }
}

/// Convert PointId to string
fn point_id_to_string(id: Option<PointId>) -> String {
    match id {
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid)),
        }) => uuid,
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(num)),
        }) => num.to_string(),
        _ => String::new(),
    }
}

/// Convert Qdrant value to serde_json Value
fn json_from_qdrant_value(v: qdrant_client::qdrant::Value) -> Value {
    use qdrant_client::qdrant::value::Kind;

    match v.kind {
        Some(Kind::NullValue(_)) | None => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(json_from_qdrant_value)
                .collect(),
        ),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_rejects_dimension_mismatch() {
        let store = QdrantStore::new("http://127.0.0.1:6334", "test_collection", 3, None)
            .expect("store should initialize");

        let point = PostPoint {
            id: uuid::Uuid::new_v4().to_string(),
            vector: vec![0.1, 0.2],
            payload: PostPayload {
                post_id: "p".to_string(),
                title: "t".to_string(),
                channel: "c".to_string(),
                date: "None".to_string(),
            },
        };

        let err = store
            .upsert(vec![point])
            .await
            .expect_err("should reject mismatched vector length");

        match err {
            Error::Qdrant(message) => assert!(message.contains("Vector dimension mismatch")),
            other => panic!("expected qdrant error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_upsert_is_noop() {
        let store = QdrantStore::new("http://127.0.0.1:6334", "test_collection", 3, None).unwrap();
        store.upsert(Vec::new()).await.unwrap();
    }

    #[test]
    fn test_point_id_to_string() {
        assert_eq!(point_id_to_string(Some(PointId::from(7u64))), "7");
        assert_eq!(point_id_to_string(None), "");
    }

    #[test]
    fn test_json_from_qdrant_value() {
        let value = qdrant_client::qdrant::Value::from("hello");
        assert_eq!(json_from_qdrant_value(value), Value::String("hello".into()));
    }
}
