//! Payload schema for Qdrant points

use qdrant_client::qdrant::{PointStruct, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A post vector ready to be upserted; the point id is the post id
#[derive(Debug, Clone)]
pub struct PostPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: PostPayload,
}

impl PostPoint {
    /// Convert to qdrant-client PointStruct
    pub fn into_point_struct(self) -> PointStruct {
        let payload_map = self.payload.to_qdrant_payload();
        PointStruct::new(self.id, self.vector, payload_map)
    }
}

/// Payload stored with each post vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPayload {
    pub post_id: String,
    pub title: String,
    pub channel: String,
    /// Watch date as stored on the post, or `None`
    pub date: String,
}

impl PostPayload {
    pub fn to_qdrant_payload(&self) -> HashMap<String, QdrantValue> {
        let mut map = HashMap::new();
        map.insert("post_id".to_string(), string_to_qdrant(&self.post_id));
        map.insert("title".to_string(), string_to_qdrant(&self.title));
        map.insert("channel".to_string(), string_to_qdrant(&self.channel));
        map.insert("date".to_string(), string_to_qdrant(&self.date));
        map
    }

    /// Rebuild from a search payload; `None` when required fields are missing
    pub fn from_map(map: Map<String, Value>) -> Option<Self> {
        serde_json::from_value(Value::Object(map)).ok()
    }
}

fn string_to_qdrant(s: &str) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::StringValue(s.to_string())),
    }
}
