pub mod backend;
pub mod context;
pub mod desk;
pub mod diary;
pub mod engine;
pub mod library;
pub mod scoring;
pub mod similarity;
pub mod sqlite;
pub mod stats;
pub mod store;
pub mod types;

use anyhow::Result;

use crate::memory::types::Metadata;

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            embedding.len() * std::mem::size_of::<f32>(),
        )
    }
}

/// Inverse of [`embedding_to_bytes`].
pub fn bytes_to_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    anyhow::ensure!(
        bytes.len() % std::mem::size_of::<f32>() == 0,
        "embedding blob length {} is not a multiple of 4",
        bytes.len()
    );
    Ok(bytes
        .chunks_exact(std::mem::size_of::<f32>())
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Spread a source row's JSON metadata object over the fields already in `base`.
/// Keys from `extra` win. Non-object values are ignored.
pub(crate) fn merge_metadata(base: &mut Metadata, extra: Option<serde_json::Value>) {
    if let Some(serde_json::Value::Object(map)) = extra {
        base.extend(map);
    }
}

/// Parse an optional JSON text column, dropping values that fail to parse.
pub(crate) fn parse_json_column(raw: Option<String>) -> Option<serde_json::Value> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}
