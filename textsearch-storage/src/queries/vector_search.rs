//! Brute-force cosine similarity scan over a storage's partition.

use rusqlite::{params, Connection};

use textsearch_core::{
    DocumentId, SearchHit, SearchOptions, StorageMeta, TextSearchError, TextSearchResult,
};

use super::partition_table;
use super::vector_blob::bytes_to_f32_vec;
use crate::to_persistence_err;

/// Nearest neighbors of `reference` among the storage's documents.
///
/// Computes cosine distance against every vector in the partition, filters
/// by `max_distance` when set, sorts ascending, truncates to `limit`. Rows
/// are scanned in ascending document id and the sort is stable, so ties
/// break by insertion order.
pub fn search(
    conn: &Connection,
    storage: &StorageMeta,
    reference: &[f32],
    options: &SearchOptions,
) -> TextSearchResult<Vec<SearchHit>> {
    if reference.len() != storage.vector_dimensions {
        return Err(TextSearchError::ConfigurationError {
            message: format!(
                "reference vector has {} dimensions, storage {} expects {}",
                reference.len(),
                storage.id,
                storage.vector_dimensions
            ),
        });
    }

    // A zero-norm reference has no direction; nothing is similar to it.
    let ref_norm_sq: f64 = reference.iter().map(|x| (*x as f64) * (*x as f64)).sum();
    if ref_norm_sq == 0.0 {
        return Ok(vec![]);
    }

    let table = partition_table(storage.id);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT d.id, e.vector
             FROM documents d
             JOIN {table} e ON e.id = d.embedding_id
             WHERE d.storage_id = ?1
             ORDER BY d.id"
        ))
        .map_err(|e| to_persistence_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![storage.id], |row| {
            let document_id: DocumentId = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            Ok((document_id, blob))
        })
        .map_err(|e| to_persistence_err(e.to_string()))?;

    let mut hits: Vec<SearchHit> = Vec::new();
    for row in rows {
        let (document_id, blob) = row.map_err(|e| to_persistence_err(e.to_string()))?;
        let stored = bytes_to_f32_vec(&blob);
        let distance = 1.0 - cosine_similarity(reference, &stored);
        if let Some(max) = options.max_distance {
            if distance > max {
                continue;
            }
        }
        hits.push(SearchHit { document_id, distance });
    }

    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(options.limit);

    Ok(hits)
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a
        .iter()
        .map(|x| (*x as f64) * (*x as f64))
        .sum::<f64>()
        .sqrt();
    let norm_b: f64 = b
        .iter()
        .map(|x| (*x as f64) * (*x as f64))
        .sum::<f64>()
        .sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = [0.3f32, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
    }

    #[test]
    fn opposite_vectors_have_similarity_minus_one() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_norm_yields_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
