//! f32 vector ↔ BLOB encoding (little-endian).

/// Convert an f32 slice to bytes.
pub fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to an f32 vec.
pub fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let v = vec![1.0f32, -2.5, 0.0, 3.75e-3];
        assert_eq!(bytes_to_f32_vec(&f32_vec_to_bytes(&v)), v);
    }

    #[test]
    fn empty_vector() {
        assert!(bytes_to_f32_vec(&f32_vec_to_bytes(&[])).is_empty());
    }

    #[test]
    fn truncated_blob_drops_partial_floats() {
        let mut bytes = f32_vec_to_bytes(&[1.0, 2.0]);
        bytes.pop();
        assert_eq!(bytes_to_f32_vec(&bytes), vec![1.0]);
    }
}
