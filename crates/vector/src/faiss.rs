//! Reader for FAISS flat-index files.
//!
//! Supports the exact indexes written by `faiss.write_index`:
//! `IndexFlatL2` (`IxF2`), `IndexFlatIP` (`IxFI`) and generic `IndexFlat`
//! (`IxFl`). All integers and floats are little-endian.
//!
//! ```text
//! fourcc        u32
//! d             i32
//! ntotal        i64
//! reserved      i64, i64
//! is_trained    u8
//! metric_type   i32   (0 = inner product, 1 = L2)
//! metric_arg    f32   (only when metric_type > 1)
//! code count    u64   (number of f32 values, ntotal * d)
//! codes         f32 * count
//! ```

use crate::index::{FlatIndex, Metric};
use medrag_core::{AppError, AppResult};
use std::path::Path;

const FOURCC_FLAT_L2: &[u8; 4] = b"IxF2";
const FOURCC_FLAT_IP: &[u8; 4] = b"IxFI";
const FOURCC_FLAT: &[u8; 4] = b"IxFl";

const METRIC_INNER_PRODUCT: i32 = 0;
const METRIC_L2: i32 = 1;

/// Read a FAISS flat index from disk.
pub fn read_index(path: &Path) -> AppResult<FlatIndex> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::IndexLoad(format!("Failed to read index file {:?}: {}", path, e))
    })?;
    parse_index(&bytes)
}

/// Parse a FAISS flat index from its serialized bytes.
pub fn parse_index(bytes: &[u8]) -> AppResult<FlatIndex> {
    let mut reader = ByteReader::new(bytes);

    let fourcc = reader.take(4)?;
    let expected_metric = match fourcc {
        f if f == FOURCC_FLAT_L2 => Some(Metric::L2),
        f if f == FOURCC_FLAT_IP => Some(Metric::InnerProduct),
        f if f == FOURCC_FLAT => None,
        other => {
            return Err(AppError::IndexLoad(format!(
                "Unsupported index type '{}': only flat indexes (IxF2, IxFI, IxFl) can be loaded",
                String::from_utf8_lossy(other)
            )))
        }
    };

    let d = reader.i32()?;
    let ntotal = reader.i64()?;
    let _reserved = (reader.i64()?, reader.i64()?);
    let _is_trained = reader.u8()?;
    let metric_type = reader.i32()?;
    if metric_type > 1 {
        let _metric_arg = reader.f32()?;
    }

    if d <= 0 {
        return Err(AppError::IndexLoad(format!("Invalid dimension {}", d)));
    }
    if ntotal < 0 {
        return Err(AppError::IndexLoad(format!("Invalid vector count {}", ntotal)));
    }

    let metric = match metric_type {
        METRIC_L2 => Metric::L2,
        METRIC_INNER_PRODUCT => Metric::InnerProduct,
        other => {
            return Err(AppError::IndexLoad(format!(
                "Unsupported metric type {}",
                other
            )))
        }
    };
    if let Some(expected) = expected_metric {
        if expected != metric {
            return Err(AppError::IndexLoad(format!(
                "Index header declares metric {} but type implies {}",
                metric, expected
            )));
        }
    }

    let dimension = d as usize;
    let expected_count = (ntotal as u64)
        .checked_mul(dimension as u64)
        .ok_or_else(|| AppError::IndexLoad("Index size overflows".to_string()))?;

    let count = reader.u64()?;
    if count != expected_count {
        return Err(AppError::IndexLoad(format!(
            "Index holds {} floats, expected {} ({} vectors x {} dimensions)",
            count, expected_count, ntotal, dimension
        )));
    }

    let byte_len = usize::try_from(count)
        .ok()
        .and_then(|c| c.checked_mul(4))
        .ok_or_else(|| AppError::IndexLoad("Index size overflows".to_string()))?;
    let data = reader
        .take(byte_len)?
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    if reader.remaining() != 0 {
        return Err(AppError::IndexLoad(format!(
            "{} trailing bytes after index data",
            reader.remaining()
        )));
    }

    FlatIndex::from_flat(dimension, metric, data)
}

/// Little-endian cursor over a byte slice.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> AppResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(AppError::IndexLoad(format!(
                "Truncated index file: needed {} bytes at offset {}, {} available",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> AppResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> AppResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn i32(&mut self) -> AppResult<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn i64(&mut self) -> AppResult<i64> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> AppResult<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> AppResult<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::index::{VectorIndex, NO_NEIGHBOR};
    use std::io::Write;

    /// Serialize vectors the way `faiss.write_index` does for flat indexes.
    pub(crate) fn encode_flat(fourcc: &[u8; 4], metric_type: i32, d: usize, vectors: &[Vec<f32>]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(fourcc);
        out.extend_from_slice(&(d as i32).to_le_bytes());
        out.extend_from_slice(&(vectors.len() as i64).to_le_bytes());
        out.extend_from_slice(&(1i64 << 20).to_le_bytes());
        out.extend_from_slice(&(1i64 << 20).to_le_bytes());
        out.push(1);
        out.extend_from_slice(&metric_type.to_le_bytes());
        if metric_type > 1 {
            out.extend_from_slice(&0f32.to_le_bytes());
        }
        out.extend_from_slice(&((vectors.len() * d) as u64).to_le_bytes());
        for v in vectors {
            for x in v {
                out.extend_from_slice(&x.to_le_bytes());
            }
        }
        out
    }

    fn three_vectors() -> Vec<Vec<f32>> {
        vec![
            vec![0.1, 0.2, 0.3, 0.4],
            vec![1.0, 1.0, 1.0, 1.0],
            vec![-0.5, 0.0, 0.5, 0.0],
        ]
    }

    #[test]
    fn test_parse_flat_l2() {
        let bytes = encode_flat(FOURCC_FLAT_L2, METRIC_L2, 4, &three_vectors());
        let index = parse_index(&bytes).unwrap();

        assert_eq!(index.dimension(), 4);
        assert_eq!(index.ntotal(), 3);
        assert_eq!(index.metric(), Metric::L2);

        let result = index.search(&[vec![0.1, 0.2, 0.3, 0.4]], 5).unwrap();
        assert_eq!(result[0].positions[0], 0);
        assert_eq!(result[0].distances[0], 0.0);
        assert_eq!(&result[0].positions[3..], &[NO_NEIGHBOR, NO_NEIGHBOR]);
    }

    #[test]
    fn test_parse_flat_ip() {
        let bytes = encode_flat(FOURCC_FLAT_IP, METRIC_INNER_PRODUCT, 4, &three_vectors());
        let index = parse_index(&bytes).unwrap();
        assert_eq!(index.metric(), Metric::InnerProduct);
    }

    #[test]
    fn test_generic_flat_takes_metric_from_header() {
        let bytes = encode_flat(FOURCC_FLAT, METRIC_INNER_PRODUCT, 4, &three_vectors());
        assert_eq!(parse_index(&bytes).unwrap().metric(), Metric::InnerProduct);
    }

    #[test]
    fn test_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&encode_flat(FOURCC_FLAT_L2, METRIC_L2, 4, &three_vectors()))
            .unwrap();

        let index = read_index(file.path()).unwrap();
        assert_eq!(index.ntotal(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = read_index(Path::new("/no/such/faiss_index.index")).unwrap_err();
        assert!(err.to_string().contains("Failed to read index file"));
    }

    #[test]
    fn test_rejects_unsupported_type() {
        let mut bytes = encode_flat(FOURCC_FLAT_L2, METRIC_L2, 4, &three_vectors());
        bytes[..4].copy_from_slice(b"IHNf");
        let err = parse_index(&bytes).unwrap_err();
        assert!(err.to_string().contains("IHNf"));
    }

    #[test]
    fn test_rejects_truncated_file() {
        let bytes = encode_flat(FOURCC_FLAT_L2, METRIC_L2, 4, &three_vectors());
        let err = parse_index(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(err.to_string().contains("Truncated"));
    }

    #[test]
    fn test_rejects_metric_conflict() {
        let bytes = encode_flat(FOURCC_FLAT_L2, METRIC_INNER_PRODUCT, 4, &three_vectors());
        assert!(parse_index(&bytes).is_err());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = encode_flat(FOURCC_FLAT_L2, METRIC_L2, 4, &three_vectors());
        bytes.push(0);
        assert!(parse_index(&bytes).is_err());
    }
}
