//! Binary persistence for restaurant embeddings (vectors.bin).
//!
//! Header (47 bytes):
//! - version: u8 (1)
//! - model_id: [u8; 32] (SHA256 hash of the model name)
//! - dimensions: u16 (little-endian)
//! - entry_count: u64 (little-endian)
//! - checksum: u32 (CRC32 of the header bytes before the checksum)
//!
//! Entries (repeated):
//! - restaurant_id: u64 (little-endian)
//! - content_hash: u64 (little-endian)
//! - embedding: [f32; dimensions] (little-endian)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::semantic::index::{VectorEntry, VectorIndex};

/// Current file format version
const FORMAT_VERSION: u8 = 1;

/// version(1) + model_id(32) + dimensions(2) + entry_count(8) + checksum(4)
const HEADER_SIZE: usize = 47;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum VectorStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u8, u8),

    #[error("model mismatch: file was built with a different model")]
    ModelMismatch,

    #[error("checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    #[error("dimension mismatch: expected {expected}, file has {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// File header.
#[derive(Debug)]
struct Header {
    version: u8,
    model_id: [u8; 32],
    dimensions: u16,
    entry_count: u64,
}

/// Reader/writer for a vectors.bin file.
pub struct VectorStorage {
    path: PathBuf,
}

impl VectorStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the vector index, verifying the file was written for the
    /// expected model and dimensions.
    pub fn load(
        &self,
        expected_model_id: &[u8; 32],
        expected_dimensions: usize,
    ) -> Result<VectorIndex, VectorStorageError> {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);

        let header = Self::read_header(&mut reader)?;

        if header.model_id != *expected_model_id {
            return Err(VectorStorageError::ModelMismatch);
        }
        if header.dimensions as usize != expected_dimensions {
            return Err(VectorStorageError::DimensionMismatch {
                expected: expected_dimensions,
                got: header.dimensions as usize,
            });
        }

        let dimensions = header.dimensions as usize;
        let mut index = VectorIndex::with_capacity(dimensions, header.entry_count as usize);

        for _ in 0..header.entry_count {
            let (id, content_hash, embedding) = Self::read_entry(&mut reader, dimensions)?;
            // Entries that fail to insert (zero norm) are skipped
            let _ = index.insert(id, content_hash, embedding);
        }

        Ok(index)
    }

    /// Save the vector index atomically: temp file -> fsync -> rename.
    pub fn save(&self, index: &VectorIndex, model_id: &[u8; 32]) -> Result<(), VectorStorageError> {
        let temp_path = self.path.with_extension("tmp");

        let result = self.write_to_file(&temp_path, index, model_id);
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
            return result;
        }

        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    fn write_to_file(
        &self,
        path: &Path,
        index: &VectorIndex,
        model_id: &[u8; 32],
    ) -> Result<(), VectorStorageError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = Header {
            version: FORMAT_VERSION,
            model_id: *model_id,
            dimensions: index.dimensions() as u16,
            entry_count: index.len() as u64,
        };
        Self::write_header(&mut writer, &header)?;

        for (id, entry) in index.iter() {
            Self::write_entry(&mut writer, id, entry)?;
        }

        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        file.sync_all()?;

        Ok(())
    }

    fn read_header(reader: &mut BufReader<File>) -> Result<Header, VectorStorageError> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_bytes)?;

        let version = header_bytes[0];
        if version > FORMAT_VERSION {
            return Err(VectorStorageError::VersionMismatch(version, FORMAT_VERSION));
        }

        let mut model_id = [0u8; 32];
        model_id.copy_from_slice(&header_bytes[1..33]);

        let dimensions = u16::from_le_bytes(header_bytes[33..35].try_into().unwrap());
        let entry_count = u64::from_le_bytes(header_bytes[35..43].try_into().unwrap());
        let stored_checksum = u32::from_le_bytes(header_bytes[43..47].try_into().unwrap());

        let computed_checksum = crc32fast::hash(&header_bytes[0..43]);
        if stored_checksum != computed_checksum {
            return Err(VectorStorageError::ChecksumMismatch);
        }

        Ok(Header {
            version,
            model_id,
            dimensions,
            entry_count,
        })
    }

    fn write_header(
        writer: &mut BufWriter<File>,
        header: &Header,
    ) -> Result<(), VectorStorageError> {
        let mut header_bytes = [0u8; HEADER_SIZE];

        header_bytes[0] = header.version;
        header_bytes[1..33].copy_from_slice(&header.model_id);
        header_bytes[33..35].copy_from_slice(&header.dimensions.to_le_bytes());
        header_bytes[35..43].copy_from_slice(&header.entry_count.to_le_bytes());

        let checksum = crc32fast::hash(&header_bytes[0..43]);
        header_bytes[43..47].copy_from_slice(&checksum.to_le_bytes());

        writer.write_all(&header_bytes)?;
        Ok(())
    }

    fn read_entry(
        reader: &mut BufReader<File>,
        dimensions: usize,
    ) -> Result<(u64, u64, Vec<f32>), VectorStorageError> {
        let mut id_bytes = [0u8; 8];
        reader.read_exact(&mut id_bytes)?;
        let id = u64::from_le_bytes(id_bytes);

        let mut hash_bytes = [0u8; 8];
        reader.read_exact(&mut hash_bytes)?;
        let content_hash = u64::from_le_bytes(hash_bytes);

        let mut vector_bytes = vec![0u8; dimensions * 4];
        reader.read_exact(&mut vector_bytes)?;
        let embedding = vector_bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();

        Ok((id, content_hash, embedding))
    }

    fn write_entry(
        writer: &mut BufWriter<File>,
        id: u64,
        entry: &VectorEntry,
    ) -> Result<(), VectorStorageError> {
        writer.write_all(&id.to_le_bytes())?;
        writer.write_all(&entry.content_hash.to_le_bytes())?;

        for &value in &entry.embedding {
            writer.write_all(&value.to_le_bytes())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_path() -> PathBuf {
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "resto-vectors-test-{}-{}.bin",
            std::process::id(),
            counter
        ))
    }

    fn test_model_id() -> [u8; 32] {
        let mut id = [0u8; 32];
        id[0] = 0xAB;
        id[31] = 0xCD;
        id
    }

    #[test]
    fn test_save_and_load_empty() {
        let path = temp_path();
        let storage = VectorStorage::new(path.clone());
        let model_id = test_model_id();

        let index = VectorIndex::new(384);
        storage.save(&index, &model_id).unwrap();
        assert!(storage.exists());

        let loaded = storage.load(&model_id, 384).unwrap();
        assert_eq!(loaded.len(), 0);
        assert_eq!(loaded.dimensions(), 384);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_load_with_entries() {
        let path = temp_path();
        let storage = VectorStorage::new(path.clone());
        let model_id = test_model_id();

        let mut index = VectorIndex::new(3);
        index.insert(0, 100, vec![1.0, 0.0, 0.0]).unwrap();
        index.insert(1, 200, vec![0.0, 1.0, 0.0]).unwrap();
        index.insert(2, 300, vec![0.0, 0.0, 1.0]).unwrap();

        storage.save(&index, &model_id).unwrap();

        let loaded = storage.load(&model_id, 3).unwrap();
        assert_eq!(loaded.len(), 3);

        let entry = loaded.get(1).unwrap();
        assert_eq!(entry.content_hash, 200);
        assert_eq!(entry.embedding, vec![0.0, 1.0, 0.0]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_model_mismatch() {
        let path = temp_path();
        let storage = VectorStorage::new(path.clone());

        let index = VectorIndex::new(3);
        storage.save(&index, &test_model_id()).unwrap();

        let mut wrong_model_id = [0u8; 32];
        wrong_model_id[0] = 0xFF;

        let result = storage.load(&wrong_model_id, 3);
        assert!(matches!(result, Err(VectorStorageError::ModelMismatch)));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_dimension_mismatch() {
        let path = temp_path();
        let storage = VectorStorage::new(path.clone());
        let model_id = test_model_id();

        let index = VectorIndex::new(3);
        storage.save(&index, &model_id).unwrap();

        let result = storage.load(&model_id, 384);
        assert!(matches!(
            result,
            Err(VectorStorageError::DimensionMismatch { .. })
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let path = temp_path();
        let storage = VectorStorage::new(path.clone());
        let model_id = test_model_id();

        let mut index = VectorIndex::new(3);
        index.insert(0, 100, vec![1.0, 0.0, 0.0]).unwrap();
        storage.save(&index, &model_id).unwrap();

        // Flip a byte inside the header
        let mut file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        use std::io::Seek;
        file.seek(std::io::SeekFrom::Start(10)).unwrap();
        file.write_all(&[0xFF]).unwrap();

        let result = storage.load(&model_id, 3);
        assert!(matches!(result, Err(VectorStorageError::ChecksumMismatch)));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_write_cleans_up_on_error() {
        let path = PathBuf::from("/nonexistent/directory/vectors.bin");
        let storage = VectorStorage::new(path.clone());

        let index = VectorIndex::new(3);
        let result = storage.save(&index, &test_model_id());

        assert!(result.is_err());
        assert!(!path.with_extension("tmp").exists());
    }
}
