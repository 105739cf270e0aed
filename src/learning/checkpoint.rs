//! Weight-table persistence.
//!
//! # Binary Format
//!
//! | Size | Field | Description |
//! |------|-------|-------------|
//! | 4 | table_count | u32 little-endian |
//! | 8 | entry_count | u64 little-endian, per table |
//! | 4 x entry_count | weights | f32 little-endian, per table |
//!
//! Paths ending in `.gz` hold the same byte stream gzip-compressed.
//!
//! Saves go to a temporary file in the target directory first and are renamed
//! into place, so an interrupted save never leaves a truncated weight file.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::learning::LearningError;
use crate::weight::{WeightStore, WeightTable};

/// Upper bound on tables accepted from a file.
pub const MAX_TABLES: u32 = 1024;

/// Upper bound on entries per table accepted from a file (1 GiB of f32).
pub const MAX_TABLE_ENTRIES: u64 = 1 << 28;

/// Entries read per chunk.
const READ_CHUNK: usize = 1 << 16;

fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Map an early EOF to a format error; other I/O errors pass through.
fn truncated(err: io::Error, what: &str) -> LearningError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        LearningError::InvalidWeights(format!("truncated {}", what))
    } else {
        LearningError::Io(err)
    }
}

/// Serialize a weight store.
pub fn write_weights<W: Write>(writer: &mut W, store: &WeightStore) -> Result<(), LearningError> {
    let count = u32::try_from(store.len())
        .map_err(|_| LearningError::InvalidWeights(format!("{} tables", store.len())))?;
    writer.write_all(&count.to_le_bytes())?;

    for table in store.tables() {
        writer.write_all(&(table.len() as u64).to_le_bytes())?;
        for value in table.values() {
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Deserialize a weight store.
///
/// # Errors
///
/// - `LearningError::InvalidWeights` when the stream is truncated or announces
///   more tables or entries than the limits allow
/// - `LearningError::Io` for other read failures
pub fn read_weights<R: Read>(reader: &mut R) -> Result<WeightStore, LearningError> {
    let mut buf4 = [0u8; 4];
    let mut buf8 = [0u8; 8];

    reader
        .read_exact(&mut buf4)
        .map_err(|e| truncated(e, "header"))?;
    let count = u32::from_le_bytes(buf4);
    if count > MAX_TABLES {
        return Err(LearningError::InvalidWeights(format!(
            "table count {} exceeds {}",
            count, MAX_TABLES
        )));
    }

    let mut tables = Vec::with_capacity(count as usize);
    for id in 0..count {
        reader
            .read_exact(&mut buf8)
            .map_err(|e| truncated(e, &format!("table {} header", id)))?;
        let len = u64::from_le_bytes(buf8);
        if len > MAX_TABLE_ENTRIES {
            return Err(LearningError::InvalidWeights(format!(
                "table {} has {} entries, limit {}",
                id, len, MAX_TABLE_ENTRIES
            )));
        }

        // grow with the data actually read, not the announced size
        let len = len as usize;
        let mut values = Vec::with_capacity(len.min(READ_CHUNK));
        let mut chunk = vec![0u8; 4 * len.min(READ_CHUNK)];
        while values.len() < len {
            let n = (len - values.len()).min(READ_CHUNK);
            let bytes = &mut chunk[..4 * n];
            reader
                .read_exact(bytes)
                .map_err(|e| truncated(e, &format!("table {}", id)))?;
            values.extend(
                bytes
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            );
        }
        tables.push(WeightTable::from_values(values));
    }

    Ok(WeightStore::from_tables(tables))
}

/// Save weights to `path`, gzip-compressed when it ends in `.gz`.
///
/// # Errors
///
/// `LearningError::Io` when the file cannot be created or written.
pub fn save_weights<P: AsRef<Path>>(path: P, store: &WeightStore) -> Result<(), LearningError> {
    let path = path.as_ref();
    let start = Instant::now();
    let tmp = temp_path(path);

    let result = (|| -> Result<(), LearningError> {
        let file = File::create(&tmp)?;
        if is_compressed(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            write_weights(&mut encoder, store)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(file);
            write_weights(&mut writer, store)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result?;

    log::info!(
        "Saved {} weight tables to {} in {:.2}s",
        store.len(),
        path.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Load weights from `path`, gzip-decompressed when it ends in `.gz`.
///
/// # Errors
///
/// - `LearningError::Io` when the file cannot be opened or read
/// - `LearningError::InvalidWeights` when the content is malformed
pub fn load_weights<P: AsRef<Path>>(path: P) -> Result<WeightStore, LearningError> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let store = if is_compressed(path) {
        read_weights(&mut GzDecoder::new(BufReader::new(file)))?
    } else {
        read_weights(&mut BufReader::new(file))?
    };

    log::info!(
        "Loaded {} weight tables ({} entries) from {}",
        store.len(),
        store.total_entries(),
        path.display()
    );
    Ok(store)
}
