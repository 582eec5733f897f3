use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{IndexError, LogIndex};

const SNAPSHOT_KIND: &str = "pinorama-snapshot";
const SNAPSHOT_VERSION: u32 = 1;

/// First line of a snapshot file
///
/// The remaining lines hold one stored record each, in creation order.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotHeader {
    kind: String,
    version: u32,
    documents: usize,
    saved_at: String,
}

impl LogIndex {
    /// Write every record to `path` as NDJSON
    ///
    /// The file is replaced atomically: records are written to a sibling
    /// temporary file which is then renamed over `path`.
    pub fn save_snapshot(&self, path: &Path) -> Result<usize, IndexError> {
        let documents = self.documents()?;
        let tmp = temp_path(path);
        let io_err = |source| IndexError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let header = SnapshotHeader {
            kind: SNAPSHOT_KIND.to_string(),
            version: SNAPSHOT_VERSION,
            documents: documents.len(),
            saved_at: Utc::now().to_rfc3339(),
        };
        write_lines(&tmp, &header, &documents).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;

        tracing::info!(path = %path.display(), documents = documents.len(), "Saved snapshot");
        Ok(documents.len())
    }

    /// Restore records from a snapshot written by [`LogIndex::save_snapshot`]
    ///
    /// A missing file is not an error and restores nothing.
    pub fn load_snapshot(&self, path: &Path) -> Result<usize, IndexError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No snapshot to restore");
                return Ok(0);
            }
            Err(source) => {
                return Err(IndexError::SnapshotIo {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let corrupt = |line: usize, reason: String| IndexError::CorruptSnapshot {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut lines = BufReader::new(file).lines();
        let header_line = match lines.next() {
            Some(line) => line.map_err(|source| IndexError::SnapshotIo {
                path: path.to_path_buf(),
                source,
            })?,
            None => return Ok(0),
        };
        let header: SnapshotHeader =
            serde_json::from_str(&header_line).map_err(|e| corrupt(1, e.to_string()))?;
        if header.kind != SNAPSHOT_KIND || header.version != SNAPSHOT_VERSION {
            return Err(corrupt(
                1,
                format!("unsupported snapshot {} v{}", header.kind, header.version),
            ));
        }

        let mut records = Vec::with_capacity(header.documents);
        for (n, line) in lines.enumerate() {
            let line = line.map_err(|source| IndexError::SnapshotIo {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Value =
                serde_json::from_str(&line).map_err(|e| corrupt(n + 2, e.to_string()))?;
            records.push(record);
        }

        let restored = self.insert_restored(records)?;
        tracing::info!(path = %path.display(), documents = restored, "Restored snapshot");
        Ok(restored)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_lines(path: &Path, header: &SnapshotHeader, documents: &[Value]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut out, header)?;
    out.write_all(b"\n")?;
    for doc in documents {
        serde_json::to_writer(&mut out, doc)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    out.get_ref().sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinorama_types::created_at;
    use serde_json::json;

    fn pino_index() -> LogIndex {
        LogIndex::new(&pinorama_presets::pino().unwrap().db_schema).unwrap()
    }

    #[test]
    fn test_snapshot_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pinorama.ndjson");

        let index = pino_index();
        index
            .insert_many(vec![json!({ "msg": "one", "level": 30 })])
            .unwrap();
        index
            .insert_many(vec![json!({ "msg": "two", "level": 50 })])
            .unwrap();
        let before = index.documents().unwrap();
        assert_eq!(index.save_snapshot(&path).unwrap(), 2);
        assert!(!temp_path(&path).exists());

        let restarted = pino_index();
        assert_eq!(restarted.load_snapshot(&path).unwrap(), 2);
        let after = restarted.documents().unwrap();
        assert_eq!(after, before);
        assert_eq!(
            after.iter().map(|d| created_at(d)).collect::<Vec<_>>(),
            before.iter().map(|d| created_at(d)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_missing_snapshot_restores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let index = pino_index();
        assert_eq!(index.load_snapshot(&dir.path().join("absent")).unwrap(), 0);
    }

    #[test]
    fn test_corrupt_snapshot_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ndjson");
        let header = json!({
            "kind": SNAPSHOT_KIND,
            "version": SNAPSHOT_VERSION,
            "documents": 1,
            "savedAt": "2024-01-01T00:00:00Z"
        });
        fs::write(&path, format!("{}\n{{not json\n", header)).unwrap();

        let err = pino_index().load_snapshot(&path).unwrap_err();
        assert!(matches!(err, IndexError::CorruptSnapshot { line: 2, .. }));
    }

    #[test]
    fn test_foreign_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.ndjson");
        fs::write(&path, "{\"kind\":\"other\",\"version\":1,\"documents\":0,\"savedAt\":\"\"}\n").unwrap();

        let err = pino_index().load_snapshot(&path).unwrap_err();
        assert!(matches!(err, IndexError::CorruptSnapshot { line: 1, .. }));
    }
}
