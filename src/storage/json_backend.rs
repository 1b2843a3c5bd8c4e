use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{Result, StorageBackend};

const DOCUMENT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed storage keeping one JSON document per key inside `root`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    root: PathBuf,
}

impl JsonFileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn document_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_key(key), DOCUMENT_EXTENSION))
    }
}

impl StorageBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.document_path(key);
        let tmp = tmp_path(&path);
        write_atomic(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = contents.len(), "document written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.document_path(key)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Maps a key to a file stem. `[a-z0-9-]` pass through and every other byte becomes
/// `_xx` (lowercase hex), so distinct keys never share a file.
fn canonical_key(key: &str) -> String {
    if key.is_empty() {
        return "_".into();
    }
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => stem.push(char::from(byte)),
            other => stem.push_str(&format!("_{other:02x}")),
        }
    }
    stem
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend_with_temp_dir() -> (JsonFileBackend, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let backend = JsonFileBackend::new(temp.path().join("data")).expect("json backend");
        (backend, temp)
    }

    #[test]
    fn write_and_read_roundtrip() {
        let (backend, _guard) = backend_with_temp_dir();
        backend
            .write("kakeibo:categories", r#"["食費","家賃"]"#)
            .expect("write document");
        let loaded = backend.read("kakeibo:categories").expect("read document");
        assert_eq!(loaded.as_deref(), Some(r#"["食費","家賃"]"#));
    }

    #[test]
    fn missing_documents_read_as_none() {
        let (backend, _guard) = backend_with_temp_dir();
        assert_eq!(backend.read("kakeibo:recurring").expect("read"), None);
        assert!(!backend.remove("kakeibo:recurring").expect("remove"));
    }

    #[test]
    fn keys_map_to_escaped_file_names() {
        let (backend, _guard) = backend_with_temp_dir();
        let file_name = |key: &str| {
            backend
                .document_path(key)
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        };
        assert_eq!(
            file_name("kakeibo:transactions").as_deref(),
            Some("kakeibo_3atransactions.json")
        );
        assert_eq!(file_name("").as_deref(), Some("_.json"));
        assert_eq!(file_name("a/b").as_deref(), Some("a_2fb.json"));
    }

    #[test]
    fn lookalike_keys_keep_separate_documents() {
        let (backend, _guard) = backend_with_temp_dir();
        let keys = [
            "kakeibo:transactions",
            "kakeibo_transactions",
            "Kakeibo:Transactions",
            "kakeibo transactions",
        ];
        for (idx, key) in keys.iter().enumerate() {
            backend.write(key, &format!("[{idx}]")).expect("write document");
        }
        for (idx, key) in keys.iter().enumerate() {
            let expected = format!("[{idx}]");
            assert_eq!(backend.read(key).expect("read").as_deref(), Some(expected.as_str()));
        }
    }

    #[test]
    fn failed_write_preserves_previous_document() {
        let (backend, _guard) = backend_with_temp_dir();
        backend.write("ledger", "[1]").expect("initial write");

        // A directory squatting on the staging path forces File::create to fail.
        let tmp = tmp_path(&backend.document_path("ledger"));
        fs::create_dir_all(&tmp).expect("create blocking dir");

        assert!(backend.write("ledger", "[1,2]").is_err());
        assert_eq!(backend.read("ledger").expect("read").as_deref(), Some("[1]"));
    }

    #[test]
    fn remove_deletes_existing_document() {
        let (backend, _guard) = backend_with_temp_dir();
        backend.write("ledger", "[]").expect("write");
        assert!(backend.remove("ledger").expect("remove"));
        assert_eq!(backend.read("ledger").expect("read"), None);
    }
}
