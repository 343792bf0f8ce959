use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::CampDocument;

/// Fixed file name of exported backups
pub const BACKUP_FILE_NAME: &str = "camp-backup.json";

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup is not a valid camp document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backup file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No document loaded")]
    NoDocument,
}

/// Write a document to `<dir>/camp-backup.json`, pretty-printed
pub fn write_backup(document: &CampDocument, dir: &Path) -> Result<PathBuf, BackupError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(BACKUP_FILE_NAME);
    std::fs::write(&path, document.to_pretty_json()?)?;
    Ok(path)
}

/// Read and parse a backup file without touching any state
pub fn read_backup(path: &Path) -> Result<CampDocument, BackupError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(CampDocument::from_json(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_uses_fixed_name_and_pretty_json() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut doc = CampDocument::default();
        doc.event.title = "Fat Man Camp".to_string();

        let path = write_backup(&doc, dir.path()).expect("write backup");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(BACKUP_FILE_NAME));

        let contents = std::fs::read_to_string(&path).expect("read backup");
        assert!(contents.contains('\n'));
        assert_eq!(read_backup(&path).expect("read backup"), doc);
    }

    #[test]
    fn test_read_rejects_garbage() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(read_backup(&path), Err(BackupError::Parse(_))));

        assert!(matches!(read_backup(&dir.path().join("missing.json")), Err(BackupError::Io(_))));
    }
}
