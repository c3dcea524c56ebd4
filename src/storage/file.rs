//! File-based storage implementation.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SentiscopeError};
use crate::storage::{Storage, StorageError, check_name};

/// Stores each blob as a file in one directory.
#[derive(Debug)]
pub struct FileStorage {
    /// The root directory for storage.
    directory: PathBuf,
    /// fsync blobs before they are renamed into place.
    sync_writes: bool,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            std::fs::create_dir_all(&directory)
                .map_err(|e| SentiscopeError::storage(format!("Failed to create directory: {e}")))?;
        }

        if !directory.is_dir() {
            return Err(SentiscopeError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage {
            directory,
            sync_writes: true,
        })
    }

    /// Open an existing directory without creating it.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(SentiscopeError::storage(format!(
                "Directory not found: {}",
                directory.display()
            )));
        }
        Self::new(directory)
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> std::result::Result<PathBuf, StorageError> {
        check_name(name)?;
        Ok(self.directory.join(name))
    }

    /// Pick an unused `<name>_<n>.tmp` next to the target.
    fn temp_path(&self, name: &str) -> std::result::Result<PathBuf, StorageError> {
        for counter in 0..10000 {
            let path = self.directory.join(format!("{name}_{counter}.tmp"));
            if !path.exists() {
                return Ok(path);
            }
        }
        Err(StorageError::IoError(
            "Could not create temporary file".to_string(),
        ))
    }
}

fn io_error(name: &str, e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::FileNotFound(name.to_string())
    } else {
        StorageError::IoError(e.to_string())
    }
}

impl Storage for FileStorage {
    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.file_path(name)?;
        let mut file = File::open(&path).map_err(|e| io_error(name, e))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        Ok(data)
    }

    fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.file_path(name)?;
        let temp = self.temp_path(name)?;

        let written = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp)?;
            file.write_all(data)?;
            if self.sync_writes {
                file.sync_all()?;
            }
            Ok(())
        })();

        if let Err(e) = written.and_then(|_| std::fs::rename(&temp, &path)) {
            let _ = std::fs::remove_file(&temp);
            return Err(StorageError::IoError(format!("Failed to write {name}: {e}")).into());
        }
        Ok(())
    }

    fn file_exists(&self, name: &str) -> bool {
        self.file_path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.file_path(name)?;
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| StorageError::IoError(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for entry in
            std::fs::read_dir(&self.directory).map_err(|e| StorageError::IoError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::IoError(e.to_string()))?;
            let path = entry.path();

            if path.is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let path = self.file_path(name)?;
        let metadata = path.metadata().map_err(|e| io_error(name, e))?;
        Ok(metadata.len())
    }

    fn describe(&self, name: &str) -> String {
        self.directory.join(name).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_write_and_read() {
        let (_temp_dir, storage) = create_test_storage();

        storage.write_file("test.bin", b"Hello, World!").unwrap();
        assert_eq!(storage.read_file("test.bin").unwrap(), b"Hello, World!");
        assert_eq!(storage.file_size("test.bin").unwrap(), 13);

        // Replacing leaves no temp files behind.
        storage.write_file("test.bin", b"bye").unwrap();
        assert_eq!(storage.read_file("test.bin").unwrap(), b"bye");
        assert_eq!(storage.list_files().unwrap(), vec!["test.bin"]);
    }

    #[test]
    fn test_file_operations() {
        let (_temp_dir, storage) = create_test_storage();

        assert!(!storage.file_exists("nonexistent.bin"));
        storage.write_file("b.bin", b"2").unwrap();
        storage.write_file("a.bin", b"1").unwrap();
        assert!(storage.file_exists("a.bin"));
        assert_eq!(storage.list_files().unwrap(), vec!["a.bin", "b.bin"]);

        storage.delete_file("a.bin").unwrap();
        assert!(!storage.file_exists("a.bin"));
        storage.delete_file("a.bin").unwrap();
    }

    #[test]
    fn test_file_not_found() {
        let (_temp_dir, storage) = create_test_storage();

        let err = storage.read_file("nonexistent.bin").unwrap_err();
        assert!(err.to_string().contains("File not found"));
        assert!(storage.file_size("nonexistent.bin").is_err());
    }

    #[test]
    fn test_rejects_paths() {
        let (_temp_dir, storage) = create_test_storage();
        assert!(storage.write_file("../escape.bin", b"x").is_err());
        assert!(!storage.file_exists("../escape.bin"));
    }

    #[test]
    fn test_open_requires_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FileStorage::open(temp_dir.path().join("missing")).is_err());
        assert!(FileStorage::open(temp_dir.path()).is_ok());

        let nested = temp_dir.path().join("models/current");
        let storage = FileStorage::new(&nested).unwrap();
        assert_eq!(storage.directory(), nested.as_path());
    }
}
