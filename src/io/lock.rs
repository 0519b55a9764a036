use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock serializing writers of one stream document.
///
/// The lock lives in a sibling `<file>.lock` so the TUI and a concurrent
/// `tstream add` never interleave their saves. Uses flock on Unix.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another tstream process may be writing")]
    Timeout { path: PathBuf },
    #[error("lock error: {0}")]
    IoError(#[from] std::io::Error),
}

/// `journal.md` -> `journal.md.lock`
pub fn lock_path_for(document: &Path) -> PathBuf {
    let mut name = document
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("stream"));
    name.push(".lock");
    document.with_file_name(name)
}

impl FileLock {
    /// Acquire the lock for `document`, blocking up to `timeout`.
    pub fn acquire(document: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = lock_path_for(document);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(FileLock {
                        _file: file,
                        path: lock_path,
                    });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }

    /// Acquire with default timeout (5 seconds)
    pub fn acquire_default(document: &Path) -> Result<Self, LockError> {
        Self::acquire(document, Duration::from_secs(5))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // flock is released with the file; the lock file itself is removed too
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_is_sibling() {
        assert_eq!(
            lock_path_for(Path::new("/notes/journal.md")),
            PathBuf::from("/notes/journal.md.lock")
        );
    }

    #[test]
    fn test_acquire_and_release_lock() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("journal.md");

        let lock = FileLock::acquire_default(&doc);
        assert!(lock.is_ok());
        assert!(lock_path_for(&doc).exists());

        drop(lock);
        assert!(!lock_path_for(&doc).exists());

        let lock2 = FileLock::acquire_default(&doc);
        assert!(lock2.is_ok());
    }

    #[test]
    fn test_lock_contention() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("journal.md");

        let _lock1 = FileLock::acquire_default(&doc).unwrap();
        let lock2 = FileLock::acquire(&doc, Duration::from_millis(50));
        assert!(matches!(lock2, Err(LockError::Timeout { .. })));
    }

    #[test]
    fn test_different_documents_do_not_contend() {
        let tmp = TempDir::new().unwrap();
        let _a = FileLock::acquire_default(&tmp.path().join("a.md")).unwrap();
        let b = FileLock::acquire(&tmp.path().join("b.md"), Duration::from_millis(50));
        assert!(b.is_ok());
    }
}
