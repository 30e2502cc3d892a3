//! Cross-process lock guarding copies of shared resource files.
//!
//! Several generators may run concurrently in the same build tree. Copies
//! of static resources (Ansys's `usermat.cpp`...) are done while holding a
//! lock file created exclusively; the lock is released when the guard is
//! dropped. The lock file holds the pid of its holder: a lock left by a
//! process that no longer runs is removed instead of waited for.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::interfaces::errors::GenerationError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A lock serialising copies of shared resources.
pub trait ResourceLock: std::fmt::Debug {
    /// Acquire the lock, waiting for other holders up to the lock timeout.
    fn acquire(&self) -> Result<LockGuard, GenerationError>;
}

/// Releases the lock on drop.
#[derive(Debug)]
pub struct LockGuard {
    path: Option<PathBuf>,
}

impl LockGuard {
    /// A guard holding nothing.
    pub fn none() -> Self {
        LockGuard { path: None }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!("failed to release lock {}: {}", path.display(), e);
            } else {
                tracing::debug!("released lock {}", path.display());
            }
        }
    }
}

/// Named lock shared by every generator process.
#[derive(Debug, Clone)]
pub struct MFrontLock {
    path: PathBuf,
    timeout: Duration,
}

impl MFrontLock {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        MFrontLock {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pid written by the current holder, if it got that far.
    fn holder(&self) -> Option<u32> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    fn error(&self, message: impl Into<String>) -> GenerationError {
        GenerationError::Lock {
            path: self.path.display().to_string(),
            message: message.into(),
        }
    }
}

impl ResourceLock for MFrontLock {
    fn acquire(&self) -> Result<LockGuard, GenerationError> {
        let start = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.path)
            {
                Ok(mut file) => {
                    if let Err(e) = writeln!(file, "{}", std::process::id()) {
                        drop(file);
                        let _ = std::fs::remove_file(&self.path);
                        return Err(GenerationError::io(&self.path, e));
                    }
                    tracing::debug!("acquired lock {}", self.path.display());
                    return Ok(LockGuard {
                        path: Some(self.path.clone()),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let holder = self.holder();
                    if let Some(pid) = holder.filter(|&pid| !process_is_running(pid)) {
                        tracing::warn!(
                            "removing stale lock {} left by process {}",
                            self.path.display(),
                            pid
                        );
                        match std::fs::remove_file(&self.path) {
                            Ok(()) => continue,
                            Err(e) if e.kind() == ErrorKind::NotFound => continue,
                            Err(e) => return Err(GenerationError::io(&self.path, e)),
                        }
                    }
                    if start.elapsed() >= self.timeout {
                        let by = match holder {
                            Some(pid) => format!("process {}", pid),
                            None => "another process".to_string(),
                        };
                        return Err(self.error(format!(
                            "still held by {} after {} ms",
                            by,
                            self.timeout.as_millis()
                        )));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(self.error(e.to_string())),
            }
        }
    }
}

/// Whether `pid` names a live process. Assumed alive where this cannot be
/// checked.
#[cfg(target_os = "linux")]
fn process_is_running(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(not(target_os = "linux"))]
fn process_is_running(_pid: u32) -> bool {
    true
}

/// Lock for drivers serialising resource copies themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLock;

impl ResourceLock for NoLock {
    fn acquire(&self) -> Result<LockGuard, GenerationError> {
        Ok(LockGuard::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_is_released_on_drop() {
        let tmp = TempDir::new().unwrap();
        let lock = MFrontLock::new(tmp.path().join("mfront.lock"), Duration::from_millis(50));
        {
            let _guard = lock.acquire().unwrap();
            assert!(lock.path().exists());
        }
        assert!(!lock.path().exists());
        let _again = lock.acquire().unwrap();
    }

    #[test]
    fn test_second_acquisition_times_out() {
        let tmp = TempDir::new().unwrap();
        let lock = MFrontLock::new(tmp.path().join("mfront.lock"), Duration::from_millis(60));
        let _guard = lock.acquire().unwrap();
        let err = lock.acquire().unwrap_err();
        assert!(matches!(err, GenerationError::Lock { .. }));
    }

    #[test]
    fn test_timeout_names_the_holder() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mfront.lock");
        let pid = std::process::id();
        std::fs::write(&path, format!("{}\n", pid)).unwrap();

        let lock = MFrontLock::new(&path, Duration::from_millis(40));
        match lock.acquire().unwrap_err() {
            GenerationError::Lock { message, .. } => {
                assert!(message.contains(&format!("process {}", pid)), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(path.exists());
    }

    #[test]
    fn test_unreadable_holder_is_waited_for() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mfront.lock");
        std::fs::write(&path, "").unwrap();

        let lock = MFrontLock::new(&path, Duration::from_millis(40));
        match lock.acquire().unwrap_err() {
            GenerationError::Lock { message, .. } => {
                assert!(message.contains("another process"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_stale_lock_is_reclaimed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mfront.lock");
        // above any pid_max
        std::fs::write(&path, "4294967294\n").unwrap();

        let lock = MFrontLock::new(&path, Duration::from_millis(40));
        {
            let _guard = lock.acquire().unwrap();
            let holder = std::fs::read_to_string(&path).unwrap();
            assert_eq!(holder.trim(), std::process::id().to_string());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let lock = MFrontLock::new(
            tmp.path().join("missing").join("mfront.lock"),
            Duration::from_millis(10),
        );
        assert!(lock.acquire().is_err());
    }

    #[test]
    fn test_no_lock() {
        let _a = NoLock.acquire().unwrap();
        let _b = NoLock.acquire().unwrap();
    }
}
