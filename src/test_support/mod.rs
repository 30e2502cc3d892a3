//! Test utilities for the interface generators.
//!
//! Provides behaviour fixtures and a lock recording its acquisitions, so
//! tests can check that shared resources are copied under the lock without
//! touching the system temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use mfront_interfaces::test_support::{fixtures, RecordingLock};
//!
//! #[test]
//! fn test_example() {
//!     let bd = fixtures::test_plasticity();
//!     let lock = RecordingLock::default();
//!     // Generate with a context using the lock...
//!     assert_eq!(lock.acquisitions(), 1);
//! }
//! ```

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::interfaces::errors::GenerationError;
use crate::util::lock::{LockGuard, ResourceLock};

pub use fixtures::*;

/// Lock counting its acquisitions.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RecordingLock {
    acquisitions: Arc<AtomicUsize>,
}

impl RecordingLock {
    /// Number of times the lock was acquired.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl ResourceLock for RecordingLock {
    fn acquire(&self) -> Result<LockGuard, GenerationError> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(LockGuard::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_lock_counts() {
        let lock = RecordingLock::default();
        let shared = lock.clone();
        drop(lock.acquire().unwrap());
        drop(shared.acquire().unwrap());
        assert_eq!(lock.acquisitions(), 2);
    }
}
