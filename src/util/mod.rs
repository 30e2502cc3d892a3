//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod lock;

pub use config::Config;
pub use context::GenerationContext;
pub use diagnostic::Diagnostic;
pub use lock::{LockGuard, MFrontLock, NoLock, ResourceLock};
