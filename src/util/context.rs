//! Generation context.
//!
//! Everything an interface needs besides the behaviour itself: where to
//! write, which debugging options are on, host settings and the lock
//! guarding shared resource copies. It is built once by the driver and
//! passed explicitly to every interface.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::util::config::{Config, HostsConfig};
use crate::util::lock::{MFrontLock, NoLock, ResourceLock};

/// Context of one generator run.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Root of the generated tree (`include/`, `src/`, manifest)
    output_dir: PathBuf,

    /// Emit debugging comments and traces
    debug: bool,

    /// Default for `@<Host>GenerateMTestFileOnFailure`
    generate_mtest_on_failure: bool,

    /// Host settings (`ASTER_ARCH`, `CASTEM_ROOT`...)
    hosts: HostsConfig,

    /// Lock guarding copies of shared resources
    lock: Arc<dyn ResourceLock + Send + Sync>,
}

impl GenerationContext {
    /// Create a context writing to `output_dir`, without locking.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        GenerationContext {
            output_dir: output_dir.into(),
            debug: false,
            generate_mtest_on_failure: false,
            hosts: HostsConfig::default(),
            lock: Arc::new(NoLock),
        }
    }

    /// Create a context from the merged configuration.
    ///
    /// The lock is an [`MFrontLock`] placed where the configuration says.
    pub fn from_config(output_dir: impl Into<PathBuf>, config: &Config) -> Self {
        GenerationContext {
            output_dir: output_dir.into(),
            debug: config.generation.debug.unwrap_or(false),
            generate_mtest_on_failure: config.generation.generate_mtest_on_failure.unwrap_or(false),
            hosts: config.hosts.clone(),
            lock: Arc::new(MFrontLock::new(
                config.lock.lock_path(),
                config.lock.timeout(),
            )),
        }
    }

    /// Replace the resource lock.
    pub fn with_lock(mut self, lock: Arc<dyn ResourceLock + Send + Sync>) -> Self {
        self.lock = lock;
        self
    }

    /// Set debug mode.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Set the MTest-on-failure default.
    pub fn set_generate_mtest_on_failure(&mut self, b: bool) {
        self.generate_mtest_on_failure = b;
    }

    pub fn set_hosts(&mut self, hosts: HostsConfig) {
        self.hosts = hosts;
    }

    /// Root of the generated tree.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory of generated headers.
    pub fn include_dir(&self) -> PathBuf {
        self.output_dir.join("include")
    }

    /// Directory of generated sources.
    pub fn src_dir(&self) -> PathBuf {
        self.output_dir.join("src")
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn generate_mtest_on_failure(&self) -> bool {
        self.generate_mtest_on_failure
    }

    pub fn hosts(&self) -> &HostsConfig {
        &self.hosts
    }

    pub fn lock(&self) -> &dyn ResourceLock {
        self.lock.as_ref()
    }
}
