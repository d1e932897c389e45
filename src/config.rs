//! Process-wide runtime configuration: cache layout and renderer binary.

use crate::error::Result;
use log::debug;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

/// Name of the cache directory under the system temp directory.
pub const CACHE_DIR_NAME: &str = "html2pdf_cache";

#[cfg(windows)]
const BINARY_NAME: &str = "wkhtmltopdf.exe";
#[cfg(not(windows))]
const BINARY_NAME: &str = "wkhtmltopdf";

/// Directories and binaries used by one run, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Cache root
    pub cache_dir: PathBuf,
    /// Renderer binaries
    pub bin_dir: PathBuf,
    /// Scratch space for materialized content
    pub tmp_dir: PathBuf,
    /// Explicit renderer binary, bypassing lookup
    pub wkhtmltopdf: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Lay out the cache under `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        Self {
            bin_dir: cache_dir.join("bin"),
            tmp_dir: cache_dir.join("tmp"),
            cache_dir,
            wkhtmltopdf: None,
        }
    }

    /// Use a specific renderer binary.
    pub fn with_wkhtmltopdf(mut self, binary: impl Into<PathBuf>) -> Self {
        self.wkhtmltopdf = Some(binary.into());
        self
    }

    /// Location of a renderer binary installed in the cache.
    pub fn cached_binary(&self) -> PathBuf {
        self.bin_dir.join(BINARY_NAME)
    }

    /// Renderer binary to run: the explicit one, else the cached one if
    /// present, else the bare name resolved through `PATH`.
    pub fn renderer_binary(&self) -> PathBuf {
        if let Some(binary) = &self.wkhtmltopdf {
            return binary.clone();
        }
        let cached = self.cached_binary();
        if cached.is_file() {
            return cached;
        }
        PathBuf::from(BINARY_NAME)
    }

    /// Create the cache, bin and tmp directories if missing.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.cache_dir, &self.tmp_dir, &self.bin_dir] {
            create_dir(dir)?;
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join(CACHE_DIR_NAME))
    }
}

/// Create a directory with mode 0o777, narrowed by the process umask.
fn create_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder.create(dir)?;
    debug!("    (Debug) created dir = {}", dir.display());
    Ok(())
}
