//! wkhtmltopdf process driver.

use super::{RenderJob, Renderer};
use crate::error::{Error, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs the wkhtmltopdf binary once per job.
#[derive(Debug, Clone)]
pub struct Wkhtmltopdf {
    binary: PathBuf,
}

impl Wkhtmltopdf {
    /// Create a driver for the given binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Binary this driver runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Renderer for Wkhtmltopdf {
    /// Blocks until the process exits; there is no timeout.
    fn create(&self, job: &RenderJob) -> Result<Vec<u8>> {
        let args = job.args();
        debug!(
            "    (Debug) wkhtmltopdf args: {}",
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| Error::RendererUnavailable {
                path: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::Renderer {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
