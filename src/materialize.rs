//! Materialization of inline content into scratch files.
//!
//! wkhtmltopdf only reads documents from paths, so literal markup and
//! style sheets from a recipe are written to uniquely named files in the
//! scratch directory. Every created file is recorded and deleted by
//! [`Materializer::cleanup`] (also run on drop).

use crate::error::{Error, Result};
use crate::resolve::ContentComponent;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Kind of content written to a scratch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML document
    Markup,
    /// CSS style sheet
    Stylesheet,
}

impl ContentKind {
    /// File suffix for this kind, including the dot.
    pub fn suffix(&self) -> &'static str {
        match self {
            ContentKind::Markup => ".html",
            ContentKind::Stylesheet => ".css",
        }
    }
}

/// Owner of the scratch directory and of every file created in it.
#[derive(Debug)]
pub struct Materializer {
    dir: PathBuf,
    created: Vec<PathBuf>,
}

impl Materializer {
    /// Create a materializer writing into `dir`.
    ///
    /// The directory itself is not created here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            created: Vec::new(),
        }
    }

    /// Scratch directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files created so far and not yet cleaned up.
    pub fn created(&self) -> &[PathBuf] {
        &self.created
    }

    /// Write `content` to a new owner-only file and record it for deletion.
    ///
    /// Bytes are written as given, whatever their encoding. Identical
    /// content still yields a new file on every call.
    pub fn write_content(
        &mut self,
        content: impl AsRef<[u8]>,
        kind: ContentKind,
    ) -> Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix("html2pdf")
            .suffix(kind.suffix())
            .tempfile_in(&self.dir)?;
        file.write_all(content.as_ref())?;
        file.flush()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        let (_, path) = file.keep().map_err(|err| Error::Io(err.error))?;
        debug!("    (Debug) Created tmpfile: {}", path.display());
        self.created.push(path.clone());
        Ok(path)
    }

    /// Resolve a component's input to a path the renderer can read.
    ///
    /// `input_content` takes precedence and is written to a markup file;
    /// otherwise `input` is returned unchanged, without checking that it
    /// exists. A component with neither fails, naming `target`.
    pub fn materialize(&mut self, component: &ContentComponent, target: &str) -> Result<PathBuf> {
        if let Some(content) = component.input_content.as_deref() {
            return self.write_content(content, ContentKind::Markup);
        }
        match component.input.as_deref() {
            Some(input) => Ok(PathBuf::from(input)),
            None => Err(Error::MissingInput(target.to_string())),
        }
    }

    /// Resolve a component's user style sheet, if it declares one.
    pub fn materialize_style_sheet(
        &mut self,
        component: &ContentComponent,
    ) -> Result<Option<PathBuf>> {
        if let Some(content) = component.user_style_sheet_content.as_deref() {
            return self.write_content(content, ContentKind::Stylesheet).map(Some);
        }
        Ok(component.user_style_sheet.as_deref().map(PathBuf::from))
    }

    /// Delete every recorded file.
    pub fn cleanup(&mut self) {
        for path in self.created.drain(..) {
            if let Err(err) = fs::remove_file(&path) {
                debug!(
                    "    (Debug) Failed to remove tmpfile {}: {}",
                    path.display(),
                    err
                );
            }
        }
    }
}

impl Drop for Materializer {
    fn drop(&mut self) {
        self.cleanup();
    }
}
