//! Renderer configuration and invocation.
//!
//! A [`RenderJob`] is the fully resolved configuration for one build
//! target: document options, an optional cover, an optional table of
//! contents and the ordered pages. A [`Renderer`] turns a job into PDF
//! bytes.

mod wkhtmltopdf;

pub use wkhtmltopdf::Wkhtmltopdf;

use crate::error::Result;
use crate::resolve::{Options, GLOBAL_OPTIONS};
use std::ffi::OsString;
use std::path::PathBuf;

/// A materialized cover or page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInput {
    /// Path or URL the renderer reads
    pub input: PathBuf,
    /// Style sheet path, if any
    pub user_style_sheet: Option<PathBuf>,
    /// Per-input options
    pub options: Options,
}

/// A materialized table of contents.
#[derive(Debug, Clone, PartialEq)]
pub struct TocInput {
    /// Style sheet path, if any
    pub user_style_sheet: Option<PathBuf>,
    /// Table-of-contents options
    pub options: Options,
}

/// Everything the renderer needs to produce one PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    options: Options,
    cover: Option<PageInput>,
    toc: Option<TocInput>,
    pages: Vec<PageInput>,
}

impl RenderJob {
    /// Create a job with document options set once.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            cover: None,
            toc: None,
            pages: Vec::new(),
        }
    }

    /// Set the cover.
    pub fn set_cover(&mut self, cover: PageInput) {
        self.cover = Some(cover);
    }

    /// Include a table of contents.
    pub fn set_toc(&mut self, toc: TocInput) {
        self.toc = Some(toc);
    }

    /// Append a page.
    pub fn add_page(&mut self, page: PageInput) {
        self.pages.push(page);
    }

    /// Document options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Cover, if set.
    pub fn cover(&self) -> Option<&PageInput> {
        self.cover.as_ref()
    }

    /// Table of contents, if included.
    pub fn toc(&self) -> Option<&TocInput> {
        self.toc.as_ref()
    }

    /// Pages in order.
    pub fn pages(&self) -> &[PageInput] {
        &self.pages
    }

    /// Command-line arguments for wkhtmltopdf, ending with `-` so the PDF
    /// is written to standard output.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.options.args().into_iter().map(Into::into).collect();

        if let Some(cover) = &self.cover {
            args.push("cover".into());
            push_page(&mut args, cover);
        }
        if let Some(toc) = &self.toc {
            args.push("toc".into());
            args.extend(toc.options.args().into_iter().map(Into::into));
            push_style_sheet(&mut args, toc.user_style_sheet.as_ref());
        }
        for page in &self.pages {
            args.push("page".into());
            push_page(&mut args, page);
        }

        args.push("-".into());
        args
    }
}

impl Default for RenderJob {
    fn default() -> Self {
        Self::new(Options::new(GLOBAL_OPTIONS))
    }
}

fn push_page(args: &mut Vec<OsString>, page: &PageInput) {
    args.push(page.input.clone().into_os_string());
    args.extend(page.options.args().into_iter().map(Into::into));
    push_style_sheet(args, page.user_style_sheet.as_ref());
}

fn push_style_sheet(args: &mut Vec<OsString>, style: Option<&PathBuf>) {
    if let Some(style) = style {
        args.push("--user-style-sheet".into());
        args.push(style.clone().into_os_string());
    }
}

/// Something that renders a job into PDF bytes.
pub trait Renderer {
    /// Run the job synchronously and return the produced PDF.
    fn create(&self, job: &RenderJob) -> Result<Vec<u8>>;
}
