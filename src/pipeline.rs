//! Execution of registered build targets.
//!
//! Targets run one at a time in declaration order. The first failure
//! stops the run; targets after it are never attempted. Scratch files
//! stay recorded in the [`Materializer`] until it is cleaned up.

use crate::error::Result;
use crate::materialize::Materializer;
use crate::model::BuildTarget;
use crate::render::{PageInput, RenderJob, Renderer, TocInput};
use crate::resolve::ContentComponent;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Run every target in order, stopping at the first failure.
pub fn run_targets(
    targets: Vec<BuildTarget>,
    materializer: &mut Materializer,
    renderer: &dyn Renderer,
) -> Result<()> {
    info!("==> Loaded {} pdf config.", targets.len());
    for mut target in targets {
        execute(&mut target, materializer, renderer)?;
    }
    info!("==> Complete!");
    Ok(())
}

/// Resolve, materialize and render one target, then write its output file.
///
/// Every component is resolved before any content is written, so a
/// malformed `cover`, `pages` or `toc` fails without leaving scratch files.
pub fn execute(
    target: &mut BuildTarget,
    materializer: &mut Materializer,
    renderer: &dyn Renderer,
) -> Result<()> {
    let output_file = target.output_file();
    info!("==> Processing: {}", target.name());
    info!("    output_file: {}", output_file.display());

    let options = target.options()?.clone();
    debug!("    (Debug) options: {:?}", options.args());

    let cover = target.cover()?;
    let pages = target.pages()?;
    let toc = target.toc()?;

    let name = target.name();
    let mut job = RenderJob::new(options);
    if let Some(cover) = &cover {
        job.set_cover(page_input(cover, name, materializer)?);
    }
    if let Some(toc) = &toc {
        job.set_toc(TocInput {
            user_style_sheet: materializer.materialize_style_sheet(toc)?,
            options: toc.options.clone(),
        });
    }
    for page in &pages {
        job.add_page(page_input(page, name, materializer)?);
    }

    let pdf = renderer.create(&job)?;
    write_output(&output_file, &pdf)
}

fn page_input(
    component: &ContentComponent,
    target: &str,
    materializer: &mut Materializer,
) -> Result<PageInput> {
    Ok(PageInput {
        input: materializer.materialize(component, target)?,
        user_style_sheet: materializer.materialize_style_sheet(component)?,
        options: component.options.clone(),
    })
}

fn write_output(path: &Path, pdf: &[u8]) -> Result<()> {
    fs::write(path, pdf)?;
    debug!(
        "    (Debug) wrote {} bytes to {}",
        pdf.len(),
        path.display()
    );
    Ok(())
}
