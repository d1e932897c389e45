//! # html2pdf
//!
//! Generate PDF documents from HTML with Lua recipes and wkhtmltopdf.
//!
//! A recipe declares one or more build targets. Each target names its
//! output file, document options, an optional cover, an optional table of
//! contents and its pages. Inline markup and style sheets are written to
//! scratch files, wkhtmltopdf renders every target in turn, and the
//! scratch files are removed afterwards.
//!
//! ## Quick Start
//!
//! ```no_run
//! use html2pdf::{App, RuntimeConfig};
//!
//! fn main() -> html2pdf::Result<()> {
//!     let mut app = App::new(RuntimeConfig::default())?;
//!     app.load_recipe(
//!         r#"
//!         pdf "hello.pdf" {
//!             options = { page_size = "A4", margin_top = 20 },
//!             pages = { input_content = "<h1>Hello</h1>" },
//!         }
//!         "#,
//!     )?;
//!     let result = app.run();
//!     app.close();
//!     result
//! }
//! ```

pub mod config;
pub mod error;
pub mod materialize;
pub mod model;
pub mod pipeline;
pub mod recipe;
pub mod render;
pub mod resolve;

// Re-export commonly used types
pub use config::RuntimeConfig;
pub use error::{Error, Result};
pub use materialize::{ContentKind, Materializer};
pub use model::{AttributeAccess, BuildTarget, PropertyBag};
pub use recipe::{Registry, SharedRegistry, TargetHandle, Variables};
pub use render::{PageInput, RenderJob, Renderer, TocInput, Wkhtmltopdf};
pub use resolve::{ComponentKind, ContentComponent, OptionValue, Options};

use log::{debug, info};
use mlua::Lua;
use std::fs;
use std::path::Path;

/// A recipe runtime: Lua state, declared targets, variables and scratch
/// files for one invocation.
///
/// # Example
///
/// ```no_run
/// use html2pdf::{App, RuntimeConfig};
///
/// let mut app = App::new(RuntimeConfig::default()).unwrap();
/// app.load_variables_from_json(r#"{"title": "Report"}"#).unwrap();
/// app.load_script_file("recipe.lua").unwrap();
/// let result = app.run();
/// app.close();
/// result.unwrap();
/// ```
pub struct App {
    registry: SharedRegistry,
    variables: Variables,
    config: RuntimeConfig,
    materializer: Materializer,
    lua: Lua,
}

impl App {
    /// Create a runtime with `pdf`, `var` and the helper modules installed.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let lua = Lua::new();
        let registry = Registry::shared();
        recipe::install(&lua, &registry)?;

        let variables = Variables::new();
        variables.install(&lua)?;

        Ok(Self {
            materializer: Materializer::new(config.tmp_dir.clone()),
            registry,
            variables,
            config,
            lua,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current recipe variables.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Overlay variables from a JSON object and refresh `var`.
    pub fn load_variables_from_json(&mut self, json: &str) -> Result<()> {
        self.variables.merge_json(json)?;
        self.variables.install(&self.lua)
    }

    /// Overlay variables from a JSON file and refresh `var`.
    pub fn load_variables_from_json_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.variables.merge_json_file(path.as_ref())?;
        self.variables.install(&self.lua)
    }

    /// Execute recipe source, registering the targets it declares.
    pub fn load_recipe(&mut self, source: &str) -> Result<()> {
        self.lua.load(source).set_name("=recipe").exec()?;
        Ok(())
    }

    /// Execute a recipe file.
    pub fn load_script_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        self.lua
            .load(source.as_str())
            .set_name(format!("@{}", path.display()))
            .exec()?;
        Ok(())
    }

    /// Number of targets declared so far.
    pub fn target_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Names of the declared targets, in declaration order.
    pub fn target_names(&self) -> Vec<String> {
        self.registry
            .borrow()
            .all()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    /// Render every declared target with wkhtmltopdf.
    pub fn run(&mut self) -> Result<()> {
        let renderer = Wkhtmltopdf::new(self.config.renderer_binary());
        self.run_with(&renderer)
    }

    /// Render every declared target with the given renderer.
    ///
    /// Targets are consumed: a second call finds nothing to do.
    pub fn run_with(&mut self, renderer: &dyn Renderer) -> Result<()> {
        info!("==> Starting html2pdf...");
        self.config.prepare()?;
        debug!(
            "    (Debug) wkhtmltopdf = {}",
            self.config.renderer_binary().display()
        );

        let targets = self.registry.borrow_mut().take_all();
        pipeline::run_targets(targets, &mut self.materializer, renderer)
    }

    /// Delete every scratch file created so far.
    pub fn close(&mut self) {
        self.materializer.cleanup();
    }
}
