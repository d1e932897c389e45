//! Recipe scripting surface.
//!
//! A recipe is a Lua script that declares build targets through the
//! global `pdf` function:
//!
//! ```lua
//! pdf "report.pdf" {
//!     options = { margin_top = 20 },
//!     pages = { { input = "index.html" } },
//! }
//!
//! local t = pdf("notes.pdf")
//! t.pages = { input_content = "<h1>Notes</h1>" }
//! ```
//!
//! Both forms end in the same [`Registry`]. `pdf` is also available as
//! `require("html2pdf").pdf`, next to the `json` and `env` helper modules.

mod modules;
mod registry;
mod variables;

pub use registry::{Registry, SharedRegistry, TargetHandle};
pub use variables::Variables;

use crate::error::Result;
use mlua::{Function, Lua, Table};

/// Install `pdf` and the preloaded modules into a Lua state.
pub fn install(lua: &Lua, registry: &SharedRegistry) -> Result<()> {
    let pdf = pdf_function(lua, registry)?;
    lua.globals().set("pdf", pdf.clone())?;

    let package: Table = lua.globals().get("package")?;
    let preload: Table = package.get("preload")?;

    preload.set(
        "html2pdf",
        lua.create_function(move |lua, ()| {
            let module = lua.create_table()?;
            module.set("pdf", pdf.clone())?;
            Ok(module)
        })?,
    )?;
    preload.set(
        "json",
        lua.create_function(|lua, ()| modules::json_module(lua))?,
    )?;
    preload.set(
        "env",
        lua.create_function(|lua, ()| modules::env_module(lua))?,
    )?;

    Ok(())
}

fn pdf_function(lua: &Lua, registry: &SharedRegistry) -> Result<Function> {
    let registry = registry.clone();
    let pdf = lua.create_function(move |_, (name, attributes): (String, Option<Table>)| {
        let handle = TargetHandle::register(&registry, name);
        if let Some(attributes) = attributes {
            handle.apply_attributes(&attributes)?;
        }
        Ok(handle)
    })?;
    Ok(pdf)
}
