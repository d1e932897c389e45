//! Resolution of loosely-typed recipe values into renderer parameters.

mod component;
mod options;

pub use component::{resolve_cover, resolve_pages, resolve_toc, ComponentKind, ContentComponent};
pub use options::{
    OptionField, OptionKind, OptionValue, Options, GLOBAL_OPTIONS, PAGE_OPTIONS, TOC_OPTIONS,
};
