//! Recipe data model: build targets, their property bags and value snapshots.
//!
//! Scripts write into a [`PropertyBag`] through [`AttributeAccess`]; the
//! execution pipeline later reads owned [`Value`] snapshots out of it.

mod target;
mod value;

pub use target::{AttributeAccess, BuildTarget, PropertyBag};
pub use value::{Table, Value};
