//! Build targets and their property bags.

use super::value::Value;
use crate::error::{Error, Result};
use crate::resolve::{
    resolve_cover, resolve_pages, resolve_toc, ContentComponent, Options, GLOBAL_OPTIONS,
};
use std::collections::HashMap;
use std::path::PathBuf;

/// Read/write access to arbitrary named attributes.
///
/// Anything exposing `get`/`set` can back a scripting handle; bulk
/// assignment is built on top of `set` so every declaration syntax ends
/// up on the same mutation path.
pub trait AttributeAccess {
    /// Name used in error messages.
    fn owner(&self) -> &str;

    /// Current value of an attribute, nil when unset.
    fn get(&self, key: &str) -> mlua::Value;

    /// Assign an attribute.
    fn set(&mut self, key: &str, value: mlua::Value);

    /// Assign every entry of a script table.
    ///
    /// All keys must be strings. The table is checked before anything is
    /// assigned, so a bad key leaves the attributes untouched.
    fn apply_attributes(&mut self, attributes: &mlua::Table) -> Result<()> {
        let mut entries = Vec::new();
        for pair in attributes.clone().pairs::<mlua::Value, mlua::Value>() {
            let (key, value) = pair?;
            match key {
                mlua::Value::String(key) => entries.push((key.to_str()?.to_string(), value)),
                _ => return Err(Error::InvalidKey(self.owner().to_string())),
            }
        }
        for (key, value) in entries {
            self.set(&key, value);
        }
        Ok(())
    }
}

/// Raw script values keyed by attribute name.
///
/// Values are kept as live runtime references: a nested table stored here
/// can still be mutated by the script until execution starts.
#[derive(Debug, Default)]
pub struct PropertyBag {
    values: HashMap<String, mlua::Value>,
}

impl PropertyBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value of a key, if set.
    pub fn raw(&self, key: &str) -> Option<&mlua::Value> {
        self.values.get(key)
    }

    /// Store a value. Assigning nil removes the key.
    pub fn insert(&mut self, key: &str, value: mlua::Value) {
        if value.is_nil() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), value);
        }
    }

    /// Owned snapshot of a key, if set.
    pub fn snapshot(&self, key: &str) -> Result<Option<Value>> {
        self.values.get(key).map(Value::from_lua).transpose()
    }

    /// Number of attributes set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One named PDF-generation job declared by a recipe.
#[derive(Debug)]
pub struct BuildTarget {
    name: String,
    bag: PropertyBag,
    options: Option<Options>,
}

impl BuildTarget {
    /// Create a target with an empty property bag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bag: PropertyBag::new(),
            options: None,
        }
    }

    /// Target name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target's property bag.
    pub fn bag(&self) -> &PropertyBag {
        &self.bag
    }

    /// Output path: the `output_file` attribute if it is a string,
    /// otherwise the target name.
    pub fn output_file(&self) -> PathBuf {
        match self.bag.raw("output_file") {
            Some(mlua::Value::String(s)) => PathBuf::from(s.to_string_lossy().to_string()),
            _ => PathBuf::from(&self.name),
        }
    }

    /// Document options, resolved on first use from the `options` attribute.
    pub fn options(&mut self) -> Result<&Options> {
        if self.options.is_none() {
            let options = match self.bag.snapshot("options")? {
                None => Options::new(GLOBAL_OPTIONS),
                Some(Value::Table(table)) => {
                    Options::resolve(&self.name, "options", &table, GLOBAL_OPTIONS)?
                }
                Some(_) => {
                    return Err(Error::InvalidFormat {
                        target: self.name.clone(),
                        message: "options only support table.".into(),
                    })
                }
            };
            self.options = Some(options);
        }
        Ok(self.options.get_or_insert_with(|| Options::new(GLOBAL_OPTIONS)))
    }

    /// Resolved cover, if declared.
    pub fn cover(&self) -> Result<Option<ContentComponent>> {
        resolve_cover(&self.name, self.bag.snapshot("cover")?.as_ref())
    }

    /// Resolved pages, in declaration order.
    pub fn pages(&self) -> Result<Vec<ContentComponent>> {
        resolve_pages(&self.name, self.bag.snapshot("pages")?.as_ref())
    }

    /// Resolved table of contents, if declared.
    pub fn toc(&self) -> Result<Option<ContentComponent>> {
        resolve_toc(&self.name, self.bag.snapshot("toc")?.as_ref())
    }
}

impl AttributeAccess for BuildTarget {
    fn owner(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> mlua::Value {
        self.bag.raw(key).cloned().unwrap_or(mlua::Value::Nil)
    }

    fn set(&mut self, key: &str, value: mlua::Value) {
        self.bag.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlua::Lua;

    fn table(lua: &Lua, source: &str) -> mlua::Table {
        lua.load(source).eval().unwrap()
    }

    #[test]
    fn test_get_unset_is_nil() {
        let target = BuildTarget::new("a.pdf");
        assert!(target.get("pages").is_nil());
    }

    #[test]
    fn test_apply_attributes() {
        let lua = Lua::new();
        let mut target = BuildTarget::new("a.pdf");
        target
            .apply_attributes(&table(&lua, r#"return { output_file = "b.pdf", x = 1 }"#))
            .unwrap();

        assert_eq!(target.bag().len(), 2);
        assert_eq!(target.output_file(), PathBuf::from("b.pdf"));
    }

    #[test]
    fn test_non_string_key_names_target() {
        let lua = Lua::new();
        let mut target = BuildTarget::new("broken");
        let err = target
            .apply_attributes(&table(&lua, r#"return { title = "t", [1] = "x" }"#))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidKey(ref name) if name == "broken"));
        assert!(target.bag().is_empty());
    }

    #[test]
    fn test_output_file_defaults_to_name() {
        let target = BuildTarget::new("report.pdf");
        assert_eq!(target.output_file(), PathBuf::from("report.pdf"));
    }

    #[test]
    fn test_nil_assignment_removes() {
        let lua = Lua::new();
        let mut target = BuildTarget::new("a.pdf");
        target.set("title", mlua::Value::String(lua.create_string("t").unwrap()));
        target.set("title", mlua::Value::Nil);
        assert!(target.bag().is_empty());
    }

    #[test]
    fn test_options_resolved_lazily() {
        let lua = Lua::new();
        let mut target = BuildTarget::new("a.pdf");
        target
            .apply_attributes(&table(
                &lua,
                r#"return { options = { margin_top = "20", grayscale = true } }"#,
            ))
            .unwrap();

        let options = target.options().unwrap();
        assert_eq!(options.uint("margin_top"), Some(20));
        assert_eq!(options.flag("grayscale"), Some(true));
        assert!(!options.is_set("dpi"));
    }

    #[test]
    fn test_options_must_be_table() {
        let lua = Lua::new();
        let mut target = BuildTarget::new("a.pdf");
        target
            .apply_attributes(&table(&lua, r#"return { options = "landscape" }"#))
            .unwrap();
        assert!(target.options().is_err());
    }

    #[test]
    fn test_nested_mutation_is_visible() {
        let lua = Lua::new();
        let mut target = BuildTarget::new("a.pdf");
        let attributes = table(&lua, r#"return { options = {} }"#);
        target.apply_attributes(&attributes).unwrap();

        let options: mlua::Table = attributes.get("options").unwrap();
        options.set("dpi", "300").unwrap();

        assert_eq!(target.options().unwrap().uint("dpi"), Some(300));
    }
}
