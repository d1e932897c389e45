//! The `var` table visible to recipes.

use super::modules::json_to_lua;
use crate::error::{Error, Result};
use mlua::Lua;
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::Path;

/// Top-level recipe variables, seeded with host facts.
#[derive(Debug, Clone, PartialEq)]
pub struct Variables {
    values: Map<String, JsonValue>,
}

impl Variables {
    /// Variables holding only `ARCH` and `OS`.
    pub fn new() -> Self {
        let mut values = Map::new();
        values.insert("ARCH".into(), std::env::consts::ARCH.into());
        values.insert("OS".into(), std::env::consts::OS.into());
        Self { values }
    }

    /// Value of a variable.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Overlay a JSON object; later keys replace earlier ones.
    pub fn merge_json(&mut self, json: &str) -> Result<()> {
        match serde_json::from_str::<JsonValue>(json)? {
            JsonValue::Object(map) => {
                self.values.extend(map);
                Ok(())
            }
            other => Err(Error::Variables(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Overlay a JSON object read from a file.
    pub fn merge_json_file(&mut self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path)?;
        self.merge_json(&json)
    }

    /// Publish the variables as the global `var` table.
    ///
    /// JSON `null` values read as `nil`.
    pub fn install(&self, lua: &Lua) -> Result<()> {
        let table = json_to_lua(lua, &JsonValue::Object(self.values.clone()))?;
        lua.globals().set("var", table)?;
        Ok(())
    }
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_host_facts() {
        let vars = Variables::new();
        assert_eq!(vars.get("OS"), Some(&json!(std::env::consts::OS)));
        assert_eq!(vars.get("ARCH"), Some(&json!(std::env::consts::ARCH)));
    }

    #[test]
    fn test_merge_overrides_top_level() {
        let mut vars = Variables::new();
        vars.merge_json(r#"{"name": "first", "n": 1}"#).unwrap();
        vars.merge_json(r#"{"name": "second", "OS": "plan9"}"#).unwrap();

        assert_eq!(vars.get("name"), Some(&json!("second")));
        assert_eq!(vars.get("n"), Some(&json!(1)));
        assert_eq!(vars.get("OS"), Some(&json!("plan9")));
    }

    #[test]
    fn test_merge_rejects_non_object() {
        let mut vars = Variables::new();
        let err = vars.merge_json("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::Variables(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_merge_rejects_malformed_json() {
        let mut vars = Variables::new();
        assert!(matches!(
            vars.merge_json("{name:"),
            Err(Error::Variables(_))
        ));
    }

    #[test]
    fn test_install_sets_global() {
        let lua = Lua::new();
        let mut vars = Variables::new();
        vars.merge_json(r#"{"title": "Report", "nested": {"depth": 2}}"#)
            .unwrap();
        vars.install(&lua).unwrap();

        let title: String = lua.load("return var.title").eval().unwrap();
        let depth: i64 = lua.load("return var.nested.depth").eval().unwrap();
        let os: String = lua.load("return var.OS").eval().unwrap();
        assert_eq!(title, "Report");
        assert_eq!(depth, 2);
        assert_eq!(os, std::env::consts::OS);
    }

    #[test]
    fn test_null_variable_is_nil() {
        let lua = Lua::new();
        let mut vars = Variables::new();
        vars.merge_json(r#"{"flag": null, "list": [null, 2]}"#).unwrap();
        vars.install(&lua).unwrap();

        let flag_is_nil: bool = lua.load("return var.flag == nil").eval().unwrap();
        let second: i64 = lua.load("return var.list[2]").eval().unwrap();
        assert!(flag_is_nil);
        assert_eq!(second, 2);
    }
}
