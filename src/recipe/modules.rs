//! Helper modules recipes can `require`.

use mlua::{Lua, LuaSerdeExt, Result, SerializeOptions, Table, Value};

/// Convert JSON into a Lua value. JSON `null` becomes `nil`.
pub(crate) fn json_to_lua(lua: &Lua, value: &serde_json::Value) -> Result<Value> {
    let options = SerializeOptions::new()
        .serialize_none_to_null(false)
        .serialize_unit_to_null(false);
    lua.to_value_with(value, options)
}

/// The `json` module: `encode(value)` and `decode(string)`.
pub fn json_module(lua: &Lua) -> Result<Table> {
    let json = lua.create_table()?;

    json.set(
        "encode",
        lua.create_function(|lua, value: Value| {
            let value: serde_json::Value = lua.from_value(value)?;
            serde_json::to_string(&value)
                .map_err(|e| mlua::Error::runtime(format!("JSON encode error: {}", e)))
        })?,
    )?;

    json.set(
        "decode",
        lua.create_function(|lua, source: String| {
            let value: serde_json::Value = serde_json::from_str(&source)
                .map_err(|e| mlua::Error::runtime(format!("JSON decode error: {}", e)))?;
            json_to_lua(lua, &value)
        })?,
    )?;

    Ok(json)
}

/// The `env` module: `get(name)` and `set(name, value)` on the process
/// environment.
pub fn env_module(lua: &Lua) -> Result<Table> {
    let env = lua.create_table()?;

    env.set(
        "get",
        lua.create_function(|_, name: String| Ok(std::env::var(name).ok()))?,
    )?;

    env.set(
        "set",
        lua.create_function(|_, (name, value): (String, String)| {
            if name.is_empty() || name.contains('=') || name.contains('\0') {
                return Err(mlua::Error::runtime(format!(
                    "invalid environment variable name: {:?}",
                    name
                )));
            }
            std::env::set_var(name, value);
            Ok(())
        })?,
    )?;

    Ok(env)
}
