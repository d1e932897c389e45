//! Owned snapshot of values assigned by recipe scripts.
//!
//! The property bag keeps live Lua references so scripts can keep mutating
//! nested tables until execution starts. Resolution works on a [`Value`]
//! snapshot taken at run time, which keeps the resolvers free of any
//! scripting-runtime types.

use crate::error::{Error, Result};

/// Nested tables deeper than this are treated as cyclic.
const MAX_DEPTH: usize = 64;

/// A script value copied out of the Lua runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Nil,
    /// Boolean
    Boolean(bool),
    /// Integer number
    Integer(i64),
    /// Floating point number
    Number(f64),
    /// UTF-8 string
    String(String),
    /// String holding bytes that are not valid UTF-8
    Bytes(Vec<u8>),
    /// Table (array-like, map-like or mixed)
    Table(Table),
    /// Function (opaque once snapshotted)
    Function,
    /// Any other runtime type, named by its Lua type name
    Other(&'static str),
}

impl Value {
    /// Copy a Lua value, recursing into tables.
    pub fn from_lua(value: &mlua::Value) -> Result<Self> {
        Self::from_lua_at(value, 0)
    }

    fn from_lua_at(value: &mlua::Value, depth: usize) -> Result<Self> {
        Ok(match value {
            mlua::Value::Nil => Value::Nil,
            mlua::Value::Boolean(b) => Value::Boolean(*b),
            mlua::Value::Integer(i) => Value::Integer(*i),
            mlua::Value::Number(n) => Value::Number(*n),
            mlua::Value::String(s) => {
                let bytes = s.as_bytes();
                match std::str::from_utf8(&bytes) {
                    Ok(text) => Value::String(text.to_string()),
                    Err(_) => Value::Bytes(bytes.to_vec()),
                }
            }
            mlua::Value::Function(_) => Value::Function,
            mlua::Value::Table(t) => {
                if depth >= MAX_DEPTH {
                    return Err(Error::Other(format!(
                        "table nesting exceeds {} levels (cyclic table?)",
                        MAX_DEPTH
                    )));
                }
                Value::Table(Table::from_lua_at(t, depth + 1)?)
            }
            other => Value::Other(other.type_name()),
        })
    }

    /// Lua-style type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Number(_) => "number",
            Value::String(_) | Value::Bytes(_) => "string",
            Value::Table(_) => "table",
            Value::Function => "function",
            Value::Other(name) => *name,
        }
    }

    /// Check for nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of a string value, whatever its encoding.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow the table payload, if this is a table.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        match String::from_utf8(b) {
            Ok(s) => Value::String(s),
            Err(err) => Value::Bytes(err.into_bytes()),
        }
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

/// An ordered copy of a Lua table.
///
/// Entries with positive integer keys come first, in key order, followed by
/// every other entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    entries: Vec<(Value, Value)>,
    max_index: usize,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an array-shaped table from a list of values.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut table = Self::new();
        for item in items {
            table.push(item);
        }
        table
    }

    fn from_lua_at(table: &mlua::Table, depth: usize) -> Result<Self> {
        let mut indexed = Vec::new();
        let mut others = Vec::new();
        for pair in table.clone().pairs::<mlua::Value, mlua::Value>() {
            let (k, v) = pair?;
            match k {
                mlua::Value::Integer(i) if i >= 1 => {
                    indexed.push((i, Value::from_lua_at(&v, depth)?));
                }
                k => others.push((
                    Value::from_lua_at(&k, depth)?,
                    Value::from_lua_at(&v, depth)?,
                )),
            }
        }
        indexed.sort_by_key(|(i, _)| *i);

        let max_index = indexed
            .last()
            .map_or(0, |(i, _)| usize::try_from(*i).unwrap_or(usize::MAX));
        let mut entries: Vec<(Value, Value)> = indexed
            .into_iter()
            .map(|(i, v)| (Value::Integer(i), v))
            .collect();
        entries.extend(others);
        Ok(Self { entries, max_index })
    }

    /// Builder-style string-keyed insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a string-keyed entry.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k.as_str() == Some(key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((Value::from(key), value)),
        }
    }

    /// Append after the largest integer key.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.max_index += 1;
        self.entries
            .push((Value::Integer(self.max_index as i64), value.into()));
    }

    /// Look up a string key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Largest positive integer key, 0 when there is none.
    pub fn max_index(&self) -> usize {
        self.max_index
    }

    /// A table with any positive integer key is array-shaped, holes
    /// included.
    pub fn is_array(&self) -> bool {
        self.max_index > 0
    }

    /// Iterate over all entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterate over the string keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
