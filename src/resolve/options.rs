//! Renderer option schemas and coercion of script values onto them.
//!
//! Every knob the renderer understands is described once, as data, in one
//! of the schema tables below. Resolution walks a schema and coerces each
//! matching table entry; fields the recipe leaves out stay unset and are
//! never passed to the renderer.

use crate::error::{Error, Result};
use crate::model::{Table, Value};
use std::collections::BTreeMap;

/// Type a renderer option expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Switch, emitted only when true
    Flag,
    /// Free text
    Text,
    /// Unsigned integer
    Uint,
}

/// One renderer option: recipe key, expected kind and command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionField {
    /// Key as written in recipe tables
    pub key: &'static str,
    /// Expected kind
    pub kind: OptionKind,
    /// Renderer command-line flag
    pub flag: &'static str,
}

const fn field(key: &'static str, kind: OptionKind, flag: &'static str) -> OptionField {
    OptionField { key, kind, flag }
}

use OptionKind::{Flag, Text, Uint};

/// Document-wide options, from a target's `options` table.
pub const GLOBAL_OPTIONS: &[OptionField] = &[
    field("cookie_jar", Text, "--cookie-jar"),
    field("copies", Uint, "--copies"),
    field("dpi", Uint, "--dpi"),
    field("grayscale", Flag, "--grayscale"),
    field("image_dpi", Uint, "--image-dpi"),
    field("image_quality", Uint, "--image-quality"),
    field("lowquality", Flag, "--lowquality"),
    field("margin_bottom", Uint, "--margin-bottom"),
    field("margin_left", Uint, "--margin-left"),
    field("margin_right", Uint, "--margin-right"),
    field("margin_top", Uint, "--margin-top"),
    field("orientation", Text, "--orientation"),
    field("no_collate", Flag, "--no-collate"),
    field("page_height", Uint, "--page-height"),
    field("page_size", Text, "--page-size"),
    field("page_width", Uint, "--page-width"),
    field("no_pdf_compression", Flag, "--no-pdf-compression"),
    field("title", Text, "--title"),
    // outline
    field("no_outline", Flag, "--no-outline"),
    field("outline_depth", Uint, "--outline-depth"),
];

/// Per-input options shared by the cover and every page.
pub const PAGE_OPTIONS: &[OptionField] = &[
    field("encoding", Text, "--encoding"),
    field("page_offset", Uint, "--page-offset"),
];

/// Table-of-contents options, including the per-input ones.
pub const TOC_OPTIONS: &[OptionField] = &[
    field("disable_dotted_lines", Flag, "--disable-dotted-lines"),
    field("toc_header_text", Text, "--toc-header-text"),
    field("toc_level_indentation", Uint, "--toc-level-indentation"),
    field("disable_toc_links", Flag, "--disable-toc-links"),
    field("encoding", Text, "--encoding"),
    field("page_offset", Uint, "--page-offset"),
];

/// A resolved option value in the renderer's native type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Switch state
    Flag(bool),
    /// Text value
    Text(String),
    /// Unsigned integer value
    Uint(u64),
}

/// Where a value being coerced lives: owning target and component key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub target: &'a str,
    pub context: &'a str,
}

impl Scope<'_> {
    fn invalid_uint(&self, field: &str, value: String) -> Error {
        Error::InvalidUint {
            target: self.target.to_string(),
            context: self.context.to_string(),
            field: field.to_string(),
            value,
        }
    }

    fn invalid_type(&self, field: &str, found: &'static str) -> Error {
        Error::InvalidOptionType {
            target: self.target.to_string(),
            context: self.context.to_string(),
            field: field.to_string(),
            found,
        }
    }
}

/// Resolved options for one schema.
///
/// A key missing here means "no override": the renderer default applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    schema: &'static [OptionField],
    values: BTreeMap<&'static str, OptionValue>,
}

impl Options {
    /// Create an empty set of options for a schema.
    pub fn new(schema: &'static [OptionField]) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Resolve a script table against a schema.
    ///
    /// `target` and `context` (the attribute the table came from) are
    /// carried into coercion errors. Keys outside the schema are ignored.
    pub fn resolve(
        target: &str,
        context: &str,
        table: &Table,
        schema: &'static [OptionField],
    ) -> Result<Self> {
        let scope = Scope { target, context };
        let mut options = Self::new(schema);
        for field in schema {
            let Some(raw) = table.get(field.key) else {
                continue;
            };
            if let Some(value) = coerce(scope, field, raw)? {
                options.values.insert(field.key, value);
            }
        }
        Ok(options)
    }

    /// Schema these options were resolved against.
    pub fn schema(&self) -> &'static [OptionField] {
        self.schema
    }

    /// Look up a resolved value.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Check whether a field was set by the recipe.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Resolved unsigned integer, if set.
    pub fn uint(&self, key: &str) -> Option<u64> {
        match self.values.get(key) {
            Some(OptionValue::Uint(n)) => Some(*n),
            _ => None,
        }
    }

    /// Resolved switch state, if set.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(OptionValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// Resolved text, if set.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(OptionValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Number of fields set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renderer arguments in schema order.
    ///
    /// Switches are emitted only when true; unset fields are skipped.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for field in self.schema {
            match self.values.get(field.key) {
                Some(OptionValue::Flag(true)) => args.push(field.flag.to_string()),
                Some(OptionValue::Flag(false)) | None => {}
                Some(OptionValue::Text(s)) => {
                    args.push(field.flag.to_string());
                    args.push(s.clone());
                }
                Some(OptionValue::Uint(n)) => {
                    args.push(field.flag.to_string());
                    args.push(n.to_string());
                }
            }
        }
        args
    }
}

/// Coerce a value into a text field. Empty strings count as absent.
///
/// Strings that are not valid UTF-8 are converted lossily.
pub(crate) fn coerce_text(scope: Scope, key: &str, value: &Value) -> Result<Option<String>> {
    Ok(coerce_bytes(scope, key, value)?.map(|b| String::from_utf8_lossy(&b).into_owned()))
}

/// Coerce a value into raw content bytes. Empty strings count as absent.
pub(crate) fn coerce_bytes(scope: Scope, key: &str, value: &Value) -> Result<Option<Vec<u8>>> {
    match value {
        Value::Nil => Ok(None),
        Value::String(_) | Value::Bytes(_) => Ok(value
            .as_bytes()
            .filter(|b| !b.is_empty())
            .map(<[u8]>::to_vec)),
        Value::Integer(i) => Ok(Some(i.to_string().into_bytes())),
        Value::Number(n) => Ok(Some(n.to_string().into_bytes())),
        other => Err(scope.invalid_type(key, other.type_name())),
    }
}

fn coerce_uint(scope: Scope, key: &str, value: &Value) -> Result<Option<u64>> {
    match value {
        Value::Nil => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        // Digits only: no sign, no whitespace.
        Value::String(s) if s.bytes().all(|b| b.is_ascii_digit()) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| scope.invalid_uint(key, s.clone())),
        Value::String(s) => Err(scope.invalid_uint(key, s.clone())),
        Value::Bytes(b) => {
            let raw = String::from_utf8_lossy(b).into_owned();
            Err(scope.invalid_uint(key, raw))
        }
        Value::Integer(i) => u64::try_from(*i)
            .map(Some)
            .map_err(|_| scope.invalid_uint(key, i.to_string())),
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n < u64::MAX as f64 => {
            Ok(Some(*n as u64))
        }
        Value::Number(n) => Err(scope.invalid_uint(key, n.to_string())),
        other => Err(scope.invalid_type(key, other.type_name())),
    }
}

fn coerce(scope: Scope, field: &OptionField, value: &Value) -> Result<Option<OptionValue>> {
    match field.kind {
        OptionKind::Flag => match value {
            Value::Nil => Ok(None),
            Value::Boolean(b) => Ok(Some(OptionValue::Flag(*b))),
            other => Err(scope.invalid_type(field.key, other.type_name())),
        },
        OptionKind::Text => Ok(coerce_text(scope, field.key, value)?.map(OptionValue::Text)),
        OptionKind::Uint => Ok(coerce_uint(scope, field.key, value)?.map(OptionValue::Uint)),
    }
}

/// Log table keys that neither the schema nor `extra` know about.
pub(crate) fn log_unknown_keys(context: &str, table: &Table, schema: &[OptionField], extra: &[&str]) {
    for key in table.keys() {
        if !schema.iter().any(|f| f.key == key) && !extra.contains(&key) {
            log::debug!("    (Debug) {}: ignoring unknown key '{}'", context, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(table: &Table, schema: &'static [OptionField]) -> Result<Options> {
        Options::resolve("report", "options", table, schema)
    }

    #[test]
    fn test_unspecified_fields_stay_unset() {
        let options = resolve(&Table::new(), GLOBAL_OPTIONS).unwrap();
        assert!(options.is_empty());
        assert!(options.args().is_empty());
        for field in GLOBAL_OPTIONS {
            assert!(!options.is_set(field.key));
        }
    }

    #[test]
    fn test_margin_and_grayscale() {
        let table = Table::new()
            .with("margin_top", "20")
            .with("grayscale", true);
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();

        assert_eq!(options.uint("margin_top"), Some(20));
        assert_eq!(options.flag("grayscale"), Some(true));
        assert_eq!(options.len(), 2);
        assert_eq!(options.args(), vec!["--grayscale", "--margin-top", "20"]);
    }

    #[test]
    fn test_explicit_zero_is_distinct_from_unset() {
        let table = Table::new().with("margin_left", "0");
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();
        assert_eq!(options.uint("margin_left"), Some(0));
        assert!(!options.is_set("margin_right"));
    }

    #[test]
    fn test_non_numeric_string_names_field() {
        let table = Table::new().with("dpi", "high");
        let err = resolve(&table, GLOBAL_OPTIONS).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'report' options: detected invalid parameter (uint expected): dpi = \"high\""
        );
        match err {
            Error::InvalidUint {
                target,
                field,
                value,
                ..
            } => {
                assert_eq!(target, "report");
                assert_eq!(field, "dpi");
                assert_eq!(value, "high");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_signed_or_padded_strings_rejected() {
        for raw in ["+20", "-1", " 20", "20 ", "2_0", "0x10"] {
            let table = Table::new().with("margin_top", raw);
            assert!(
                matches!(resolve(&table, GLOBAL_OPTIONS), Err(Error::InvalidUint { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_uint_beyond_32_bits() {
        let table = Table::new().with("copies", "4294967296");
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();
        assert_eq!(options.uint("copies"), Some(4_294_967_296));
    }

    #[test]
    fn test_wrong_type_names_target_and_component() {
        let table = Table::new().with("page_offset", true);
        let err = Options::resolve("book", "pages", &table, PAGE_OPTIONS).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'book' pages: invalid type for option 'page_offset': boolean given"
        );
    }

    #[test]
    fn test_negative_number_rejected() {
        let table = Table::new().with("copies", -1i64);
        assert!(matches!(
            resolve(&table, GLOBAL_OPTIONS),
            Err(Error::InvalidUint { .. })
        ));
    }

    #[test]
    fn test_numbers_accepted_for_numeric_fields() {
        let table = Table::new()
            .with("copies", 2i64)
            .with("outline_depth", 3.0f64);
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();
        assert_eq!(options.uint("copies"), Some(2));
        assert_eq!(options.uint("outline_depth"), Some(3));
    }

    #[test]
    fn test_fractional_number_rejected() {
        let table = Table::new().with("dpi", 1.5f64);
        assert!(resolve(&table, GLOBAL_OPTIONS).is_err());
    }

    #[test]
    fn test_empty_string_is_absent() {
        let table = Table::new().with("margin_top", "").with("title", "");
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn test_false_flag_resolves_but_is_not_emitted() {
        let table = Table::new().with("no_outline", false);
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();
        assert_eq!(options.flag("no_outline"), Some(false));
        assert!(options.args().is_empty());
    }

    #[test]
    fn test_wrong_type_for_flag() {
        let table = Table::new().with("grayscale", "yes");
        assert!(matches!(
            resolve(&table, GLOBAL_OPTIONS),
            Err(Error::InvalidOptionType { found: "string", .. })
        ));
    }

    #[test]
    fn test_page_height_maps_to_its_own_flag() {
        let table = Table::new().with("page_height", "297");
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();
        assert_eq!(options.args(), vec!["--page-height", "297"]);
    }

    #[test]
    fn test_text_fields() {
        let table = Table::new()
            .with("orientation", "Landscape")
            .with("title", "Report");
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();
        assert_eq!(options.text("orientation"), Some("Landscape"));
        assert_eq!(
            options.args(),
            vec!["--orientation", "Landscape", "--title", "Report"]
        );
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let table = Table::new().with("not_an_option", "1");
        let options = resolve(&table, GLOBAL_OPTIONS).unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn test_toc_schema() {
        let table = Table::new()
            .with("toc_header_text", "Contents")
            .with("disable_toc_links", true)
            .with("toc_level_indentation", "2");
        let options = resolve(&table, TOC_OPTIONS).unwrap();
        assert_eq!(
            options.args(),
            vec![
                "--toc-header-text",
                "Contents",
                "--toc-level-indentation",
                "2",
                "--disable-toc-links"
            ]
        );
    }
}
