//! Cover, page and table-of-contents components of a build target.

use super::options::{coerce_bytes, coerce_text, log_unknown_keys, OptionField, Options, Scope};
use super::options::{PAGE_OPTIONS, TOC_OPTIONS};
use crate::error::{Error, Result};
use crate::model::{Table, Value};

const CONTENT_KEYS: &[&str] = &[
    "input",
    "input_content",
    "user_style_sheet",
    "user_style_sheet_content",
];

/// Which slot of the rendered document a component fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Cover page
    Cover,
    /// Regular page
    Page,
    /// Table of contents
    Toc,
}

impl ComponentKind {
    /// Attribute key the component is read from.
    pub fn key(&self) -> &'static str {
        match self {
            ComponentKind::Cover => "cover",
            ComponentKind::Page => "pages",
            ComponentKind::Toc => "toc",
        }
    }

    /// Option schema that applies to this component.
    pub fn schema(&self) -> &'static [OptionField] {
        match self {
            ComponentKind::Cover | ComponentKind::Page => PAGE_OPTIONS,
            ComponentKind::Toc => TOC_OPTIONS,
        }
    }
}

/// One content unit of a rendered PDF.
///
/// Content comes from either a path reference (`input`) or literal markup
/// (`input_content`). The same pair exists for the user style sheet.
/// When both of a pair are given, the literal content wins. Literal content
/// is kept as raw bytes, so documents in any encoding pass through intact.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentComponent {
    /// Component slot
    pub kind: ComponentKind,
    /// Path or URL of the input document
    pub input: Option<String>,
    /// Literal markup
    pub input_content: Option<Vec<u8>>,
    /// Path of a style sheet to apply
    pub user_style_sheet: Option<String>,
    /// Literal style sheet
    pub user_style_sheet_content: Option<Vec<u8>>,
    /// Per-component renderer options
    pub options: Options,
}

impl ContentComponent {
    /// Create an empty component.
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            input: None,
            input_content: None,
            user_style_sheet: None,
            user_style_sheet_content: None,
            options: Options::new(kind.schema()),
        }
    }

    /// Map a script table onto a component of `target`.
    pub fn from_table(target: &str, kind: ComponentKind, table: &Table) -> Result<Self> {
        let scope = Scope {
            target,
            context: kind.key(),
        };
        let text = |key: &str| match table.get(key) {
            Some(value) => coerce_text(scope, key, value),
            None => Ok(None),
        };
        let bytes = |key: &str| match table.get(key) {
            Some(value) => coerce_bytes(scope, key, value),
            None => Ok(None),
        };
        log_unknown_keys(kind.key(), table, kind.schema(), CONTENT_KEYS);

        Ok(Self {
            kind,
            input: text("input")?,
            input_content: bytes("input_content")?,
            user_style_sheet: text("user_style_sheet")?,
            user_style_sheet_content: bytes("user_style_sheet_content")?,
            options: Options::resolve(target, kind.key(), table, kind.schema())?,
        })
    }

    /// Set the input path.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Set literal markup.
    pub fn with_input_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.input_content = Some(content.into());
        self
    }

    /// Set literal style sheet.
    pub fn with_style_sheet_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.user_style_sheet_content = Some(content.into());
        self
    }
}

fn invalid(target: &str, message: impl Into<String>) -> Error {
    Error::InvalidFormat {
        target: target.to_string(),
        message: message.into(),
    }
}

fn resolve_single(
    target: &str,
    kind: ComponentKind,
    value: Option<&Value>,
) -> Result<Option<ContentComponent>> {
    match value {
        None | Some(Value::Nil) => Ok(None),
        Some(Value::Table(table)) if table.is_array() => Err(invalid(
            target,
            format!("{} can't support array table.", kind.key()),
        )),
        Some(Value::Table(table)) => ContentComponent::from_table(target, kind, table).map(Some),
        Some(_) => Err(invalid(
            target,
            format!("{} only support table.", kind.key()),
        )),
    }
}

/// Resolve a target's `cover` attribute.
pub fn resolve_cover(target: &str, value: Option<&Value>) -> Result<Option<ContentComponent>> {
    resolve_single(target, ComponentKind::Cover, value)
}

/// Resolve a target's `toc` attribute.
pub fn resolve_toc(target: &str, value: Option<&Value>) -> Result<Option<ContentComponent>> {
    resolve_single(target, ComponentKind::Toc, value)
}

/// Resolve a target's `pages` attribute.
///
/// A plain table is one page. A table with any positive integer key holds
/// one table per page, in key order; holes are skipped.
pub fn resolve_pages(target: &str, value: Option<&Value>) -> Result<Vec<ContentComponent>> {
    let table = match value {
        None | Some(Value::Nil) => return Ok(Vec::new()),
        Some(Value::Table(table)) => table,
        Some(_) => return Err(invalid(target, "pages only support table.")),
    };

    if !table.is_array() {
        return Ok(vec![ContentComponent::from_table(
            target,
            ComponentKind::Page,
            table,
        )?]);
    }

    table
        .iter()
        .map(|(_, entry)| match entry {
            Value::Table(page) => ContentComponent::from_table(target, ComponentKind::Page, page),
            other => Err(invalid(
                target,
                format!("each page must be a table ({} given).", other.type_name()),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> Table {
        Table::new().with("input_content", html)
    }

    #[test]
    fn test_absent_cover() {
        assert_eq!(resolve_cover("t", None).unwrap(), None);
        assert_eq!(resolve_cover("t", Some(&Value::Nil)).unwrap(), None);
    }

    #[test]
    fn test_cover_fields() {
        let table = Table::new()
            .with("input", "cover.html")
            .with("encoding", "utf-8")
            .with("page_offset", "1")
            .with("user_style_sheet", "cover.css");
        let cover = resolve_cover("t", Some(&Value::Table(table)))
            .unwrap()
            .unwrap();

        assert_eq!(cover.kind, ComponentKind::Cover);
        assert_eq!(cover.input.as_deref(), Some("cover.html"));
        assert_eq!(cover.user_style_sheet.as_deref(), Some("cover.css"));
        assert_eq!(cover.options.text("encoding"), Some("utf-8"));
        assert_eq!(cover.options.uint("page_offset"), Some(1));
    }

    #[test]
    fn test_empty_cover_table_resolves() {
        // Exclusivity is checked at materialization time.
        let cover = resolve_cover("x", Some(&Value::Table(Table::new())))
            .unwrap()
            .unwrap();
        assert_eq!(cover.input, None);
        assert_eq!(cover.input_content, None);
    }

    #[test]
    fn test_cover_not_a_table() {
        let err = resolve_cover("x", Some(&Value::from("cover.html"))).unwrap_err();
        assert!(err.to_string().contains("'x'"));
        assert!(err.to_string().contains("cover only support table."));
    }

    #[test]
    fn test_cover_array_rejected() {
        let value = Value::Table(Table::array([page("<p>a</p>")]));
        let err = resolve_cover("x", Some(&value)).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_toc_fields() {
        let table = Table::new()
            .with("toc_header_text", "Index")
            .with("disable_dotted_lines", true);
        let toc = resolve_toc("t", Some(&Value::Table(table))).unwrap().unwrap();
        assert_eq!(toc.kind, ComponentKind::Toc);
        assert_eq!(toc.options.text("toc_header_text"), Some("Index"));
        assert_eq!(toc.options.flag("disable_dotted_lines"), Some(true));
    }

    #[test]
    fn test_toc_not_a_table() {
        assert!(resolve_toc("t", Some(&Value::Boolean(true))).is_err());
    }

    #[test]
    fn test_pages_absent() {
        assert!(resolve_pages("t", None).unwrap().is_empty());
    }

    #[test]
    fn test_pages_single_table() {
        let value = Value::Table(page("<p>one</p>"));
        let pages = resolve_pages("t", Some(&value)).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].input_content.as_deref(), Some(&b"<p>one</p>"[..]));
    }

    #[test]
    fn test_pages_array_keeps_order() {
        let value = Value::Table(Table::array([
            page("<p>1</p>"),
            Table::new().with("input", "two.html"),
            page("<p>3</p>"),
        ]));
        let pages = resolve_pages("t", Some(&value)).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].input_content.as_deref(), Some(&b"<p>1</p>"[..]));
        assert_eq!(pages[1].input.as_deref(), Some("two.html"));
        assert_eq!(pages[2].input_content.as_deref(), Some(&b"<p>3</p>"[..]));
    }

    #[test]
    fn test_pages_non_table_element() {
        let mut table = Table::array([page("<p>1</p>")]);
        table.push("two.html");
        let err = resolve_pages("report", Some(&Value::Table(table))).unwrap_err();
        assert!(err.to_string().contains("'report'"));
    }

    #[test]
    fn test_pages_not_a_table() {
        assert!(resolve_pages("t", Some(&Value::from("page.html"))).is_err());
    }

    #[test]
    fn test_page_bad_offset() {
        let value = Value::Table(page("<p/>").with("page_offset", "first"));
        let err = resolve_pages("report", Some(&value)).unwrap_err();
        assert!(matches!(err, Error::InvalidUint { .. }));
        assert!(err
            .to_string()
            .starts_with("'report' pages: detected invalid parameter"));
    }

    #[test]
    fn test_toc_bad_option_names_component() {
        let value = Value::Table(Table::new().with("toc_level_indentation", "deep"));
        let err = resolve_toc("book", Some(&value)).unwrap_err();
        assert!(err.to_string().starts_with("'book' toc: "));
    }

    #[test]
    fn test_non_utf8_content_kept_as_bytes() {
        let table = Table::new()
            .with("input_content", Value::Bytes(b"<p>caf\xe9</p>".to_vec()))
            .with("user_style_sheet_content", Value::Bytes(b"/* \xff */".to_vec()))
            .with("encoding", "iso-8859-1");
        let pages = resolve_pages("t", Some(&Value::Table(table))).unwrap();

        assert_eq!(pages[0].input_content.as_deref(), Some(&b"<p>caf\xe9</p>"[..]));
        assert_eq!(
            pages[0].user_style_sheet_content.as_deref(),
            Some(&b"/* \xff */"[..])
        );
        assert_eq!(pages[0].options.text("encoding"), Some("iso-8859-1"));
    }

    fn lua_value(source: &str) -> Value {
        let lua = mlua::Lua::new();
        let value: mlua::Value = lua.load(source).eval().unwrap();
        Value::from_lua(&value).unwrap()
    }

    #[test]
    fn test_sparse_pages_array() {
        let value = lua_value(r#"return { [2] = { input = "b.html" } }"#);
        let pages = resolve_pages("s", Some(&value)).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].input.as_deref(), Some("b.html"));

        let value = lua_value(r#"return { [3] = { input = "c.html" }, { input = "a.html" } }"#);
        let inputs: Vec<_> = resolve_pages("s", Some(&value))
            .unwrap()
            .into_iter()
            .map(|p| p.input.unwrap())
            .collect();
        assert_eq!(inputs, vec!["a.html", "c.html"]);
    }

    #[test]
    fn test_sparse_cover_and_toc_rejected() {
        let value = lua_value(r#"return { [2] = { input = "b.html" } }"#);
        let err = resolve_cover("s", Some(&value)).unwrap_err();
        assert!(err.to_string().contains("cover can't support array table."));
        let err = resolve_toc("s", Some(&value)).unwrap_err();
        assert!(err.to_string().contains("toc can't support array table."));
    }
}
