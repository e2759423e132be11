//! Cell nodes and the value writer

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{XlsxError, XlsxResult};
use crate::shared_strings::SharedStringTable;

/// Declared type of a cell (the `t` attribute)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellType {
    Boolean,
    Date,
    Error,
    InlineString,
    Number,
    SharedString,
    /// Cached string result of a formula
    FormulaString,
    Other(String),
}

impl CellType {
    pub fn from_xlsx(value: &str) -> Self {
        match value {
            "b" => CellType::Boolean,
            "d" => CellType::Date,
            "e" => CellType::Error,
            "inlineStr" => CellType::InlineString,
            "n" => CellType::Number,
            "s" => CellType::SharedString,
            "str" => CellType::FormulaString,
            other => CellType::Other(other.to_string()),
        }
    }

    pub fn as_xlsx(&self) -> &str {
        match self {
            CellType::Boolean => "b",
            CellType::Date => "d",
            CellType::Error => "e",
            CellType::InlineString => "inlineStr",
            CellType::Number => "n",
            CellType::SharedString => "s",
            CellType::FormulaString => "str",
            CellType::Other(s) => s.as_str(),
        }
    }
}

/// What a cell holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CellContent {
    /// No child elements
    Empty,
    /// Children kept exactly as read from the template
    Preserved {
        xml: Vec<u8>,
        /// Text of `<v>`
        value: Option<String>,
        /// Text of `<is>`
        inline_text: Option<String>,
        has_formula: bool,
    },
    /// A literal string written by a fill
    InlineString(String),
}

/// A `<c>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub(crate) reference: String,
    pub(crate) data_type: Option<CellType>,
    /// Attributes other than `r` and `t`, in document order
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) content: CellContent,
}

impl Cell {
    /// Create an empty cell with the given reference
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            data_type: None,
            attributes: Vec::new(),
            content: CellContent::Empty,
        }
    }

    /// The cell reference (`r` attribute)
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The declared type, if any
    pub fn data_type(&self) -> Option<&CellType> {
        self.data_type.as_ref()
    }

    /// Look up a preserved attribute such as the style index `s`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the cell carries a formula
    pub fn has_formula(&self) -> bool {
        matches!(
            self.content,
            CellContent::Preserved {
                has_formula: true,
                ..
            }
        )
    }

    /// The literal stored value: the `<v>` text or the inline string
    pub fn raw_value(&self) -> Option<&str> {
        match &self.content {
            CellContent::Empty => None,
            CellContent::Preserved {
                value, inline_text, ..
            } => value.as_deref().or(inline_text.as_deref()),
            CellContent::InlineString(text) => Some(text),
        }
    }

    /// Effective text of the cell
    ///
    /// Shared-string cells store an index into `shared_strings`; when a table
    /// is supplied the index is dereferenced. Every other cell (or a
    /// shared-string cell read without a table) returns its literal value.
    pub fn text(&self, shared_strings: Option<&SharedStringTable>) -> XlsxResult<String> {
        let Some(raw) = self.raw_value() else {
            return Ok(String::new());
        };

        match (&self.data_type, shared_strings, &self.content) {
            (Some(CellType::SharedString), Some(table), CellContent::Preserved { .. }) => {
                let index: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!(
                        "invalid shared string index '{}' in cell {}",
                        raw, self.reference
                    ))
                })?;
                table.get(index).map(str::to_string).ok_or_else(|| {
                    XlsxError::Parse(format!(
                        "shared string index {} out of range ({} entries) in cell {}",
                        index,
                        table.len(),
                        self.reference
                    ))
                })
            }
            _ => Ok(raw.to_string()),
        }
    }

    /// Overwrite the cell with a literal inline string
    ///
    /// Any formula, cached value or shared-string typing is dropped; other
    /// attributes (style, etc.) are kept.
    pub fn set_inline_string(&mut self, value: impl Into<String>) {
        self.data_type = Some(CellType::InlineString);
        self.content = CellContent::InlineString(value.into());
    }

    pub(crate) fn write<W: Write>(
        &self,
        writer: &mut Writer<W>,
        qname: &dyn Fn(&str) -> String,
    ) -> XlsxResult<()> {
        let name = qname("c");
        let mut start = BytesStart::new(name.as_str());
        start.push_attribute(("r", self.reference.as_str()));
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if let Some(data_type) = &self.data_type {
            start.push_attribute(("t", data_type.as_xlsx()));
        }

        match &self.content {
            CellContent::Empty => {
                writer.write_event(Event::Empty(start))?;
            }
            CellContent::Preserved { xml, .. } => {
                writer.write_event(Event::Start(start))?;
                writer.get_mut().write_all(xml)?;
                writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
            }
            CellContent::InlineString(text) => {
                let is_name = qname("is");
                let t_name = qname("t");
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Start(BytesStart::new(is_name.as_str())))?;
                let mut t = BytesStart::new(t_name.as_str());
                t.push_attribute(("xml:space", "preserve"));
                writer.write_event(Event::Start(t))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new(t_name.as_str())))?;
                writer.write_event(Event::End(BytesEnd::new(is_name.as_str())))?;
                writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
            }
        }
        Ok(())
    }
}

/// Whether a value counts as "nothing to write"
///
/// Absent, empty and whitespace-only values leave the target untouched.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Write a value into a located cell
///
/// Returns `false` without touching the cell when the value is blank.
pub fn write_value(cell: &mut Cell, value: Option<&str>) -> bool {
    match value {
        Some(v) if !is_blank(Some(v)) => {
            cell.set_inline_string(v);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preserved(value: &str, data_type: Option<CellType>, has_formula: bool) -> Cell {
        Cell {
            reference: "B2".into(),
            data_type,
            attributes: vec![("s".into(), "3".into())],
            content: CellContent::Preserved {
                xml: format!("<v>{}</v>", value).into_bytes(),
                value: Some(value.to_string()),
                inline_text: None,
                has_formula,
            },
        }
    }

    #[test]
    fn test_write_value_sets_inline_string() {
        let mut cell = preserved("0", Some(CellType::SharedString), false);
        assert!(write_value(&mut cell, Some("Jane")));
        assert_eq!(cell.data_type(), Some(&CellType::InlineString));
        assert_eq!(cell.raw_value(), Some("Jane"));
        assert_eq!(cell.attribute("s"), Some("3"));
    }

    #[test]
    fn test_write_value_drops_formula() {
        let mut cell = preserved("42", None, true);
        assert!(cell.has_formula());
        write_value(&mut cell, Some("override"));
        assert!(!cell.has_formula());
    }

    #[test]
    fn test_blank_values_are_no_ops() {
        let mut cell = preserved("Existing", Some(CellType::FormulaString), false);
        let before = cell.clone();

        assert!(!write_value(&mut cell, None));
        assert!(!write_value(&mut cell, Some("")));
        assert!(!write_value(&mut cell, Some("   ")));
        assert_eq!(cell, before);
    }

    #[test]
    fn test_text_dereferences_shared_strings() {
        let table: SharedStringTable = vec!["zero".to_string(), "one".to_string()]
            .into_iter()
            .collect();
        let cell = preserved("1", Some(CellType::SharedString), false);

        assert_eq!(cell.text(Some(&table)).unwrap(), "one");
        // Without a table the index is returned as-is.
        assert_eq!(cell.text(None).unwrap(), "1");

        let out_of_range = preserved("7", Some(CellType::SharedString), false);
        assert!(out_of_range.text(Some(&table)).is_err());
    }

    #[test]
    fn test_text_of_plain_and_empty_cells() {
        let table = SharedStringTable::default();
        assert_eq!(preserved("3.5", None, false).text(Some(&table)).unwrap(), "3.5");
        assert_eq!(Cell::new("A1").text(Some(&table)).unwrap(), "");

        let mut written = Cell::new("A1");
        written.set_inline_string("5");
        assert_eq!(written.text(Some(&table)).unwrap(), "5");
    }

    #[test]
    fn test_cell_type_round_trips_attribute_text() {
        for t in ["b", "d", "e", "inlineStr", "n", "s", "str"] {
            assert_eq!(CellType::from_xlsx(t).as_xlsx(), t);
        }
        assert_eq!(CellType::from_xlsx("x").as_xlsx(), "x");
    }
}
