//! Worksheet row/cell tree
//!
//! Only `<sheetData>` is modelled. Everything before and after it (sheet
//! views, column widths, merged cells, print settings, ...) is kept as the
//! original bytes and written back unchanged.

mod cell;
mod locate;

pub use cell::{is_blank, write_value, Cell, CellType};

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::Writer;
use sheetfill_core::CellAddress;

use crate::error::{XlsxError, XlsxResult};
use cell::CellContent;

/// A `<row>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub(crate) index: u32,
    /// Attributes other than `r`, in document order
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) cells: Vec<Cell>,
}

impl Row {
    /// Create an empty row
    pub fn new(index: u32) -> Self {
        Self {
            index,
            attributes: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Row number (`r` attribute, 1-based)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Cells in document order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Find a cell by its exact reference
    pub fn cell(&self, reference: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.reference == reference)
    }

    fn write<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        qname: &dyn Fn(&str) -> String,
    ) -> XlsxResult<()> {
        let name = qname("row");
        let index = self.index.to_string();
        let mut start = BytesStart::new(name.as_str());
        start.push_attribute(("r", index.as_str()));
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.cells.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for cell in &self.cells {
            cell.write(writer, qname)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        Ok(())
    }
}

/// An in-memory worksheet part
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Bytes before `<sheetData>`
    head: Vec<u8>,
    /// The `<sheetData>` start tag as read
    sheet_data: BytesStart<'static>,
    rows: Vec<Row>,
    /// Bytes after `</sheetData>`
    tail: Vec<u8>,
    modified: bool,
}

impl Worksheet {
    /// Parse a worksheet part
    pub fn from_xml(xml: &[u8]) -> XlsxResult<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut head = Writer::new(Vec::new());
        let mut tail = Writer::new(Vec::new());

        // Everything up to <sheetData> goes to `head` verbatim.
        let (sheet_data, self_closing) = loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                    break (e.into_owned(), false);
                }
                Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                    break (e.into_owned(), true);
                }
                Event::Eof => {
                    return Err(XlsxError::InvalidFormat(
                        "worksheet has no sheetData element".into(),
                    ))
                }
                event => head.write_event(event)?,
            }
            buf.clear();
        };
        buf.clear();

        let mut rows: Vec<Row> = Vec::new();
        if !self_closing {
            loop {
                match reader.read_event_into(&mut buf)? {
                    Event::Start(e) if e.local_name().as_ref() == b"row" => {
                        let implicit = rows.last().map_or(1, |r| r.index + 1);
                        let mut row = parse_row_start(&e, implicit)?;
                        read_row_cells(&mut reader, &mut row)?;
                        rows.push(row);
                    }
                    Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                        let implicit = rows.last().map_or(1, |r| r.index + 1);
                        rows.push(parse_row_start(&e, implicit)?);
                    }
                    Event::Start(e) => {
                        // Not part of the row model; drop it.
                        let end = e.to_end().into_owned();
                        let mut skip = Vec::new();
                        reader.read_to_end_into(end.name(), &mut skip)?;
                    }
                    Event::End(e) if e.local_name().as_ref() == b"sheetData" => break,
                    Event::Eof => {
                        return Err(XlsxError::InvalidFormat(
                            "unterminated sheetData element".into(),
                        ))
                    }
                    _ => {}
                }
                buf.clear();
            }
            buf.clear();
        }

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,
                event => tail.write_event(event)?,
            }
            buf.clear();
        }

        Ok(Self {
            head: head.into_inner(),
            sheet_data,
            rows,
            tail: tail.into_inner(),
            modified: false,
        })
    }

    /// Serialize the worksheet part
    pub fn to_xml(&self) -> XlsxResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.head.len() + self.tail.len() + 256);
        out.extend_from_slice(&self.head);

        let mut writer = Writer::new(out);
        let prefix = self.prefix();
        let qname = move |local: &str| match &prefix {
            Some(p) => format!("{}:{}", p, local),
            None => local.to_string(),
        };

        if self.rows.is_empty() {
            writer.write_event(Event::Empty(self.sheet_data.borrow()))?;
        } else {
            writer.write_event(Event::Start(self.sheet_data.borrow()))?;
            for row in &self.rows {
                row.write(&mut writer, &qname)?;
            }
            writer.write_event(Event::End(self.sheet_data.to_end()))?;
        }

        let mut out = writer.into_inner();
        out.extend_from_slice(&self.tail);
        Ok(out)
    }

    /// Rows in document order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// First row with the given index
    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.iter().find(|r| r.index == index)
    }

    /// Find a cell by address without creating anything
    pub fn cell(&self, address: &CellAddress) -> Option<&Cell> {
        self.row(address.row)?.cell(&address.to_a1_string())
    }

    /// Whether anything has been created or written since parsing
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Namespace prefix used by `<sheetData>`, reused for new elements
    fn prefix(&self) -> Option<String> {
        self.sheet_data
            .name()
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
    }
}

fn parse_row_start(e: &BytesStart<'_>, implicit_index: u32) -> XlsxResult<Row> {
    let mut index = None;
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"r" => {
                index = Some(value.trim().parse::<u32>().map_err(|_| {
                    XlsxError::Parse(format!("invalid row index '{}'", value))
                })?);
            }
            key => attributes.push((
                String::from_utf8_lossy(key).into_owned(),
                value.into_owned(),
            )),
        }
    }

    Ok(Row {
        index: index.unwrap_or(implicit_index),
        attributes,
        cells: Vec::new(),
    })
}

fn read_row_cells(reader: &mut Reader<&[u8]>, row: &mut Row) -> XlsxResult<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let mut cell = parse_cell_start(&e, row)?;
                let end = e.to_end().into_owned();
                cell.content = read_cell_content(reader, end.name().as_ref())?;
                row.cells.push(cell);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let cell = parse_cell_start(&e, row)?;
                row.cells.push(cell);
            }
            Event::Start(e) => {
                let end = e.to_end().into_owned();
                let mut skip = Vec::new();
                reader.read_to_end_into(end.name(), &mut skip)?;
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => break,
            Event::Eof => {
                return Err(XlsxError::InvalidFormat(format!(
                    "unterminated row {}",
                    row.index
                )))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

fn parse_cell_start(e: &BytesStart<'_>, row: &Row) -> XlsxResult<Cell> {
    let mut reference = None;
    let mut data_type = None;
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"r" => reference = Some(value.into_owned()),
            b"t" => data_type = Some(CellType::from_xlsx(&value)),
            key => attributes.push((
                String::from_utf8_lossy(key).into_owned(),
                value.into_owned(),
            )),
        }
    }

    let reference = match reference {
        Some(r) => r,
        None => implicit_reference(row)?,
    };

    Ok(Cell {
        reference,
        data_type,
        attributes,
        content: CellContent::Empty,
    })
}

/// Reference for a cell written without `r`: the column after the previous
/// cell in the row, or column A
fn implicit_reference(row: &Row) -> XlsxResult<String> {
    let col = match row.cells.last() {
        Some(prev) => CellAddress::parse(&prev.reference)?.col + 1,
        None => 0,
    };
    Ok(CellAddress::new(col, row.index).to_a1_string())
}

/// Capture the children of a `<c>` verbatim, pulling out the `<v>` and
/// inline-string text on the way
fn read_cell_content(reader: &mut Reader<&[u8]>, end_name: &[u8]) -> XlsxResult<CellContent> {
    let mut buf = Vec::new();
    let mut xml = Writer::new(Vec::new());
    let mut depth = 0usize;

    let mut value: Option<String> = None;
    let mut inline_text: Option<String> = None;
    let mut has_formula = false;
    let mut in_v = false;
    let mut in_is = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match &event {
            Event::Start(e) => {
                depth += 1;
                match e.local_name().as_ref() {
                    b"v" => in_v = true,
                    b"f" => has_formula = true,
                    b"is" => {
                        in_is = true;
                        inline_text.get_or_insert_with(String::new);
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_is && !in_phonetic => in_t = true,
                    _ => {}
                }
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"f" => has_formula = true,
                b"is" => {
                    inline_text.get_or_insert_with(String::new);
                }
                _ => {}
            },
            Event::End(e) => {
                if depth == 0 && e.name().as_ref() == end_name {
                    break;
                }
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"v" => in_v = false,
                    b"is" => in_is = false,
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                }
            }
            Event::Text(t) => {
                if in_v {
                    value.get_or_insert_with(String::new).push_str(&t.unescape()?);
                } else if in_t {
                    inline_text
                        .get_or_insert_with(String::new)
                        .push_str(&t.unescape()?);
                }
            }
            Event::Eof => {
                return Err(XlsxError::InvalidFormat("unterminated cell".into()));
            }
            _ => {}
        }
        xml.write_event(event)?;
        buf.clear();
    }

    let xml = xml.into_inner();
    if xml.is_empty() {
        return Ok(CellContent::Empty);
    }
    Ok(CellContent::Preserved {
        xml,
        value,
        inline_text,
        has_formula,
    })
}
