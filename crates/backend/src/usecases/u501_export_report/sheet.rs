use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::TemplateError;
use super::layout::CellRef;
use super::xml::{
    escape_text, find_attr, inner_texts, qualified_name, raw_attributes, remove_attr, set_attr,
    start_tag,
};

/// Value written into a worksheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Text(String),
    /// Non-finite numbers are written as blank cells
    Number(f64),
    /// Formula text without the leading '='
    Formula(String),
}

/// One `<c>` element. Attributes other than `r` and the inner markup are kept
/// verbatim until the value is overwritten.
#[derive(Debug, Clone)]
pub struct Cell {
    pub col: u32,
    attrs: Vec<(String, String)>,
    body: String,
}

impl Cell {
    pub fn new(col: u32) -> Self {
        Self {
            col,
            attrs: Vec::new(),
            body: String::new(),
        }
    }

    /// Index into the stylesheet's `cellXfs`
    pub fn style(&self) -> Option<u32> {
        find_attr(&self.attrs, "s").and_then(|s| s.parse().ok())
    }

    pub fn set_style(&mut self, style: u32) {
        set_attr(&mut self.attrs, "s", style.to_string());
    }

    pub fn set_value(&mut self, value: &CellValue) {
        remove_attr(&mut self.attrs, "t");
        self.body = match value {
            CellValue::Blank => String::new(),
            CellValue::Text(text) => {
                set_attr(&mut self.attrs, "t", "inlineStr");
                let space = if text.trim() != text {
                    " xml:space=\"preserve\""
                } else {
                    ""
                };
                format!("<is><t{}>{}</t></is>", space, escape_text(text))
            }
            CellValue::Number(n) if n.is_finite() => format!("<v>{}</v>", n),
            CellValue::Number(_) => String::new(),
            CellValue::Formula(formula) => format!("<f>{}</f>", escape_text(formula)),
        };
    }

    /// Displayed text of string and number cells
    pub fn text(&self, shared_strings: &[String]) -> Option<String> {
        match find_attr(&self.attrs, "t") {
            Some("s") => {
                let index: usize = inner_texts(&self.body, b"v").first()?.trim().parse().ok()?;
                shared_strings.get(index).cloned()
            }
            Some("inlineStr") => Some(inner_texts(&self.body, b"t").concat()),
            _ => inner_texts(&self.body, b"v").into_iter().next(),
        }
    }

    pub fn number(&self) -> Option<f64> {
        match find_attr(&self.attrs, "t") {
            None | Some("n") => inner_texts(&self.body, b"v").first()?.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn formula(&self) -> Option<String> {
        inner_texts(&self.body, b"f").into_iter().next()
    }

    pub fn is_blank(&self) -> bool {
        self.body.is_empty()
    }

    fn write(&self, row: u32, out: &mut String) {
        let mut attrs = Vec::with_capacity(self.attrs.len() + 1);
        attrs.push(("r".to_string(), CellRef::new(self.col, row).to_string()));
        attrs.extend(self.attrs.iter().cloned());

        if self.body.is_empty() {
            out.push_str(&start_tag("c", &attrs, true));
        } else {
            out.push_str(&start_tag("c", &attrs, false));
            out.push_str(&self.body);
            out.push_str("</c>");
        }
    }
}

/// One `<row>` with its cells sorted by column
#[derive(Debug, Clone)]
pub struct Row {
    pub index: u32,
    attrs: Vec<(String, String)>,
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            attrs: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Empty row carrying another row's formatting attributes (height, style)
    pub fn like(index: u32, template: &Row) -> Self {
        Self {
            index,
            attrs: template.attrs.clone(),
            cells: Vec::new(),
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, col: u32) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.col == col)
    }

    /// Write a value. `style` overrides the cell's style; `None` keeps the
    /// existing one.
    pub fn set_cell(&mut self, col: u32, value: &CellValue, style: Option<u32>) {
        let position = match self.cells.binary_search_by_key(&col, |cell| cell.col) {
            Ok(position) => position,
            Err(position) => {
                self.cells.insert(position, Cell::new(col));
                position
            }
        };
        let cell = &mut self.cells[position];
        cell.set_value(value);
        if let Some(style) = style {
            cell.set_style(style);
        }
    }

    fn write(&self, out: &mut String) {
        let mut attrs = Vec::with_capacity(self.attrs.len() + 1);
        attrs.push(("r".to_string(), self.index.to_string()));
        attrs.extend(self.attrs.iter().cloned());

        if self.cells.is_empty() {
            out.push_str(&start_tag("row", &attrs, true));
            return;
        }
        out.push_str(&start_tag("row", &attrs, false));
        for cell in &self.cells {
            cell.write(self.index, out);
        }
        out.push_str("</row>");
    }
}

/// A worksheet part split around `<sheetData>`.
///
/// Markup before and after the cell table is kept as text; only the
/// `<dimension>` reference is rewritten on output.
#[derive(Debug, Clone)]
pub struct SheetData {
    head: String,
    rows: Vec<Row>,
    tail: String,
}

impl SheetData {
    pub fn parse(part: &str, xml: &str) -> Result<Self, TemplateError> {
        let mut reader = Reader::from_str(xml);
        let mut head = None;
        let mut rows: Vec<Row> = Vec::new();
        let mut row: Option<Row> = None;
        let mut cell: Option<(Cell, usize)> = None;

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|e| TemplateError::xml(part, e))?;
            let after = reader.buffer_position() as usize;

            match event {
                Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                    head = Some(xml[..after].to_string());
                }
                Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                    let name = qualified_name(&e);
                    return Ok(Self {
                        head: format!("{}<{}>", &xml[..before], name),
                        rows,
                        tail: format!("</{}>{}", name, &xml[after..]),
                    });
                }
                Event::End(e) if e.local_name().as_ref() == b"sheetData" => {
                    let head = head.ok_or_else(|| TemplateError::xml(part, "unbalanced sheetData"))?;
                    return Ok(Self {
                        head,
                        rows,
                        tail: xml[before..].to_string(),
                    });
                }
                Event::Start(e) if head.is_some() && e.local_name().as_ref() == b"row" => {
                    row = Some(parse_row(part, &e, rows.last())?);
                }
                Event::Empty(e) if head.is_some() && e.local_name().as_ref() == b"row" => {
                    let parsed = parse_row(part, &e, rows.last())?;
                    rows.push(parsed);
                }
                Event::End(e) if e.local_name().as_ref() == b"row" => {
                    if let Some(row) = row.take() {
                        rows.push(row);
                    }
                }
                Event::Start(e) if e.local_name().as_ref() == b"c" => {
                    if let Some(current) = row.as_ref() {
                        cell = Some((parse_cell(part, &e, current)?, after));
                    }
                }
                Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                    if let Some(current) = row.as_mut() {
                        let parsed = parse_cell(part, &e, current)?;
                        current.cells.push(parsed);
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"c" => {
                    if let (Some((mut parsed, body_start)), Some(current)) = (cell.take(), row.as_mut()) {
                        parsed.body = xml[body_start..before].to_string();
                        current.cells.push(parsed);
                    }
                }
                Event::Eof => {
                    return Err(TemplateError::xml(part, "worksheet has no sheetData"));
                }
                _ => {}
            }
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.iter().find(|row| row.index == index)
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.row(at.row)?.cell(at.col)
    }

    pub fn take_row(&mut self, index: u32) -> Option<Row> {
        let position = self.rows.iter().position(|row| row.index == index)?;
        Some(self.rows.remove(position))
    }

    /// Move every row at or below `from` down by `by` rows
    pub fn shift_rows(&mut self, from: u32, by: u32) {
        if by == 0 {
            return;
        }
        for row in self.rows.iter_mut().filter(|row| row.index >= from) {
            row.index += by;
        }
    }

    /// Insert keeping rows sorted; an existing row with the same index is replaced
    pub fn insert_row(&mut self, row: Row) {
        match self.rows.binary_search_by_key(&row.index, |r| r.index) {
            Ok(position) => self.rows[position] = row,
            Err(position) => self.rows.insert(position, row),
        }
    }

    /// Append rows that all lie below the current last row
    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = Row>) {
        for row in rows {
            match self.rows.last() {
                Some(last) if last.index >= row.index => self.insert_row(row),
                _ => self.rows.push(row),
            }
        }
    }

    pub fn set_cell(&mut self, at: CellRef, value: &CellValue, style: Option<u32>) {
        let position = match self.rows.binary_search_by_key(&at.row, |row| row.index) {
            Ok(position) => position,
            Err(position) => {
                self.rows.insert(position, Row::new(at.row));
                position
            }
        };
        self.rows[position].set_cell(at.col, value, style);
    }

    /// Used range as (top-left, bottom-right)
    pub fn dimension(&self) -> Option<(CellRef, CellRef)> {
        let mut bounds: Option<(CellRef, CellRef)> = None;
        for row in &self.rows {
            let (Some(first), Some(last)) = (row.cells.first(), row.cells.last()) else {
                continue;
            };
            bounds = Some(match bounds {
                None => (
                    CellRef::new(first.col, row.index),
                    CellRef::new(last.col, row.index),
                ),
                Some((top_left, bottom_right)) => (
                    CellRef::new(top_left.col.min(first.col), top_left.row.min(row.index)),
                    CellRef::new(
                        bottom_right.col.max(last.col),
                        bottom_right.row.max(row.index),
                    ),
                ),
            });
        }
        bounds
    }

    pub fn to_xml(&self) -> String {
        let range = match self.dimension() {
            Some((top_left, bottom_right)) if top_left == bottom_right => top_left.to_string(),
            Some((top_left, bottom_right)) => format!("{}:{}", top_left, bottom_right),
            None => "A1".to_string(),
        };

        let mut out = with_dimension(&self.head, &range);
        for row in &self.rows {
            row.write(&mut out);
        }
        out.push_str(&self.tail);
        out
    }
}

/// Row attributes minus `r` and `spans` (spans go stale once cells move)
fn parse_row(part: &str, element: &BytesStart, previous: Option<&Row>) -> Result<Row, TemplateError> {
    let mut attrs = raw_attributes(element);
    let index = match find_attr(&attrs, "r") {
        Some(r) => r
            .parse::<u32>()
            .map_err(|_| TemplateError::xml(part, format!("invalid row number '{}'", r)))?,
        None => previous.map_or(1, |row| row.index + 1),
    };
    attrs.retain(|(key, _)| key != "r" && key != "spans");
    Ok(Row {
        index,
        attrs,
        cells: Vec::new(),
    })
}

fn parse_cell(part: &str, element: &BytesStart, row: &Row) -> Result<Cell, TemplateError> {
    let mut attrs = raw_attributes(element);
    let col = match find_attr(&attrs, "r") {
        Some(r) => {
            let at: CellRef = r.parse()?;
            if at.row != row.index {
                return Err(TemplateError::xml(
                    part,
                    format!("cell {} is inside row {}", r, row.index),
                ));
            }
            at.col
        }
        None => row.cells.last().map_or(0, |cell| cell.col + 1),
    };
    remove_attr(&mut attrs, "r");
    Ok(Cell {
        col,
        attrs,
        body: String::new(),
    })
}

/// Rewrite the `ref` of the `<dimension>` element, if the sheet has one
fn with_dimension(head: &str, range: &str) -> String {
    let Some(start) = head.find("<dimension") else {
        return head.to_string();
    };
    let Some(offset) = head[start..].find("ref=\"") else {
        return head.to_string();
    };
    let value_start = start + offset + "ref=\"".len();
    match head[value_start..].find('"') {
        Some(len) => format!("{}{}{}", &head[..value_start], range, &head[value_start + len..]),
        None => head.to_string(),
    }
}
