use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::TemplateError;
use super::package::STYLES_PART;
use super::xml::{attribute, qualified_name, raw_attributes, set_attr, start_tag, Splices};

/// Display format applied to every written Date cell
pub const DATE_FORMAT_CODE: &str = "yyyy-mm-dd";

/// Ids below this are reserved for built-in number formats
const FIRST_CUSTOM_NUM_FMT_ID: u32 = 164;

#[derive(Debug, Clone)]
struct Container {
    name: String,
    attrs: Vec<(String, String)>,
    start: usize,
    start_end: usize,
    close_start: Option<usize>,
}

impl Container {
    fn new(element: &BytesStart, start: usize, start_end: usize) -> Self {
        Self {
            name: qualified_name(element),
            attrs: raw_attributes(element),
            start,
            start_end,
            close_start: None,
        }
    }

    /// Replace the start tag with one carrying `count` and add `child` as the
    /// last child
    fn append(&self, child: &str, count: usize, splices: &mut Splices) {
        let mut attrs = self.attrs.clone();
        set_attr(&mut attrs, "count", count.to_string());
        let open = start_tag(&self.name, &attrs, false);
        match self.close_start {
            Some(close_start) => {
                splices.replace(self.start, self.start_end, open);
                splices.insert(close_start, child);
            }
            // was self-closing
            None => splices.replace(
                self.start,
                self.start_end,
                format!("{}{}</{}>", open, child, self.name),
            ),
        }
    }
}

#[derive(Debug, Clone)]
struct Xf {
    name: String,
    attrs: Vec<(String, String)>,
    inner: Option<String>,
}

impl Xf {
    fn to_xml(&self) -> String {
        match &self.inner {
            Some(inner) => format!(
                "{}{}</{}>",
                start_tag(&self.name, &self.attrs, false),
                inner,
                self.name
            ),
            None => start_tag(&self.name, &self.attrs, true),
        }
    }
}

/// Add a cell format that shows dates as `yyyy-mm-dd`.
///
/// The new `xf` copies the font, fill, border and alignment of
/// `cellXfs[base_style]` (the template's sample Date cell) and only swaps the
/// number format. Returns the updated stylesheet and the new style index.
pub fn add_date_style(styles: &str, base_style: Option<u32>) -> Result<(String, u32), TemplateError> {
    let mut reader = Reader::from_str(styles);
    let mut style_sheet_end = None;
    let mut prefix = String::new();
    let mut num_fmts: Option<Container> = None;
    // declared in <numFmts>; numFmt elements elsewhere (dxfs) only reserve ids
    let mut formats: Vec<(u32, String)> = Vec::new();
    let mut in_num_fmts = false;
    let mut highest_id: Option<u32> = None;
    let mut cell_xfs: Option<Container> = None;
    let mut in_cell_xfs = false;
    let mut xfs: Vec<Xf> = Vec::new();
    let mut open_xf: Option<(Xf, usize)> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| TemplateError::xml(STYLES_PART, e))?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"styleSheet" => {
                    style_sheet_end = Some(after);
                    let name = qualified_name(&e);
                    prefix = name[..name.len() - "styleSheet".len()].to_string();
                }
                b"numFmts" => {
                    num_fmts = Some(Container::new(&e, before, after));
                    in_num_fmts = true;
                }
                b"numFmt" => collect_format(&e, in_num_fmts, &mut formats, &mut highest_id),
                b"cellXfs" => {
                    cell_xfs = Some(Container::new(&e, before, after));
                    in_cell_xfs = true;
                }
                b"xf" if in_cell_xfs => {
                    let xf = Xf {
                        name: qualified_name(&e),
                        attrs: raw_attributes(&e),
                        inner: None,
                    };
                    open_xf = Some((xf, after));
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"numFmts" => num_fmts = Some(Container::new(&e, before, after)),
                b"numFmt" => collect_format(&e, in_num_fmts, &mut formats, &mut highest_id),
                b"cellXfs" => cell_xfs = Some(Container::new(&e, before, after)),
                b"xf" if in_cell_xfs => xfs.push(Xf {
                    name: qualified_name(&e),
                    attrs: raw_attributes(&e),
                    inner: None,
                }),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"numFmts" => {
                    if let Some(container) = num_fmts.as_mut() {
                        container.close_start = Some(before);
                    }
                    in_num_fmts = false;
                }
                b"cellXfs" => {
                    if let Some(container) = cell_xfs.as_mut() {
                        container.close_start = Some(before);
                    }
                    in_cell_xfs = false;
                }
                b"xf" => {
                    if let Some((mut xf, inner_start)) = open_xf.take() {
                        xf.inner = Some(styles[inner_start..before].to_string());
                        xfs.push(xf);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let cell_xfs =
        cell_xfs.ok_or_else(|| TemplateError::xml(STYLES_PART, "stylesheet has no cellXfs"))?;
    let style_sheet_end =
        style_sheet_end.ok_or_else(|| TemplateError::xml(STYLES_PART, "missing styleSheet root"))?;

    let mut splices = Splices::default();

    let existing = formats
        .iter()
        .find(|(_, code)| code == DATE_FORMAT_CODE)
        .map(|(id, _)| *id);
    let num_fmt_id = match existing {
        Some(id) => id,
        None => {
            let id = highest_id
                .map(|id| id + 1)
                .unwrap_or(FIRST_CUSTOM_NUM_FMT_ID)
                .max(FIRST_CUSTOM_NUM_FMT_ID);
            let num_fmt = format!(
                "<{}numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                prefix, id, DATE_FORMAT_CODE
            );
            match &num_fmts {
                Some(container) => container.append(&num_fmt, formats.len() + 1, &mut splices),
                // numFmts must be the first child of styleSheet
                None => splices.insert(
                    style_sheet_end,
                    format!("<{0}numFmts count=\"1\">{1}</{0}numFmts>", prefix, num_fmt),
                ),
            }
            id
        }
    };

    let base = base_style
        .and_then(|index| xfs.get(index as usize))
        .or_else(|| xfs.first())
        .cloned();
    let mut date_xf = base.unwrap_or_else(|| Xf {
        name: format!("{}xf", prefix),
        attrs: vec![
            ("fontId".to_string(), "0".to_string()),
            ("fillId".to_string(), "0".to_string()),
            ("borderId".to_string(), "0".to_string()),
            ("xfId".to_string(), "0".to_string()),
        ],
        inner: None,
    });
    set_attr(&mut date_xf.attrs, "numFmtId", num_fmt_id.to_string());
    set_attr(&mut date_xf.attrs, "applyNumberFormat", "1");

    let date_style = xfs.len() as u32;
    cell_xfs.append(&date_xf.to_xml(), xfs.len() + 1, &mut splices);

    Ok((splices.apply(styles), date_style))
}

fn number_format(element: &BytesStart) -> Option<(u32, String)> {
    let id = attribute(element, b"numFmtId")?.parse().ok()?;
    let code = attribute(element, b"formatCode")?;
    Some((id, code))
}

fn collect_format(
    element: &BytesStart,
    declared: bool,
    formats: &mut Vec<(u32, String)>,
    highest_id: &mut Option<u32>,
) {
    if let Some((id, code)) = number_format(element) {
        *highest_id = Some(highest_id.map_or(id, |highest| highest.max(id)));
        if declared {
            formats.push((id, code));
        }
    }
}
