use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::TemplateError;
use super::xml::{attribute, remove_element_containing, unescape_lossy};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
pub const STYLES_PART: &str = "xl/styles.xml";
pub const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
}

/// An xlsx file held in memory as its zip entries, in original order
#[derive(Debug, Clone)]
pub struct XlsxPackage {
    entries: Vec<PackageEntry>,
}

/// Worksheet name and the package part that holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub path: String,
}

impl XlsxPackage {
    pub fn open(path: &Path) -> Result<Self, TemplateError> {
        if !path.exists() {
            return Err(TemplateError::NotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TemplateError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
            });
        }

        Ok(Self { entries })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TemplateError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }

        Ok(writer.finish()?.into_inner())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Text of an XML part
    pub fn part(&self, name: &str) -> Result<&str, TemplateError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| TemplateError::MissingPart(name.to_string()))?;
        std::str::from_utf8(&entry.data).map_err(|e| TemplateError::xml(name, e))
    }

    /// Replace a part's content, or append the part if it is new
    pub fn set_part(&mut self, name: &str, data: impl Into<Vec<u8>>) {
        let data = data.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
            }),
        }
    }

    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name != name);
        self.entries.len() != before
    }

    /// Worksheets in workbook order
    pub fn sheets(&self) -> Result<Vec<SheetEntry>, TemplateError> {
        let targets = relationship_targets(self.part(WORKBOOK_RELS_PART)?)?;
        let workbook = self.part(WORKBOOK_PART)?;
        let mut reader = Reader::from_str(workbook);
        let mut sheets = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e))
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    let name = attribute(&e, b"name").unwrap_or_default();
                    // r:id is the only attribute of <sheet> with local name "id"
                    let target = attribute(&e, b"id").and_then(|id| targets.get(&id).cloned());
                    match target {
                        Some(target) => sheets.push(SheetEntry {
                            name,
                            path: resolve_target(&target),
                        }),
                        None => {
                            return Err(TemplateError::xml(
                                WORKBOOK_PART,
                                format!("sheet '{}' has no worksheet relationship", name),
                            ))
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(TemplateError::xml(WORKBOOK_PART, e)),
                _ => {}
            }
        }

        Ok(sheets)
    }

    pub fn sheet_path(&self, sheet_name: &str) -> Result<String, TemplateError> {
        let sheets = self.sheets()?;
        sheets
            .iter()
            .find(|sheet| sheet.name == sheet_name)
            .map(|sheet| sheet.path.clone())
            .ok_or_else(|| TemplateError::SheetNotFound {
                sheet: sheet_name.to_string(),
                available: sheets
                    .iter()
                    .map(|sheet| sheet.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Shared-string table; empty when the workbook has none
    pub fn shared_strings(&self) -> Result<Vec<String>, TemplateError> {
        if !self.contains(SHARED_STRINGS_PART) {
            return Ok(Vec::new());
        }
        parse_shared_strings(self.part(SHARED_STRINGS_PART)?)
    }

    /// Make spreadsheet apps recompute every formula when the file is opened
    pub fn force_full_recalculation(&mut self) -> Result<(), TemplateError> {
        let workbook = self.part(WORKBOOK_PART)?.to_string();
        let updated = set_full_calc_on_load(&workbook);
        self.set_part(WORKBOOK_PART, updated);

        if self.remove_part(CALC_CHAIN_PART) {
            if let Ok(content_types) = self.part(CONTENT_TYPES_PART) {
                if let Some(updated) =
                    remove_element_containing(content_types, "Override", "/xl/calcChain.xml")
                {
                    self.set_part(CONTENT_TYPES_PART, updated);
                }
            }
            if let Ok(rels) = self.part(WORKBOOK_RELS_PART) {
                if let Some(updated) = remove_element_containing(rels, "Relationship", "calcChain.xml")
                {
                    self.set_part(WORKBOOK_RELS_PART, updated);
                }
            }
        }

        Ok(())
    }
}

/// Relationship id -> target from a .rels part
fn relationship_targets(rels: &str) -> Result<HashMap<String, String>, TemplateError> {
    let mut reader = Reader::from_str(rels);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id"), attribute(&e, b"Target")) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TemplateError::xml(WORKBOOK_RELS_PART, e)),
            _ => {}
        }
    }

    Ok(targets)
}

/// Workbook relationship targets are relative to `xl/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

/// Each `<si>` becomes one string: the concatenation of its `<t>` runs,
/// without phonetic (`<rPh>`) text.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>, TemplateError> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut text_start: Option<usize> = None;
    let mut phonetic_depth = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => phonetic_depth += 1,
                b"t" if phonetic_depth == 0 => {
                    text_start = Some(reader.buffer_position() as usize);
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => {
                    if let (Some(start), Some(text)) = (text_start.take(), current.as_mut()) {
                        text.push_str(&unescape_lossy(&xml[start..before]));
                    }
                }
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"si" => strings.push(current.take().unwrap_or_default()),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(TemplateError::xml(SHARED_STRINGS_PART, e)),
            _ => {}
        }
    }

    Ok(strings)
}

/// Add `fullCalcOnLoad="1"` to `<calcPr>`, creating the element if needed.
/// `calcPr` follows `definedNames` (or `sheets`) in the workbook schema.
fn set_full_calc_on_load(workbook: &str) -> String {
    if let Some(start) = workbook.find("<calcPr") {
        let end = workbook[start..]
            .find('>')
            .map(|offset| start + offset)
            .unwrap_or(workbook.len());
        if workbook[start..end].contains("fullCalcOnLoad") {
            return workbook.to_string();
        }
        let insert_at = start + "<calcPr".len();
        return format!(
            "{} fullCalcOnLoad=\"1\"{}",
            &workbook[..insert_at],
            &workbook[insert_at..]
        );
    }

    let anchor = ["</definedNames>", "</sheets>"]
        .iter()
        .find_map(|tag| workbook.find(tag).map(|pos| pos + tag.len()));
    match anchor {
        Some(pos) => format!(
            "{}<calcPr fullCalcOnLoad=\"1\"/>{}",
            &workbook[..pos],
            &workbook[pos..]
        ),
        None => workbook.to_string(),
    }
}
