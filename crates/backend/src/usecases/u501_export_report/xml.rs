//! Small helpers for editing OOXML parts in place.
//!
//! Parts are scanned with quick-xml and edited by byte position so that
//! everything not touched keeps its original markup.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Attributes as `(qualified name, raw value)` pairs, values still escaped
pub fn raw_attributes(element: &BytesStart) -> Vec<(String, String)> {
    element
        .attributes()
        .flatten()
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect()
}

/// Unescaped value of the attribute whose local name is `local_name`
pub fn attribute(element: &BytesStart, local_name: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local_name)
        .map(|attr| unescape_lossy(&String::from_utf8_lossy(&attr.value)))
}

pub fn qualified_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

pub fn unescape_lossy(raw: &str) -> String {
    unescape(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

/// Characters XML 1.0 allows in text: tab, LF, CR and everything from
/// U+0020 up except U+FFFE and U+FFFF
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
}

/// Escape markup characters and drop the ones XML cannot carry at all
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return escape(text);
    }
    let cleaned: String = text.chars().filter(|c| is_xml_char(*c)).collect();
    Cow::Owned(escape(&cleaned).into_owned())
}

/// Value of `key` in an attribute list
pub fn find_attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Replace `key` in place or append it
pub fn set_attr(attrs: &mut Vec<(String, String)>, key: &str, value: impl Into<String>) {
    let value = value.into();
    match attrs.iter_mut().find(|(name, _)| name == key) {
        Some(slot) => slot.1 = value,
        None => attrs.push((key.to_string(), value)),
    }
}

pub fn remove_attr(attrs: &mut Vec<(String, String)>, key: &str) {
    attrs.retain(|(name, _)| name != key);
}

/// `<name a="1" b="2">` or `<name a="1" b="2"/>`; values must already be escaped
pub fn start_tag(name: &str, attrs: &[(String, String)], self_closing: bool) -> String {
    let mut tag = String::with_capacity(name.len() + 2 + attrs.len() * 16);
    tag.push('<');
    tag.push_str(name);
    for (key, value) in attrs {
        tag.push(' ');
        tag.push_str(key);
        tag.push_str("=\"");
        tag.push_str(value);
        tag.push('"');
    }
    tag.push_str(if self_closing { "/>" } else { ">" });
    tag
}

/// Unescaped text of every `<tag>` element in a fragment, in document order
pub fn inner_texts(fragment: &str, tag: &[u8]) -> Vec<String> {
    let mut reader = Reader::from_str(fragment);
    let mut texts = Vec::new();
    let mut start = None;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == tag => {
                start = Some(reader.buffer_position() as usize);
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == tag => texts.push(String::new()),
            Ok(Event::End(e)) if e.local_name().as_ref() == tag => {
                if let Some(start) = start.take() {
                    texts.push(unescape_lossy(&fragment[start..before]));
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    texts
}

/// Byte-range replacements applied back to front so earlier offsets stay valid
#[derive(Debug, Default)]
pub struct Splices {
    edits: Vec<(usize, usize, String)>,
}

impl Splices {
    pub fn replace(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.edits.push((start, end, text.into()));
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at, at, text);
    }

    pub fn apply(mut self, source: &str) -> String {
        self.edits.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        let mut result = source.to_string();
        for (start, end, text) in self.edits {
            result.replace_range(start..end, &text);
        }
        result
    }
}

/// Drop the first `<tag .../>` element whose markup contains `needle`
pub fn remove_element_containing(xml: &str, tag: &str, needle: &str) -> Option<String> {
    let open = format!("<{}", tag);
    let mut search = 0;
    while let Some(offset) = xml[search..].find(&open) {
        let start = search + offset;
        let end = start + xml[start..].find('>')? + 1;
        if xml[start..end].contains(needle) {
            return Some(format!("{}{}", &xml[..start], &xml[end..]));
        }
        search = end;
    }
    None
}
