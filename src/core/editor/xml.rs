//! Streaming, position-aware editing of XML-like documents.
//!
//! The document is tokenized into an ordered sequence of lexical events,
//! each retaining the exact raw slice it came from, so copying an event
//! reproduces the source byte for byte. Edits are grafted between copied
//! regions; everything the caller does not touch survives unchanged,
//! including indentation, comments, and line endings.

use crate::core::editor::EditError;
use std::collections::HashMap;

/// One lexical event of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    Declaration { raw: String },
    Doctype { raw: String },
    Comment { raw: String },
    CData { raw: String },
    StartTag { name: String, raw: String },
    EndTag { name: String, raw: String },
    SelfClosingTag { name: String, raw: String },
    Text { raw: String },
}

impl XmlEvent {
    pub fn raw(&self) -> &str {
        match self {
            XmlEvent::Declaration { raw }
            | XmlEvent::Doctype { raw }
            | XmlEvent::Comment { raw }
            | XmlEvent::CData { raw }
            | XmlEvent::StartTag { raw, .. }
            | XmlEvent::EndTag { raw, .. }
            | XmlEvent::SelfClosingTag { raw, .. }
            | XmlEvent::Text { raw } => raw,
        }
    }
}

/// Positional condition driving `copy_until` / `skip_until`.
#[derive(Debug, Clone, PartialEq)]
pub enum EventCondition {
    StartElement(String),
    EndElement(String),
}

impl EventCondition {
    /// A self-closing tag satisfies both its start and end condition, the
    /// way an event-pull parser reports it as two events.
    pub fn matches(&self, event: &XmlEvent) -> bool {
        match self {
            EventCondition::StartElement(wanted) => match event {
                XmlEvent::StartTag { name, .. } | XmlEvent::SelfClosingTag { name, .. } => {
                    name == wanted
                }
                _ => false,
            },
            EventCondition::EndElement(wanted) => match event {
                XmlEvent::EndTag { name, .. } | XmlEvent::SelfClosingTag { name, .. } => {
                    name == wanted
                }
                _ => false,
            },
        }
    }
}

impl std::fmt::Display for EventCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCondition::StartElement(name) => write!(f, "start of element <{}>", name),
            EventCondition::EndElement(name) => write!(f, "end of element <{}>", name),
        }
    }
}

/// Tokenize a document into events. Raw slices concatenate back to the
/// exact input.
pub fn scan(source: &str) -> Result<Vec<XmlEvent>, EditError> {
    let mut events = Vec::new();
    let mut rest = source;

    while !rest.is_empty() {
        match rest.find('<') {
            None => {
                events.push(XmlEvent::Text {
                    raw: rest.to_string(),
                });
                break;
            }
            Some(0) => {
                let (event, consumed) = scan_markup(rest)?;
                events.push(event);
                rest = &rest[consumed..];
            }
            Some(at) => {
                events.push(XmlEvent::Text {
                    raw: rest[..at].to_string(),
                });
                rest = &rest[at..];
            }
        }
    }

    Ok(events)
}

fn scan_markup(rest: &str) -> Result<(XmlEvent, usize), EditError> {
    if let Some(stripped) = rest.strip_prefix("<?") {
        let end = stripped
            .find("?>")
            .ok_or_else(|| EditError::Parse("unterminated declaration".to_string()))?;
        let consumed = 2 + end + 2;
        return Ok((
            XmlEvent::Declaration {
                raw: rest[..consumed].to_string(),
            },
            consumed,
        ));
    }
    if let Some(stripped) = rest.strip_prefix("<!--") {
        let end = stripped
            .find("-->")
            .ok_or_else(|| EditError::Parse("unterminated comment".to_string()))?;
        let consumed = 4 + end + 3;
        return Ok((
            XmlEvent::Comment {
                raw: rest[..consumed].to_string(),
            },
            consumed,
        ));
    }
    if let Some(stripped) = rest.strip_prefix("<![CDATA[") {
        let end = stripped
            .find("]]>")
            .ok_or_else(|| EditError::Parse("unterminated CDATA section".to_string()))?;
        let consumed = 9 + end + 3;
        return Ok((
            XmlEvent::CData {
                raw: rest[..consumed].to_string(),
            },
            consumed,
        ));
    }
    if rest.starts_with("<!") {
        let end = rest
            .find('>')
            .ok_or_else(|| EditError::Parse("unterminated doctype".to_string()))?;
        let consumed = end + 1;
        return Ok((
            XmlEvent::Doctype {
                raw: rest[..consumed].to_string(),
            },
            consumed,
        ));
    }

    // Ordinary tag; honor quotes so '>' inside attribute values does not
    // terminate the tag.
    let mut quote: Option<char> = None;
    for (idx, ch) in rest.char_indices().skip(1) {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '>' => {
                    let raw = &rest[..idx + 1];
                    return Ok((classify_tag(raw), idx + 1));
                }
                _ => {}
            },
        }
    }
    Err(EditError::Parse("unterminated tag".to_string()))
}

fn classify_tag(raw: &str) -> XmlEvent {
    if let Some(name_part) = raw.strip_prefix("</") {
        let name = name_part
            .trim_end_matches('>')
            .trim()
            .to_string();
        return XmlEvent::EndTag {
            name,
            raw: raw.to_string(),
        };
    }
    let inner = &raw[1..raw.len() - 1];
    let self_closing = inner.ends_with('/');
    let name: String = inner
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
        .collect();
    if self_closing {
        XmlEvent::SelfClosingTag {
            name,
            raw: raw.to_string(),
        }
    } else {
        XmlEvent::StartTag {
            name,
            raw: raw.to_string(),
        }
    }
}

/// Streaming editor over a scanned document. Events are copied, skipped,
/// or interleaved with new content; `drain` flushes the remainder.
pub struct XmlEditor {
    events: Vec<XmlEvent>,
    cursor: usize,
    /// Open-element depth at the cursor; the root's children sit at 1.
    depth: usize,
    output: String,
    line_break: String,
    indent_unit: String,
}

impl XmlEditor {
    pub fn new(source: &str) -> Result<Self, EditError> {
        let events = scan(source)?;
        let line_break = detect_line_break(source);
        let indent_unit = detect_indent_unit(&events);
        Ok(XmlEditor {
            events,
            cursor: 0,
            depth: 0,
            output: String::with_capacity(source.len()),
            line_break,
            indent_unit,
        })
    }

    pub fn line_break(&self) -> &str {
        &self.line_break
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    /// Name of the document's root element, when one exists.
    pub fn root_name(&self) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            XmlEvent::StartTag { name, .. } | XmlEvent::SelfClosingTag { name, .. } => {
                Some(name.as_str())
            }
            _ => None,
        })
    }

    /// Copy events verbatim until the condition matches. With
    /// `inclusive` the matching event is copied too; otherwise it is
    /// withheld and stays next in the stream.
    pub fn copy_until(
        &mut self,
        condition: &EventCondition,
        inclusive: bool,
    ) -> Result<(), EditError> {
        while self.cursor < self.events.len() {
            let event = &self.events[self.cursor];
            if condition.matches(event) {
                if inclusive {
                    self.output.push_str(event.raw());
                    self.consume_event();
                }
                return Ok(());
            }
            self.output.push_str(event.raw());
            self.consume_event();
        }
        Err(EditError::AnchorNotFound(condition.to_string()))
    }

    /// Like `copy_until`, but the condition only matches elements that are
    /// direct children of the document root; identically named elements
    /// nested deeper are copied through. Resolves the ambiguity between a
    /// top-level container and a same-named one inside another block
    /// (`dependencyManagement`, profiles).
    pub fn copy_until_root_child(
        &mut self,
        condition: &EventCondition,
        inclusive: bool,
    ) -> Result<(), EditError> {
        while self.cursor < self.events.len() {
            let event = &self.events[self.cursor];
            if matches_at_root_child(condition, event, self.depth) {
                if inclusive {
                    self.output.push_str(event.raw());
                    self.consume_event();
                }
                return Ok(());
            }
            self.output.push_str(event.raw());
            self.consume_event();
        }
        Err(EditError::AnchorNotFound(format!(
            "{} at the root level",
            condition
        )))
    }

    /// Discard events up to and including the matching one.
    pub fn skip_until(&mut self, condition: &EventCondition) -> Result<(), EditError> {
        while self.cursor < self.events.len() {
            let matched = condition.matches(&self.events[self.cursor]);
            self.consume_event();
            if matched {
                return Ok(());
            }
        }
        Err(EditError::AnchorNotFound(condition.to_string()))
    }

    fn consume_event(&mut self) {
        match &self.events[self.cursor] {
            XmlEvent::StartTag { .. } => self.depth += 1,
            XmlEvent::EndTag { .. } => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.cursor += 1;
    }

    /// Append caller-supplied content verbatim.
    pub fn write_raw(&mut self, content: &str) {
        self.output.push_str(content);
    }

    /// Emit a new element with simple text children, indented to `depth`
    /// nesting levels using the document's own indentation unit and line
    /// break. The element starts on a fresh line.
    pub fn write_element(&mut self, name: &str, fields: &[(&str, &str)], depth: usize) {
        let lb = self.line_break.clone();
        let unit = self.indent_unit.clone();

        self.output.push_str(&lb);
        push_repeated(&mut self.output, &unit, depth);
        self.output.push('<');
        self.output.push_str(name);
        self.output.push('>');

        for (field, value) in fields {
            self.output.push_str(&lb);
            push_repeated(&mut self.output, &unit, depth + 1);
            self.output.push('<');
            self.output.push_str(field);
            self.output.push('>');
            self.output.push_str(value);
            self.output.push_str("</");
            self.output.push_str(field);
            self.output.push('>');
        }

        self.output.push_str(&lb);
        push_repeated(&mut self.output, &unit, depth);
        self.output.push_str("</");
        self.output.push_str(name);
        self.output.push('>');
    }

    /// Copy every remaining event verbatim and return the finished
    /// document.
    pub fn drain(mut self) -> String {
        while self.cursor < self.events.len() {
            self.output.push_str(self.events[self.cursor].raw());
            self.cursor += 1;
        }
        self.output
    }
}

/// Root-child matching: a start (or self-closing) tag is a root child at
/// depth 1; an end tag of a root child is seen at depth 2.
fn matches_at_root_child(condition: &EventCondition, event: &XmlEvent, depth: usize) -> bool {
    if !condition.matches(event) {
        return false;
    }
    match event {
        XmlEvent::StartTag { .. } | XmlEvent::SelfClosingTag { .. } => depth == 1,
        XmlEvent::EndTag { .. } => depth == 2,
        _ => false,
    }
}

fn push_repeated(out: &mut String, unit: &str, times: usize) {
    for _ in 0..times {
        out.push_str(unit);
    }
}

fn detect_line_break(source: &str) -> String {
    if source.contains("\r\n") {
        "\r\n".to_string()
    } else {
        "\n".to_string()
    }
}

/// Indentation unit inferred from the first indented text event; falls
/// back to four spaces for documents without one.
fn detect_indent_unit(events: &[XmlEvent]) -> String {
    for event in events {
        if let XmlEvent::Text { raw } = event {
            if let Some(after) = raw.rfind('\n').map(|i| &raw[i + 1..]) {
                if !after.is_empty() && after.chars().all(|c| c == ' ' || c == '\t') {
                    return after.to_string();
                }
            }
        }
    }
    "    ".to_string()
}

/// Read-side scan: collect, for each `entry` element directly inside the
/// top-level `container` element (a direct child of the document root),
/// its simple text fields. Same-named containers nested deeper, such as a
/// managed-dependency block, are not consulted. Used by operations to
/// answer "does X already exist" before editing.
pub fn scan_entries(
    source: &str,
    container: &str,
    entry: &str,
) -> Result<Vec<HashMap<String, String>>, EditError> {
    let events = scan(source)?;
    let mut results = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<HashMap<String, String>> = None;
    let mut field: Option<(String, String)> = None;

    for event in &events {
        match event {
            XmlEvent::StartTag { name, .. } => {
                if current.is_some() {
                    if field.is_none() {
                        field = Some((name.clone(), String::new()));
                    }
                } else if name == entry
                    && stack.len() == 2
                    && stack.last().map(String::as_str) == Some(container)
                {
                    current = Some(HashMap::new());
                }
                stack.push(name.clone());
            }
            XmlEvent::Text { raw } => {
                if let Some((_, value)) = field.as_mut() {
                    value.push_str(raw.trim());
                }
            }
            XmlEvent::EndTag { name, .. } => {
                stack.pop();
                if let Some((fname, value)) = field.take() {
                    if &fname == name {
                        if let Some(fields) = current.as_mut() {
                            fields.insert(fname, value);
                        }
                    } else {
                        field = Some((fname, value));
                    }
                } else if name == entry && current.is_some() {
                    if let Some(fields) = current.take() {
                        results.push(fields);
                    }
                }
            }
            XmlEvent::SelfClosingTag { name, .. } => {
                if let Some(fields) = current.as_mut() {
                    fields.insert(name.clone(), String::new());
                }
            }
            _ => {}
        }
    }

    Ok(results)
}
