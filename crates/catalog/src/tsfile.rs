//! Reader and writer for the TS 2.1 catalog dialect.
//!
//! Parsing is event-based so structural violations can be reported with a
//! line hint. Serialization emits the canonical layout (four-space indent
//! steps, paired tags for empty translations, lupdate-style escaping), so a
//! catalog already in canonical form round-trips byte for byte.

use std::borrow::Cow;
use std::collections::HashSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::message::{Location, Message, MessageStatus, Translation};
use crate::plurals::PluralRuleSet;
use crate::store::{Catalog, TsContext};

/// Error conditions raised while reading a catalog.
#[derive(Debug, Error)]
pub enum TsParseError {
    #[error("malformed catalog at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("unexpected end of file")]
    UnexpectedEof,
}

struct TsReader<'a> {
    reader: Reader<&'a [u8]>,
    input: &'a str,
}

impl<'a> TsReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            reader: Reader::from_str(input),
            input,
        }
    }

    fn line(&self) -> usize {
        let offset = self.reader.buffer_position().min(self.input.len());
        self.input.as_bytes()[..offset]
            .iter()
            .filter(|byte| **byte == b'\n')
            .count()
            + 1
    }

    fn malformed(&self, reason: impl Into<String>) -> TsParseError {
        TsParseError::Malformed {
            line: self.line(),
            reason: reason.into(),
        }
    }

    fn next(&mut self) -> Result<Event<'a>, TsParseError> {
        self.reader
            .read_event()
            .map_err(|err| TsParseError::Malformed {
                line: self.line(),
                reason: err.to_string(),
            })
    }

    /// Collects the text content of an element up to its closing tag.
    fn read_text(&mut self, tag: &[u8]) -> Result<String, TsParseError> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Event::Text(chunk) => {
                    let chunk = chunk
                        .unescape()
                        .map_err(|err| self.malformed(err.to_string()))?;
                    text.push_str(&chunk);
                }
                Event::CData(chunk) => text.push_str(&String::from_utf8_lossy(chunk.as_ref())),
                Event::Comment(_) => {}
                Event::End(end) if end.name().as_ref() == tag => return Ok(text),
                Event::Eof => return Err(TsParseError::UnexpectedEof),
                Event::Start(element) | Event::Empty(element) => {
                    return Err(self.malformed(format!(
                        "unexpected element <{}> inside <{}>",
                        element_name(&element),
                        String::from_utf8_lossy(tag)
                    )))
                }
                _ => return Err(self.malformed("unexpected content")),
            }
        }
    }
}

/// Parses the textual catalog representation.
pub fn parse(input: &str) -> Result<Catalog, TsParseError> {
    let mut r = TsReader::new(input);

    let root = loop {
        match r.next()? {
            Event::Start(element) => {
                if element.name().as_ref() == b"TS" {
                    break element;
                }
                return Err(r.malformed(format!(
                    "expected <TS> root element, found <{}>",
                    element_name(&element)
                )));
            }
            Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
            Event::Text(text) if is_whitespace(text.as_ref()) => {}
            Event::Eof => return Err(TsParseError::UnexpectedEof),
            _ => return Err(r.malformed("expected <TS> root element")),
        }
    };

    let mut version = None;
    let mut language = None;
    let mut source_language = None;
    let mut extra = Vec::new();
    for attr in root.attributes() {
        let attr = attr.map_err(|err| r.malformed(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| r.malformed(err.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"version" => version = Some(value),
            b"language" => language = Some(value),
            b"sourcelanguage" => source_language = Some(value),
            key => extra.push((String::from_utf8_lossy(key).into_owned(), value)),
        }
    }
    let version = version.ok_or_else(|| r.malformed("<TS> is missing the version attribute"))?;
    let language = language.ok_or_else(|| r.malformed("<TS> is missing the language attribute"))?;

    let rules = PluralRuleSet::for_language(&language);
    let mut contexts: Vec<TsContext> = Vec::new();
    loop {
        match r.next()? {
            Event::Start(element) if element.name().as_ref() == b"context" => {
                contexts.push(parse_context(&mut r, &rules)?);
            }
            Event::End(end) if end.name().as_ref() == b"TS" => break,
            Event::Text(text) if is_whitespace(text.as_ref()) => {}
            Event::Comment(_) => {}
            Event::Eof => return Err(TsParseError::UnexpectedEof),
            Event::Start(element) | Event::Empty(element) => {
                return Err(r.malformed(format!(
                    "unexpected element <{}> in <TS>",
                    element_name(&element)
                )))
            }
            _ => return Err(r.malformed("unexpected content in <TS>")),
        }
    }

    loop {
        match r.next()? {
            Event::Eof => break,
            Event::Text(text) if is_whitespace(text.as_ref()) => {}
            Event::Comment(_) => {}
            _ => return Err(r.malformed("content after </TS>")),
        }
    }

    Catalog::from_contexts(language, source_language, version, extra, contexts)
        .map_err(|err| r.malformed(err.to_string()))
}

fn parse_context(r: &mut TsReader, rules: &PluralRuleSet) -> Result<TsContext, TsParseError> {
    let mut name: Option<String> = None;
    let mut messages = Vec::new();
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    loop {
        match r.next()? {
            Event::Start(element) => match element.name().as_ref() {
                b"name" => name = Some(r.read_text(b"name")?),
                b"message" => {
                    let line = r.line();
                    let message = parse_message(r, &element, rules)?;
                    let key = (message.source.clone(), message.comment.clone());
                    if !seen.insert(key) {
                        return Err(TsParseError::Malformed {
                            line,
                            reason: format!(
                                "duplicate message {:?} (disambiguator {:?})",
                                message.source, message.comment
                            ),
                        });
                    }
                    messages.push(message);
                }
                _ => {
                    return Err(r.malformed(format!(
                        "unexpected element <{}> in <context>",
                        element_name(&element)
                    )))
                }
            },
            Event::End(end) if end.name().as_ref() == b"context" => break,
            Event::Text(text) if is_whitespace(text.as_ref()) => {}
            Event::Comment(_) => {}
            Event::Eof => return Err(TsParseError::UnexpectedEof),
            Event::Empty(element) => {
                return Err(r.malformed(format!(
                    "unexpected element <{}> in <context>",
                    element_name(&element)
                )))
            }
            _ => return Err(r.malformed("unexpected content in <context>")),
        }
    }
    let name = name.ok_or_else(|| r.malformed("<context> is missing <name>"))?;
    Ok(TsContext { name, messages })
}

fn parse_message(
    r: &mut TsReader,
    start: &BytesStart,
    rules: &PluralRuleSet,
) -> Result<Message, TsParseError> {
    let mut numerus = false;
    let mut extra = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| r.malformed(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| r.malformed(err.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"numerus" => numerus = value == "yes",
            key => extra.push((String::from_utf8_lossy(key).into_owned(), value)),
        }
    }

    let mut locations = Vec::new();
    let mut source: Option<String> = None;
    let mut comment: Option<String> = None;
    let mut extracomment: Option<String> = None;
    let mut translatorcomment: Option<String> = None;
    let mut parsed: Option<(MessageStatus, Translation)> = None;
    let mut translation_line = r.line();

    loop {
        match r.next()? {
            Event::Empty(element) => match element.name().as_ref() {
                b"location" => locations.push(parse_location(r, &element)?),
                b"translation" => {
                    translation_line = r.line();
                    let status = parse_translation_attrs(r, &element)?;
                    let payload = if numerus {
                        Translation::Plural(Vec::new())
                    } else {
                        Translation::Single(String::new())
                    };
                    parsed = Some((status, payload));
                }
                _ => {
                    return Err(r.malformed(format!(
                        "unexpected element <{}> in <message>",
                        element_name(&element)
                    )))
                }
            },
            Event::Start(element) => match element.name().as_ref() {
                b"location" => {
                    let location = parse_location(r, &element)?;
                    consume_end(r, b"location")?;
                    locations.push(location);
                }
                b"source" => source = Some(r.read_text(b"source")?),
                b"comment" => comment = Some(r.read_text(b"comment")?),
                b"extracomment" => extracomment = Some(r.read_text(b"extracomment")?),
                b"translatorcomment" => {
                    translatorcomment = Some(r.read_text(b"translatorcomment")?)
                }
                b"translation" => {
                    translation_line = r.line();
                    parsed = Some(parse_translation(r, &element, numerus)?);
                }
                _ => {
                    return Err(r.malformed(format!(
                        "unexpected element <{}> in <message>",
                        element_name(&element)
                    )))
                }
            },
            Event::End(end) if end.name().as_ref() == b"message" => break,
            Event::Text(text) if is_whitespace(text.as_ref()) => {}
            Event::Comment(_) => {}
            Event::Eof => return Err(TsParseError::UnexpectedEof),
            _ => return Err(r.malformed("unexpected content in <message>")),
        }
    }

    let source = source.ok_or_else(|| r.malformed("<message> is missing <source>"))?;
    let (status, translation) = parsed.unwrap_or_else(|| {
        let payload = if numerus {
            Translation::empty_plural(rules.form_count())
        } else {
            Translation::Single(String::new())
        };
        (MessageStatus::Unfinished, payload)
    });

    if let Translation::Plural(forms) = &translation {
        if forms.len() != rules.form_count() {
            return Err(TsParseError::Malformed {
                line: translation_line,
                reason: format!(
                    "plural translation has {} forms, the catalog language expects {}",
                    forms.len(),
                    rules.form_count()
                ),
            });
        }
    }

    Ok(Message {
        source,
        comment,
        locations,
        extracomment,
        translatorcomment,
        status,
        translation,
        extra,
    })
}

fn parse_location(r: &TsReader, element: &BytesStart) -> Result<Location, TsParseError> {
    let mut filename: Option<String> = None;
    let mut line: Option<u32> = None;
    for attr in element.attributes() {
        let attr = attr.map_err(|err| r.malformed(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| r.malformed(err.to_string()))?;
        match attr.key.as_ref() {
            b"filename" => filename = Some(value.into_owned()),
            b"line" => {
                line = Some(value.parse().map_err(|_| {
                    r.malformed(format!("invalid location line number {value:?}"))
                })?)
            }
            key => {
                return Err(r.malformed(format!(
                    "unsupported attribute {:?} on <location>",
                    String::from_utf8_lossy(key)
                )))
            }
        }
    }
    let filename = filename
        .ok_or_else(|| r.malformed("<location> is missing the filename attribute"))?;
    Ok(Location { filename, line })
}

fn parse_translation_attrs(
    r: &TsReader,
    element: &BytesStart,
) -> Result<MessageStatus, TsParseError> {
    let mut status = MessageStatus::Finished;
    for attr in element.attributes() {
        let attr = attr.map_err(|err| r.malformed(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| r.malformed(err.to_string()))?;
        match attr.key.as_ref() {
            b"type" => {
                status = MessageStatus::from_type_attr(&value)
                    .ok_or_else(|| r.malformed(format!("unknown translation type {value:?}")))?
            }
            key => {
                return Err(r.malformed(format!(
                    "unsupported attribute {:?} on <translation>",
                    String::from_utf8_lossy(key)
                )))
            }
        }
    }
    Ok(status)
}

fn parse_translation(
    r: &mut TsReader,
    start: &BytesStart,
    numerus: bool,
) -> Result<(MessageStatus, Translation), TsParseError> {
    let status = parse_translation_attrs(r, start)?;
    let mut text = String::new();
    let mut forms: Vec<String> = Vec::new();
    loop {
        match r.next()? {
            Event::Text(chunk) => {
                let chunk = chunk
                    .unescape()
                    .map_err(|err| r.malformed(err.to_string()))?;
                text.push_str(&chunk);
            }
            Event::CData(chunk) => text.push_str(&String::from_utf8_lossy(chunk.as_ref())),
            Event::Start(element) if element.name().as_ref() == b"numerusform" => {
                forms.push(r.read_text(b"numerusform")?);
            }
            Event::Empty(element) if element.name().as_ref() == b"numerusform" => {
                forms.push(String::new());
            }
            Event::End(end) if end.name().as_ref() == b"translation" => break,
            Event::Comment(_) => {}
            Event::Eof => return Err(TsParseError::UnexpectedEof),
            Event::Start(element) | Event::Empty(element) => {
                return Err(r.malformed(format!(
                    "unexpected element <{}> in <translation>",
                    element_name(&element)
                )))
            }
            _ => return Err(r.malformed("unexpected content in <translation>")),
        }
    }

    if numerus {
        if !text.trim().is_empty() {
            return Err(r.malformed("plural translation text must be inside <numerusform>"));
        }
        Ok((status, Translation::Plural(forms)))
    } else {
        if !forms.is_empty() {
            return Err(r.malformed("<numerusform> in a message without numerus=\"yes\""));
        }
        Ok((status, Translation::Single(text)))
    }
}

fn consume_end(r: &mut TsReader, tag: &[u8]) -> Result<(), TsParseError> {
    loop {
        match r.next()? {
            Event::End(end) if end.name().as_ref() == tag => return Ok(()),
            Event::Text(text) if is_whitespace(text.as_ref()) => {}
            Event::Eof => return Err(TsParseError::UnexpectedEof),
            _ => {
                return Err(r.malformed(format!(
                    "expected </{}>",
                    String::from_utf8_lossy(tag)
                )))
            }
        }
    }
}

fn element_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn is_whitespace(bytes: &[u8]) -> bool {
    bytes.iter().all(|byte| byte.is_ascii_whitespace())
}

/// Serializes a catalog into the canonical textual layout.
pub fn serialize(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n");
    out.push_str("<TS version=\"");
    out.push_str(&escape(catalog.version()));
    out.push('"');
    if let Some(source_language) = catalog.source_language() {
        out.push_str(" sourcelanguage=\"");
        out.push_str(&escape(source_language));
        out.push('"');
    }
    out.push_str(" language=\"");
    out.push_str(&escape(catalog.language()));
    out.push('"');
    write_extra_attrs(&mut out, catalog.extra_attributes());
    out.push_str(">\n");
    for context in catalog.contexts() {
        out.push_str("<context>\n    <name>");
        out.push_str(&escape(&context.name));
        out.push_str("</name>\n");
        for message in &context.messages {
            write_message(&mut out, message);
        }
        out.push_str("</context>\n");
    }
    out.push_str("</TS>\n");
    out
}

fn write_message(out: &mut String, message: &Message) {
    out.push_str("    <message");
    if message.is_plural() {
        out.push_str(" numerus=\"yes\"");
    }
    write_extra_attrs(out, &message.extra);
    out.push_str(">\n");
    for location in &message.locations {
        out.push_str("        <location filename=\"");
        out.push_str(&escape(&location.filename));
        out.push('"');
        if let Some(line) = location.line {
            out.push_str(" line=\"");
            out.push_str(&line.to_string());
            out.push('"');
        }
        out.push_str("/>\n");
    }
    write_text_element(out, "source", &message.source);
    if let Some(comment) = &message.comment {
        write_text_element(out, "comment", comment);
    }
    if let Some(extracomment) = &message.extracomment {
        write_text_element(out, "extracomment", extracomment);
    }
    if let Some(translatorcomment) = &message.translatorcomment {
        write_text_element(out, "translatorcomment", translatorcomment);
    }
    out.push_str("        <translation");
    if let Some(kind) = message.status.type_attr() {
        out.push_str(" type=\"");
        out.push_str(kind);
        out.push('"');
    }
    out.push('>');
    match &message.translation {
        Translation::Single(text) => {
            out.push_str(&escape(text));
        }
        Translation::Plural(forms) => {
            out.push('\n');
            for form in forms {
                out.push_str("            <numerusform>");
                out.push_str(&escape(form));
                out.push_str("</numerusform>\n");
            }
            out.push_str("        ");
        }
    }
    out.push_str("</translation>\n    </message>\n");
}

fn write_text_element(out: &mut String, tag: &str, text: &str) {
    out.push_str("        <");
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape(text));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn write_extra_attrs(out: &mut String, extra: &[(String, String)]) {
    for (key, value) in extra {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
}

fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
