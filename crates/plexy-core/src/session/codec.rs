//! XML encoding of the session document.
//!
//! ```text
//! <session>
//!  <widget controller="clock">
//!   <geometry x="10" y="20" width="100" height="50"/>
//!   <arg zone="UTC"/>
//!   <location id="w1"><geometry x="8" y="8"/></location>
//!   <state id="w1" state="1"/>
//!  </widget>
//! </session>
//! ```
//!
//! Parsing is lenient: a syntax error stops the reader, the error text is
//! reported next to whatever entries were read up to that point.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use super::model::{SessionDocument, WidgetEntry};
use crate::error::{PlexyError, Result};
use crate::geometry::{Point, Rect};

const ROOT: &str = "session";
const WIDGET: &[u8] = b"widget";
const GEOMETRY: &[u8] = b"geometry";
const ARG: &[u8] = b"arg";
const LOCATION: &[u8] = b"location";
const STATE: &[u8] = b"state";

/// Outcome of parsing a serialized session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSession {
    pub document: SessionDocument,
    /// Parser diagnostic, if the input was malformed.
    pub error: Option<String>,
}

impl ParsedSession {
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }
}

impl SessionDocument {
    /// Serializes the document to its XML form.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);
        write_document(&mut writer, self).map_err(|e| PlexyError::serialization("XML", e))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| PlexyError::serialization("XML", e.to_string()))
    }

    /// Parses a serialized session, salvaging what precedes any syntax error.
    pub fn parse_xml(xml: &str) -> ParsedSession {
        SessionReader::default().read(xml)
    }
}

fn write_document(writer: &mut Writer<Vec<u8>>, doc: &SessionDocument) -> std::result::Result<(), String> {
    emit(writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    if doc.is_empty() {
        return emit(writer, Event::Empty(BytesStart::new(ROOT)));
    }

    emit(writer, Event::Start(BytesStart::new(ROOT)))?;
    for entry in doc.entries() {
        write_entry(writer, entry)?;
    }
    emit(writer, Event::End(BytesEnd::new(ROOT)))
}

fn write_entry(writer: &mut Writer<Vec<u8>>, entry: &WidgetEntry) -> std::result::Result<(), String> {
    let mut widget = BytesStart::new("widget");
    widget.push_attribute(("controller", entry.controller_name.as_str()));

    let has_children = entry.geometry.is_some()
        || entry.arguments.is_some()
        || !entry.locations.is_empty()
        || !entry.states.is_empty();
    if !has_children {
        return emit(writer, Event::Empty(widget));
    }

    emit(writer, Event::Start(widget))?;

    if let Some(rect) = entry.geometry {
        emit(writer, Event::Empty(rect_element(rect)))?;
    }

    if let Some(args) = &entry.arguments {
        let mut arg = BytesStart::new("arg");
        for (key, value) in args {
            if !WidgetEntry::is_valid_argument_key(key) {
                tracing::warn!("[SessionCodec] Skipping argument with invalid key '{}'", key);
                continue;
            }
            arg.push_attribute((key.as_str(), value.as_str()));
        }
        emit(writer, Event::Empty(arg))?;
    }

    for location in &entry.locations {
        let mut element = BytesStart::new("location");
        element.push_attribute(("id", location.widget_id.as_str()));
        emit(writer, Event::Start(element))?;
        emit(writer, Event::Empty(point_element(location.position)))?;
        emit(writer, Event::End(BytesEnd::new("location")))?;
    }

    for state in &entry.states {
        let mut element = BytesStart::new("state");
        element.push_attribute(("id", state.widget_id.as_str()));
        element.push_attribute(("state", if state.closed { "1" } else { "0" }));
        emit(writer, Event::Empty(element))?;
    }

    emit(writer, Event::End(BytesEnd::new("widget")))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> std::result::Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

fn rect_element(rect: Rect) -> BytesStart<'static> {
    let mut element = BytesStart::new("geometry");
    element.push_attribute(("x", format_number(rect.x).as_str()));
    element.push_attribute(("y", format_number(rect.y).as_str()));
    element.push_attribute(("width", format_number(rect.width).as_str()));
    element.push_attribute(("height", format_number(rect.height).as_str()));
    element
}

fn point_element(point: Point) -> BytesStart<'static> {
    let mut element = BytesStart::new("geometry");
    element.push_attribute(("x", format_number(point.x).as_str()));
    element.push_attribute(("y", format_number(point.y).as_str()));
    element
}

/// Shortest decimal form: `10` rather than `10.0`.
fn format_number(value: f64) -> String {
    format!("{}", value)
}

fn parse_number(raw: Option<&String>) -> f64 {
    match raw {
        Some(text) => text.trim().parse().unwrap_or_else(|_| {
            tracing::debug!("[SessionCodec] Unparsable number '{}', using 0", text);
            0.0
        }),
        None => 0.0,
    }
}

/// Streaming reader state for one parse.
#[derive(Default)]
struct SessionReader {
    entries: Vec<WidgetEntry>,
    current: Option<WidgetEntry>,
    /// Id of the `location` element being read, with its position once seen.
    location: Option<(String, Option<Point>)>,
    depth: usize,
}

impl SessionReader {
    fn read(mut self, xml: &str) -> ParsedSession {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut error = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    self.open(e);
                    self.depth += 1;
                }
                Ok(Event::Empty(ref e)) => {
                    self.open(e);
                    self.close(e.name().as_ref());
                }
                Ok(Event::End(ref e)) => {
                    self.depth = self.depth.saturating_sub(1);
                    self.close(e.name().as_ref());
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    let message = format!(
                        "XML parse error at byte {}: {}",
                        reader.buffer_position(),
                        e
                    );
                    tracing::warn!("[SessionCodec] {}", message);
                    error = Some(message);
                    break;
                }
                _ => {}
            }
        }

        self.finish_location();
        if let Some(entry) = self.current.take() {
            self.entries.push(entry);
        }

        ParsedSession {
            document: SessionDocument::from_entries(self.entries),
            error,
        }
    }

    /// Handles a start or empty tag at the current depth.
    fn open(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        let name = name.as_ref();

        match self.depth {
            0 => {
                if name != ROOT.as_bytes() {
                    tracing::warn!(
                        "[SessionCodec] Unexpected root element '{}'",
                        String::from_utf8_lossy(name)
                    );
                }
            }
            1 if name == WIDGET => {
                let attrs = attributes(e);
                let controller = attrs.get("controller").cloned().unwrap_or_default();
                self.current = Some(WidgetEntry::new(controller));
            }
            2 => {
                let Some(entry) = self.current.as_mut() else {
                    return;
                };
                let attrs = attributes(e);
                match name {
                    GEOMETRY => {
                        entry.geometry = Some(Rect::new(
                            parse_number(attrs.get("x")),
                            parse_number(attrs.get("y")),
                            parse_number(attrs.get("width")),
                            parse_number(attrs.get("height")),
                        ));
                    }
                    // Only the first arg block counts.
                    ARG if entry.arguments.is_none() => {
                        entry.arguments = Some(attrs);
                    }
                    LOCATION => {
                        let id = attrs.get("id").cloned().unwrap_or_default();
                        self.location = Some((id, None));
                    }
                    STATE => {
                        let id = attrs.get("id").cloned().unwrap_or_default();
                        let closed = attrs
                            .get("state")
                            .and_then(|s| s.trim().parse::<i64>().ok())
                            .is_some_and(|v| v != 0);
                        entry.upsert_state(&id, closed);
                    }
                    _ => {}
                }
            }
            3 if name == GEOMETRY => {
                if let Some((_, position)) = self.location.as_mut() {
                    let attrs = attributes(e);
                    *position = Some(Point::new(
                        parse_number(attrs.get("x")),
                        parse_number(attrs.get("y")),
                    ));
                }
            }
            _ => {}
        }
    }

    /// Handles the end of an element; `self.depth` is the element's own depth.
    fn close(&mut self, name: &[u8]) {
        match (self.depth, name) {
            (2, LOCATION) => self.finish_location(),
            (1, WIDGET) => {
                if let Some(entry) = self.current.take() {
                    self.entries.push(entry);
                }
            }
            _ => {}
        }
    }

    fn finish_location(&mut self) {
        let Some((id, position)) = self.location.take() else {
            return;
        };
        let Some(entry) = self.current.as_mut() else {
            return;
        };
        match position {
            Some(position) => entry.upsert_location(&id, position),
            None => tracing::debug!(
                "[SessionCodec] Dropping location '{}' of '{}': missing geometry",
                id,
                entry.controller_name
            ),
        }
    }
}

fn attributes(e: &BytesStart<'_>) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        match attr.unescape_value() {
            Ok(value) => {
                map.insert(key, value.into_owned());
            }
            Err(err) => {
                tracing::debug!("[SessionCodec] Skipping attribute '{}': {}", key, err);
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionDocument {
        let mut doc = SessionDocument::new();
        doc.append_controller_rect("clock", Rect::new(10.0, 20.0, 100.0, 50.0));
        doc.set_argument("clock", "zone", "Europe/Berlin");
        doc.set_argument("clock", "label", "a \"quoted\" <label> & more");
        doc.set_widget_location("clock", Point::new(8.0, 8.5), "w1");
        doc.set_widget_state("clock", "w1", true);
        doc.set_widget_state("clock", "w2", false);
        doc.append_controller_rect("notes", Rect::new(0.0, 0.0, 320.0, 240.0));
        doc
    }

    #[test]
    fn test_roundtrip_preserves_everything() {
        let doc = sample();
        let xml = doc.to_xml().unwrap();

        let parsed = SessionDocument::parse_xml(&xml);
        assert!(parsed.is_clean(), "unexpected error: {:?}", parsed.error);
        assert_eq!(parsed.document, doc);
    }

    #[test]
    fn test_invalid_argument_keys_are_not_written() {
        let mut entry = WidgetEntry::new("clock");
        let args = entry.arguments.get_or_insert_with(BTreeMap::new);
        args.insert("time zone".to_string(), "UTC".to_string());
        args.insert("format".to_string(), "24h".to_string());
        let doc = SessionDocument::from_entries(vec![entry]);

        let xml = doc.to_xml().unwrap();
        assert!(!xml.contains("time zone"));

        let parsed = SessionDocument::parse_xml(&xml);
        assert!(parsed.is_clean());
        let restored = parsed.document.first_entry("clock").unwrap();
        let restored_args = restored.arguments.as_ref().unwrap();
        assert_eq!(restored_args.len(), 1);
        assert_eq!(restored_args["format"], "24h");
    }

    #[test]
    fn test_serialized_layout() {
        let mut doc = SessionDocument::new();
        doc.append_controller_rect("clock", Rect::new(10.0, 20.0, 100.0, 50.0));
        doc.set_widget_state("clock", "w1", true);

        let xml = doc.to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<widget controller=\"clock\">"));
        assert!(xml.contains("<geometry x=\"10\" y=\"20\" width=\"100\" height=\"50\"/>"));
        assert!(xml.contains("<state id=\"w1\" state=\"1\"/>"));
    }

    #[test]
    fn test_empty_document() {
        let xml = SessionDocument::new().to_xml().unwrap();
        assert!(xml.contains("<session/>"));

        let parsed = SessionDocument::parse_xml(&xml);
        assert!(parsed.is_clean());
        assert!(parsed.document.is_empty());

        let blank = SessionDocument::parse_xml("");
        assert!(blank.is_clean());
        assert!(blank.document.is_empty());
    }

    #[test]
    fn test_malformed_input_salvages_leading_entries() {
        let xml = r#"<session>
            <widget controller="clock"><geometry x="1" y="2" width="3" height="4"/></widget>
            <widget controller="notes"><geometry x="5" y="6" width="7" height="8"/>
            </session>"#;

        let parsed = SessionDocument::parse_xml(xml);
        assert!(parsed.error.is_some());
        let names: Vec<_> = parsed
            .document
            .entries()
            .iter()
            .map(|e| e.controller_name.as_str())
            .collect();
        assert_eq!(names, vec!["clock", "notes"]);
        assert_eq!(
            parsed.document.entries()[1].geometry,
            Some(Rect::new(5.0, 6.0, 7.0, 8.0))
        );
    }

    #[test]
    fn test_lenient_values() {
        let xml = r#"<?xml version="1.0"?>
            <!DOCTYPE Session>
            <session>
              <widget controller="radio">
                <geometry x="abc" y="2"/>
                <arg station="jazz"/>
                <arg station="ignored" extra="ignored"/>
                <location id="lost"/>
                <location id="kept"><geometry x="4" y="5"/></location>
                <state id="a" state="2"/>
                <state id="b"/>
                <unknown><geometry x="9" y="9"/></unknown>
              </widget>
              <widget/>
            </session>"#;

        let parsed = SessionDocument::parse_xml(xml);
        assert!(parsed.is_clean(), "{:?}", parsed.error);

        let entries = parsed.document.entries();
        assert_eq!(entries.len(), 2);

        let radio = &entries[0];
        assert_eq!(radio.geometry, Some(Rect::new(0.0, 2.0, 0.0, 0.0)));
        let args = radio.arguments.as_ref().unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args["station"], "jazz");
        assert_eq!(radio.locations.len(), 1);
        assert_eq!(radio.location("kept").unwrap().position, Point::new(4.0, 5.0));
        assert!(radio.state("a").unwrap().closed);
        assert!(!radio.state("b").unwrap().closed);

        assert_eq!(entries[1].controller_name, "");
    }

    #[test]
    fn test_duplicate_child_ids_collapse_on_read() {
        let xml = r#"<session><widget controller="clock">
              <location id="w1"><geometry x="1" y="1"/></location>
              <location id="w1"><geometry x="2" y="2"/></location>
              <state id="w1" state="0"/>
              <state id="w1" state="1"/>
            </widget></session>"#;

        let parsed = SessionDocument::parse_xml(xml);
        let entry = &parsed.document.entries()[0];
        assert_eq!(entry.locations.len(), 1);
        assert_eq!(entry.location("w1").unwrap().position, Point::new(2.0, 2.0));
        assert_eq!(entry.states.len(), 1);
        assert!(entry.state("w1").unwrap().closed);
    }

    #[test]
    fn test_foreign_root_is_still_read() {
        let xml = r#"<desktop><widget controller="clock"/></desktop>"#;
        let parsed = SessionDocument::parse_xml(xml);
        assert!(parsed.is_clean());
        assert_eq!(parsed.document.entries()[0].controller_name, "clock");
    }
}
