//! Event-schema reader: recovers `xEvent` records from the device's XML
//! schema file.
//!
//! Events are the one protocol category the manual does not document in a
//! parseable form, but the device firmware ships a machine-readable schema
//! for them. An element is an event root when it carries `event="True"`;
//! everything beneath it describes the event body, which nests arbitrarily
//! (six levels deep in practice). Only `public-api` events are kept — the
//! other access classes are internal surfaces that the published protocol
//! does not include.

use crate::error::ExtractError;
use crate::model::{EnumValue, Event, EventAccess, EventChild, UserRole};
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Read and parse the event schema XML file.
pub fn read_events(path: &Path) -> Result<Vec<Event>, ExtractError> {
    let xml = std::fs::read_to_string(path)
        .map_err(|e| xml_error(path, format!("cannot read file: {e}")))?;
    parse_events_xml(&xml, path)
}

/// Parse event schema XML from a string. `source` is used for error
/// reporting only.
pub fn parse_events_xml(xml: &str, source: &Path) -> Result<Vec<Event>, ExtractError> {
    let root = parse_tree(xml, source)?;

    let mut events = Vec::new();
    let base = vec!["xEvent".to_string()];
    for element in &root.children {
        collect_events(element, &base, &mut events, source)?;
    }

    info!("Parsed {} xEvents from XML", events.len());
    Ok(events)
}

fn xml_error(source: &Path, detail: impl Into<String>) -> ExtractError {
    ExtractError::EventXml {
        path: source.to_path_buf(),
        detail: detail.into(),
    }
}

// ── Element tree ──────────────────────────────────────────────────────────

/// One XML element with its attributes, child elements, and text content.
/// The schema file is small (hundreds of kilobytes), so an owned tree is
/// simpler than streaming the recursive walk.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// True when the attribute exists and equals `expected` ignoring case.
    fn attribute_eq(&self, name: &str, expected: &str) -> bool {
        self.attribute(name)
            .is_some_and(|v| v.eq_ignore_ascii_case(expected))
    }
}

fn parse_tree(xml: &str, source: &Path) -> Result<Element, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| xml_error(source, e.to_string()))?
        {
            XmlEvent::Start(start) => {
                stack.push(element_from_tag(&start, source)?);
            }
            XmlEvent::Empty(start) => {
                let element = element_from_tag(&start, source)?;
                attach(element, &mut stack, &mut root);
            }
            XmlEvent::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error(source, "closing tag without opening tag"))?;
                attach(element, &mut stack, &mut root);
            }
            XmlEvent::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| xml_error(source, e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(xml_error(source, "unclosed element at end of document"));
    }
    root.ok_or_else(|| xml_error(source, "document has no root element"))
}

fn element_from_tag(
    start: &quick_xml::events::BytesStart<'_>,
    source: &Path,
) -> Result<Element, ExtractError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| xml_error(source, e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| xml_error(source, e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        ..Default::default()
    })
}

fn attach(element: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            // keep the first root; trailing siblings would be malformed XML
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

// ── Schema walk ───────────────────────────────────────────────────────────

/// Descend the raw schema looking for `event="True"` roots.
fn collect_events(
    element: &Element,
    path: &[String],
    events: &mut Vec<Event>,
    source: &Path,
) -> Result<(), ExtractError> {
    let mut path = path.to_vec();
    path.push(element.name.clone());

    if element.attribute_eq("event", "True") {
        let access_raw = element.attribute("access").ok_or_else(|| {
            xml_error(source, format!("event {} has no access attribute", path.join(" ")))
        })?;
        let access = EventAccess::parse(access_raw).ok_or_else(|| {
            xml_error(source, format!("unknown event access class {access_raw:?}"))
        })?;

        let mut requires_user_role = BTreeSet::new();
        if let Some(raw_roles) = element.attribute("role") {
            for raw_role in raw_roles.split(';') {
                let role = UserRole::parse(raw_role).ok_or_else(|| {
                    xml_error(source, format!("unknown user role {raw_role:?}"))
                })?;
                requires_user_role.insert(role);
            }
        }

        if access == EventAccess::PublicApi {
            let mut children = Vec::new();
            for child in &element.children {
                children.push(body_child(child, &path, source)?);
            }
            events.push(Event {
                path,
                requires_user_role,
                access,
                children,
            });
        }
    } else {
        for child in &element.children {
            collect_events(child, &path, events, source)?;
        }
    }
    Ok(())
}

/// Convert one element inside an event body to its typed tree node.
fn body_child(
    element: &Element,
    parent_path: &[String],
    source: &Path,
) -> Result<EventChild, ExtractError> {
    let mut path = parent_path.to_vec();
    // a className attribute overrides the element name in the path
    path.push(
        element
            .attribute("className")
            .unwrap_or(&element.name)
            .to_string(),
    );
    let required = !element.attribute_eq("optional", "True");

    if element.attribute_eq("type", "literal") && !element.children.is_empty() {
        let values = element
            .children
            .iter()
            .filter(|c| c.name == "Value")
            .map(|c| EnumValue::new(c.text.clone()))
            .collect();
        Ok(EventChild::Enum {
            path,
            required,
            values,
        })
    } else if element.attribute_eq("type", "string") || element.attribute_eq("type", "literal") {
        // a literal with no Value children degrades to a free string
        Ok(EventChild::String { path, required })
    } else if element.attribute_eq("type", "int") {
        Ok(EventChild::Int {
            path,
            required,
            implicit_anonymous_singleton: element.attribute_eq("onlyTextNode", "true"),
        })
    } else if element.attribute_eq("multiple", "True") {
        let mut children = Vec::new();
        for child in &element.children {
            children.push(body_child(child, &path, source)?);
        }
        Ok(EventChild::List { path, children })
    } else {
        let mut children = Vec::new();
        for child in &element.children {
            children.push(body_child(child, &path, source)?);
        }
        Ok(EventChild::Object {
            path,
            required,
            children,
        })
    }
}
