//! Minimal element tree over `quick-xml`, shared by the dialect readers.
//!
//! Namespace prefixes are dropped from element and attribute names, so
//! `bpmndi:BPMNShape` is looked up as `BPMNShape`. DOCTYPE declarations are
//! rejected outright, which keeps entity expansion out of the picture.

use super::{Bounds, LocationMap, ParseError, Point};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Deepest element nesting accepted. The tree and its drop are recursive.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, treating empty strings as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<String> {
        self.attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn required_attr(&self, name: &'static str) -> Result<String, ParseError> {
        self.non_empty_attr(name)
            .ok_or_else(|| ParseError::MissingAttribute {
                element: self.name.clone(),
                attribute: name,
            })
    }

    pub fn f64_attr(&self, name: &str) -> Result<f64, ParseError> {
        let raw = self.attr(name).unwrap_or("0");
        raw.trim()
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber {
                attribute: name.to_string(),
                value: raw.to_string(),
            })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Trimmed text of the first child with the given name, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(|child| child.text.trim().to_string())
            .filter(|text| !text.is_empty())
    }

    /// Depth-first search for every element with the given name.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        let mut stack: Vec<&XmlElement> = self.children.iter().rev().collect();
        while let Some(element) = stack.pop() {
            if element.name == name {
                found.push(element);
            }
            stack.extend(element.children.iter().rev());
        }
        found
    }
}

pub fn parse_document(xml: &[u8]) -> Result<XmlElement, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(ParseError::Xml("document nested too deeply".to_string()));
                }
                stack.push(element_from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::Xml("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| ParseError::Xml(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(&e).map_err(|e| ParseError::Xml(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(text);
                }
            }
            Ok(Event::DocType(_)) => return Err(ParseError::DocType),
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Xml(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or(ParseError::EmptyDocument)
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement, ParseError> {
    let name = std::str::from_utf8(e.local_name().as_ref())
        .map_err(|e| ParseError::Xml(e.to_string()))?
        .to_string();

    let mut attributes = IndexMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::Xml(e.to_string()))?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(|e| ParseError::Xml(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::Xml(e.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        // Only the first top-level element counts as the document root.
        None if root.is_none() => *root = Some(element),
        None => {}
    }
}

/// Collects `<shape ref_attr="id"><Bounds .../></shape>` diagram entries.
pub fn collect_shapes(
    root: &XmlElement,
    shape_name: &str,
    ref_attr: &str,
) -> Result<LocationMap, ParseError> {
    let mut locations = LocationMap::new();
    for shape in root.descendants_named(shape_name) {
        let (Some(element_ref), Some(bounds)) = (shape.non_empty_attr(ref_attr), shape.child("Bounds"))
        else {
            continue;
        };
        locations.insert(
            element_ref,
            Bounds::new(
                bounds.f64_attr("x")?,
                bounds.f64_attr("y")?,
                bounds.f64_attr("width")?,
                bounds.f64_attr("height")?,
            ),
        );
    }
    Ok(locations)
}

/// Collects `<edge ref_attr="id"><waypoint x y/>...</edge>` diagram entries.
pub fn collect_edges(
    root: &XmlElement,
    edge_name: &str,
    ref_attr: &str,
) -> Result<IndexMap<String, Vec<Point>>, ParseError> {
    let mut edges = IndexMap::new();
    for edge in root.descendants_named(edge_name) {
        let Some(element_ref) = edge.non_empty_attr(ref_attr) else {
            continue;
        };
        let waypoints = edge
            .children_named("waypoint")
            .map(|point| {
                Ok(Point {
                    x: point.f64_attr("x")?,
                    y: point.f64_attr("y")?,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        edges.insert(element_ref, waypoints);
    }
    Ok(edges)
}

/// Strips the leading `#` of a same-document href.
pub fn local_ref(href: &str) -> String {
    href.trim().trim_start_matches('#').to_string()
}
