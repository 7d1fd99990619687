//! PLY header parsing.
//!
//! The header is line oriented ASCII even for binary files, so it is read
//! with `read_until` and the reader is left positioned on the first body byte.

use std::io::BufRead;

use plyview_core::ply_types::ScalarType;
use plyview_core::status::{header_error, Status};

pub const VERTEX_ELEMENT: &str = "vertex";
pub const FACE_ELEMENT: &str = "face";
/// Accepted names of the face index list.
pub const FACE_INDEX_PROPERTIES: [&str; 2] = ["vertex_indices", "vertex_index"];

/// Body encoding declared on the `format` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ascii" => Some(PlyFormat::Ascii),
            "binary_little_endian" => Some(PlyFormat::BinaryLittleEndian),
            "binary_big_endian" => Some(PlyFormat::BinaryBigEndian),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlyFormat::Ascii => "ascii",
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
            PlyFormat::BinaryBigEndian => "binary_big_endian",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Scalar(ScalarType),
    List { count: ScalarType, item: ScalarType },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
}

impl PropertyDef {
    pub fn is_list(&self) -> bool {
        matches!(self.kind, PropertyKind::List { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertyDef>,
}

impl ElementDef {
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Parsed PLY header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub elements: Vec<ElementDef>,
    pub comments: Vec<String>,
    pub obj_info: Vec<String>,
}

impl PlyHeader {
    /// Parse a header, consuming input up to and including `end_header`.
    pub fn parse<R: BufRead>(reader: &mut R) -> Status<Self> {
        let magic = read_header_line(reader)?.ok_or_else(|| header_error("Empty file"))?;
        if magic != "ply" {
            return Err(header_error("Missing 'ply' magic"));
        }

        let mut format = None;
        let mut elements: Vec<ElementDef> = Vec::new();
        let mut comments = Vec::new();
        let mut obj_info = Vec::new();

        loop {
            let line = read_header_line(reader)?
                .ok_or_else(|| header_error("No end_header found"))?;
            let mut words = line.split_whitespace();
            let keyword = match words.next() {
                Some(k) => k,
                None => continue,
            };

            match keyword {
                "end_header" => break,
                "comment" => comments.push(line["comment".len()..].trim().to_string()),
                "obj_info" => obj_info.push(line["obj_info".len()..].trim().to_string()),
                "format" => {
                    if format.is_some() {
                        return Err(header_error("Duplicate format line"));
                    }
                    let name = words.next().unwrap_or_default();
                    let parsed = PlyFormat::from_name(name)
                        .ok_or_else(|| header_error(format!("Unknown format '{name}'")))?;
                    match words.next() {
                        Some("1.0") => {}
                        Some(version) => {
                            return Err(header_error(format!("Unsupported version '{version}'")))
                        }
                        None => return Err(header_error("Missing format version")),
                    }
                    format = Some(parsed);
                }
                "element" => {
                    if format.is_none() {
                        return Err(header_error("Element declared before format"));
                    }
                    let name = words
                        .next()
                        .ok_or_else(|| header_error("Element without a name"))?;
                    let count = words
                        .next()
                        .and_then(|s| s.parse::<usize>().ok())
                        .ok_or_else(|| header_error(format!("Invalid count for element '{name}'")))?;
                    elements.push(ElementDef {
                        name: name.to_string(),
                        count,
                        properties: Vec::new(),
                    });
                }
                "property" => {
                    let element = elements
                        .last_mut()
                        .ok_or_else(|| header_error("Property declared outside an element"))?;
                    let property = parse_property(words)?;
                    if element.property(&property.name).is_some() {
                        return Err(header_error(format!(
                            "Duplicate property '{}' in element '{}'",
                            property.name, element.name
                        )));
                    }
                    element.properties.push(property);
                }
                other => return Err(header_error(format!("Unknown header keyword '{other}'"))),
            }
        }

        let format = format.ok_or_else(|| header_error("Missing format line"))?;
        Ok(Self {
            format,
            elements,
            comments,
            obj_info,
        })
    }

    pub fn element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Declared vertex count, 0 if the file has no vertex element.
    pub fn vertex_count(&self) -> usize {
        self.element(VERTEX_ELEMENT).map_or(0, |e| e.count)
    }

    /// Declared face count, 0 if the file has no face element.
    pub fn face_count(&self) -> usize {
        self.element(FACE_ELEMENT).map_or(0, |e| e.count)
    }
}

fn parse_property<'a>(mut words: impl Iterator<Item = &'a str>) -> Status<PropertyDef> {
    let first = words
        .next()
        .ok_or_else(|| header_error("Property without a type"))?;
    let kind = if first == "list" {
        let count = parse_type(words.next())?;
        if !count.is_integral() {
            return Err(header_error("List count type must be integral"));
        }
        let item = parse_type(words.next())?;
        PropertyKind::List { count, item }
    } else {
        PropertyKind::Scalar(parse_type(Some(first))?)
    };
    let name = words
        .next()
        .ok_or_else(|| header_error("Property without a name"))?;
    Ok(PropertyDef {
        name: name.to_string(),
        kind,
    })
}

fn parse_type(word: Option<&str>) -> Status<ScalarType> {
    let word = word.ok_or_else(|| header_error("Missing property type"))?;
    ScalarType::from_name(word).ok_or_else(|| header_error(format!("Unknown property type '{word}'")))
}

fn read_header_line<R: BufRead>(reader: &mut R) -> Status<Option<String>> {
    let mut buf = Vec::new();
    let n = reader
        .read_until(b'\n', &mut buf)
        .map_err(|e| header_error(format!("Read failed: {e}")))?;
    if n == 0 {
        return Ok(None);
    }
    let line = String::from_utf8(buf).map_err(|_| header_error("Header is not ASCII"))?;
    Ok(Some(line.trim().to_string()))
}
