//! PLY property stream decoder (ASCII, binary little and big endian).
//!
//! Provides a struct-based API (`PlyReader`) that parses the header eagerly
//! and decodes the body lazily through [`PropertyEvents`].

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use log::debug;
use num_traits::ToPrimitive;

use plyview_core::ply_types::ScalarType;
use plyview_core::status::{stream_error, PlyError, Status};
use plyview_core::vertex_layout::VertexProperty;

use crate::ply_header::{
    PlyFormat, PlyHeader, PropertyKind, FACE_ELEMENT, FACE_INDEX_PROPERTIES, VERTEX_ELEMENT,
};
use crate::traits::{ElementCounts, PlyEvent, PropertyStream};

/// PLY format reader.
#[derive(Debug)]
pub struct PlyReader<R> {
    header: PlyHeader,
    source: R,
}

impl PlyReader<BufReader<File>> {
    /// Open a PLY file and parse its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Status<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PlyError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> PlyReader<R> {
    /// Parse the header from an already open source.
    pub fn from_reader(mut source: R) -> Status<Self> {
        let header = PlyHeader::parse(&mut source)?;
        debug!(
            "PLY header: {} with {} vertices, {} faces, {} elements",
            header.format.name(),
            header.vertex_count(),
            header.face_count(),
            header.elements.len()
        );
        Ok(Self { header, source })
    }

    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    pub fn declared_counts(&self) -> ElementCounts {
        ElementCounts {
            vertices: self.header.vertex_count(),
            faces: self.header.face_count(),
        }
    }

    /// Start decoding the body.
    pub fn into_events(self) -> PropertyEvents<R> {
        PropertyEvents::new(self.header, self.source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyRole {
    Vertex {
        property: VertexProperty,
        end_of_record: bool,
    },
    FaceIndices,
    Skip,
}

#[derive(Debug)]
struct PropertyPlan {
    kind: PropertyKind,
    role: PropertyRole,
}

#[derive(Debug)]
struct ElementPlan {
    count: usize,
    properties: Vec<PropertyPlan>,
}

impl ElementPlan {
    fn build(header: &PlyHeader) -> Vec<ElementPlan> {
        header
            .elements
            .iter()
            .map(|element| {
                let roles: Vec<PropertyRole> = if element.name == VERTEX_ELEMENT {
                    let consumed: Vec<Option<VertexProperty>> = element
                        .properties
                        .iter()
                        .map(|p| match p.kind {
                            PropertyKind::Scalar(_) => VertexProperty::from_name(&p.name),
                            PropertyKind::List { .. } => None,
                        })
                        .collect();
                    let last = consumed.iter().rposition(Option::is_some);
                    consumed
                        .iter()
                        .enumerate()
                        .map(|(i, p)| match p {
                            Some(property) => PropertyRole::Vertex {
                                property: *property,
                                end_of_record: Some(i) == last,
                            },
                            None => PropertyRole::Skip,
                        })
                        .collect()
                } else if element.name == FACE_ELEMENT {
                    let list = element
                        .properties
                        .iter()
                        .position(|p| p.is_list() && FACE_INDEX_PROPERTIES.contains(&p.name.as_str()));
                    (0..element.properties.len())
                        .map(|i| {
                            if Some(i) == list {
                                PropertyRole::FaceIndices
                            } else {
                                PropertyRole::Skip
                            }
                        })
                        .collect()
                } else {
                    vec![PropertyRole::Skip; element.properties.len()]
                };

                ElementPlan {
                    count: element.count,
                    properties: element
                        .properties
                        .iter()
                        .zip(roles)
                        .map(|(p, role)| PropertyPlan { kind: p.kind, role })
                        .collect(),
                }
            })
            .collect()
    }
}

/// Lazy event iterator over a PLY body.
///
/// Values are read one at a time as events are requested, list items
/// included, so memory does not grow with element or list sizes. Every
/// declared element is decoded in order, including elements that emit no
/// events, so that the byte position stays correct. Data after the last
/// declared element is ignored.
#[derive(Debug)]
pub struct PropertyEvents<R> {
    source: R,
    format: PlyFormat,
    counts: ElementCounts,
    plan: Vec<ElementPlan>,
    element: usize,
    instance: usize,
    property: usize,
    list: Option<ListCursor>,
    token: Vec<u8>,
    done: bool,
}

/// Progress through the list property currently being read.
#[derive(Debug, Clone, Copy)]
struct ListCursor {
    item: ScalarType,
    emit: bool,
    position: usize,
    length: usize,
}

enum Step {
    Event(PlyEvent),
    Skipped,
    Finished,
}

impl<R: BufRead> PropertyEvents<R> {
    fn new(header: PlyHeader, source: R) -> Self {
        let counts = ElementCounts {
            vertices: header.vertex_count(),
            faces: header.face_count(),
        };
        Self {
            source,
            format: header.format,
            counts,
            plan: ElementPlan::build(&header),
            element: 0,
            instance: 0,
            property: 0,
            list: None,
            token: Vec::new(),
            done: false,
        }
    }

    /// Decode a single value, or one list length, from the body.
    fn step(&mut self) -> Status<Step> {
        if let Some(mut list) = self.list.take() {
            if list.position >= list.length {
                self.property += 1;
                return Ok(Step::Skipped);
            }
            let raw = read_value(&mut self.source, &mut self.token, self.format, list.item)?;
            let position = list.position;
            list.position += 1;
            self.list = Some(list);
            if !list.emit {
                return Ok(Step::Skipped);
            }
            return Ok(Step::Event(PlyEvent::FaceIndex {
                value: to_index(raw)?,
                position,
                length: list.length,
            }));
        }

        loop {
            let Some(element) = self.plan.get(self.element) else {
                return Ok(Step::Finished);
            };
            if self.instance >= element.count {
                self.element += 1;
                self.instance = 0;
                self.property = 0;
            } else if self.property >= element.properties.len() {
                self.instance += 1;
                self.property = 0;
            } else {
                break;
            }
        }

        let plan = &self.plan[self.element].properties[self.property];
        let (kind, role) = (plan.kind, plan.role);
        match kind {
            PropertyKind::Scalar(ty) => {
                let value = read_value(&mut self.source, &mut self.token, self.format, ty)?;
                self.property += 1;
                match role {
                    PropertyRole::Vertex {
                        property,
                        end_of_record,
                    } => Ok(Step::Event(PlyEvent::VertexScalar {
                        property,
                        value,
                        end_of_record,
                    })),
                    _ => Ok(Step::Skipped),
                }
            }
            PropertyKind::List { count, item } => {
                let raw = read_value(&mut self.source, &mut self.token, self.format, count)?;
                let length = raw
                    .to_usize()
                    .ok_or_else(|| stream_error(format!("Invalid list length {raw}")))?;
                self.list = Some(ListCursor {
                    item,
                    emit: role == PropertyRole::FaceIndices,
                    position: 0,
                    length,
                });
                Ok(Step::Skipped)
            }
        }
    }
}

impl<R: BufRead> Iterator for PropertyEvents<R> {
    type Item = Status<PlyEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.step() {
                Ok(Step::Event(event)) => return Some(Ok(event)),
                Ok(Step::Skipped) => {}
                Ok(Step::Finished) => self.done = true,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl<R: BufRead> PropertyStream for PropertyEvents<R> {
    fn declared_counts(&self) -> ElementCounts {
        self.counts
    }
}

fn to_index(raw: f64) -> Status<u32> {
    if raw.fract() != 0.0 {
        return Err(stream_error(format!("Non-integral face index {raw}")));
    }
    raw.to_u32()
        .ok_or_else(|| stream_error(format!("Invalid face index {raw}")))
}

fn read_value<R: BufRead>(
    source: &mut R,
    token: &mut Vec<u8>,
    format: PlyFormat,
    ty: ScalarType,
) -> Status<f64> {
    match format {
        PlyFormat::Ascii => read_ascii(source, token, ty),
        PlyFormat::BinaryLittleEndian => read_binary::<LittleEndian, _>(source, ty),
        PlyFormat::BinaryBigEndian => read_binary::<BigEndian, _>(source, ty),
    }
}

fn body_error(err: io::Error) -> PlyError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        stream_error("Unexpected end of file")
    } else {
        PlyError::Io(err)
    }
}

fn read_binary<B: ByteOrder, R: Read>(source: &mut R, ty: ScalarType) -> Status<f64> {
    let value = match ty {
        ScalarType::Int8 => f64::from(source.read_i8().map_err(body_error)?),
        ScalarType::Uint8 => f64::from(source.read_u8().map_err(body_error)?),
        ScalarType::Int16 => f64::from(source.read_i16::<B>().map_err(body_error)?),
        ScalarType::Uint16 => f64::from(source.read_u16::<B>().map_err(body_error)?),
        ScalarType::Int32 => f64::from(source.read_i32::<B>().map_err(body_error)?),
        ScalarType::Uint32 => f64::from(source.read_u32::<B>().map_err(body_error)?),
        ScalarType::Float32 => f64::from(source.read_f32::<B>().map_err(body_error)?),
        ScalarType::Float64 => source.read_f64::<B>().map_err(body_error)?,
    };
    Ok(value)
}

fn read_ascii<R: BufRead>(source: &mut R, token: &mut Vec<u8>, ty: ScalarType) -> Status<f64> {
    next_token(source, token).map_err(body_error)?;
    if token.is_empty() {
        return Err(stream_error("Unexpected end of file"));
    }
    let text = std::str::from_utf8(token).map_err(|_| stream_error("Non-ASCII value in body"))?;
    let value = if ty.is_integral() {
        text.parse::<i64>().ok().and_then(|v| fit_integral(v, ty))
    } else {
        text.parse::<f64>().ok()
    };
    value.ok_or_else(|| stream_error(format!("Invalid {} value '{text}'", ty.name())))
}

/// `value` as a float if it lies within the range of `ty`.
fn fit_integral(value: i64, ty: ScalarType) -> Option<f64> {
    let fits = match ty {
        ScalarType::Int8 => value.to_i8().is_some(),
        ScalarType::Uint8 => value.to_u8().is_some(),
        ScalarType::Int16 => value.to_i16().is_some(),
        ScalarType::Uint16 => value.to_u16().is_some(),
        ScalarType::Int32 => value.to_i32().is_some(),
        ScalarType::Uint32 => value.to_u32().is_some(),
        ScalarType::Float32 | ScalarType::Float64 => true,
    };
    if fits {
        value.to_f64()
    } else {
        None
    }
}

/// Read the next whitespace-delimited word into `token`, empty at EOF.
fn next_token<R: BufRead>(source: &mut R, token: &mut Vec<u8>) -> io::Result<()> {
    token.clear();
    loop {
        let (consumed, finished) = {
            let available = source.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            let mut consumed = 0;
            let mut finished = false;
            for &byte in available {
                consumed += 1;
                if byte.is_ascii_whitespace() {
                    if !token.is_empty() {
                        finished = true;
                        break;
                    }
                } else {
                    token.push(byte);
                }
            }
            (consumed, finished)
        };
        source.consume(consumed);
        if finished {
            return Ok(());
        }
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Decode every event of an in-memory PLY file.
pub fn read_ply_events(data: &[u8]) -> Status<Vec<PlyEvent>> {
    PlyReader::from_reader(data)?.into_events().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plyview_core::status::LoadStage;
    use proptest::prelude::*;

    const QUAD: &str = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 2
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
3 0 1 2
3 0 2 3
";

    fn vertex_values(events: &[PlyEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                PlyEvent::VertexScalar { value, .. } => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn face_values(events: &[PlyEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                PlyEvent::FaceIndex { value, .. } => Some(*value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ascii_quad() {
        let events = read_ply_events(QUAD.as_bytes()).unwrap();
        assert_eq!(vertex_values(&events).len(), 12);
        assert_eq!(face_values(&events), vec![0, 1, 2, 0, 2, 3]);

        let ends: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                PlyEvent::VertexScalar { end_of_record, .. } => Some(*end_of_record),
                _ => None,
            })
            .collect();
        assert_eq!(ends.iter().filter(|e| **e).count(), 4);
        assert!(ends[2] && !ends[0] && !ends[1]);
    }

    #[test]
    fn test_face_positions() {
        let events = read_ply_events(QUAD.as_bytes()).unwrap();
        let positions: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                PlyEvent::FaceIndex { position, length, .. } => Some((*position, *length)),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![(0, 3), (1, 3), (2, 3), (0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_declared_counts() {
        let reader = PlyReader::from_reader(QUAD.as_bytes()).unwrap();
        assert_eq!(reader.declared_counts(), ElementCounts { vertices: 4, faces: 2 });
        let events = reader.into_events();
        assert_eq!(events.declared_counts().faces, 2);
    }

    #[test]
    fn test_unknown_properties_are_skipped() {
        let data = "ply
format ascii 1.0
element vertex 2
property float x
property float confidence
property float y
property float z
property list uchar float extra
element face 1
property uchar flags
property list uchar uint vertex_index
end_header
1 0.9 2 3 2 7 7
4 0.8 5 6 0
9 3 0 1 1
";
        let events = read_ply_events(data.as_bytes()).unwrap();
        assert_eq!(vertex_values(&events), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(face_values(&events), vec![0, 1, 1]);
    }

    #[test]
    fn test_end_of_record_on_last_consumed_property() {
        let data = "ply
format ascii 1.0
element vertex 1
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
property uchar alpha
end_header
0 0 0 255 128 0 255
";
        let events = read_ply_events(data.as_bytes()).unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[5],
            PlyEvent::VertexScalar {
                property: VertexProperty::Blue,
                value: 0.0,
                end_of_record: true
            }
        );
    }

    #[test]
    fn test_other_elements_are_consumed() {
        let data = "ply
format ascii 1.0
element material 1
property uchar ambient_red
element vertex 1
property float x
end_header
7
2.5
";
        let events = read_ply_events(data.as_bytes()).unwrap();
        assert_eq!(vertex_values(&events), vec![2.5]);
    }

    #[test]
    fn test_binary_little_endian() {
        let mut data = b"ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\nproperty double y\nproperty short z\nelement face 1\nproperty list uchar ushort vertex_indices\nend_header\n".to_vec();
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-2.25f64).to_le_bytes());
        data.extend_from_slice(&(-7i16).to_le_bytes());
        data.push(3);
        for index in [0u16, 1, 65535] {
            data.extend_from_slice(&index.to_le_bytes());
        }

        let events = read_ply_events(&data).unwrap();
        assert_eq!(vertex_values(&events), vec![1.5, -2.25, -7.0]);
        assert_eq!(face_values(&events), vec![0, 1, 65535]);
    }

    #[test]
    fn test_binary_big_endian() {
        let mut data = b"ply\nformat binary_big_endian 1.0\nelement vertex 2\nproperty float x\nproperty uchar red\nend_header\n".to_vec();
        data.extend_from_slice(&0.5f32.to_be_bytes());
        data.push(200);
        data.extend_from_slice(&(-3.0f32).to_be_bytes());
        data.push(10);

        let events = read_ply_events(&data).unwrap();
        assert_eq!(vertex_values(&events), vec![0.5, 200.0, -3.0, 10.0]);
    }

    #[test]
    fn test_truncated_binary_body() {
        let mut data = b"ply\nformat binary_little_endian 1.0\nelement vertex 2\nproperty float x\nend_header\n".to_vec();
        data.extend_from_slice(&1.0f32.to_le_bytes());
        data.extend_from_slice(&[0, 0]);

        let results: Vec<_> = PlyReader::from_reader(data.as_slice()).unwrap().into_events().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.stage(), LoadStage::Stream);
    }

    #[test]
    fn test_stream_failures() {
        let cases = [
            "ply\nformat ascii 1.0\nelement vertex 2\nproperty float x\nend_header\n1.0\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\nabc\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty int x\nend_header\n1.5\n",
            "ply\nformat ascii 1.0\nelement face 1\nproperty list int int vertex_indices\nend_header\n-1\n",
            "ply\nformat ascii 1.0\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n3 0 -1 2\n",
            "ply\nformat ascii 1.0\nelement face 1\nproperty list uchar float vertex_indices\nend_header\n3 0 1.5 2\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty uchar red\nend_header\n300\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty uchar red\nend_header\n-5\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty short x\nend_header\n40000\n",
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty short x\nend_header\n-32769\n",
            "ply\nformat ascii 1.0\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n256 0 1 2\n",
        ];
        for case in cases {
            let err = read_ply_events(case.as_bytes()).unwrap_err();
            assert_eq!(err.stage(), LoadStage::Stream, "case {case:?} gave {err}");
        }
    }

    #[test]
    fn test_ascii_integral_bounds() {
        let data = "ply
format ascii 1.0
element vertex 1
property uchar red
property char x
property short y
property ushort z
end_header
255 -128 -32768 65535
";
        let events = read_ply_events(data.as_bytes()).unwrap();
        assert_eq!(vertex_values(&events), vec![255.0, -128.0, -32768.0, 65535.0]);
    }

    #[test]
    fn test_long_face_list_is_streamed() {
        let length = 200_000u32;
        let mut data = b"ply\nformat binary_little_endian 1.0\nelement face 1\nproperty list uint uint vertex_indices\nend_header\n".to_vec();
        data.extend_from_slice(&length.to_le_bytes());
        for index in 0..length {
            data.extend_from_slice(&(index % 7).to_le_bytes());
        }

        let mut events = PlyReader::from_reader(data.as_slice()).unwrap().into_events();
        let first = events.next().unwrap().unwrap();
        assert_eq!(
            first,
            PlyEvent::FaceIndex {
                value: 0,
                position: 0,
                length: length as usize,
            }
        );
        // Only the count and the first item have been consumed.
        assert_eq!(events.source.len(), (length as usize - 1) * 4);

        let second = events.next().unwrap().unwrap();
        assert!(matches!(second, PlyEvent::FaceIndex { value: 1, position: 1, .. }));
        assert_eq!(events.source.len(), (length as usize - 2) * 4);
        assert_eq!(events.count(), length as usize - 2);
    }

    #[test]
    fn test_empty_face_list_emits_nothing() {
        let data = "ply
format ascii 1.0
element face 3
property list uchar int vertex_indices
property uchar flags
end_header
0 9
3 4 5 6 1
0 2
";
        let events = read_ply_events(data.as_bytes()).unwrap();
        assert_eq!(face_values(&events), vec![4, 5, 6]);
    }

    #[test]
    fn test_stream_ends_after_error() {
        let data = "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nend_header\n1 oops 3\n";
        let mut events = PlyReader::from_reader(data.as_bytes()).unwrap().into_events();
        assert!(events.next().unwrap().is_ok());
        assert!(events.next().unwrap().is_err());
        assert!(events.next().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let err = PlyReader::open("definitely/not/here.ply").unwrap_err();
        assert_eq!(err.stage(), LoadStage::Open);
    }

    fn binary_vertex(format: PlyFormat, x: f32, y: i16, z: u32) -> Vec<u8> {
        let mut data = format!(
            "ply\nformat {} 1.0\nelement vertex 1\nproperty float x\nproperty short y\nproperty uint z\nend_header\n",
            format.name()
        )
        .into_bytes();
        if format == PlyFormat::BinaryBigEndian {
            data.extend_from_slice(&x.to_be_bytes());
            data.extend_from_slice(&y.to_be_bytes());
            data.extend_from_slice(&z.to_be_bytes());
        } else {
            data.extend_from_slice(&x.to_le_bytes());
            data.extend_from_slice(&y.to_le_bytes());
            data.extend_from_slice(&z.to_le_bytes());
        }
        data
    }

    proptest! {
        #[test]
        fn binary_scalars_decode_in_either_byte_order(
            x in -1.0e6f32..1.0e6f32,
            y in any::<i16>(),
            z in any::<u32>(),
        ) {
            for format in [PlyFormat::BinaryLittleEndian, PlyFormat::BinaryBigEndian] {
                let events = read_ply_events(&binary_vertex(format, x, y, z)).unwrap();
                prop_assert_eq!(vertex_values(&events), vec![f64::from(x), f64::from(y), f64::from(z)]);
            }
        }

        #[test]
        fn ascii_uchar_accepts_only_byte_range(value in -1000i64..1000) {
            let data = format!(
                "ply\nformat ascii 1.0\nelement vertex 1\nproperty uchar red\nend_header\n{value}\n"
            );
            let result = read_ply_events(data.as_bytes());
            prop_assert_eq!(result.is_ok(), (0..=255).contains(&value));
        }
    }
}
