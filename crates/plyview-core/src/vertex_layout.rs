/// Upper bound of an 8-bit color channel; stored colors are divided by it.
pub const COLOR_RANGE: f64 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Normal,
    Color,
}

/// Vertex properties the viewer consumes, in their conventional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexProperty {
    X,
    Y,
    Z,
    Nx,
    Ny,
    Nz,
    Red,
    Green,
    Blue,
}

impl VertexProperty {
    pub const ALL: [VertexProperty; 9] = [
        VertexProperty::X,
        VertexProperty::Y,
        VertexProperty::Z,
        VertexProperty::Nx,
        VertexProperty::Ny,
        VertexProperty::Nz,
        VertexProperty::Red,
        VertexProperty::Green,
        VertexProperty::Blue,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            VertexProperty::X => "x",
            VertexProperty::Y => "y",
            VertexProperty::Z => "z",
            VertexProperty::Nx => "nx",
            VertexProperty::Ny => "ny",
            VertexProperty::Nz => "nz",
            VertexProperty::Red => "red",
            VertexProperty::Green => "green",
            VertexProperty::Blue => "blue",
        }
    }

    pub fn attribute(&self) -> AttributeKind {
        match self {
            VertexProperty::X | VertexProperty::Y | VertexProperty::Z => AttributeKind::Position,
            VertexProperty::Nx | VertexProperty::Ny | VertexProperty::Nz => AttributeKind::Normal,
            VertexProperty::Red | VertexProperty::Green | VertexProperty::Blue => AttributeKind::Color,
        }
    }

    pub fn is_color(&self) -> bool {
        self.attribute() == AttributeKind::Color
    }
}

/// Element type of the staged index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    #[default]
    U16,
}

impl IndexType {
    pub fn byte_length(&self) -> usize {
        match self {
            IndexType::U16 => 2,
        }
    }
}

/// Interleaved layout of one staged vertex.
///
/// Properties appear in the order the file declares them; every vertex in a
/// buffer shares the same layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexLayout {
    properties: Vec<VertexProperty>,
}

impl VertexLayout {
    pub fn new(properties: Vec<VertexProperty>) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &[VertexProperty] {
        &self.properties
    }

    /// Number of floats per vertex.
    pub fn stride(&self) -> usize {
        self.properties.len()
    }

    pub fn byte_stride(&self) -> usize {
        self.stride() * std::mem::size_of::<f32>()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Float offset of a property inside one vertex.
    pub fn offset_of(&self, property: VertexProperty) -> Option<usize> {
        self.properties.iter().position(|p| *p == property)
    }

    /// Float offset of the first component of `kind`.
    pub fn attribute_offset(&self, kind: AttributeKind) -> Option<usize> {
        self.properties.iter().position(|p| p.attribute() == kind)
    }

    pub fn num_components(&self, kind: AttributeKind) -> usize {
        self.properties.iter().filter(|p| p.attribute() == kind).count()
    }

    pub fn has(&self, kind: AttributeKind) -> bool {
        self.num_components(kind) > 0
    }
}
