//! Description of geometry a render backend draws for an entity.

use std::mem::size_of;

/// Type of each index in the element buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    U8,
    U16,
    U32,
}

impl IndexType {
    /// Size of one index in bytes.
    pub const fn size(&self) -> usize {
        match self {
            IndexType::U8 => size_of::<u8>(),
            IndexType::U16 => size_of::<u16>(),
            IndexType::U32 => size_of::<u32>(),
        }
    }
}

/// Element buffer contents.
#[derive(Debug, PartialEq)]
pub enum Indices {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    pub fn index_type(&self) -> IndexType {
        match self {
            Indices::U8(_) => IndexType::U8,
            Indices::U16(_) => IndexType::U16,
            Indices::U32(_) => IndexType::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Indices::U8(indices) => indices.len(),
            Indices::U16(indices) => indices.len(),
            Indices::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which draw call the backend issues.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawFunction {
    /// Vertices are drawn in order.
    Arrays,
    /// Vertices are drawn in order of the element buffer.
    Elements,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
}

/// Identifier of a compiled shader program owned by the render backend.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderProgram(pub u32);

/// Describes one attribute of a vertex inside of the vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    /// Shader location of the attribute.
    pub location: u32,
    /// Count of `f32` values in the attribute.
    pub components: usize,
    /// Offset of the attribute from the start of the vertex, in `f32` values.
    pub offset: usize,
}

/// Geometry and draw parameters of an entity.
///
/// The render backend owns the GPU resources created for this component,
/// so it can be moved between slots but never copied.
///
#[derive(Debug)]
pub struct RenderComponent {
    vertices: Vec<f32>,
    vertex_size: usize,
    vertex_buffer_offset: usize,
    indices: Option<Indices>,
    element_buffer_offset: usize,
    primitive: Primitive,
    shader_program: ShaderProgram,
    layout: Vec<VertexAttribute>,
}

impl RenderComponent {
    /// Creates component from tightly packed vertices of `vertex_size` floats each.
    pub fn new(
        vertices: Vec<f32>,
        vertex_size: usize,
        primitive: Primitive,
        shader_program: ShaderProgram,
    ) -> Self {
        let layout = vec![VertexAttribute {
            location: 0,
            components: vertex_size,
            offset: 0,
        }];
        Self {
            vertices,
            vertex_size,
            vertex_buffer_offset: 0,
            indices: None,
            element_buffer_offset: 0,
            primitive,
            shader_program,
            layout,
        }
    }

    /// Draws vertices in order of the given indices.
    pub fn with_indices(mut self, indices: Indices) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Replaces the default single-attribute vertex layout.
    pub fn with_layout(mut self, layout: Vec<VertexAttribute>) -> Self {
        self.layout = layout;
        self
    }

    /// Offsets of this geometry inside of shared vertex and element buffers.
    pub fn with_buffer_offsets(mut self, vertex: usize, element: usize) -> Self {
        self.vertex_buffer_offset = vertex;
        self.element_buffer_offset = element;
        self
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        match self.vertex_size {
            0 => 0,
            size => self.vertices.len() / size,
        }
    }

    pub fn vertex_buffer_offset(&self) -> usize {
        self.vertex_buffer_offset
    }

    pub fn indices(&self) -> Option<&Indices> {
        self.indices.as_ref()
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Indices::len)
    }

    pub fn index_type(&self) -> Option<IndexType> {
        self.indices.as_ref().map(Indices::index_type)
    }

    /// Size of one index in bytes, 0 if there is no element buffer.
    pub fn size_of_index_type(&self) -> usize {
        self.index_type().map_or(0, |index_type| index_type.size())
    }

    /// Offset of the first index in bytes.
    pub fn element_offset(&self) -> usize {
        self.size_of_index_type() * self.element_buffer_offset
    }

    pub fn draw_function(&self) -> DrawFunction {
        match self.indices {
            Some(_) => DrawFunction::Elements,
            None => DrawFunction::Arrays,
        }
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn shader_program(&self) -> ShaderProgram {
        self.shader_program
    }

    pub fn layout(&self) -> &[VertexAttribute] {
        &self.layout
    }
}
