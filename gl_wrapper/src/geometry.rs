use gl::types::{GLint, GLsizei, GLuint};
use thiserror::Error;

use crate::api::GlApi;

pub struct GeometryBuilder<'a> {
    attributes: Vec<VertexAttribute>,
    data: &'a [f32],
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(data: &'a [f32]) -> Self {
        Self {
            data,
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute; attributes take consecutive slots starting at 0.
    pub fn with_attribute(mut self, attr: VertexAttribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn build<'gl, G: GlApi>(self, gl: &'gl G) -> Result<Geometry<'gl, G>, GBError> {
        let total_len: usize = self.attributes.iter().map(|a| a.size()).sum();

        if total_len == 0 {
            return Err(GBError::EmptyLayout);
        }

        if self.data.len() % total_len != 0 {
            return Err(GBError::InvalidDataLength);
        }

        let stride = (total_len * std::mem::size_of::<f32>()) as GLsizei;

        let vao = gl.gen_vertex_array();
        let vbo = gl.gen_buffer();

        gl.bind_vertex_array(vao);
        gl.bind_array_buffer(vbo);

        gl.static_buffer_data(self.data);

        let mut offset = 0;

        for (i, attr) in self.attributes.iter().enumerate() {
            gl.vertex_attrib_pointer(
                i as GLuint,
                attr.size() as GLint,
                stride,
                offset * std::mem::size_of::<f32>(),
            );
            offset += attr.size();
            gl.enable_vertex_attrib_array(i as GLuint);
        }

        gl.bind_array_buffer(0);
        gl.bind_vertex_array(0);

        let vertices = self.data.len() / total_len;

        Ok(Geometry {
            gl,
            vao,
            vbo,
            vertices,
        })
    }
}

#[derive(Debug, Error)]
pub enum GBError {
    #[error("No vertex attributes given")]
    EmptyLayout,
    #[error("Invalid data length for given attributes")]
    InvalidDataLength,
}

#[derive(Copy, Clone, Debug)]
pub enum VertexAttribute {
    Float,
    Vec2,
    Vec3,
}

impl VertexAttribute {
    pub fn size(&self) -> usize {
        match self {
            VertexAttribute::Float => 1,
            VertexAttribute::Vec2 => 2,
            VertexAttribute::Vec3 => 3,
        }
    }
}

/// A vertex array with its single backing buffer.
///
/// Dropping it deletes the buffer first, then the vertex array.
pub struct Geometry<'gl, G: GlApi> {
    gl: &'gl G,
    vao: GLuint,
    vbo: GLuint,
    vertices: usize,
}

impl<G: GlApi> Geometry<'_, G> {
    pub fn vao(&self) -> GLuint {
        self.vao
    }

    pub fn vbo(&self) -> GLuint {
        self.vbo
    }

    pub fn vertices(&self) -> usize {
        self.vertices
    }
}

impl<G: GlApi> Drop for Geometry<'_, G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.vbo);
        self.gl.delete_vertex_array(self.vao);
    }
}
