use crate::api::GlApi;
use crate::geometry::Geometry;
use crate::program::Program;

pub struct GlRenderer<'gl, G: GlApi> {
    gl: &'gl G,
}

impl<'gl, G: GlApi> GlRenderer<'gl, G> {
    pub fn new(gl: &'gl G) -> Self {
        Self { gl }
    }

    /// Binds `program` and `geometry` and draws every vertex as a triangle list.
    pub fn draw(&self, geometry: &Geometry<'_, G>, program: &Program<'_, G>) {
        self.gl.use_program(program.get_id());
        self.gl.bind_vertex_array(geometry.vao());
        self.gl.draw_triangles(0, geometry.vertices() as i32);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.gl.viewport(width, height);
    }

    pub fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    pub fn clear(&self) {
        self.gl.clear_color_buffer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryBuilder, VertexAttribute};
    use crate::program::ProgramBuilder;
    use crate::recording::{GlCall, RecordingGl};
    use crate::TRIANGLE;

    #[test]
    fn draw_binds_every_time() {
        let gl = RecordingGl::new();
        let program = ProgramBuilder::new("", "").build(&gl).unwrap();
        let geometry = GeometryBuilder::new(&TRIANGLE)
            .with_attribute(VertexAttribute::Vec3)
            .build(&gl)
            .unwrap();
        let renderer = GlRenderer::new(&gl);

        gl.clear_calls();
        renderer.draw(&geometry, &program);
        renderer.draw(&geometry, &program);

        let frame = vec![
            GlCall::UseProgram(program.get_id()),
            GlCall::BindVertexArray(geometry.vao()),
            GlCall::DrawTriangles(0, 3),
        ];
        assert_eq!(gl.calls(), [frame.clone(), frame].concat());
    }

    #[test]
    fn resize_sets_viewport() {
        let gl = RecordingGl::new();
        GlRenderer::new(&gl).resize(1024, 768);

        assert_eq!(gl.calls(), vec![GlCall::Viewport(1024, 768)]);
    }
}
