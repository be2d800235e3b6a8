//! In-memory [`GlApi`] that records every call and tracks live objects.
//!
//! Used by the tests of this crate and of the binaries built on top of it, so
//! the object lifecycle and the per-frame call sequence can be checked without
//! a GL context.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ffi::CStr;

use gl::types::{GLint, GLsizei, GLuint};

use crate::api::{GlApi, ShaderStage};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Shader,
    Program,
    VertexArray,
    Buffer,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderStage, GLuint),
    ShaderSource(GLuint, String),
    CompileShader(GLuint),
    ShaderInfoLog(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    ProgramInfoLog(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
    GenVertexArray(GLuint),
    BindVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    GenBuffer(GLuint),
    BindArrayBuffer(GLuint),
    StaticBufferData(Vec<f32>),
    DeleteBuffer(GLuint),
    VertexAttribPointer {
        index: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    },
    EnableVertexAttribArray(GLuint),
    DrawTriangles(GLint, GLsizei),
    ClearColor([f32; 4]),
    ClearColorBuffer,
    Viewport(u32, u32),
}

#[derive(Default)]
pub struct RecordingGl {
    calls: RefCell<Vec<GlCall>>,
    live: RefCell<BTreeMap<GLuint, ObjectKind>>,
    stages: RefCell<BTreeMap<GLuint, ShaderStage>>,
    last_id: Cell<GLuint>,
    failing_stages: Vec<ShaderStage>,
    failing_link: bool,
    info_log: String,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shaders compiled for `stage` report a failed compile status.
    pub fn failing_compile(mut self, stage: ShaderStage) -> Self {
        self.failing_stages.push(stage);
        self
    }

    /// Programs report a failed link status.
    pub fn failing_link(mut self) -> Self {
        self.failing_link = true;
        self
    }

    /// Text returned by the info log queries.
    pub fn with_info_log(mut self, log: impl Into<String>) -> Self {
        self.info_log = log.into();
        self
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn live(&self, kind: ObjectKind) -> usize {
        self.live.borrow().values().filter(|k| **k == kind).count()
    }

    pub fn live_total(&self) -> usize {
        self.live.borrow().len()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self, kind: ObjectKind) -> GLuint {
        let id = self.last_id.get() + 1;
        self.last_id.set(id);
        self.live.borrow_mut().insert(id, kind);
        id
    }

    fn release(&self, id: GLuint, kind: ObjectKind) {
        let mut live = self.live.borrow_mut();
        let found = live.get(&id).copied();
        match found {
            Some(k) if k == kind => {
                live.remove(&id);
            }
            // GL ignores deleting name 0
            None if id == 0 => {}
            other => panic!("deleting {kind:?} {id}, but live object is {other:?}"),
        }
    }

    fn truncated_log(&self, limit: usize) -> String {
        let mut end = self.info_log.len().min(limit.saturating_sub(1));
        while !self.info_log.is_char_boundary(end) {
            end -= 1;
        }
        self.info_log[..end].to_owned()
    }
}

impl GlApi for RecordingGl {
    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        let id = self.allocate(ObjectKind::Shader);
        self.stages.borrow_mut().insert(id, stage);
        self.record(GlCall::CreateShader(stage, id));
        id
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        let source = source.to_string_lossy().into_owned();
        self.record(GlCall::ShaderSource(shader, source));
    }

    fn compile_shader(&self, shader: GLuint) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        match self.stages.borrow().get(&shader) {
            Some(stage) => !self.failing_stages.contains(stage),
            None => false,
        }
    }

    fn shader_info_log(&self, shader: GLuint, limit: usize) -> String {
        self.record(GlCall::ShaderInfoLog(shader));
        self.truncated_log(limit)
    }

    fn delete_shader(&self, shader: GLuint) {
        self.release(shader, ObjectKind::Shader);
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> GLuint {
        let id = self.allocate(ObjectKind::Program);
        self.record(GlCall::CreateProgram(id));
        id
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn link_program(&self, program: GLuint) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, _program: GLuint) -> bool {
        !self.failing_link
    }

    fn program_info_log(&self, program: GLuint, limit: usize) -> String {
        self.record(GlCall::ProgramInfoLog(program));
        self.truncated_log(limit)
    }

    fn use_program(&self, program: GLuint) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        self.release(program, ObjectKind::Program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn gen_vertex_array(&self) -> GLuint {
        let id = self.allocate(ObjectKind::VertexArray);
        self.record(GlCall::GenVertexArray(id));
        id
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        self.record(GlCall::BindVertexArray(vao));
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        self.release(vao, ObjectKind::VertexArray);
        self.record(GlCall::DeleteVertexArray(vao));
    }

    fn gen_buffer(&self) -> GLuint {
        let id = self.allocate(ObjectKind::Buffer);
        self.record(GlCall::GenBuffer(id));
        id
    }

    fn bind_array_buffer(&self, vbo: GLuint) {
        self.record(GlCall::BindArrayBuffer(vbo));
    }

    fn static_buffer_data(&self, data: &[f32]) {
        self.record(GlCall::StaticBufferData(data.to_vec()));
    }

    fn delete_buffer(&self, vbo: GLuint) {
        self.release(vbo, ObjectKind::Buffer);
        self.record(GlCall::DeleteBuffer(vbo));
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn draw_triangles(&self, first: GLint, count: GLsizei) {
        self.record(GlCall::DrawTriangles(first, count));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear_color_buffer(&self) {
        self.record(GlCall::ClearColorBuffer);
    }

    fn viewport(&self, width: u32, height: u32) {
        self.record(GlCall::Viewport(width, height));
    }
}
