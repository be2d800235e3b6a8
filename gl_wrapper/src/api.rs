use std::ffi::{c_char, c_void, CStr};

use gl::types::{GLint, GLsizei, GLsizeiptr, GLuint};
use thiserror::Error;

/// Pipeline stage a shader object is compiled for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    fn gl_enum(&self) -> gl::types::GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

/// The subset of the GL driver used by this crate.
///
/// All methods take `&self`: GL state lives in the current context, not in
/// the implementor. Object names are plain `GLuint`s, ownership is tracked by
/// the wrappers in [`crate::program`] and [`crate::geometry`].
pub trait GlApi {
    fn create_shader(&self, stage: ShaderStage) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &CStr);
    fn compile_shader(&self, shader: GLuint);
    fn shader_compile_status(&self, shader: GLuint) -> bool;
    /// Reads at most `limit` bytes of the info log, terminator included.
    fn shader_info_log(&self, shader: GLuint, limit: usize) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn program_link_status(&self, program: GLuint) -> bool;
    /// Reads at most `limit` bytes of the info log, terminator included.
    fn program_info_log(&self, program: GLuint, limit: usize) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);

    fn gen_vertex_array(&self) -> GLuint;
    fn bind_vertex_array(&self, vao: GLuint);
    fn delete_vertex_array(&self, vao: GLuint);

    fn gen_buffer(&self) -> GLuint;
    fn bind_array_buffer(&self, vbo: GLuint);
    /// Uploads `data` to the bound array buffer with `GL_STATIC_DRAW`.
    fn static_buffer_data(&self, data: &[f32]);
    fn delete_buffer(&self, vbo: GLuint);

    /// Float attribute, not normalized. `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    );
    fn enable_vertex_attrib_array(&self, index: GLuint);

    fn draw_triangles(&self, first: GLint, count: GLsizei);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_buffer(&self);
    fn viewport(&self, width: u32, height: u32);
}

#[derive(Debug, Error)]
pub enum GlError {
    #[error("could not load GL entry points: {}", .0.join(", "))]
    Loader(Vec<&'static str>),
}

/// [`GlApi`] backed by the global function pointers of the `gl` crate.
///
/// Only obtainable through [`NativeGl::load`], so holding one means the entry
/// points were resolved for the current context.
pub struct NativeGl {
    _loaded: (),
}

impl NativeGl {
    pub fn load<F>(loader: F) -> Result<Self, GlError>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let missing: Vec<_> = REQUIRED
            .iter()
            .filter(|(_, is_loaded)| !is_loaded())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(GlError::Loader(missing));
        }

        Ok(Self { _loaded: () })
    }

    pub fn version(&self) -> Option<String> {
        unsafe {
            let ptr = gl::GetString(gl::VERSION);
            if ptr.is_null() {
                return None;
            }

            Some(
                CStr::from_ptr(ptr as *const c_char)
                    .to_string_lossy()
                    .into_owned(),
            )
        }
    }
}

const REQUIRED: &[(&str, fn() -> bool)] = &[
    ("glCreateShader", gl::CreateShader::is_loaded),
    ("glShaderSource", gl::ShaderSource::is_loaded),
    ("glCompileShader", gl::CompileShader::is_loaded),
    ("glGetShaderiv", gl::GetShaderiv::is_loaded),
    ("glGetShaderInfoLog", gl::GetShaderInfoLog::is_loaded),
    ("glDeleteShader", gl::DeleteShader::is_loaded),
    ("glCreateProgram", gl::CreateProgram::is_loaded),
    ("glAttachShader", gl::AttachShader::is_loaded),
    ("glLinkProgram", gl::LinkProgram::is_loaded),
    ("glGetProgramiv", gl::GetProgramiv::is_loaded),
    ("glGetProgramInfoLog", gl::GetProgramInfoLog::is_loaded),
    ("glUseProgram", gl::UseProgram::is_loaded),
    ("glDeleteProgram", gl::DeleteProgram::is_loaded),
    ("glGenVertexArrays", gl::GenVertexArrays::is_loaded),
    ("glBindVertexArray", gl::BindVertexArray::is_loaded),
    ("glDeleteVertexArrays", gl::DeleteVertexArrays::is_loaded),
    ("glGenBuffers", gl::GenBuffers::is_loaded),
    ("glBindBuffer", gl::BindBuffer::is_loaded),
    ("glBufferData", gl::BufferData::is_loaded),
    ("glDeleteBuffers", gl::DeleteBuffers::is_loaded),
    ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded),
    ("glEnableVertexAttribArray", gl::EnableVertexAttribArray::is_loaded),
    ("glDrawArrays", gl::DrawArrays::is_loaded),
    ("glClearColor", gl::ClearColor::is_loaded),
    ("glClear", gl::Clear::is_loaded),
    ("glViewport", gl::Viewport::is_loaded),
];

/// Turns a driver-filled log buffer into a string, stopping at the first NUL.
pub(crate) fn info_log_to_string(buf: &[u8]) -> String {
    let data = buf.split(|b| *b == 0).next().unwrap_or(buf);

    String::from_utf8_lossy(data).into_owned()
}

impl GlApi for NativeGl {
    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(
                shader,
                1,
                (&source.as_ptr()) as *const *const c_char,
                std::ptr::null(),
            );
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, (&mut success) as *mut GLint) };
        success == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: GLuint, limit: usize) -> String {
        let mut buf = vec![0_u8; limit];

        unsafe {
            gl::GetShaderInfoLog(
                shader,
                limit as GLsizei,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            );
        }

        info_log_to_string(&buf)
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        let mut success: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, (&mut success) as *mut GLint) };
        success == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint, limit: usize) -> String {
        let mut buf = vec![0_u8; limit];

        unsafe {
            gl::GetProgramInfoLog(
                program,
                limit as GLsizei,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            );
        }

        info_log_to_string(&buf)
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, (&mut vao) as *mut GLuint) };
        vao
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, (&vao) as *const GLuint) }
    }

    fn gen_buffer(&self) -> GLuint {
        let mut vbo = 0;
        unsafe { gl::GenBuffers(1, (&mut vbo) as *mut GLuint) };
        vbo
    }

    fn bind_array_buffer(&self, vbo: GLuint) {
        unsafe { gl::BindBuffer(gl::ARRAY_BUFFER, vbo) }
    }

    fn static_buffer_data(&self, data: &[f32]) {
        unsafe {
            gl::BufferData(
                gl::ARRAY_BUFFER,
                std::mem::size_of_val(data) as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&self, vbo: GLuint) {
        unsafe { gl::DeleteBuffers(1, (&vbo) as *const GLuint) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        components: GLint,
        stride: GLsizei,
        offset: usize,
    ) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn draw_triangles(&self, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(gl::TRIANGLES, first, count) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { gl::ClearColor(r, g, b, a) }
    }

    fn clear_color_buffer(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe { gl::Viewport(0, 0, width as GLint, height as GLint) }
    }
}
