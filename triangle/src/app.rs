use thiserror::Error;

use gl_wrapper::api::{GlApi, GlError};
use gl_wrapper::geometry::{GBError, Geometry, GeometryBuilder, VertexAttribute};
use gl_wrapper::program::{BuildPolicy, PBError, Program, ProgramBuilder};
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::TRIANGLE;

use crate::config::{ConfigError, ShaderSources};
use crate::input::{process_escape, sample_input, ClearColor};
use crate::window::{WindowError, WindowSystem};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error(transparent)]
    Loader(#[from] GlError),
    #[error(transparent)]
    Program(#[from] PBError),
    #[error(transparent)]
    Geometry(#[from] GBError),
}

/// GPU objects that live for the whole run.
pub struct GpuObjects<'gl, G: GlApi> {
    // fields drop in order: buffer and vertex array, then the program
    geometry: Geometry<'gl, G>,
    program: Program<'gl, G>,
}

impl<'gl, G: GlApi> GpuObjects<'gl, G> {
    pub fn new(
        gl: &'gl G,
        shaders: &ShaderSources,
        policy: BuildPolicy,
    ) -> Result<Self, AppError> {
        let program = ProgramBuilder::new(&shaders.vertex, &shaders.fragment)
            .with_policy(policy)
            .build(gl)?;

        let geometry = GeometryBuilder::new(&TRIANGLE)
            .with_attribute(VertexAttribute::Vec3)
            .build(gl)?;

        Ok(Self { geometry, program })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Running,
    ShuttingDown,
    Terminated,
}

#[derive(Debug)]
pub struct FrameStats {
    pub frames: u64,
    pub last_clear_color: Option<ClearColor>,
    pub state: LoopState,
}

pub struct FrameLoop<'gl, G: GlApi> {
    renderer: GlRenderer<'gl, G>,
    // taken at shutdown
    objects: Option<GpuObjects<'gl, G>>,
    swap_interval: u32,
    state: LoopState,
    frames: u64,
    last_clear_color: Option<ClearColor>,
}

impl<'gl, G: GlApi> FrameLoop<'gl, G> {
    pub fn new(gl: &'gl G, objects: GpuObjects<'gl, G>, swap_interval: u32) -> Self {
        Self {
            renderer: GlRenderer::new(gl),
            objects: Some(objects),
            swap_interval,
            state: LoopState::Initializing,
            frames: 0,
            last_clear_color: None,
        }
    }

    /// Renders until the window asks to close, then releases the GPU objects.
    ///
    /// The objects are released even when a frame fails.
    pub fn run<W: WindowSystem>(mut self, window: &mut W) -> Result<FrameStats, AppError> {
        self.enter(LoopState::Running);

        let mut result = Ok(());
        while !window.should_close() {
            if let Err(e) = self.frame(window) {
                result = Err(e);
                break;
            }
        }

        self.enter(LoopState::ShuttingDown);
        self.objects = None;
        self.enter(LoopState::Terminated);

        result.map(|_| FrameStats {
            frames: self.frames,
            last_clear_color: self.last_clear_color,
            state: self.state,
        })
    }

    fn frame<W: WindowSystem>(&mut self, window: &mut W) -> Result<(), AppError> {
        process_escape(window);

        if let Some(color) = sample_input(window, &self.renderer) {
            self.last_clear_color = Some(color);
        }

        if let Some(objects) = &self.objects {
            self.renderer.draw(&objects.geometry, &objects.program);
        }

        window.swap_buffers()?;

        if let Some((width, height)) = window.poll_events() {
            log::debug!("resized to {width}x{height}");
            self.renderer.resize(width, height);
        }

        window.set_swap_interval(self.swap_interval);

        self.frames += 1;

        Ok(())
    }

    fn enter(&mut self, state: LoopState) {
        log::debug!("frame loop {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}
