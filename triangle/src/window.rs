use std::collections::HashSet;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::panic::{self, AssertUnwindSafe};

use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContextSurfaceAccessor,
    PossiblyCurrentContext, Version,
};
use glutin::display::{Display, GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};

use glutin_winit::DisplayBuilder;

use raw_window_handle::HasRawWindowHandle;

use thiserror::Error;

use winit::dpi::{PhysicalSize, Size};
use winit::event::{ElementState, Event, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use gl_wrapper::api::{GlError, NativeGl};

use crate::config::WindowConfig;
use crate::input::Key;

/// What the frame loop needs from the windowing side.
pub trait WindowSystem {
    fn should_close(&self) -> bool;
    fn set_should_close(&mut self, value: bool);
    fn is_pressed(&self, key: Key) -> bool;
    fn swap_buffers(&mut self) -> Result<(), WindowError>;
    fn set_swap_interval(&mut self, interval: u32);
    /// Processes pending events. Returns the new framebuffer size if the
    /// window was resized.
    fn poll_events(&mut self) -> Option<(u32, u32)>;
}

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("could not create GL display: {0}")]
    Display(String),
    #[error("display offered no GL config matching the window")]
    NoConfig,
    #[error("display did not create a window")]
    NoWindow,
    #[error("window has a zero-sized framebuffer")]
    ZeroSize,
    #[error("could not create GL context: {0}")]
    Context(glutin::error::Error),
    #[error("could not create window surface: {0}")]
    Surface(glutin::error::Error),
    #[error("could not swap buffers: {0}")]
    Swap(glutin::error::Error),
}

/// An OpenGL 3.3 core window driven by polling.
pub struct AppWindow {
    // XXX the context and surface must be dropped before the window.
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    gl_display: Display,
    event_loop: EventLoop<()>,
    held: HashSet<Key>,
    should_close: bool,
    swap_interval: Option<u32>,
}

impl AppWindow {
    pub fn new(config: &WindowConfig) -> Result<Self, WindowError> {
        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(
                config.width,
                config.height,
            )))
            .with_title(&config.title);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new();

        // The picker has to hand back a config, so an empty list unwinds out
        // of it and is turned into an error here.
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            display_builder.build(&event_loop, template, |configs| {
                match pick_config(configs, |c| c.num_samples()) {
                    Some(config) => config,
                    None => panic::panic_any(NoConfigOffered),
                }
            })
        }));

        let (window, gl_config) = match built {
            Ok(res) => res.map_err(|e| WindowError::Display(e.to_string()))?,
            Err(payload) if payload.is::<NoConfigOffered>() => {
                return Err(WindowError::NoConfig)
            }
            Err(payload) => panic::resume_unwind(payload),
        };

        let window = window.ok_or(WindowError::NoWindow)?;
        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(window.raw_window_handle()));

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr) }
            .map_err(WindowError::Context)?
            .make_current(&gl_window.surface)
            .map_err(WindowError::Context)?;

        let size = gl_window.window.inner_size();
        log::info!(
            "created {}x{} window \"{}\"",
            size.width,
            size.height,
            config.title
        );

        Ok(Self {
            gl_context,
            gl_window,
            gl_display,
            event_loop,
            held: HashSet::new(),
            should_close: false,
            swap_interval: None,
        })
    }

    /// Resolves the GL entry points through the current context.
    pub fn load_gl(&self) -> Result<NativeGl, GlError> {
        let display = &self.gl_display;

        NativeGl::load(|s| match CString::new(s) {
            Ok(name) => display.get_proc_address(name.as_c_str()).cast(),
            Err(_) => std::ptr::null(),
        })
    }
}

impl WindowSystem for AppWindow {
    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    fn is_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn swap_buffers(&mut self) -> Result<(), WindowError> {
        self.gl_window
            .surface
            .swap_buffers(&self.gl_context)
            .map_err(WindowError::Swap)
    }

    fn set_swap_interval(&mut self, interval: u32) {
        // the driver call is only issued when the interval changes
        if self.swap_interval == Some(interval) {
            return;
        }

        let swap = match NonZeroU32::new(interval) {
            Some(n) => SwapInterval::Wait(n),
            None => SwapInterval::DontWait,
        };

        if let Err(e) = self
            .gl_window
            .surface
            .set_swap_interval(&self.gl_context, swap)
        {
            log::warn!("could not set swap interval {interval}: {e}");
        }

        self.swap_interval = Some(interval);
    }

    fn poll_events(&mut self) -> Option<(u32, u32)> {
        let mut resized = None;

        let held = &mut self.held;
        let should_close = &mut self.should_close;
        let gl_window = &self.gl_window;
        let gl_context = &self.gl_context;

        self.event_loop.run_return(|event, _, control_flow| {
            *control_flow = ControlFlow::Poll;
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if let (Some(w), Some(h)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        {
                            gl_window.surface.resize(gl_context, w, h);
                            resized = Some((size.width, size.height));
                        }
                    }
                    WindowEvent::CloseRequested => *should_close = true,
                    WindowEvent::Focused(false) => held.clear(),
                    WindowEvent::KeyboardInput { input, .. } => {
                        if let Some(key) = input.virtual_keycode.and_then(map_key) {
                            match input.state {
                                ElementState::Pressed => {
                                    held.insert(key);
                                }
                                ElementState::Released => {
                                    held.remove(&key);
                                }
                            }
                        }
                    }
                    _ => (),
                },
                Event::MainEventsCleared => control_flow.set_exit(),
                _ => (),
            }
        });

        resized
    }
}

struct NoConfigOffered;

/// Picks the config with the most samples, the first one on ties.
fn pick_config<C>(configs: impl Iterator<Item = C>, samples: impl Fn(&C) -> u8) -> Option<C> {
    configs.fold(None, |best, c| match best {
        Some(b) if samples(&b) >= samples(&c) => Some(b),
        _ => Some(c),
    })
}

fn map_key(code: VirtualKeyCode) -> Option<Key> {
    match code {
        VirtualKeyCode::A => Some(Key::A),
        VirtualKeyCode::S => Some(Key::S),
        VirtualKeyCode::D => Some(Key::D),
        VirtualKeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &Config) -> Result<Self, WindowError> {
        let (width, height): (u32, u32) = window.inner_size().into();
        let raw_window_handle = window.raw_window_handle();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            NonZeroU32::new(width).ok_or(WindowError::ZeroSize)?,
            NonZeroU32::new(height).ok_or(WindowError::ZeroSize)?,
        );

        let surface = unsafe {
            config
                .display()
                .create_window_surface(config, &attrs)
                .map_err(WindowError::Surface)?
        };

        Ok(Self { window, surface })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_only_used_keys() {
        assert_eq!(map_key(VirtualKeyCode::A), Some(Key::A));
        assert_eq!(map_key(VirtualKeyCode::S), Some(Key::S));
        assert_eq!(map_key(VirtualKeyCode::D), Some(Key::D));
        assert_eq!(map_key(VirtualKeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(VirtualKeyCode::W), None);
    }

    #[test]
    fn empty_config_list_picks_nothing() {
        assert_eq!(pick_config(std::iter::empty::<u8>(), |s| *s), None);
    }

    #[test]
    fn picks_most_samples_first_on_ties() {
        let configs = [("a", 0), ("b", 4), ("c", 4), ("d", 2)];

        let picked = pick_config(configs.into_iter(), |c| c.1);

        assert_eq!(picked, Some(("b", 4)));
    }
}
