use clap::Parser;

mod app;
mod args;
mod config;
mod input;
mod logging;
#[cfg(test)]
mod testing;
mod window;

use app::{AppError, FrameLoop, GpuObjects};
use args::Args;
use config::AppConfig;
use logging::init_logging;
use window::AppWindow;

fn main() {
    // clion needs help in trait annotation
    let args = <Args as Parser>::parse();

    init_logging(args.log.as_deref());

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = AppConfig::from_args(args)?;
    let shaders = config.shaders.load()?;

    // declared first so it outlives everything created from its context
    let mut window = AppWindow::new(&config.window)?;

    let gl = window.load_gl()?;
    if let Some(version) = gl.version() {
        log::info!("OpenGL {version}");
    }

    let objects = GpuObjects::new(&gl, &shaders, config.shader_errors.into())?;

    let stats = FrameLoop::new(&gl, objects, config.swap_interval).run(&mut window)?;

    log::info!("rendered {} frames", stats.frames);

    Ok(())
}
