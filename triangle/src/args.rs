use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ShaderErrors;

/// Renders a triangle; hold A, S and D to change the background, Escape quits
#[derive(Debug, Default, Parser)]
pub struct Args {
    /// Path to a JSON5 configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Width of the window
    #[arg(long)]
    pub width: Option<u32>,
    /// Height of the window
    #[arg(long)]
    pub height: Option<u32>,
    /// Title of the window
    #[arg(long)]
    pub title: Option<String>,
    /// Swap interval requested every frame (0 disables vsync)
    #[arg(long)]
    pub swap_interval: Option<u32>,
    /// Path to a vertex shader replacing the built-in one
    #[arg(long)]
    pub vertex_shader: Option<PathBuf>,
    /// Path to a fragment shader replacing the built-in one
    #[arg(long)]
    pub fragment_shader: Option<PathBuf>,
    /// What to do when a shader fails to compile or link
    #[arg(long, value_enum)]
    pub shader_errors: Option<ShaderErrorsArg>,
    /// Log filter in env_logger syntax, overrides RUST_LOG
    #[arg(long)]
    pub log: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ShaderErrorsArg {
    Fatal,
    Log,
}

impl From<ShaderErrorsArg> for ShaderErrors {
    fn from(s: ShaderErrorsArg) -> Self {
        match s {
            ShaderErrorsArg::Fatal => Self::Fatal,
            ShaderErrorsArg::Log => Self::Log,
        }
    }
}
