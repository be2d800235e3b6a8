use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use gl_wrapper::program::BuildPolicy;

use crate::args::Args;

const DEFAULT_VERTEX_SHADER: &str = include_str!("gl_shaders/triangle.vert");
const DEFAULT_FRAGMENT_SHADER: &str = include_str!("gl_shaders/solid.frag");

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub swap_interval: u32,
    pub shaders: ShaderPaths,
    pub shader_errors: ShaderErrors,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            swap_interval: 1,
            shaders: ShaderPaths::default(),
            shader_errors: ShaderErrors::Fatal,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: String::from("Learning OpenGL"),
        }
    }
}

/// Optional replacements for the built-in shader sources.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShaderPaths {
    pub vertex: Option<PathBuf>,
    pub fragment: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShaderErrors {
    Fatal,
    Log,
}

impl From<ShaderErrors> for BuildPolicy {
    fn from(s: ShaderErrors) -> Self {
        match s {
            ShaderErrors::Fatal => Self::Strict,
            ShaderErrors::Log => Self::Lenient,
        }
    }
}

pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl AppConfig {
    pub fn parse(src: &str) -> Result<Self, ConfigError> {
        let config: Self = json5::from_str(src).map_err(ConfigError::Format)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_owned(),
            source,
        })?;

        Self::parse(&src)
    }

    /// Config file given on the command line (or defaults), with the
    /// remaining flags applied on top.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };

        if let Some(width) = args.width {
            config.window.width = width;
        }
        if let Some(height) = args.height {
            config.window.height = height;
        }
        if let Some(title) = &args.title {
            config.window.title = title.clone();
        }
        if let Some(interval) = args.swap_interval {
            config.swap_interval = interval;
        }
        if let Some(path) = &args.vertex_shader {
            config.shaders.vertex = Some(path.clone());
        }
        if let Some(path) = &args.fragment_shader {
            config.shaders.fragment = Some(path.clone());
        }
        if let Some(policy) = args.shader_errors {
            config.shader_errors = policy.into();
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::WindowSize(
                self.window.width,
                self.window.height,
            ));
        }

        Ok(())
    }
}

impl ShaderPaths {
    pub fn load(&self) -> Result<ShaderSources, ConfigError> {
        Ok(ShaderSources {
            vertex: read_or(self.vertex.as_deref(), DEFAULT_VERTEX_SHADER)?,
            fragment: read_or(self.fragment.as_deref(), DEFAULT_FRAGMENT_SHADER)?,
        })
    }
}

fn read_or(path: Option<&Path>, builtin: &str) -> Result<String, ConfigError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        }),
        None => Ok(builtin.to_owned()),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Format(json5::Error),
    #[error("window size must be non-zero, got {0}x{1}")]
    WindowSize(u32, u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ShaderErrorsArg;

    #[test]
    fn defaults() {
        let config = AppConfig::from_args(&Args::default()).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.swap_interval, 1);
        assert_eq!(config.shader_errors, ShaderErrors::Fatal);
    }

    #[test]
    fn partial_json5() {
        let config = AppConfig::parse(
            r#"{
                // only what differs from the defaults
                window: { title: "demo" },
                swap_interval: 0,
                shader_errors: "log",
            }"#,
        )
        .unwrap();

        assert_eq!(config.window.title, "demo");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.swap_interval, 0);
        assert_eq!(config.shader_errors, ShaderErrors::Log);
        assert_eq!(config.shaders, ShaderPaths::default());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args {
            width: Some(1280),
            title: Some(String::from("flags")),
            swap_interval: Some(2),
            shader_errors: Some(ShaderErrorsArg::Log),
            ..Default::default()
        };

        let config = AppConfig::from_args(&args).unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "flags");
        assert_eq!(config.swap_interval, 2);
        assert_eq!(BuildPolicy::from(config.shader_errors), BuildPolicy::Lenient);
    }

    #[test]
    fn rejects_zero_sized_window() {
        let res = AppConfig::parse("{ window: { width: 0 } }");
        assert!(matches!(res, Err(ConfigError::WindowSize(0, 600))));
    }

    #[test]
    fn rejects_unknown_policy() {
        let res = AppConfig::parse(r#"{ shader_errors: "ignore" }"#);
        assert!(matches!(res, Err(ConfigError::Format(_))));
    }

    #[test]
    fn builtin_shaders() {
        let sources = ShaderPaths::default().load().unwrap();

        assert!(sources.vertex.contains("layout (location = 0) in vec3 aPos;"));
        assert!(sources.fragment.contains("out vec4 FragColor;"));
    }

    #[test]
    fn missing_shader_file() {
        let paths = ShaderPaths {
            vertex: Some(PathBuf::from("does/not/exist.vert")),
            fragment: None,
        };

        assert!(matches!(paths.load(), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn file_then_flags() {
        let path = std::env::temp_dir().join(format!("triangle-{}.json5", std::process::id()));
        std::fs::write(
            &path,
            r#"{ window: { width: 640, title: "from file" }, swap_interval: 0 }"#,
        )
        .unwrap();

        let from_file = AppConfig::load_from_path(&path);
        let args = Args {
            config: Some(path.clone()),
            title: Some(String::from("from flags")),
            ..Default::default()
        };
        let merged = AppConfig::from_args(&args);
        std::fs::remove_file(&path).unwrap();

        let from_file = from_file.unwrap();
        assert_eq!(from_file.window.width, 640);
        assert_eq!(from_file.window.title, "from file");
        assert_eq!(from_file.swap_interval, 0);

        let merged = merged.unwrap();
        assert_eq!(merged.window.width, 640);
        assert_eq!(merged.window.title, "from flags");
    }

    #[test]
    fn missing_config_file() {
        let args = Args {
            config: Some(PathBuf::from("does/not/exist.json5")),
            ..Default::default()
        };

        match AppConfig::from_args(&args) {
            Err(ConfigError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("does/not/exist.json5"))
            }
            res => panic!("unexpected result {res:?}"),
        }
    }
}
