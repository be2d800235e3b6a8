use std::ffi::{CStr, CString};

use gl::types::GLuint;
use thiserror::Error;

use crate::api::{GlApi, ShaderStage};

/// Upper bound, in bytes, of the compile and link diagnostics read back.
pub const INFO_LOG_LIMIT: usize = 512;

/// What to do when a stage fails to compile or the program fails to link.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BuildPolicy {
    /// Report the failure as an error, nothing stays allocated.
    #[default]
    Strict,
    /// Log the failure and hand out the program anyway.
    Lenient,
}

impl BuildPolicy {
    /// Level the driver diagnostics are logged at. Under `Strict` they travel
    /// in the returned error and whoever handles it reports them.
    pub fn diagnostic_level(&self) -> log::Level {
        match self {
            BuildPolicy::Strict => log::Level::Debug,
            BuildPolicy::Lenient => log::Level::Error,
        }
    }
}

pub struct ProgramBuilder<'a> {
    vert: &'a str,
    frag: &'a str,
    policy: BuildPolicy,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(vert_src: &'a str, frag_src: &'a str) -> Self {
        Self {
            vert: vert_src,
            frag: frag_src,
            policy: BuildPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BuildPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build<'gl, G: GlApi>(self, gl: &'gl G) -> Result<Program<'gl, G>, PBError> {
        let vert_src =
            CString::new(self.vert).map_err(|_| PBError::InvalidSource(ShaderStage::Vertex))?;
        let frag_src =
            CString::new(self.frag).map_err(|_| PBError::InvalidSource(ShaderStage::Fragment))?;

        let level = self.policy.diagnostic_level();
        let (vert, vert_status) = compile(gl, ShaderStage::Vertex, &vert_src, level);
        let (frag, frag_status) = compile(gl, ShaderStage::Fragment, &frag_src, level);

        if self.policy == BuildPolicy::Strict {
            if let Err(e) = vert_status.and(frag_status) {
                gl.delete_shader(vert);
                gl.delete_shader(frag);
                return Err(e);
            }
        }

        let id = gl.create_program();
        gl.attach_shader(id, vert);
        gl.attach_shader(id, frag);
        gl.link_program(id);

        let link_status = if gl.program_link_status(id) {
            Ok(())
        } else {
            let log = gl.program_info_log(id, INFO_LOG_LIMIT);
            log::log!(level, "program linking failed:\n{log}");
            Err(PBError::Linking(log))
        };

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        let program = Program { gl, id };

        match (link_status, self.policy) {
            // dropping the program deletes it
            (Err(e), BuildPolicy::Strict) => Err(e),
            _ => Ok(program),
        }
    }
}

fn compile<G: GlApi>(
    gl: &G,
    stage: ShaderStage,
    src: &CStr,
    level: log::Level,
) -> (GLuint, Result<(), PBError>) {
    let shader = gl.create_shader(stage);
    gl.shader_source(shader, src);
    gl.compile_shader(shader);

    if gl.shader_compile_status(shader) {
        return (shader, Ok(()));
    }

    let log = gl.shader_info_log(shader, INFO_LOG_LIMIT);
    log::log!(level, "{} shader compilation failed:\n{log}", stage.name());

    (shader, Err(PBError::Compilation { stage, log }))
}

#[derive(Clone, Debug, Error)]
pub enum PBError {
    #[error("{} shader source contains a NUL byte", .0.name())]
    InvalidSource(ShaderStage),
    #[error("{} shader compilation failed: {log}", .stage.name())]
    Compilation { stage: ShaderStage, log: String },
    #[error("program linking failed: {0}")]
    Linking(String),
}

/// A linked program object, deleted on drop.
pub struct Program<'gl, G: GlApi> {
    gl: &'gl G,
    id: GLuint,
}

impl<G: GlApi> Program<'_, G> {
    pub fn get_id(&self) -> GLuint {
        self.id
    }
}

impl<G: GlApi> Drop for Program<'_, G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GlCall, ObjectKind, RecordingGl};

    const VERT: &str = "#version 330 core\nvoid main() {}\n";
    const FRAG: &str = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n";

    #[test]
    fn builds_and_releases_stages() {
        let gl = RecordingGl::new();
        let program = ProgramBuilder::new(VERT, FRAG).build(&gl).unwrap();

        assert_eq!(gl.live(ObjectKind::Program), 1);
        assert_eq!(gl.live(ObjectKind::Shader), 0);

        let calls = gl.calls();
        assert!(calls.contains(&GlCall::LinkProgram(program.get_id())));
        assert!(calls.contains(&GlCall::ShaderSource(1, VERT.to_owned())));
        assert!(calls.contains(&GlCall::ShaderSource(2, FRAG.to_owned())));

        // both stages are attached before linking, deleted after it
        let link = calls
            .iter()
            .position(|c| matches!(c, GlCall::LinkProgram(_)))
            .unwrap();
        let attaches: Vec<_> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GlCall::AttachShader(..)))
            .map(|(i, _)| i)
            .collect();
        let deletes: Vec<_> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GlCall::DeleteShader(_)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(attaches.len(), 2);
        assert_eq!(deletes.len(), 2);
        assert!(attaches.iter().all(|i| *i < link));
        assert!(deletes.iter().all(|i| *i > link));

        drop(program);
        assert_eq!(gl.live_total(), 0);
    }

    #[test]
    fn strict_compile_failure_leaves_nothing_allocated() {
        let gl = RecordingGl::new()
            .failing_compile(ShaderStage::Fragment)
            .with_info_log("0:3(1): error: syntax error");

        let err = ProgramBuilder::new(VERT, FRAG).build(&gl).err().unwrap();

        match err {
            PBError::Compilation { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(log, "0:3(1): error: syntax error");
            }
            e => panic!("unexpected error {e:?}"),
        }

        assert_eq!(gl.live_total(), 0);
        assert_eq!(gl.count(|c| matches!(c, GlCall::CreateProgram(_))), 0);
    }

    #[test]
    fn strict_link_failure_deletes_program() {
        let gl = RecordingGl::new().failing_link().with_info_log("link error");

        let err = ProgramBuilder::new(VERT, FRAG).build(&gl).err().unwrap();

        assert!(matches!(err, PBError::Linking(ref log) if log == "link error"));
        assert_eq!(gl.live_total(), 0);
        assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteProgram(_))), 1);
    }

    #[test]
    fn lenient_failures_still_yield_program() {
        let gl = RecordingGl::new()
            .failing_compile(ShaderStage::Vertex)
            .failing_link();

        let program = ProgramBuilder::new(VERT, FRAG)
            .with_policy(BuildPolicy::Lenient)
            .build(&gl)
            .unwrap();

        assert_eq!(gl.live(ObjectKind::Program), 1);
        assert_eq!(gl.live(ObjectKind::Shader), 0);
        assert_eq!(gl.count(|c| matches!(c, GlCall::ShaderInfoLog(_))), 1);
        assert_eq!(gl.count(|c| matches!(c, GlCall::ProgramInfoLog(_))), 1);

        drop(program);
        assert_eq!(gl.live_total(), 0);
    }

    #[test]
    fn diagnostics_are_bounded() {
        let gl = RecordingGl::new()
            .failing_compile(ShaderStage::Vertex)
            .with_info_log("x".repeat(2048));

        let err = ProgramBuilder::new(VERT, FRAG).build(&gl).err().unwrap();

        match err {
            PBError::Compilation { log, .. } => assert!(log.len() < INFO_LOG_LIMIT),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn diagnostics_are_logged_once() {
        // strict hands the log to the caller inside the error
        assert_eq!(BuildPolicy::Strict.diagnostic_level(), log::Level::Debug);
        assert_eq!(BuildPolicy::Lenient.diagnostic_level(), log::Level::Error);

        let gl = RecordingGl::new()
            .failing_compile(ShaderStage::Vertex)
            .with_info_log("0:1(1): error: bad");
        let err = ProgramBuilder::new(VERT, FRAG).build(&gl).err().unwrap();

        assert!(err.to_string().contains("0:1(1): error: bad"));
    }

    #[test]
    fn nul_in_source_is_rejected_before_gl() {
        let gl = RecordingGl::new();

        let err = ProgramBuilder::new("void main() {}\0", FRAG)
            .build(&gl)
            .err()
            .unwrap();

        assert!(matches!(err, PBError::InvalidSource(ShaderStage::Vertex)));
        assert!(gl.calls().is_empty());
    }
}
