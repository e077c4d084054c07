use crate::host::GraphicsContext;
use crate::types::{ShaderStage, UniformNames};

/// Attribute the quad vertex stage reads clip-space positions from.
pub const POSITION_ATTRIBUTE: &str = "a_position";

/// Fixed pass-through vertex stage shared by every effect.
pub const VERTEX_SHADER: &str = r"attribute vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Failure while turning sources into a linked program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program failed to link: {log}")]
    Link { log: String },
    #[error("failed to allocate {what}")]
    Allocation { what: &'static str },
}

/// Compiles the quad vertex stage and `fragment`, then links them.
///
/// Nothing is left behind on failure: any shader or program object created
/// along the way is deleted before the error is returned. On success the
/// intermediate shader objects are released too, only the program survives.
pub fn build_program<G: GraphicsContext>(
    gl: &G,
    fragment: &str,
) -> Result<G::Program, ProgramError> {
    let vertex = compile_stage(gl, ShaderStage::Vertex, VERTEX_SHADER)?;
    let fragment = match compile_stage(gl, ShaderStage::Fragment, fragment) {
        Ok(shader) => shader,
        Err(err) => {
            gl.delete_shader(vertex);
            return Err(err);
        }
    };

    let Some(program) = gl.create_program() else {
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
        return Err(ProgramError::Allocation { what: "program" });
    };

    let linked = gl.link_program(&program, &vertex, &fragment);
    gl.delete_shader(vertex);
    gl.delete_shader(fragment);

    match linked {
        Ok(()) => Ok(program),
        Err(log) => {
            gl.delete_program(program);
            Err(ProgramError::Link {
                log: normalize_log(log, "link failed without diagnostics"),
            })
        }
    }
}

fn compile_stage<G: GraphicsContext>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, ProgramError> {
    let shader = gl.create_shader(stage).ok_or(ProgramError::Allocation {
        what: match stage {
            ShaderStage::Vertex => "vertex shader",
            ShaderStage::Fragment => "fragment shader",
        },
    })?;
    match gl.compile_shader(&shader, source) {
        Ok(()) => Ok(shader),
        Err(log) => {
            gl.delete_shader(shader);
            Err(ProgramError::Compile {
                stage,
                log: normalize_log(log, "compile failed without diagnostics"),
            })
        }
    }
}

fn normalize_log(log: String, fallback: &str) -> String {
    let trimmed = log.trim_end_matches(['\0', '\n', ' ']).trim_start();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A `uniform`, `attribute` or `varying` declaration found in a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub ty: String,
    pub name: String,
}

/// Uniforms declared at the top level of `source`.
pub fn declared_uniforms(source: &str) -> Vec<Declaration> {
    declarations(source, "uniform")
}

/// Declarations introduced by `qualifier` (`uniform`, `attribute`, `varying`).
///
/// This is a lexical scan, not a parser: precision qualifiers are skipped and
/// comma-separated lists and array suffixes are handled, which covers the
/// shapes effect shaders use.
pub fn declarations(source: &str, qualifier: &str) -> Vec<Declaration> {
    let stripped = strip_comments(source);
    let mut found = Vec::new();
    for statement in stripped.split([';', '{', '}']) {
        let mut tokens = statement.split_whitespace();
        if tokens.next() != Some(qualifier) {
            continue;
        }
        let mut ty = None;
        for token in tokens.by_ref() {
            if matches!(token, "lowp" | "mediump" | "highp") {
                continue;
            }
            ty = Some(token.to_string());
            break;
        }
        let Some(ty) = ty else { continue };
        let rest: Vec<&str> = tokens.collect();
        for name in rest.join(" ").split(',') {
            let name = name.split('[').next().unwrap_or_default().trim();
            if !name.is_empty() {
                found.push(Declaration {
                    ty: ty.clone(),
                    name: name.to_string(),
                });
            }
        }
    }
    found
}

/// Required uniform names (resolution and time) that `source` never declares.
pub fn missing_required_uniforms<'a>(source: &str, names: &'a UniformNames) -> Vec<&'a str> {
    let declared = declared_uniforms(source);
    [names.resolution.as_str(), names.time.as_str()]
        .into_iter()
        .filter(|required| declared.iter().all(|decl| decl.name != *required))
        .collect()
}

/// Removes `//` and `/* */` comments, keeping newlines so line numbers hold.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessCanvas;
    use crate::host::CanvasTarget;

    const GRID: &str = r"
        precision highp float;
        uniform vec2 u_resolution;
        uniform float u_time; // seconds
        uniform vec3 u_color;
        /* uniform float u_hidden; */
        void main() {
            gl_FragColor = vec4(u_color * fract(u_time), 1.0);
        }
    ";

    #[test]
    fn finds_uniform_declarations() {
        let names: Vec<_> = declared_uniforms(GRID).into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["u_resolution", "u_time", "u_color"]);
    }

    #[test]
    fn handles_lists_arrays_and_precision() {
        let decls = declared_uniforms("uniform mediump vec2 a, b[4];\nuniform float c;");
        let names: Vec<_> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(decls[0].ty, "vec2");
    }

    #[test]
    fn reports_missing_required_uniforms() {
        let names = UniformNames::default();
        assert!(missing_required_uniforms(GRID, &names).is_empty());
        let missing = missing_required_uniforms("uniform float u_time;", &names);
        assert_eq!(missing, ["u_resolution"]);
    }

    #[test]
    fn strip_comments_preserves_lines() {
        let stripped = strip_comments("a // x\n/* y\n z */b");
        assert_eq!(stripped, "a \n\nb");
    }

    #[test]
    fn builds_program_and_releases_shaders() {
        let canvas = HeadlessCanvas::new("c", 8, 8);
        let gl = canvas.context().unwrap();
        let program = build_program(&gl, GRID).expect("program");
        assert_eq!(canvas.live_shaders(), 0);
        assert_eq!(canvas.live_programs(), 1);
        gl.delete_program(program);
        assert_eq!(canvas.live_objects(), 0);
    }

    #[test]
    fn compile_failure_leaves_nothing_behind() {
        let canvas = HeadlessCanvas::new("c", 8, 8);
        let gl = canvas.context().unwrap();
        let err = build_program(&gl, "void main() { gl_FragColor = vec4(1.0);").unwrap_err();
        assert!(matches!(
            err,
            ProgramError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(canvas.live_objects(), 0);
    }

    #[test]
    fn link_failure_leaves_nothing_behind() {
        let canvas = HeadlessCanvas::new("c", 8, 8);
        let gl = canvas.context().unwrap();
        let source = "precision mediump float;\nvarying vec2 v_uv;\nvoid main() { gl_FragColor = vec4(v_uv, 0.0, 1.0); }";
        let err = build_program(&gl, source).unwrap_err();
        match err {
            ProgramError::Link { log } => assert!(log.contains("v_uv")),
            other => panic!("expected link error, got {other:?}"),
        }
        assert_eq!(canvas.live_objects(), 0);
    }
}
