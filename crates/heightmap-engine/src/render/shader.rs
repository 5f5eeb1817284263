use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Vertex stage file name inside a shader directory.
pub const VERTEX_SHADER_FILE: &str = "colour_vert.wgsl";

/// Fragment stage file name inside a shader directory.
pub const FRAGMENT_SHADER_FILE: &str = "colour_frag.wgsl";

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse shader {path}:\n{diagnostic}")]
    Parse { path: PathBuf, diagnostic: String },

    #[error("shader {path} failed validation: {diagnostic}")]
    Validation { path: PathBuf, diagnostic: String },

    #[error("shader {path} has no {stage} entry point `{entry}`")]
    MissingEntryPoint {
        path: PathBuf,
        stage: ShaderStage,
        entry: &'static str,
    },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => VERTEX_ENTRY,
            ShaderStage::Fragment => FRAGMENT_ENTRY,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// WGSL text for one stage, already parsed and validated.
#[derive(Debug, Clone)]
pub struct StageSource {
    pub path: PathBuf,
    pub wgsl: String,
}

/// The vertex + fragment pair used by the terrain pipeline.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: StageSource,
    pub fragment: StageSource,
}

impl ShaderSources {
    /// Reads [`VERTEX_SHADER_FILE`] and [`FRAGMENT_SHADER_FILE`] from `dir` and
    /// validates both, so broken shaders fail before any window opens.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let dir = dir.as_ref();
        let vertex = read_stage(dir.join(VERTEX_SHADER_FILE), ShaderStage::Vertex)?;
        let fragment = read_stage(dir.join(FRAGMENT_SHADER_FILE), ShaderStage::Fragment)?;
        log::info!("shaders loaded from {}", dir.display());
        Ok(Self { vertex, fragment })
    }

    /// Validates in-memory WGSL. Paths in errors are `<vertex>`/`<fragment>`.
    pub fn from_wgsl(
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Result<Self, ShaderError> {
        let vertex = StageSource {
            path: PathBuf::from("<vertex>"),
            wgsl: vertex.into(),
        };
        let fragment = StageSource {
            path: PathBuf::from("<fragment>"),
            wgsl: fragment.into(),
        };
        validate(&vertex, ShaderStage::Vertex)?;
        validate(&fragment, ShaderStage::Fragment)?;
        Ok(Self { vertex, fragment })
    }
}

fn read_stage(path: PathBuf, stage: ShaderStage) -> Result<StageSource, ShaderError> {
    let wgsl = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(source) => return Err(ShaderError::Io { path, source }),
    };
    let src = StageSource { path, wgsl };
    validate(&src, stage)?;
    Ok(src)
}

fn validate(src: &StageSource, stage: ShaderStage) -> Result<(), ShaderError> {
    let module = naga::front::wgsl::parse_str(&src.wgsl).map_err(|e| ShaderError::Parse {
        path: src.path.clone(),
        diagnostic: e.emit_to_string(&src.wgsl),
    })?;

    let entry = stage.entry_point();
    let has_entry = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage.naga() && ep.name == entry);
    if !has_entry {
        return Err(ShaderError::MissingEntryPoint {
            path: src.path.clone(),
            stage,
            entry,
        });
    }

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Validation {
        path: src.path.clone(),
        diagnostic: e.as_inner().to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
struct Transform { mvp: mat4x4<f32> };
@group(0) @binding(0) var<uniform> transform: Transform;

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) colour: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) colour: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip = transform.mvp * vec4<f32>(position, 1.0);
    out.colour = colour;
    return out;
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main(@location(0) colour: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(colour, 1.0);
}
"#;

    #[test]
    fn valid_pair_is_accepted() {
        let s = ShaderSources::from_wgsl(VS, FS).unwrap();
        assert_eq!(s.vertex.path, PathBuf::from("<vertex>"));
        assert_eq!(s.fragment.wgsl, FS);
    }

    #[test]
    fn syntax_error_is_reported_as_parse() {
        let err = ShaderSources::from_wgsl("fn vs_main( {", FS).unwrap_err();
        assert!(matches!(err, ShaderError::Parse { .. }), "{err}");
    }

    #[test]
    fn type_error_is_reported() {
        let bad = "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }";
        let err = ShaderSources::from_wgsl(VS, bad).unwrap_err();
        assert!(
            matches!(err, ShaderError::Parse { .. } | ShaderError::Validation { .. }),
            "{err}"
        );
    }

    #[test]
    fn swapped_stages_miss_entry_points() {
        let err = ShaderSources::from_wgsl(FS, VS).unwrap_err();
        match err {
            ShaderError::MissingEntryPoint { stage, entry, .. } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert_eq!(entry, VERTEX_ENTRY);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_directory_is_io() {
        let err = ShaderSources::load("no/such/shader/dir").unwrap_err();
        match err {
            ShaderError::Io { path, .. } => assert!(path.ends_with(VERTEX_SHADER_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
