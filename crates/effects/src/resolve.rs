use renderer::compile::{declared_uniforms, missing_required_uniforms};
use renderer::{CanvasConfig, CanvasSpec, Fallback, RenderOptions, UniformNames};
use siteconfig::{ResolvedCanvas, ShaderSource, SiteConfig, UniformOverrides};

use crate::catalog::lookup;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("canvas '{canvas}' uses unknown effect '{effect}'")]
    UnknownEffect { canvas: String, effect: String },
}

impl ResolveError {
    /// Id of the canvas entry that failed to resolve.
    pub fn canvas(&self) -> &str {
        match self {
            ResolveError::UnknownEffect { canvas, .. } => canvas,
        }
    }
}

/// Outcome of resolving a site config: the canvases ready to mount and the
/// entries that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub specs: Vec<CanvasSpec>,
    pub errors: Vec<ResolveError>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Turns every configured canvas into a mountable spec. An entry that cannot
/// be resolved is logged and skipped; the others still resolve.
pub fn resolve(config: &SiteConfig) -> Resolution {
    let mut resolution = Resolution::default();
    for canvas in config.resolved() {
        match resolve_canvas(&canvas) {
            Ok(spec) => resolution.specs.push(spec),
            Err(err) => {
                tracing::error!(canvas = %canvas.id, "{err}");
                resolution.errors.push(err);
            }
        }
    }
    resolution
}

pub fn resolve_canvas(canvas: &ResolvedCanvas) -> Result<CanvasSpec, ResolveError> {
    let names = uniform_names(&canvas.uniforms);
    let (fragment, interactive_default) = match &canvas.source {
        ShaderSource::Effect(name) => {
            let effect = lookup(name).ok_or_else(|| ResolveError::UnknownEffect {
                canvas: canvas.id.clone(),
                effect: name.clone(),
            })?;
            (effect.fragment.to_string(), effect.interactive)
        }
        ShaderSource::Inline(fragment) => {
            let reads_pointer = declared_uniforms(fragment)
                .iter()
                .any(|decl| decl.name == names.pointer);
            (fragment.clone(), reads_pointer)
        }
    };
    let interactive = canvas.interactive.unwrap_or(interactive_default);
    tracing::debug!(canvas = %canvas.id, interactive, "resolved canvas");

    let config = CanvasConfig::new(fragment)
        .with_options(RenderOptions::new(canvas.color, canvas.speed))
        .with_uniforms(names)
        .interactive(interactive)
        .with_render_scale(canvas.render_scale);
    let mut spec = CanvasSpec::new(canvas.id.clone(), config);
    if let Some(fallback) = &canvas.fallback {
        spec = spec.with_fallback(Fallback {
            selector: fallback.selector.clone(),
            background: fallback.background.clone(),
        });
    }
    Ok(spec)
}

/// Problems that would make a canvas misbehave at runtime. Empty when the
/// config is ready to mount.
pub fn check(config: &SiteConfig) -> Vec<String> {
    let mut issues = Vec::new();
    for canvas in config.resolved() {
        let spec = match resolve_canvas(&canvas) {
            Ok(spec) => spec,
            Err(err) => {
                issues.push(err.to_string());
                continue;
            }
        };
        let fragment = &spec.config.fragment;
        let names = &spec.config.uniforms;
        for missing in missing_required_uniforms(fragment, names) {
            issues.push(format!(
                "canvas '{}' fragment never declares uniform '{missing}'",
                canvas.id
            ));
        }
        if spec.config.interactive
            && declared_uniforms(fragment)
                .iter()
                .all(|decl| decl.name != names.pointer)
        {
            issues.push(format!(
                "canvas '{}' is interactive but never declares uniform '{}'",
                canvas.id, names.pointer
            ));
        }
    }
    issues
}

fn uniform_names(overrides: &UniformOverrides) -> UniformNames {
    let mut names = UniformNames::default();
    let slots = [
        (&mut names.resolution, &overrides.resolution),
        (&mut names.time, &overrides.time),
        (&mut names.color, &overrides.color),
        (&mut names.speed, &overrides.speed),
        (&mut names.pointer, &overrides.pointer),
    ];
    for (slot, replacement) in slots {
        if let Some(replacement) = replacement {
            *slot = replacement.trim().to_string();
        }
    }
    names
}
