use std::fmt;

use serde::{Deserialize, Serialize};

/// Accent color applied when the caller does not supply one.
pub const DEFAULT_COLOR: [f32; 3] = [0.0, 0.8, 1.0];

/// Animation rate multiplier applied when the caller does not supply one.
pub const DEFAULT_SPEED: f32 = 1.0;

/// Pixel dimensions of a canvas, either its drawing buffer or its laid-out box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales the size by `factor`, rounding to the nearest pixel.
    pub fn scaled(self, factor: f32) -> Self {
        if factor == 1.0 {
            return self;
        }
        let scale = |value: u32| (value as f32 * factor).round().max(0.0) as u32;
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }

    pub fn as_uniform(self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Programmable pipeline stage a shader source targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Value pushed to a single uniform before a draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

/// Per-instance options tinting and pacing an effect.
///
/// Unknown keys are ignored and missing keys fall back to [`DEFAULT_COLOR`]
/// and [`DEFAULT_SPEED`], so `{}` and the fully spelled-out defaults describe
/// the same effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_color() -> [f32; 3] {
    DEFAULT_COLOR
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            speed: DEFAULT_SPEED,
        }
    }
}

impl RenderOptions {
    pub fn new(color: [f32; 3], speed: f32) -> Self {
        Self { color, speed }
    }

    /// Parses options from a JSON object such as `{"color":[0,0.5,0.6],"speed":0.5}`.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(trimmed)
    }

    /// Replaces non-finite components with defaults so they never reach a uniform.
    pub fn sanitized(self) -> Self {
        let color = if self.color.iter().all(|c| c.is_finite()) {
            self.color
        } else {
            tracing::warn!(color = ?self.color, "non-finite accent color; using default");
            DEFAULT_COLOR
        };
        let speed = if self.speed.is_finite() {
            self.speed
        } else {
            tracing::warn!(speed = self.speed, "non-finite speed; using default");
            DEFAULT_SPEED
        };
        Self { color, speed }
    }
}

/// Names the runtime looks up in the linked program for each uniform it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformNames {
    pub resolution: String,
    pub time: String,
    pub color: String,
    pub speed: String,
    pub pointer: String,
}

impl Default for UniformNames {
    fn default() -> Self {
        Self {
            resolution: "u_resolution".to_string(),
            time: "u_time".to_string(),
            color: "u_color".to_string(),
            speed: "u_speed".to_string(),
            pointer: "u_pointer".to_string(),
        }
    }
}

/// Everything needed to attach one shader canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Fragment stage source, paired with the fixed full-screen quad vertex stage.
    pub fragment: String,
    pub options: RenderOptions,
    pub uniforms: UniformNames,
    /// Subscribe to pointer movement and feed the normalized position uniform.
    pub interactive: bool,
    /// Drawing buffer size relative to the displayed size.
    pub render_scale: f32,
}

impl CanvasConfig {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            options: RenderOptions::default(),
            uniforms: UniformNames::default(),
            interactive: false,
            render_scale: 1.0,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_uniforms(mut self, uniforms: UniformNames) -> Self {
        self.uniforms = uniforms;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_render_scale(mut self, render_scale: f32) -> Self {
        self.render_scale = render_scale;
        self
    }

    pub(crate) fn effective_render_scale(&self) -> f32 {
        if self.render_scale.is_finite() && self.render_scale > 0.0 {
            self.render_scale
        } else {
            tracing::warn!(
                render_scale = self.render_scale,
                "invalid render scale; rendering at display size"
            );
            1.0
        }
    }
}
