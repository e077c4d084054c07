use std::collections::BTreeSet;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Layout of the site this workspace ships with.
pub const BUNDLED_SITE: &str = include_str!("../site.toml");

/// Color used when neither the canvas nor `[defaults]` sets one.
pub const BUILTIN_COLOR: [f32; 3] = [0.0, 0.8, 1.0];
/// Speed used when neither the canvas nor `[defaults]` sets one.
pub const BUILTIN_SPEED: f32 = 1.0;
/// Render scale used when neither the canvas nor `[defaults]` sets one.
pub const BUILTIN_RENDER_SCALE: f32 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub version: u32,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default, rename = "canvas")]
    pub canvases: Vec<CanvasEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    pub effect: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color_opt")]
    pub color: Option<[f32; 3]>,
    pub speed: Option<f32>,
    pub render_scale: Option<f32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CanvasEntry {
    pub id: String,
    pub effect: Option<String>,
    /// Inline fragment shader source used instead of a catalog effect.
    pub fragment: Option<String>,
    #[serde(default, deserialize_with = "deserialize_color_opt")]
    pub color: Option<[f32; 3]>,
    pub speed: Option<f32>,
    pub interactive: Option<bool>,
    pub render_scale: Option<f32>,
    #[serde(default)]
    pub uniforms: UniformOverrides,
    pub fallback: Option<FallbackEntry>,
}

/// Uniform names a fragment uses instead of the standard ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UniformOverrides {
    pub resolution: Option<String>,
    pub time: Option<String>,
    pub color: Option<String>,
    pub speed: Option<String>,
    pub pointer: Option<String>,
}

impl UniformOverrides {
    fn entries(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("resolution", self.resolution.as_deref()),
            ("time", self.time.as_deref()),
            ("color", self.color.as_deref()),
            ("speed", self.speed.as_deref()),
            ("pointer", self.pointer.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FallbackEntry {
    pub selector: Option<String>,
    pub background: String,
}

/// Where a canvas gets its fragment shader from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    Effect(String),
    Inline(String),
}

/// A canvas entry with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCanvas {
    pub id: String,
    pub source: ShaderSource,
    pub color: [f32; 3],
    pub speed: f32,
    /// `None` leaves the choice to the effect.
    pub interactive: Option<bool>,
    pub render_scale: f32,
    pub uniforms: UniformOverrides,
    pub fallback: Option<FallbackEntry>,
}

fn deserialize_color_opt<'de, D>(deserializer: D) -> Result<Option<[f32; 3]>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Rgb([f32; 3]),
        Hex(String),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Rgb(rgb)) => Some(rgb),
        Some(Helper::Hex(raw)) => Some(parse_hex_color(&raw).map_err(de::Error::custom)?),
    };
    Ok(result)
}

/// Parses `#rrggbb` (the `#` is optional) into linear `[0, 1]` components.
pub fn parse_hex_color(raw: &str) -> Result<[f32; 3], String> {
    let digits = raw.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid color '{raw}'; expected '#rrggbb' or [r, g, b]"));
    }
    let channel = |offset: usize| {
        u8::from_str_radix(&digits[offset..offset + 2], 16)
            .map(|value| f32::from(value) / 255.0)
            .map_err(|err| format!("invalid color '{raw}': {err}"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

impl SiteConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SiteConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// The layout compiled into the crate.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUNDLED_SITE)
    }

    pub fn canvas(&self, id: &str) -> Option<&CanvasEntry> {
        self.canvases.iter().find(|entry| entry.id == id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.canvases.is_empty() {
            return Err(ConfigError::Invalid(
                "config must define at least one [[canvas]]".into(),
            ));
        }

        validate_color("defaults.color", self.defaults.color)?;
        validate_speed("defaults.speed", self.defaults.speed)?;
        validate_render_scale("defaults.render_scale", self.defaults.render_scale)?;
        if let Some(effect) = &self.defaults.effect {
            if effect.trim().is_empty() {
                return Err(ConfigError::Invalid("defaults.effect may not be empty".into()));
            }
        }

        let mut seen = BTreeSet::new();
        for entry in &self.canvases {
            let id = entry.id.trim();
            if id.is_empty() {
                return Err(ConfigError::Invalid("canvas id may not be empty".into()));
            }
            if !seen.insert(id) {
                return Err(ConfigError::Invalid(format!("canvas '{id}' is defined twice")));
            }

            match (&entry.effect, &entry.fragment) {
                (Some(_), Some(_)) => {
                    return Err(ConfigError::Invalid(format!(
                        "canvas '{id}' sets both effect and fragment"
                    )));
                }
                (None, None) if self.defaults.effect.is_none() => {
                    return Err(ConfigError::Invalid(format!(
                        "canvas '{id}' needs an effect or fragment (no defaults.effect set)"
                    )));
                }
                (Some(effect), None) if effect.trim().is_empty() => {
                    return Err(ConfigError::Invalid(format!(
                        "canvas '{id}' effect may not be empty"
                    )));
                }
                (None, Some(fragment)) if fragment.trim().is_empty() => {
                    return Err(ConfigError::Invalid(format!(
                        "canvas '{id}' fragment may not be empty"
                    )));
                }
                _ => {}
            }

            validate_color(&format!("canvas '{id}' color"), entry.color)?;
            validate_speed(&format!("canvas '{id}' speed"), entry.speed)?;
            validate_render_scale(&format!("canvas '{id}' render_scale"), entry.render_scale)?;

            for (slot, name) in entry.uniforms.entries() {
                if name.is_some_and(|name| name.trim().is_empty()) {
                    return Err(ConfigError::Invalid(format!(
                        "canvas '{id}' uniforms.{slot} may not be empty"
                    )));
                }
            }

            if let Some(fallback) = &entry.fallback {
                if fallback.background.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "canvas '{id}' fallback background may not be empty"
                    )));
                }
                if fallback
                    .selector
                    .as_deref()
                    .is_some_and(|selector| selector.trim().is_empty())
                {
                    return Err(ConfigError::Invalid(format!(
                        "canvas '{id}' fallback selector may not be empty"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Every canvas with `[defaults]` and built-in values filled in.
    pub fn resolved(&self) -> Vec<ResolvedCanvas> {
        self.canvases
            .iter()
            .map(|entry| entry.resolved(&self.defaults))
            .collect()
    }
}

impl CanvasEntry {
    pub fn resolved(&self, defaults: &Defaults) -> ResolvedCanvas {
        let source = match (&self.fragment, &self.effect) {
            (Some(fragment), _) => ShaderSource::Inline(fragment.clone()),
            (None, Some(effect)) => ShaderSource::Effect(effect.clone()),
            (None, None) => ShaderSource::Effect(defaults.effect.clone().unwrap_or_default()),
        };
        ResolvedCanvas {
            id: self.id.trim().to_string(),
            source,
            color: self.color.or(defaults.color).unwrap_or(BUILTIN_COLOR),
            speed: self.speed.or(defaults.speed).unwrap_or(BUILTIN_SPEED),
            interactive: self.interactive,
            render_scale: self
                .render_scale
                .or(defaults.render_scale)
                .unwrap_or(BUILTIN_RENDER_SCALE),
            uniforms: self.uniforms.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

fn validate_color(what: &str, color: Option<[f32; 3]>) -> Result<(), ConfigError> {
    if let Some(color) = color {
        if !color.iter().all(|c| c.is_finite() && (0.0..=1.0).contains(c)) {
            return Err(ConfigError::Invalid(format!(
                "{what} components must be within [0, 1], got {color:?}"
            )));
        }
    }
    Ok(())
}

fn validate_speed(what: &str, speed: Option<f32>) -> Result<(), ConfigError> {
    if let Some(speed) = speed {
        if !speed.is_finite() {
            return Err(ConfigError::Invalid(format!("{what} must be finite")));
        }
    }
    Ok(())
}

fn validate_render_scale(what: &str, scale: Option<f32>) -> Result<(), ConfigError> {
    if let Some(scale) = scale {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "{what} must be greater than zero"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
version = 1

[defaults]
effect = "grid"
speed = 0.5

[[canvas]]
id = "services-canvas"
color = [0.0, 0.5, 0.6]

[[canvas]]
id = "engine-bay-canvas"
effect = "engine"
color = "#4D80CC"
interactive = true
render_scale = 0.5

[canvas.fallback]
selector = ".hero"
background = "#1A1A1A"

[[canvas]]
id = "custom"
fragment = "void main() { gl_FragColor = vec4(1.0); }"

[canvas.uniforms]
time = "u_engine_cycles"
"##;

    #[test]
    fn parses_sample_config() {
        let config = SiteConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.canvases.len(), 3);
        let hero = config.canvas("engine-bay-canvas").unwrap();
        assert_eq!(hero.fallback.as_ref().unwrap().selector.as_deref(), Some(".hero"));
        let [r, g, b] = hero.color.unwrap();
        assert!((r - 77.0 / 255.0).abs() < 1e-6);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert!((b - 204.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn resolves_with_defaults() {
        let config = SiteConfig::from_toml_str(SAMPLE).unwrap();
        let resolved = config.resolved();

        assert_eq!(resolved[0].source, ShaderSource::Effect("grid".into()));
        assert_eq!(resolved[0].speed, 0.5);
        assert_eq!(resolved[0].render_scale, 1.0);
        assert_eq!(resolved[0].interactive, None);

        assert_eq!(resolved[1].source, ShaderSource::Effect("engine".into()));
        assert_eq!(resolved[1].interactive, Some(true));
        assert_eq!(resolved[1].render_scale, 0.5);

        assert!(matches!(resolved[2].source, ShaderSource::Inline(_)));
        assert_eq!(resolved[2].color, BUILTIN_COLOR);
        assert_eq!(resolved[2].uniforms.time.as_deref(), Some("u_engine_cycles"));
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = SiteConfig::from_toml_str("version = 2\n[[canvas]]\nid = \"a\"\neffect = \"grid\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let config = r#"
version = 1
[defaults]
effect = "grid"
[[canvas]]
id = "news-canvas"
[[canvas]]
id = "news-canvas"
"#;
        let err = SiteConfig::from_toml_str(config).unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn requires_a_shader_source() {
        let config = "version = 1\n[[canvas]]\nid = \"a\"\n";
        let err = SiteConfig::from_toml_str(config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let both = "version = 1\n[[canvas]]\nid = \"a\"\neffect = \"grid\"\nfragment = \"void main() {}\"\n";
        assert!(SiteConfig::from_toml_str(both).is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        for body in [
            "color = [1.5, 0.0, 0.0]",
            "render_scale = 0.0",
            "color = \"#12345\"",
        ] {
            let config = format!("version = 1\n[[canvas]]\nid = \"a\"\neffect = \"grid\"\n{body}\n");
            assert!(SiteConfig::from_toml_str(&config).is_err(), "{body}");
        }
    }

    #[test]
    fn zero_speed_is_allowed() {
        let config = "version = 1\n[[canvas]]\nid = \"a\"\neffect = \"grid\"\nspeed = 0.0\n";
        let parsed = SiteConfig::from_toml_str(config).unwrap();
        assert_eq!(parsed.resolved()[0].speed, 0.0);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SiteConfig::from_toml_str("version = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bundled_site_is_valid() {
        let config = SiteConfig::bundled().expect("bundled site");
        let resolved = config.resolved();
        assert_eq!(resolved.len(), 9);

        let facts = resolved.iter().find(|c| c.id == "facts-canvas").unwrap();
        assert_eq!(facts.color, [0.1, 0.4, 0.6]);
        assert_eq!(facts.speed, 0.3);
        assert_eq!(facts.source, ShaderSource::Effect("grid".into()));

        let hero = resolved.iter().find(|c| c.id == "engine-bay-canvas").unwrap();
        assert_eq!(hero.source, ShaderSource::Effect("engine".into()));
        assert_eq!(
            hero.fallback,
            Some(FallbackEntry {
                selector: Some(".hero".into()),
                background: "#1A1A1A".into(),
            })
        );
    }

    #[test]
    fn hex_colors_accept_optional_hash() {
        assert_eq!(parse_hex_color("ffffff").unwrap(), [1.0, 1.0, 1.0]);
        assert_eq!(parse_hex_color("#000000").unwrap(), [0.0, 0.0, 0.0]);
        assert!(parse_hex_color("#zzzzzz").is_err());
    }
}
