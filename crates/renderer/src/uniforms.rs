use crate::host::GraphicsContext;
use crate::types::{CanvasSize, RenderOptions, UniformNames, UniformValue};

/// Uniform inputs the runtime feeds every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    Resolution,
    Time,
    Color,
    Speed,
    Pointer,
}

impl UniformSlot {
    pub const ALL: [UniformSlot; 5] = [
        UniformSlot::Resolution,
        UniformSlot::Time,
        UniformSlot::Color,
        UniformSlot::Speed,
        UniformSlot::Pointer,
    ];

    pub fn name(self, names: &UniformNames) -> &str {
        match self {
            UniformSlot::Resolution => &names.resolution,
            UniformSlot::Time => &names.time,
            UniformSlot::Color => &names.color,
            UniformSlot::Speed => &names.speed,
            UniformSlot::Pointer => &names.pointer,
        }
    }
}

/// Values written before each draw. Write-only from the runtime's side:
/// nothing is ever read back from the context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub color: [f32; 3],
    pub speed: f32,
    /// Normalized pointer position; `None` for non-interactive canvases.
    pub pointer: Option<[f32; 2]>,
}

impl FrameUniforms {
    pub fn new(options: &RenderOptions, size: CanvasSize) -> Self {
        Self {
            resolution: size.as_uniform(),
            time: 0.0,
            color: options.color,
            speed: options.speed,
            pointer: None,
        }
    }

    pub fn value(&self, slot: UniformSlot) -> Option<UniformValue> {
        match slot {
            UniformSlot::Resolution => Some(UniformValue::Vec2(self.resolution)),
            UniformSlot::Time => Some(UniformValue::Float(self.time)),
            UniformSlot::Color => Some(UniformValue::Vec3(self.color)),
            UniformSlot::Speed => Some(UniformValue::Float(self.speed)),
            UniformSlot::Pointer => self.pointer.map(UniformValue::Vec2),
        }
    }
}

/// Locations resolved once after linking. Uniforms the program does not
/// declare (or the compiler optimised away) are simply never written.
pub struct UniformLocations<L> {
    bound: Vec<(UniformSlot, L)>,
}

impl<L> UniformLocations<L> {
    pub fn resolve<G>(gl: &G, program: &G::Program, names: &UniformNames) -> Self
    where
        G: GraphicsContext<UniformLocation = L>,
    {
        let bound = UniformSlot::ALL
            .into_iter()
            .filter_map(|slot| {
                gl.uniform_location(program, slot.name(names))
                    .map(|location| (slot, location))
            })
            .collect();
        Self { bound }
    }

    pub fn is_bound(&self, slot: UniformSlot) -> bool {
        self.bound.iter().any(|(bound, _)| *bound == slot)
    }

    pub fn bound_slots(&self) -> impl Iterator<Item = UniformSlot> + '_ {
        self.bound.iter().map(|(slot, _)| *slot)
    }

    /// Writes every bound slot that currently has a value.
    pub fn push<G>(&self, gl: &G, uniforms: &FrameUniforms)
    where
        G: GraphicsContext<UniformLocation = L>,
    {
        for (slot, location) in &self.bound {
            if let Some(value) = uniforms.value(*slot) {
                gl.set_uniform(location, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::build_program;
    use crate::headless::HeadlessCanvas;
    use crate::host::CanvasTarget;

    #[test]
    fn only_declared_uniforms_are_bound() {
        let canvas = HeadlessCanvas::new("c", 4, 4);
        let gl = canvas.context().unwrap();
        let program = build_program(
            &gl,
            "uniform vec2 u_resolution;\nuniform float u_time;\nvoid main() { gl_FragColor = vec4(0.0); }",
        )
        .unwrap();
        let locations = UniformLocations::resolve(&gl, &program, &UniformNames::default());
        let slots: Vec<_> = locations.bound_slots().collect();
        assert_eq!(slots, [UniformSlot::Resolution, UniformSlot::Time]);
    }

    #[test]
    fn pointer_is_skipped_until_known() {
        let canvas = HeadlessCanvas::new("c", 4, 4);
        let gl = canvas.context().unwrap();
        let program = build_program(
            &gl,
            "uniform vec2 u_pointer;\nvoid main() { gl_FragColor = vec4(u_pointer, 0.0, 1.0); }",
        )
        .unwrap();
        let locations = UniformLocations::resolve(&gl, &program, &UniformNames::default());
        let mut uniforms = FrameUniforms::new(&RenderOptions::default(), CanvasSize::new(4, 4));
        locations.push(&gl, &uniforms);
        assert_eq!(canvas.uniform("u_pointer"), None);

        uniforms.pointer = Some([0.25, 0.75]);
        locations.push(&gl, &uniforms);
        assert_eq!(
            canvas.uniform("u_pointer"),
            Some(UniformValue::Vec2([0.25, 0.75]))
        );
    }

    #[test]
    fn custom_names_are_respected() {
        let canvas = HeadlessCanvas::new("c", 4, 4);
        let gl = canvas.context().unwrap();
        let program = build_program(
            &gl,
            "uniform vec2 u_viewport;\nuniform float u_engine_cycles;\nvoid main() { gl_FragColor = vec4(0.0); }",
        )
        .unwrap();
        let names = UniformNames {
            resolution: "u_viewport".into(),
            time: "u_engine_cycles".into(),
            ..UniformNames::default()
        };
        let locations = UniformLocations::resolve(&gl, &program, &names);
        assert!(locations.is_bound(UniformSlot::Resolution));
        assert!(locations.is_bound(UniformSlot::Time));
        assert!(!locations.is_bound(UniformSlot::Color));
    }
}
