/// A built-in fragment shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub name: &'static str,
    pub description: &'static str,
    pub fragment: &'static str,
    /// Reads the pointer position uniform.
    pub interactive: bool,
}

static CATALOG: [Effect; 5] = [
    Effect {
        name: "grid",
        description: "Scrolling grid lines tinted by the accent color",
        fragment: include_str!("../shaders/grid.frag"),
        interactive: false,
    },
    Effect {
        name: "engine",
        description: "Rotating fBm oil-and-rust field that ripples away from the pointer",
        fragment: include_str!("../shaders/engine.frag"),
        interactive: true,
    },
    Effect {
        name: "waves",
        description: "Three interfering sine waves in orange and blue",
        fragment: include_str!("../shaders/waves.frag"),
        interactive: false,
    },
    Effect {
        name: "plasma",
        description: "Cosine-palette plasma blended with the accent color",
        fragment: include_str!("../shaders/plasma.frag"),
        interactive: false,
    },
    Effect {
        name: "voronoi",
        description: "Drifting cellular noise with highlighted cell borders",
        fragment: include_str!("../shaders/voronoi.frag"),
        interactive: false,
    },
];

pub fn catalog() -> &'static [Effect] {
    &CATALOG
}

/// Finds an effect by name, ignoring ASCII case and surrounding whitespace.
pub fn lookup(name: &str) -> Option<&'static Effect> {
    let name = name.trim();
    CATALOG
        .iter()
        .find(|effect| effect.name.eq_ignore_ascii_case(name))
}
