use bytemuck::{Pod, Zeroable};

/// Number of float components per quad vertex.
pub const POSITION_COMPONENTS: i32 = 2;

/// Vertices drawn per frame: two triangles, no index buffer.
pub const QUAD_VERTEX_COUNT: i32 = 6;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

const fn vertex(x: f32, y: f32) -> QuadVertex {
    QuadVertex { position: [x, y] }
}

/// Two triangles covering clip space.
pub static FULLSCREEN_QUAD: [QuadVertex; QUAD_VERTEX_COUNT as usize] = [
    vertex(-1.0, -1.0),
    vertex(1.0, -1.0),
    vertex(-1.0, 1.0),
    vertex(-1.0, 1.0),
    vertex(1.0, -1.0),
    vertex(1.0, 1.0),
];

/// Raw bytes of [`FULLSCREEN_QUAD`] ready for a static vertex buffer upload.
pub fn quad_bytes() -> &'static [u8] {
    bytemuck::cast_slice(&FULLSCREEN_QUAD)
}
