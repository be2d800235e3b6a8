/// One triangle in normalized device coordinates, three floats per vertex.
#[rustfmt::skip]
pub const TRIANGLE: [f32; 9] = [
    -0.5, -0.5, 0.0,
    0.5, -0.5, 0.0,
    0.0, 0.5, 0.0,
];

pub mod api;
pub mod geometry;
pub mod program;
#[cfg(any(test, feature = "recording"))]
pub mod recording;
pub mod renderer;
