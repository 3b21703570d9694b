//! Software 3D projection and rasterization
//!
//! The pipeline, start to finish:
//! - quaternion camera builds the view matrix, translation folded in
//! - symmetric frustum projection, perspective divide, remap to [0,1]
//! - scanline fills into a packed pixel buffer with an f64 depth buffer
//! - optional depth-overlay pass darkening pixels by distance

mod camera;
mod math;
mod render;

pub use camera::*;
pub use math::*;
pub use render::*;

/// Render target dimensions.
pub const WIDTH: usize = 900;
pub const HEIGHT: usize = 600;
