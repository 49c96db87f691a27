// Engine module - the render-loop math, independent of any window or GPU

pub mod frame;
pub mod geometry;
pub mod input;
pub mod rotation;
pub mod shapes;

// Re-export commonly used items
pub use frame::{FrameParams, Projection, RenderState, SpinStyle};
pub use geometry::{GeometryBuffer, GeometryError, NormalEncoding, PackedVertex};
pub use shapes::{ShapeArena, ShapeKind};
