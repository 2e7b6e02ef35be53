//! OpenGL 3.3 core profile backend.

pub mod capabilities;
pub mod context;
pub mod types;
pub mod visitor;

pub use self::context::{GLContext, SurfaceEvent};
pub use self::visitor::GLVisitor;
