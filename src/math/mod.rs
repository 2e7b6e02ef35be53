//! This module contains the math utils that mainly comes from `cgmath`.

pub use cgmath::*;

pub mod color;
pub use self::color::Color;

pub mod frustum;
pub use self::frustum::{sphere_visibility, PlaneMask};

pub mod prelude {
    pub use super::color::Color;
    pub use super::frustum::PlaneMask;
    pub use cgmath::prelude::*;
    pub use cgmath::{Matrix3, Matrix4, SquareMatrix, Vector2, Vector3, Vector4};
}
