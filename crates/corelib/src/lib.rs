//! Core types: math re-exports, Transform, Camera, orbit controls, scene graph.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod camera;
pub mod error;
pub mod light;
pub mod orbit;
pub mod scene;
pub mod transform;

pub use error::{CoreError, CoreResult};
