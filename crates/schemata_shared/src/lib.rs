//! # Schemata Shared
//!
//! Geometry value types used by the transform engine, the entity tree
//! builder and the scene format.
//!
//! ## Conventions
//!
//! - `y` is the vertical axis. Mirrors and rotations only touch `x` and `z`.
//! - Rotations are clockwise when viewed from above.
//! - Every transform here is total: no input produces an error or a panic.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod bounds;
pub mod math;
pub mod orientation;

pub use bounds::{Aabb, BlockBox};
pub use math::{BlockPos, Vec3};
pub use orientation::{Direction, Mirror, Orientation, Rotation};
