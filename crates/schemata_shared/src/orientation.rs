//! # Orientation
//!
//! Mirror and rotation about the vertical axis, applied in the horizontal
//! (x/z) plane. The mirror is always applied first, then the rotation.
//!
//! | Mirror      | Effect   |
//! |-------------|----------|
//! | `FrontBack` | `x = -x` |
//! | `LeftRight` | `z = -z` |
//!
//! | Rotation       | `(x, z)` becomes |
//! |----------------|------------------|
//! | `Clockwise90`  | `(-z, x)`        |
//! | `Clockwise180` | `(-x, -z)`       |
//! | `Clockwise270` | `(z, -x)`        |
//!
//! Continuous positions turn about the center of the origin block instead,
//! so a point inside block `b` always ends up inside the transformed `b`.
//! Mirroring `FrontBack` then maps `x` to `1 - x`, not `-x`. Directions
//! (facing vectors, offsets) use the plain table above.

use serde::{Deserialize, Serialize};

use crate::math::{BlockPos, Vec3};

/// Negation that never panics.
trait Reflect: Copy {
    fn reflect(self) -> Self;
}

impl Reflect for i32 {
    #[inline]
    fn reflect(self) -> Self {
        self.wrapping_neg()
    }
}

impl Reflect for f64 {
    #[inline]
    fn reflect(self) -> Self {
        -self
    }
}

/// Reflection about a horizontal axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mirror {
    /// No reflection.
    #[default]
    None,
    /// Negates the x axis.
    FrontBack,
    /// Negates the z axis.
    LeftRight,
}

impl Mirror {
    /// All mirror variants.
    pub const ALL: [Self; 3] = [Self::None, Self::FrontBack, Self::LeftRight];

    #[inline]
    fn apply<T: Reflect>(self, x: T, z: T) -> (T, T) {
        match self {
            Self::None => (x, z),
            Self::FrontBack => (x.reflect(), z),
            Self::LeftRight => (x, z.reflect()),
        }
    }
}

/// Clockwise rotation about the vertical axis in quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// A quarter turn clockwise.
    #[serde(rename = "clockwise_90")]
    Clockwise90,
    /// A half turn.
    #[serde(rename = "clockwise_180")]
    Clockwise180,
    /// Three quarter turns clockwise (a quarter turn counterclockwise).
    #[serde(rename = "clockwise_270", alias = "counterclockwise_90")]
    Clockwise270,
}

impl Rotation {
    /// All rotation variants, in clockwise order.
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::Clockwise90,
        Self::Clockwise180,
        Self::Clockwise270,
    ];

    /// Number of clockwise quarter turns (0-3).
    #[inline]
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 1,
            Self::Clockwise180 => 2,
            Self::Clockwise270 => 3,
        }
    }

    /// Builds a rotation from a number of clockwise quarter turns (mod 4).
    #[inline]
    #[must_use]
    pub const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::None,
            1 => Self::Clockwise90,
            2 => Self::Clockwise180,
            _ => Self::Clockwise270,
        }
    }

    /// Rotation applying `self` then `other`.
    #[inline]
    #[must_use]
    pub const fn then(self, other: Self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// The rotation undoing this one.
    #[inline]
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self::from_quarter_turns(4 - self.quarter_turns())
    }

    #[inline]
    fn apply<T: Reflect>(self, x: T, z: T) -> (T, T) {
        match self {
            Self::None => (x, z),
            Self::Clockwise90 => (z.reflect(), x),
            Self::Clockwise180 => (x.reflect(), z.reflect()),
            Self::Clockwise270 => (z, x.reflect()),
        }
    }
}

/// A mirror followed by a rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Orientation {
    /// Applied first.
    pub mirror: Mirror,
    /// Applied second.
    pub rotation: Rotation,
}

impl Orientation {
    /// The identity orientation.
    pub const IDENTITY: Self = Self::new(Mirror::None, Rotation::None);

    /// Creates a new orientation.
    #[must_use]
    pub const fn new(mirror: Mirror, rotation: Rotation) -> Self {
        Self { mirror, rotation }
    }

    /// Every mirror/rotation combination.
    #[must_use]
    pub fn all() -> impl Iterator<Item = Self> {
        Mirror::ALL
            .into_iter()
            .flat_map(|mirror| Rotation::ALL.into_iter().map(move |rotation| Self::new(mirror, rotation)))
    }

    /// Returns true for the identity orientation.
    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// The orientation undoing this one.
    ///
    /// A mirror followed by a rotation is a reflection, and every reflection
    /// is its own inverse, so only unmirrored orientations change.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self.mirror {
            Mirror::None => Self::new(Mirror::None, self.rotation.inverse()),
            _ => self,
        }
    }

    /// Transforms a block position about the local origin.
    #[must_use]
    pub fn transform_block(self, pos: BlockPos) -> BlockPos {
        let (x, z) = self.mirror.apply(pos.x, pos.z);
        let (x, z) = self.rotation.apply(x, z);
        BlockPos::new(x, pos.y, z)
    }

    /// Transforms a continuous position so that it stays inside the block
    /// [`Self::transform_block`] maps its block to.
    ///
    /// `FrontBack` maps `x` to `1 - x`; `Clockwise90` maps `(x, z)` to
    /// `(1 - z, x)`.
    #[must_use]
    pub fn transform_vec(self, pos: Vec3) -> Vec3 {
        let turned = self.transform_direction(Vec3::new(pos.x - 0.5, pos.y, pos.z - 0.5));
        Vec3::new(turned.x + 0.5, turned.y, turned.z + 0.5)
    }

    /// Transforms a direction or offset about the origin.
    #[must_use]
    pub fn transform_direction(self, dir: Vec3) -> Vec3 {
        let (x, z) = self.mirror.apply(dir.x, dir.z);
        let (x, z) = self.rotation.apply(x, z);
        Vec3::new(x, dir.y, z)
    }

    /// Transforms an entity yaw (degrees) so that the facing vector follows
    /// the same mirror and rotation as [`Self::transform_direction`].
    ///
    /// Yaw 0 faces +z, yaw 90 faces -x. The result is wrapped to `[-180, 180)`.
    #[must_use]
    pub fn transform_yaw(self, yaw: f32) -> f32 {
        let mirrored = match self.mirror {
            Mirror::None => yaw,
            Mirror::FrontBack => -yaw,
            Mirror::LeftRight => 180.0 - yaw,
        };
        wrap_degrees(mirrored + 90.0 * f32::from(self.rotation.quarter_turns()))
    }
}

/// Wraps an angle in degrees to `[-180, 180)`.
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Axis-aligned facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// -y
    Down,
    /// +y
    Up,
    /// -z
    North,
    /// +z
    South,
    /// -x
    West,
    /// +x
    East,
}

impl Direction {
    /// Horizontal facings indexed by `floor(yaw / 90 + 0.5) & 3`.
    const BY_YAW: [Self; 4] = [Self::South, Self::West, Self::North, Self::East];

    /// The horizontal facing closest to a yaw angle in degrees.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_yaw(yaw: f32) -> Self {
        let index = (f64::from(yaw) / 90.0 + 0.5).floor() as i64 & 3;
        Self::BY_YAW[index as usize]
    }

    /// Unit step on the block grid.
    #[must_use]
    pub const fn offset(self) -> BlockPos {
        match self {
            Self::Down => BlockPos::new(0, -1, 0),
            Self::Up => BlockPos::new(0, 1, 0),
            Self::North => BlockPos::new(0, 0, -1),
            Self::South => BlockPos::new(0, 0, 1),
            Self::West => BlockPos::new(-1, 0, 0),
            Self::East => BlockPos::new(1, 0, 0),
        }
    }
}
