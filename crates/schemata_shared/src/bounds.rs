//! # Bounding Volumes
//!
//! - [`BlockBox`]: inclusive volume on the block grid. Both corners are
//!   blocks inside the box.
//! - [`Aabb`]: continuous box used for entity hitboxes and spatial queries.
//!
//! Converting a `BlockBox` to an `Aabb` is the one place where the `+1`
//! between "last block coordinate" and "far face of the last block" happens.

use serde::{Deserialize, Serialize};

use crate::math::{BlockPos, Vec3};

/// Inclusive axis-aligned block volume.
///
/// Invariant: `min <= max` on every axis.
///
/// Serialized as its two corners, `[[x, y, z], [x, y, z]]`. Corners read
/// back in any order still give an ordered box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[BlockPos; 2]", into = "[BlockPos; 2]")]
pub struct BlockBox {
    min: BlockPos,
    max: BlockPos,
}

impl From<[BlockPos; 2]> for BlockBox {
    fn from([a, b]: [BlockPos; 2]) -> Self {
        Self::enclosing(a, b)
    }
}

impl From<BlockBox> for [BlockPos; 2] {
    fn from(bb: BlockBox) -> Self {
        [bb.min, bb.max]
    }
}

impl BlockBox {
    /// Smallest box containing both corners, given in any order.
    #[must_use]
    pub fn enclosing(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Minimum corner.
    #[inline]
    #[must_use]
    pub const fn min(&self) -> BlockPos {
        self.min
    }

    /// Maximum corner (inclusive).
    #[inline]
    #[must_use]
    pub const fn max(&self) -> BlockPos {
        self.max
    }

    /// Edge lengths in blocks.
    #[must_use]
    pub fn size(&self) -> [u64; 3] {
        let span = |lo: i32, hi: i32| u64::from(hi.abs_diff(lo)) + 1;
        [
            span(self.min.x, self.max.x),
            span(self.min.y, self.max.y),
            span(self.min.z, self.max.z),
        ]
    }

    /// Number of blocks inside the box.
    #[must_use]
    pub fn volume(&self) -> u128 {
        self.size().iter().map(|&s| u128::from(s)).product()
    }

    /// Returns true if the block lies inside the box.
    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    /// Continuous box covering every block of this volume.
    ///
    /// The max corner is `max + 1` on each axis (the far faces of the last blocks).
    #[must_use]
    pub fn to_aabb(&self) -> Aabb {
        let max = Vec3::from(self.max);
        Aabb::new(Vec3::from(self.min), Vec3::new(max.x + 1.0, max.y + 1.0, max.z + 1.0))
    }
}

/// Continuous axis-aligned box.
///
/// Invariant: `min <= max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from two corners in any order.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Hitbox of an entity standing at `feet`: centered horizontally,
    /// extending `height` upwards.
    #[must_use]
    pub fn around_feet(feet: Vec3, width: f64, height: f64) -> Self {
        let half = width.abs() / 2.0;
        Self::new(
            Vec3::new(feet.x - half, feet.y, feet.z - half),
            Vec3::new(feet.x + half, feet.y + height.abs(), feet.z + half),
        )
    }

    /// Strict overlap test. Boxes that only share a face do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Returns true if the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// Volume of the box.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let d = self.max - self.min;
        d.x * d.y * d.z
    }
}
