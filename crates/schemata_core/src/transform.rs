//! # Transform Engine
//!
//! Maps region-local coordinates into world coordinates.
//!
//! A stored structure is placed with a [`SchematicPlacement`] (world origin
//! plus orientation). Each of its sub-regions has its own
//! [`SubRegionPlacement`] (anchor relative to the structure plus a second
//! orientation). A point inside a sub-region is mirrored and rotated by the
//! structure's orientation, then by the sub-region's, and only then
//! translated: transform before translate, always.
//!
//! ## Block size vs. end coordinate
//!
//! A region of size `(sx, sy, sz)` ends at block `(sx - 1, sy - 1, sz - 1)`.
//! [`transformed_placement_position`] never decrements; callers that want
//! the last block pass `size - 1` themselves. [`sub_region_box`] is the one
//! caller in this crate that does so.

use schemata_shared::{BlockBox, BlockPos, Orientation, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::WorldResult;
use crate::world::{EntityQuery, EntityWorld, LiveEntity};

/// Where and how a whole structure is placed in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematicPlacement {
    /// World position of the structure's local origin.
    pub origin: BlockPos,
    /// Applied to every sub-region.
    #[serde(default)]
    pub orientation: Orientation,
}

impl SchematicPlacement {
    /// Creates a placement.
    #[must_use]
    pub const fn new(origin: BlockPos, orientation: Orientation) -> Self {
        Self { origin, orientation }
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Placement of one sub-region within its structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRegionPlacement {
    /// Region name, unique within the structure.
    pub name: String,
    /// Anchor relative to the structure origin, before any transform.
    pub position: BlockPos,
    /// Applied after the structure's orientation.
    #[serde(default)]
    pub orientation: Orientation,
    /// Disabled regions are skipped when pasting.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl SubRegionPlacement {
    /// Creates an enabled, unrotated placement.
    #[must_use]
    pub fn new(name: impl Into<String>, position: BlockPos) -> Self {
        Self {
            name: name.into(),
            position,
            orientation: Orientation::IDENTITY,
            enabled: true,
        }
    }

    /// Sets the orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Mirrors then rotates a block position about the local origin.
#[inline]
#[must_use]
pub fn transform_point(point: BlockPos, orientation: Orientation) -> BlockPos {
    orientation.transform_block(point)
}

/// Transforms a position within a sub-region by the structure's orientation,
/// then by the sub-region's.
///
/// No translation is applied and nothing is decremented: pass `size - 1`
/// for the last block of a region of `size`.
#[must_use]
pub fn transformed_placement_position(
    pos_within_sub: BlockPos,
    schematic: &SchematicPlacement,
    sub: &SubRegionPlacement,
) -> BlockPos {
    let pos = schematic.orientation.transform_block(pos_within_sub);
    sub.orientation.transform_block(pos)
}

/// Continuous counterpart of [`transformed_placement_position`].
///
/// A point inside block `b` ends up inside the block
/// `transformed_placement_position(b, ..)`.
#[must_use]
pub fn transformed_placement_vec(
    pos_within_sub: Vec3,
    schematic: &SchematicPlacement,
    sub: &SubRegionPlacement,
) -> Vec3 {
    let pos = schematic.orientation.transform_vec(pos_within_sub);
    sub.orientation.transform_vec(pos)
}

/// Transforms an entity yaw the same way as [`transformed_placement_vec`].
#[must_use]
pub fn transformed_placement_yaw(yaw: f32, schematic: &SchematicPlacement, sub: &SubRegionPlacement) -> f32 {
    sub.orientation.transform_yaw(schematic.orientation.transform_yaw(yaw))
}

/// World position of a sub-region's anchor: the relative anchor transformed
/// by `orientation`, then translated by `origin`.
#[must_use]
pub fn absolute_region_origin(origin: BlockPos, relative_region_pos: BlockPos, orientation: Orientation) -> BlockPos {
    transform_point(relative_region_pos, orientation) + origin
}

/// Inclusive block volume spanning two corners given in any order.
#[inline]
#[must_use]
pub fn enclosing_volume(a: BlockPos, b: BlockPos) -> BlockBox {
    BlockBox::enclosing(a, b)
}

/// World-space block volume of a placed sub-region.
///
/// `region_size` is in blocks; the far corner is derived from
/// `region_size - (1, 1, 1)`.
#[must_use]
pub fn sub_region_box(
    origin: BlockPos,
    region_pos: BlockPos,
    region_size: BlockPos,
    schematic: &SchematicPlacement,
    sub: &SubRegionPlacement,
) -> BlockBox {
    let region_pos_rel = transform_point(region_pos, schematic.orientation);
    let end_rel = transformed_placement_position(region_size.offset(-1, -1, -1), schematic, sub);
    let end_abs = end_rel + region_pos_rel + origin;
    let start_abs = region_pos_rel + origin;

    enclosing_volume(start_abs, end_abs)
}

/// Entities already present inside a placed sub-region.
///
/// Nothing is excluded. Query failures are returned as-is.
///
/// # Errors
///
/// Propagates the world's query error.
pub fn entities_within_sub_region<'w, W: EntityWorld + ?Sized>(
    world: &'w W,
    origin: BlockPos,
    region_pos: BlockPos,
    region_size: BlockPos,
    schematic: &SchematicPlacement,
    sub: &SubRegionPlacement,
) -> WorldResult<Vec<&'w LiveEntity>> {
    let bounds = sub_region_box(origin, region_pos, region_size, schematic, sub);
    world.entities_intersecting(&bounds.to_aabb(), &EntityQuery::default())
}
