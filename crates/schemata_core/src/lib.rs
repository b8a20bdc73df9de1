//! # Schemata Core
//!
//! Projects stored structure regions into world space and rebuilds the
//! entities stored with them.
//!
//! ## Design Principles
//!
//! 1. **Transform before translate** - Mirror, then rotate, then offset
//! 2. **Off-by-one at the call site** - Transforms never decrement a size
//! 3. **Bad data is `None`** - A broken record never panics the caller
//! 4. **Construct, then commit** - Nothing reaches the world until `spawn_tree`
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemata_core::{reconstruct_entity_tree, spawn_tree, SchemataConfig, SimWorld};
//!
//! let config = SchemataConfig::load("schemata.toml")?;
//! let registry = config.build_registry()?;
//! let mut world = SimWorld::new(1024);
//!
//! if let Some(tree) = reconstruct_entity_tree(&record, &registry) {
//!     let report = spawn_tree(tree, &mut world);
//!     assert!(report.is_complete());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod record;
pub mod registry;
pub mod transform;
pub mod tree;
pub mod world;

pub use config::{BuilderConfig, SchemataConfig, DEFAULT_MAX_PASSENGER_DEPTH};
pub use context::{
    are_schematic_blocks_currently_rendered, is_schematic_currently_rendered, should_pick_block,
    RenderContext, RenderSettings, RenderState,
};
pub use error::{ConfigError, ConfigResult, EntityError, EntityResult, WorldError, WorldResult};
pub use record::{EntityRecord, Tag};
pub use registry::{EntityFactory, EntityKind, EntityRegistry, EntityState, KindSpec};
pub use transform::{
    absolute_region_origin, enclosing_volume, entities_within_sub_region, sub_region_box,
    transform_point, transformed_placement_position, transformed_placement_vec,
    transformed_placement_yaw, SchematicPlacement, SubRegionPlacement,
};
pub use tree::{reconstruct_entity, reconstruct_entity_tree, spawn_tree, EntityNode, SpawnReport, TreeBuilder};
pub use world::{find_entity_by_id, EntityFilter, EntityQuery, EntityWorld, HasEntityId, LiveEntity, SimWorld};

pub use schemata_shared::{Aabb, BlockBox, BlockPos, Direction, Mirror, Orientation, Rotation, Vec3};
