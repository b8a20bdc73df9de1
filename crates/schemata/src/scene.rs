//! # Scenes
//!
//! A scene is a placed structure: one [`SchematicPlacement`] and a list of
//! sub-regions, each with its own anchor, size, orientation and stored
//! entities.
//!
//! ```toml
//! [placement]
//! origin = [100, 64, -20]
//! orientation = { mirror = "front_back", rotation = "clockwise_90" }
//!
//! [[regions]]
//! name = "barn"
//! position = [0, 0, 0]
//! size = [8, 5, 6]
//!
//! [[regions.entities]]
//! id = "minecart"
//! Pos = [1.5, 0.0, 2.5]
//!
//! [[regions.entities.Passengers]]
//! id = "villager"
//! ```
//!
//! Entity `Pos` values are local to their region. Pasting maps them into
//! world space with the same transforms used for the region volume.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use schemata_core::{
    absolute_region_origin, entities_within_sub_region, spawn_tree, sub_region_box, transformed_placement_vec,
    transformed_placement_yaw, BuilderConfig, EntityFactory, EntityRecord, EntityWorld, SchematicPlacement,
    SpawnReport, SubRegionPlacement, TreeBuilder, WorldError,
};
use schemata_shared::{BlockBox, BlockPos, Orientation, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or pasting a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The scene file could not be read.
    #[error("failed to read scene: {0}")]
    Io(String),

    /// The scene TOML could not be parsed.
    #[error("failed to parse scene: {0}")]
    Parse(String),

    /// A region is unusable.
    #[error("region {name}: {reason}")]
    InvalidRegion {
        /// Region name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The world refused a region query.
    #[error("world query failed: {0}")]
    World(#[from] WorldError),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<toml::de::Error> for SceneError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

fn enabled_by_default() -> bool {
    true
}

/// One sub-region of a scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Unique name within the scene.
    pub name: String,
    /// Anchor relative to the placement origin, before any transform.
    #[serde(default)]
    pub position: BlockPos,
    /// Size in blocks; every component must be positive.
    pub size: BlockPos,
    /// Applied after the placement orientation.
    #[serde(default)]
    pub orientation: Orientation,
    /// Disabled regions are skipped.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Stored entities with region-local positions.
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

impl Region {
    /// Placement view used by the transforms.
    #[must_use]
    pub fn placement(&self) -> SubRegionPlacement {
        SubRegionPlacement {
            name: self.name.clone(),
            position: self.position,
            orientation: self.orientation,
            enabled: self.enabled,
        }
    }
}

/// A placed structure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Origin and orientation of the whole structure.
    #[serde(default)]
    pub placement: SchematicPlacement,
    /// Sub-regions in paste order.
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Scene {
    /// Parses and validates a scene.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::Parse` for bad TOML, `SceneError::InvalidRegion`
    /// if validation fails.
    pub fn from_toml_str(text: &str) -> SceneResult<Self> {
        let scene: Self = toml::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Reads, parses and validates a scene file.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks region names and sizes.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::InvalidRegion` for an empty or repeated name or
    /// a size with a component below 1.
    pub fn validate(&self) -> SceneResult<()> {
        let mut names = HashSet::new();
        for region in &self.regions {
            let invalid = |reason: &str| SceneError::InvalidRegion {
                name: region.name.clone(),
                reason: reason.to_string(),
            };
            if region.name.is_empty() {
                return Err(invalid("name must not be empty"));
            }
            if !names.insert(region.name.as_str()) {
                return Err(invalid("name used twice"));
            }
            if region.size.to_array().iter().any(|&c| c < 1) {
                return Err(invalid("size must be at least 1 in every dimension"));
            }
        }
        Ok(())
    }

    /// Every entity kind id stored in the scene, riders included.
    #[must_use]
    pub fn kind_ids(&self) -> BTreeSet<String> {
        fn collect(record: &EntityRecord, out: &mut BTreeSet<String>) {
            if let Some(kind) = &record.kind {
                out.insert(kind.clone());
            }
            for rider in &record.passengers {
                collect(rider, out);
            }
        }

        let mut out = BTreeSet::new();
        for record in self.regions.iter().flat_map(|r| &r.entities) {
            collect(record, &mut out);
        }
        out
    }

    /// World-space block volume of a region.
    #[must_use]
    pub fn region_box(&self, region: &Region) -> BlockBox {
        sub_region_box(
            self.placement.origin,
            region.position,
            region.size,
            &self.placement,
            &region.placement(),
        )
    }
}

/// Outcome of pasting one region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PasteReport {
    /// Region name.
    pub region: String,
    /// World-space block volume.
    pub bounds: Option<BlockBox>,
    /// Entities inside the volume before the paste.
    pub existing: usize,
    /// Stored trees rebuilt successfully.
    pub trees_built: usize,
    /// Stored trees whose root could not be rebuilt.
    pub trees_failed: usize,
    /// Insertion results across all trees of the region.
    pub spawn: SpawnReport,
}

/// World position of a region-local entity position.
fn entity_world_position(local: Vec3, scene: &Scene, region: &Region, sub: &SubRegionPlacement) -> Vec3 {
    let anchor = absolute_region_origin(scene.placement.origin, region.position, scene.placement.orientation);
    transformed_placement_vec(local, &scene.placement, sub) + Vec3::from(anchor)
}

/// Pastes every enabled region's entities into `world`.
///
/// All region queries run first, so a refused query leaves the world
/// untouched. Then, region by region, each stored tree is rebuilt, moved
/// into world space, turned to match the placement and spawned.
///
/// # Errors
///
/// Returns `SceneError::World` if a region query fails.
pub fn paste_scene<F, W>(
    scene: &Scene,
    factory: &F,
    config: BuilderConfig,
    world: &mut W,
) -> SceneResult<Vec<PasteReport>>
where
    F: EntityFactory + ?Sized,
    W: EntityWorld + ?Sized,
{
    let enabled: Vec<&Region> = scene.regions.iter().filter(|r| r.enabled).collect();

    let mut reports = Vec::with_capacity(enabled.len());
    for region in &enabled {
        let sub = region.placement();
        let existing = entities_within_sub_region(
            &*world,
            scene.placement.origin,
            region.position,
            region.size,
            &scene.placement,
            &sub,
        )?;
        reports.push(PasteReport {
            region: region.name.clone(),
            bounds: Some(scene.region_box(region)),
            existing: existing.len(),
            ..PasteReport::default()
        });
    }

    let builder = TreeBuilder::with_config(factory, config);
    for (region, report) in enabled.iter().zip(&mut reports) {
        let sub = region.placement();
        for record in &region.entities {
            let Some(mut tree) = builder.reconstruct_tree(record) else {
                tracing::warn!("Region {}: dropped stored {:?}", region.name, record.kind);
                report.trees_failed += 1;
                continue;
            };
            report.trees_built += 1;

            let target = entity_world_position(tree.position(), scene, region, &sub);
            tree.move_tree_to(target);
            tree.for_each_mut(&mut |node| {
                let state = node.state_mut();
                state.yaw = transformed_placement_yaw(state.yaw, &scene.placement, &sub);
            });

            report.spawn.merge(spawn_tree(tree, world));
        }

        tracing::info!(
            "Region {}: {} existing, {} trees built, {} spawned",
            region.name,
            report.existing,
            report.trees_built,
            report.spawn.spawned.len()
        );
    }

    Ok(reports)
}
