//! # Schemata
//!
//! Places a stored structure into a world together with its entities.
//!
//! ## Crates
//!
//! - `schemata_shared`: positions, orientations, boxes
//! - `schemata_core`: transform engine, entity tree builder, reference world
//! - `schemata` (this crate): scene files and the paste pipeline
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemata::{paste_scene, Scene};
//! use schemata::core::{SchemataConfig, SimWorld};
//!
//! let config = SchemataConfig::load("schemata.toml")?;
//! let scene = Scene::load("barn.toml")?;
//! let mut world = SimWorld::new(4096);
//!
//! for report in paste_scene(&scene, &config.build_registry()?, config.builder, &mut world)? {
//!     println!("{}: {} spawned", report.region, report.spawn.spawned.len());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod scene;

pub use schemata_core as core;
pub use schemata_shared as shared;

pub use scene::{paste_scene, PasteReport, Region, Scene, SceneError, SceneResult};
