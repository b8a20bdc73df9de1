//! # Placement Probe
//!
//! Pastes a scene into an empty reference world and prints what happened
//! per region.

use schemata::core::{
    are_schematic_blocks_currently_rendered, is_schematic_currently_rendered, EntityRegistry, KindSpec,
    RenderState, SchemataConfig, SimWorld,
};
use schemata::{paste_scene, Scene};

const DEFAULT_CAPACITY: usize = 4096;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: placement_probe <scene.toml> [--config <cfg.toml>]");
        println!();
        println!("Options:");
        println!("  --config <path>     Kinds, builder limits and render toggles");
        println!("  --capacity <n>      World capacity (default {DEFAULT_CAPACITY})");
        return;
    }

    let scene_path = &args[1];
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1));
    let capacity: usize = args
        .iter()
        .position(|a| a == "--capacity")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CAPACITY);

    let scene = match Scene::load(scene_path) {
        Ok(scene) => scene,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    let config = match config_path {
        Some(path) => match SchemataConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                println!("Error: {e}");
                return;
            }
        },
        None => SchemataConfig::default(),
    };

    let registry = if config.kinds.is_empty() {
        // No kinds configured: accept every kind in the scene with default hitboxes
        println!("No kinds configured, using defaults for: {:?}", scene.kind_ids());
        EntityRegistry::from_specs(scene.kind_ids().into_iter().map(KindSpec::new))
    } else {
        config.build_registry()
    };
    let registry = match registry {
        Ok(registry) => registry,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    println!("Scene:     {scene_path}");
    println!(
        "Placement: origin {:?}, {:?}",
        scene.placement.origin.to_array(),
        scene.placement.orientation
    );
    let render = RenderState::new(config.render);
    println!(
        "Overlay:   rendered={} blocks={}",
        is_schematic_currently_rendered(&render),
        are_schematic_blocks_currently_rendered(&render)
    );
    println!();

    let mut world = SimWorld::new(capacity);
    let reports = match paste_scene(&scene, &registry, config.builder, &mut world) {
        Ok(reports) => reports,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    for report in &reports {
        println!("Region {}", report.region);
        if let Some(bounds) = report.bounds {
            println!("  bounds:   {:?} .. {:?}", bounds.min().to_array(), bounds.max().to_array());
        }
        println!("  existing: {}", report.existing);
        println!("  trees:    {} built, {} failed", report.trees_built, report.trees_failed);
        println!(
            "  spawned:  {} (rejected {}, skipped {})",
            report.spawn.spawned.len(),
            report.spawn.rejected.len(),
            report.spawn.skipped
        );
    }

    let skipped = scene.regions.len() - reports.len();
    if skipped > 0 {
        println!();
        println!("{skipped} disabled region(s) skipped");
    }
    println!();
    println!("World now holds {} entities", world.len());
}
