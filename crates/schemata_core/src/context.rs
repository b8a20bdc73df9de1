//! # Render State
//!
//! Read-only flags that decide whether a placed structure is currently
//! visible and whether pick-block should target it.
//!
//! Flags come in through [`RenderContext`] instead of global state, so the
//! queries below stay pure.

use serde::{Deserialize, Serialize};

/// Boolean flags the render queries read.
pub trait RenderContext {
    /// Master rendering toggle.
    fn is_rendering_enabled(&self) -> bool;
    /// Structure overlay toggle.
    fn is_schematic_rendering_enabled(&self) -> bool;
    /// Block layer of the overlay.
    fn is_schematic_blocks_rendering_enabled(&self) -> bool;
    /// Whether the invert-rendering key is held.
    fn is_invert_held(&self) -> bool;
    /// Pick-block against the overlay.
    fn is_pick_block_enabled(&self) -> bool;
    /// Suppress pick-block while the tool item is held.
    fn is_tool_item_check_enabled(&self) -> bool;
}

/// True when the overlay is visible. Holding the invert key flips the
/// overlay toggle but never overrides the master toggle.
#[must_use]
pub fn is_schematic_currently_rendered<C: RenderContext + ?Sized>(ctx: &C) -> bool {
    ctx.is_rendering_enabled() && (ctx.is_schematic_rendering_enabled() != ctx.is_invert_held())
}

/// True when overlay blocks are visible.
#[must_use]
pub fn are_schematic_blocks_currently_rendered<C: RenderContext + ?Sized>(ctx: &C) -> bool {
    is_schematic_currently_rendered(ctx) && ctx.is_schematic_blocks_rendering_enabled()
}

/// True when pick-block should target the overlay.
///
/// `holds_tool_item` is supplied by the caller.
#[must_use]
pub fn should_pick_block<C: RenderContext + ?Sized>(ctx: &C, holds_tool_item: bool) -> bool {
    ctx.is_pick_block_enabled()
        && are_schematic_blocks_currently_rendered(ctx)
        && (!ctx.is_tool_item_check_enabled() || !holds_tool_item)
}

fn on() -> bool {
    true
}

/// Persistent render toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderSettings {
    /// Master rendering toggle.
    #[serde(default = "on")]
    pub rendering_enabled: bool,
    /// Structure overlay toggle.
    #[serde(default = "on")]
    pub schematic_rendering_enabled: bool,
    /// Block layer of the overlay.
    #[serde(default = "on")]
    pub schematic_blocks_enabled: bool,
    /// Pick-block against the overlay.
    #[serde(default)]
    pub pick_block_enabled: bool,
    /// Suppress pick-block while the tool item is held.
    #[serde(default = "on")]
    pub tool_item_enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            rendering_enabled: true,
            schematic_rendering_enabled: true,
            schematic_blocks_enabled: true,
            pick_block_enabled: false,
            tool_item_enabled: true,
        }
    }
}

/// Settings plus the momentary key state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Persistent toggles.
    pub settings: RenderSettings,
    /// Invert key currently held.
    pub invert_held: bool,
}

impl RenderState {
    /// Wraps settings with the invert key released.
    #[must_use]
    pub const fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            invert_held: false,
        }
    }

    /// Sets the invert key state.
    #[must_use]
    pub const fn with_invert_held(mut self, held: bool) -> Self {
        self.invert_held = held;
        self
    }
}

impl RenderContext for RenderState {
    fn is_rendering_enabled(&self) -> bool {
        self.settings.rendering_enabled
    }

    fn is_schematic_rendering_enabled(&self) -> bool {
        self.settings.schematic_rendering_enabled
    }

    fn is_schematic_blocks_rendering_enabled(&self) -> bool {
        self.settings.schematic_blocks_enabled
    }

    fn is_invert_held(&self) -> bool {
        self.invert_held
    }

    fn is_pick_block_enabled(&self) -> bool {
        self.settings.pick_block_enabled
    }

    fn is_tool_item_check_enabled(&self) -> bool {
        self.settings.tool_item_enabled
    }
}
