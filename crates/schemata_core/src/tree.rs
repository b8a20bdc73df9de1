//! # Entity Tree Builder
//!
//! Rebuilds an entity and its riders from a nested record, then inserts the
//! whole tree into a world as a separate step.
//!
//! ## Two phases
//!
//! 1. **Construct**: [`TreeBuilder::reconstruct_tree`] owns the result. Nothing
//!    touches a world, so a failed build leaves no trace.
//! 2. **Commit**: [`spawn_tree`] hands each node to the world. From then on
//!    the world owns the entities and mounts refer to each other by id.
//!
//! ## Failure rules
//!
//! - Root fails: the whole build returns `None`, riders are never built.
//! - A rider fails: it is skipped, its siblings are still built.
//! - A node is refused by the world: its riders are never inserted.

use std::collections::HashSet;

use schemata_shared::Vec3;
use uuid::Uuid;

use crate::config::BuilderConfig;
use crate::error::{EntityError, EntityResult};
use crate::record::EntityRecord;
use crate::registry::{EntityFactory, EntityState};
use crate::world::{EntityWorld, HasEntityId, LiveEntity};

/// A reconstructed entity that owns its riders.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityNode {
    id: Uuid,
    vehicle: Option<Uuid>,
    state: EntityState,
    passengers: Vec<EntityNode>,
}

impl EntityNode {
    /// Wraps deserialized state under a new identity with no riders.
    #[must_use]
    pub fn new(id: Uuid, state: EntityState) -> Self {
        Self {
            id,
            vehicle: None,
            state,
            passengers: Vec::new(),
        }
    }

    /// Identity assigned at reconstruction.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Mount this node rides, by id.
    #[inline]
    #[must_use]
    pub const fn vehicle(&self) -> Option<Uuid> {
        self.vehicle
    }

    /// Deserialized state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &EntityState {
        &self.state
    }

    /// Mutable state.
    #[inline]
    pub fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }

    /// Current riders, in mount order.
    #[inline]
    #[must_use]
    pub fn passengers(&self) -> &[EntityNode] {
        &self.passengers
    }

    /// Returns true if anything rides this node.
    #[inline]
    #[must_use]
    pub fn is_being_ridden(&self) -> bool {
        !self.passengers.is_empty()
    }

    /// Feet position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    /// Moves this node only. Riders keep their positions.
    pub fn set_position(&mut self, position: Vec3) {
        self.state.position = position;
    }

    /// Moves this node and shifts every rider by the same amount.
    pub fn move_tree_to(&mut self, position: Vec3) {
        let delta = position - self.state.position;
        self.for_each_mut(&mut |node| node.state.position = node.state.position + delta);
    }

    /// Where a rider's feet go when it sits on this node.
    #[must_use]
    pub fn seat_position_for(&self, rider: &EntityNode) -> Vec3 {
        self.state
            .position
            .with_y_offset(self.state.mounted_y_offset + rider.state.y_offset)
    }

    /// Attaches a rider, forcing it (and its own riders) onto this node's seat.
    pub fn add_passenger(&mut self, mut rider: EntityNode) {
        rider.vehicle = Some(self.id);
        let seat = self.seat_position_for(&rider);
        rider.move_tree_to(seat);
        self.passengers.push(rider);
    }

    /// Number of nodes in this tree.
    #[must_use]
    pub fn tree_size(&self) -> usize {
        1 + self.passengers.iter().map(Self::tree_size).sum::<usize>()
    }

    /// Depth of the tree; a node with no riders has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.passengers.iter().map(Self::depth).max().unwrap_or(0)
    }

    /// Visits every node, parents before riders.
    pub fn for_each(&self, f: &mut impl FnMut(&EntityNode)) {
        f(self);
        for rider in &self.passengers {
            rider.for_each(f);
        }
    }

    /// Visits every node mutably, parents before riders.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut EntityNode)) {
        f(self);
        for rider in &mut self.passengers {
            rider.for_each_mut(f);
        }
    }

    /// Splits into the world-facing entity and the owned riders.
    ///
    /// The live entity starts with no passengers; the world links each
    /// rider once it has been inserted.
    #[must_use]
    pub fn into_live(self) -> (LiveEntity, Vec<EntityNode>) {
        let live = LiveEntity {
            id: self.id,
            vehicle: self.vehicle,
            passengers: Vec::new(),
            state: self.state,
        };
        (live, self.passengers)
    }
}

impl HasEntityId for EntityNode {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

/// A v4 id that differs from `avoid`.
fn fresh_id(avoid: Option<Uuid>) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if Some(id) != avoid {
            return id;
        }
    }
}

/// Reconstructs entity trees through a factory.
pub struct TreeBuilder<'a, F: EntityFactory + ?Sized> {
    factory: &'a F,
    config: BuilderConfig,
}

impl<'a, F: EntityFactory + ?Sized> TreeBuilder<'a, F> {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new(factory: &'a F) -> Self {
        Self::with_config(factory, BuilderConfig::default())
    }

    /// Creates a builder with an explicit configuration.
    #[must_use]
    pub fn with_config(factory: &'a F, config: BuilderConfig) -> Self {
        Self { factory, config }
    }

    /// Deserializes a single record, ignoring its riders.
    ///
    /// The node gets a fresh id; any id stored in the record is discarded.
    /// Every deserialization error becomes `None`.
    #[must_use]
    pub fn reconstruct_entity(&self, record: &EntityRecord) -> Option<EntityNode> {
        match self.factory.create_from_record(record) {
            Ok(state) => Some(EntityNode::new(fresh_id(record.uuid), state)),
            Err(e) => {
                tracing::debug!("Failed to reconstruct {:?}: {}", record.kind, e);
                None
            }
        }
    }

    /// Deserializes a record and, recursively, its riders.
    ///
    /// Returns `None` only if the root fails. Riders that fail, nest too
    /// deep or ride one of their own mounts are skipped.
    #[must_use]
    pub fn reconstruct_tree(&self, record: &EntityRecord) -> Option<EntityNode> {
        let mut ancestors = HashSet::new();
        self.build(record, 0, &mut ancestors)
    }

    fn build(&self, record: &EntityRecord, depth: usize, ancestors: &mut HashSet<Uuid>) -> Option<EntityNode> {
        let mut node = self.reconstruct_entity(record)?;

        let tracked = record.uuid.filter(|uuid| ancestors.insert(*uuid));

        for passenger in &record.passengers {
            if let Err(e) = self.admit(passenger, depth + 1, ancestors) {
                tracing::warn!("Skipping passenger of {}: {}", node.state.kind, e);
                continue;
            }
            match self.build(passenger, depth + 1, ancestors) {
                Some(rider) => node.add_passenger(rider),
                None => tracing::debug!("Skipping passenger {:?} of {}", passenger.kind, node.state.kind),
            }
        }

        if let Some(uuid) = tracked {
            ancestors.remove(&uuid);
        }
        Some(node)
    }

    /// Checks the structural limits before a rider is built.
    fn admit(&self, passenger: &EntityRecord, depth: usize, ancestors: &HashSet<Uuid>) -> EntityResult<()> {
        if depth > self.config.max_passenger_depth {
            return Err(EntityError::DepthExceeded {
                depth,
                limit: self.config.max_passenger_depth,
            });
        }
        match passenger.uuid {
            Some(uuid) if ancestors.contains(&uuid) => Err(EntityError::Cycle(uuid)),
            _ => Ok(()),
        }
    }
}

/// [`TreeBuilder::reconstruct_entity`] with the default configuration.
#[must_use]
pub fn reconstruct_entity<F: EntityFactory + ?Sized>(record: &EntityRecord, factory: &F) -> Option<EntityNode> {
    TreeBuilder::new(factory).reconstruct_entity(record)
}

/// [`TreeBuilder::reconstruct_tree`] with the default configuration.
#[must_use]
pub fn reconstruct_entity_tree<F: EntityFactory + ?Sized>(record: &EntityRecord, factory: &F) -> Option<EntityNode> {
    TreeBuilder::new(factory).reconstruct_tree(record)
}

/// Outcome of [`spawn_tree`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Inserted ids, in insertion order.
    pub spawned: Vec<Uuid>,
    /// Ids the world refused.
    pub rejected: Vec<Uuid>,
    /// Riders never offered to the world because a mount was refused.
    pub skipped: usize,
}

impl SpawnReport {
    /// Returns true if every node of the tree was inserted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty() && self.skipped == 0
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: SpawnReport) {
        self.spawned.extend(other.spawned);
        self.rejected.extend(other.rejected);
        self.skipped += other.skipped;
    }
}

/// Inserts a tree into the world, parents before riders.
///
/// Each rider is placed on its mount's seat right before insertion:
/// `mount.position + (0, mount.mounted_y_offset + rider.y_offset, 0)`.
/// A mount only lists riders the world actually accepted.
pub fn spawn_tree<W: EntityWorld + ?Sized>(node: EntityNode, world: &mut W) -> SpawnReport {
    let mut report = SpawnReport::default();
    spawn_node(node, world, &mut report);
    report
}

/// Returns true if `node` itself was inserted.
fn spawn_node<W: EntityWorld + ?Sized>(node: EntityNode, world: &mut W, report: &mut SpawnReport) -> bool {
    let position = node.position();
    let mounted_y_offset = node.state.mounted_y_offset;
    let (live, riders) = node.into_live();
    let id = live.id;

    if !world.insert(live) {
        tracing::debug!("World refused {}; {} rider subtrees dropped", id, riders.len());
        report.rejected.push(id);
        report.skipped += riders.iter().map(EntityNode::tree_size).sum::<usize>();
        return false;
    }
    report.spawned.push(id);

    for mut rider in riders {
        let seat = position.with_y_offset(mounted_y_offset + rider.state.y_offset);
        rider.set_position(seat);
        let rider_id = rider.id;
        if spawn_node(rider, world, report) && !world.link_passenger(id, rider_id) {
            tracing::warn!("Could not seat {} on {}", rider_id, id);
        }
    }
    true
}
