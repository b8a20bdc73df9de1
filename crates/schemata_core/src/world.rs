//! # World Collaborator
//!
//! The narrow interface the transform engine and tree builder need from a
//! world: a spatial query, insertion and repositioning.
//!
//! [`SimWorld`] is an in-memory implementation with a fixed capacity.
//! It backs the scene pipeline and the tests.

use std::collections::{HashMap, HashSet};

use schemata_shared::{Aabb, Vec3};
use uuid::Uuid;

use crate::error::{WorldError, WorldResult};
use crate::registry::EntityState;

/// An entity that is part of a world.
///
/// Mount relations are stored by identifier in both directions.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveEntity {
    /// Identity, unique within the world.
    pub id: Uuid,
    /// Entity this one rides, if any.
    pub vehicle: Option<Uuid>,
    /// Entities riding this one, in mount order.
    pub passengers: Vec<Uuid>,
    /// Deserialized state.
    pub state: EntityState,
}

impl LiveEntity {
    /// Hitbox at the current position.
    #[must_use]
    pub fn hitbox(&self) -> Aabb {
        self.state.hitbox()
    }
}

/// Anything carrying an entity identifier.
pub trait HasEntityId {
    /// The identifier.
    fn entity_id(&self) -> Uuid;
}

impl HasEntityId for LiveEntity {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

impl<T: HasEntityId> HasEntityId for &T {
    fn entity_id(&self) -> Uuid {
        (**self).entity_id()
    }
}

/// Returns the first entity with the given identifier.
///
/// A `None` identifier never matches.
#[must_use]
pub fn find_entity_by_id<T: HasEntityId>(list: &[T], id: Option<Uuid>) -> Option<&T> {
    let id = id?;
    list.iter().find(|entity| entity.entity_id() == id)
}

/// Predicate applied to query results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntityFilter {
    /// Accept everything.
    #[default]
    Any,
    /// Reject player entities.
    NotPlayer,
}

impl EntityFilter {
    /// Returns true if the state passes the filter.
    #[must_use]
    pub fn accepts(self, state: &EntityState) -> bool {
        match self {
            Self::Any => true,
            Self::NotPlayer => !state.is_player,
        }
    }
}

/// Exclusions for a spatial query. The default excludes nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityQuery {
    /// Identifiers never returned.
    pub exclude: HashSet<Uuid>,
    /// Predicate every result must pass.
    pub filter: EntityFilter,
}

impl EntityQuery {
    /// Adds an identifier to the exclude set.
    #[must_use]
    pub fn excluding(mut self, id: Uuid) -> Self {
        self.exclude.insert(id);
        self
    }

    /// Sets the filter.
    #[must_use]
    pub fn with_filter(mut self, filter: EntityFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Returns true if the entity passes the exclusions.
    #[must_use]
    pub fn accepts(&self, entity: &LiveEntity) -> bool {
        !self.exclude.contains(&entity.id) && self.filter.accepts(&entity.state)
    }
}

/// The world operations the engine consumes.
pub trait EntityWorld {
    /// All entities whose hitbox intersects `bounds`, in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the world refuses the query.
    fn entities_intersecting(&self, bounds: &Aabb, query: &EntityQuery) -> WorldResult<Vec<&LiveEntity>>;

    /// Adds an entity. Returns true if it is now part of the world.
    fn insert(&mut self, entity: LiveEntity) -> bool;

    /// Moves a live entity. Returns false if the id is not live.
    fn reposition(&mut self, id: Uuid, position: Vec3) -> bool;

    /// Seats `rider` on `vehicle`. Returns false unless both are live.
    fn link_passenger(&mut self, vehicle: Uuid, rider: Uuid) -> bool;
}

/// In-memory world with a fixed capacity.
///
/// Insertion is rejected on a duplicate id, a full world, a non-finite
/// position or a kind on the deny list.
#[derive(Debug)]
pub struct SimWorld {
    /// Entities in insertion order.
    entities: Vec<LiveEntity>,
    /// Id to slot in `entities`.
    index: HashMap<Uuid, usize>,
    capacity: usize,
    max_query_volume: f64,
    denied_kinds: HashSet<String>,
}

impl SimWorld {
    /// Creates an empty world holding at most `capacity` entities.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity.min(4096)),
            index: HashMap::new(),
            capacity,
            max_query_volume: f64::INFINITY,
            denied_kinds: HashSet::new(),
        }
    }

    /// Limits the volume of a single spatial query.
    #[must_use]
    pub fn with_max_query_volume(mut self, volume: f64) -> Self {
        self.max_query_volume = volume;
        self
    }

    /// Refuses every future insertion of the given kind.
    pub fn deny_kind(&mut self, kind: impl Into<String>) {
        self.denied_kinds.insert(kind.into());
    }

    /// Maximum number of entities.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the world holds no entities.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns true if the id is part of the world.
    #[must_use]
    pub fn is_live(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    /// Gets a live entity by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&LiveEntity> {
        self.index.get(&id).map(|&slot| &self.entities[slot])
    }

    /// Iterates over live entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LiveEntity> {
        self.entities.iter()
    }

    fn rejection_reason(&self, entity: &LiveEntity) -> Option<&'static str> {
        if self.index.contains_key(&entity.id) {
            Some("duplicate id")
        } else if self.entities.len() >= self.capacity {
            Some("world full")
        } else if !entity.state.position.is_finite() {
            Some("non-finite position")
        } else if self.denied_kinds.contains(&entity.state.kind) {
            Some("kind denied")
        } else {
            None
        }
    }
}

impl EntityWorld for SimWorld {
    fn entities_intersecting(&self, bounds: &Aabb, query: &EntityQuery) -> WorldResult<Vec<&LiveEntity>> {
        if !bounds.min.is_finite() || !bounds.max.is_finite() {
            return Err(WorldError::InvalidBounds);
        }
        let volume = bounds.volume();
        if volume > self.max_query_volume {
            return Err(WorldError::QueryTooLarge {
                volume,
                limit: self.max_query_volume,
            });
        }

        Ok(self
            .entities
            .iter()
            .filter(|entity| query.accepts(entity) && entity.hitbox().intersects(bounds))
            .collect())
    }

    fn insert(&mut self, entity: LiveEntity) -> bool {
        if let Some(reason) = self.rejection_reason(&entity) {
            tracing::debug!("Rejected {} ({}): {}", entity.id, entity.state.kind, reason);
            return false;
        }

        self.index.insert(entity.id, self.entities.len());
        self.entities.push(entity);
        true
    }

    fn reposition(&mut self, id: Uuid, position: Vec3) -> bool {
        match self.index.get(&id) {
            Some(&slot) => {
                self.entities[slot].state.position = position;
                true
            }
            None => false,
        }
    }

    fn link_passenger(&mut self, vehicle: Uuid, rider: Uuid) -> bool {
        let (Some(&mount), Some(&seated)) = (self.index.get(&vehicle), self.index.get(&rider)) else {
            return false;
        };
        if mount == seated {
            return false;
        }

        self.entities[seated].vehicle = Some(vehicle);
        let passengers = &mut self.entities[mount].passengers;
        if !passengers.contains(&rider) {
            passengers.push(rider);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EntityRecord;
    use crate::registry::{EntityKind, KindSpec};

    fn live(kind: &KindSpec, x: f64, y: f64, z: f64) -> LiveEntity {
        let state = kind
            .deserialize(&EntityRecord::new(kind.id.clone()).with_pos(x, y, z))
            .unwrap();
        LiveEntity {
            id: Uuid::new_v4(),
            vehicle: None,
            passengers: Vec::new(),
            state,
        }
    }

    fn unit_box_at(x: f64, y: f64, z: f64) -> Aabb {
        Aabb::new(Vec3::new(x, y, z), Vec3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut world = SimWorld::new(10);
        let pig = live(&KindSpec::new("pig"), 0.5, 0.0, 0.5);
        let id = pig.id;

        assert!(world.insert(pig.clone()));
        assert!(world.is_live(id));
        assert_eq!(world.len(), 1);
        assert_eq!(world.get(id).map(|e| e.state.kind.as_str()), Some("pig"));

        // Same id twice
        assert!(!world.insert(pig));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_capacity_and_denied_kinds() {
        let mut world = SimWorld::new(1);
        world.deny_kind("bat");

        assert!(!world.insert(live(&KindSpec::new("bat"), 0.0, 0.0, 0.0)));
        assert!(world.insert(live(&KindSpec::new("cow"), 0.0, 0.0, 0.0)));
        assert!(!world.insert(live(&KindSpec::new("cow"), 1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_query_filters() {
        let mut world = SimWorld::new(10);
        let player = live(&KindSpec::new("player").as_player(), 5.5, 0.0, 5.5);
        let cow = live(&KindSpec::new("cow"), 5.5, 0.0, 5.5);
        let far = live(&KindSpec::new("cow"), 50.0, 0.0, 50.0);
        let cow_id = cow.id;
        let player_id = player.id;
        world.insert(player);
        world.insert(cow);
        world.insert(far);

        let bounds = unit_box_at(5.0, 0.0, 5.0);
        assert_eq!(world.entities_intersecting(&bounds, &EntityQuery::default()).unwrap().len(), 2);

        let no_players = EntityQuery::default().with_filter(EntityFilter::NotPlayer);
        let found = world.entities_intersecting(&bounds, &no_players).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, cow_id);

        let excluding = EntityQuery::default().excluding(cow_id);
        let found = world.entities_intersecting(&bounds, &excluding).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, player_id);
    }

    #[test]
    fn test_query_too_large() {
        let world = SimWorld::new(4).with_max_query_volume(8.0);
        let bounds = Aabb::new(Vec3::ZERO, Vec3::new(3.0, 3.0, 3.0));
        assert!(matches!(
            world.entities_intersecting(&bounds, &EntityQuery::default()),
            Err(WorldError::QueryTooLarge { .. })
        ));
    }

    #[test]
    fn test_reposition() {
        let mut world = SimWorld::new(4);
        let cow = live(&KindSpec::new("cow"), 0.0, 0.0, 0.0);
        let id = cow.id;
        world.insert(cow);

        assert!(world.reposition(id, Vec3::new(3.0, 4.0, 5.0)));
        assert_eq!(world.get(id).unwrap().state.position, Vec3::new(3.0, 4.0, 5.0));
        assert!(!world.reposition(Uuid::new_v4(), Vec3::ZERO));
    }

    #[test]
    fn test_link_passenger() {
        let mut world = SimWorld::new(4);
        let boat = live(&KindSpec::new("boat"), 0.0, 0.0, 0.0);
        let pig = live(&KindSpec::new("pig"), 0.0, 0.0, 0.0);
        let (boat_id, pig_id) = (boat.id, pig.id);
        world.insert(boat);
        world.insert(pig);

        assert!(world.link_passenger(boat_id, pig_id));
        assert!(world.link_passenger(boat_id, pig_id));
        assert_eq!(world.get(boat_id).unwrap().passengers, vec![pig_id]);
        assert_eq!(world.get(pig_id).unwrap().vehicle, Some(boat_id));

        assert!(!world.link_passenger(boat_id, Uuid::new_v4()));
        assert!(!world.link_passenger(boat_id, boat_id));
        assert_eq!(world.get(boat_id).unwrap().passengers, vec![pig_id]);
    }

    #[test]
    fn test_find_entity_by_id() {
        let a = live(&KindSpec::new("cow"), 0.0, 0.0, 0.0);
        let b = live(&KindSpec::new("pig"), 0.0, 0.0, 0.0);
        let b_id = b.id;
        let list = vec![a, b];

        assert_eq!(find_entity_by_id(&list, Some(b_id)).map(|e| e.id), Some(b_id));
        assert!(find_entity_by_id(&list, None).is_none());
        assert!(find_entity_by_id(&list, Some(Uuid::new_v4())).is_none());
    }
}
