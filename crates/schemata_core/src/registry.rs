//! # Entity Kind Registry
//!
//! Maps kind identifiers to deserializers. Each kind turns a record into an
//! [`EntityState`] and decides its own mount offsets; kinds share no base
//! implementation beyond the [`EntityKind`] trait.
//!
//! The bundled [`KindSpec`] is a data-driven kind loaded from configuration,
//! which covers every kind that only needs a hitbox, offsets and a list of
//! required fields.

use std::collections::{BTreeMap, HashMap};

use schemata_shared::{Aabb, Direction, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, EntityError, EntityResult};
use crate::record::{EntityRecord, Tag, POS_KEY, ROTATION_KEY};

/// Deserialized state of a single entity, without identity or riders.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityState {
    /// Kind identifier.
    pub kind: String,
    /// Feet position.
    pub position: Vec3,
    /// Yaw in degrees.
    pub yaw: f32,
    /// Pitch in degrees, positive looks down.
    pub pitch: f32,
    /// Hitbox width.
    pub width: f64,
    /// Hitbox height.
    pub height: f64,
    /// Height of the seat above this entity's feet.
    pub mounted_y_offset: f64,
    /// Vertical adjustment applied when this entity rides something.
    pub y_offset: f64,
    /// Whether this entity is a player.
    pub is_player: bool,
    /// Remaining kind-specific fields.
    pub data: BTreeMap<String, Tag>,
}

impl EntityState {
    /// Hitbox at the current position.
    #[must_use]
    pub fn hitbox(&self) -> Aabb {
        Aabb::around_feet(self.position, self.width, self.height)
    }

    /// Horizontal facing from the yaw.
    #[must_use]
    pub fn horizontal_looking_direction(&self) -> Direction {
        Direction::from_yaw(self.yaw)
    }

    /// `Down` when looking below the horizon, otherwise `Up`.
    #[must_use]
    pub fn vertical_looking_direction(&self) -> Direction {
        if self.pitch > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Vertical facing when looking steeply up or down, horizontal otherwise.
    #[must_use]
    pub fn closest_looking_direction(&self) -> Direction {
        if self.pitch > 60.0 {
            Direction::Down
        } else if -self.pitch > 60.0 {
            Direction::Up
        } else {
            self.horizontal_looking_direction()
        }
    }
}

/// A deserializer for one kind of entity.
pub trait EntityKind: Send + Sync {
    /// Kind identifier this deserializer handles.
    fn id(&self) -> &str;

    /// Builds the entity state from a record of this kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or has malformed fields.
    fn deserialize(&self, record: &EntityRecord) -> EntityResult<EntityState>;
}

/// Creates entity state from records.
pub trait EntityFactory {
    /// Resolves the record's kind and deserializes it.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing or unknown kind, or malformed data.
    fn create_from_record(&self, record: &EntityRecord) -> EntityResult<EntityState>;
}

fn default_width() -> f64 {
    0.6
}

fn default_height() -> f64 {
    1.8
}

/// Data-driven entity kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KindSpec {
    /// Kind identifier.
    pub id: String,
    /// Hitbox width.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Hitbox height.
    #[serde(default = "default_height")]
    pub height: f64,
    /// Seat height. Defaults to three quarters of the hitbox height.
    #[serde(default)]
    pub mounted_y_offset: Option<f64>,
    /// Adjustment applied when riding.
    #[serde(default)]
    pub y_offset: f64,
    /// Fields a record must carry to be valid.
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Whether entities of this kind are players.
    #[serde(default)]
    pub player: bool,
}

impl KindSpec {
    /// Creates a kind with the default hitbox and offsets.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            width: default_width(),
            height: default_height(),
            mounted_y_offset: None,
            y_offset: 0.0,
            required_fields: Vec::new(),
            player: false,
        }
    }

    /// Sets the hitbox.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets both mount offsets.
    #[must_use]
    pub fn with_offsets(mut self, mounted_y_offset: f64, y_offset: f64) -> Self {
        self.mounted_y_offset = Some(mounted_y_offset);
        self.y_offset = y_offset;
        self
    }

    /// Adds a required field.
    #[must_use]
    pub fn requiring(mut self, field: impl Into<String>) -> Self {
        self.required_fields.push(field.into());
        self
    }

    /// Marks the kind as a player kind.
    #[must_use]
    pub fn as_player(mut self) -> Self {
        self.player = true;
        self
    }

    /// Checks that the kind is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty id or a negative or
    /// non-finite size or offset.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.id.is_empty() {
            return Err(ConfigError::Invalid("kind id must not be empty".to_string()));
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "kind {}: {name} must be a non-negative number, got {value}",
                    self.id
                )));
            }
        }
        let offsets = [self.mounted_y_offset.unwrap_or(0.0), self.y_offset];
        if offsets.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "kind {}: offsets must be finite",
                self.id
            )));
        }
        Ok(())
    }
}

impl EntityKind for KindSpec {
    fn id(&self) -> &str {
        &self.id
    }

    #[allow(clippy::cast_possible_truncation)]
    fn deserialize(&self, record: &EntityRecord) -> EntityResult<EntityState> {
        for field in &self.required_fields {
            if record.field(field).is_none() {
                return Err(EntityError::MissingField {
                    kind: self.id.clone(),
                    field: field.clone(),
                });
            }
        }

        let position = match record.field(POS_KEY) {
            Some(tag) => Vec3::from(tag.as_numbers::<3>(POS_KEY)?),
            None => Vec3::ZERO,
        };
        let [yaw, pitch] = match record.field(ROTATION_KEY) {
            Some(tag) => tag.as_numbers::<2>(ROTATION_KEY)?,
            None => [0.0, 0.0],
        };

        let data = record
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != POS_KEY && key.as_str() != ROTATION_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(EntityState {
            kind: self.id.clone(),
            position,
            yaw: yaw as f32,
            pitch: pitch as f32,
            width: self.width,
            height: self.height,
            mounted_y_offset: self.mounted_y_offset.unwrap_or(self.height * 0.75),
            y_offset: self.y_offset,
            is_player: self.player,
            data,
        })
    }
}

/// Kind identifier to deserializer.
#[derive(Default)]
pub struct EntityRegistry {
    kinds: HashMap<String, Box<dyn EntityKind>>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from data-driven kinds.
    ///
    /// # Errors
    ///
    /// Returns an error if a kind is invalid or an id appears twice.
    pub fn from_specs(specs: impl IntoIterator<Item = KindSpec>) -> ConfigResult<Self> {
        let mut registry = Self::new();
        for spec in specs {
            spec.validate()?;
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Registers a kind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the id is already registered.
    pub fn register(&mut self, kind: impl EntityKind + 'static) -> ConfigResult<()> {
        let id = kind.id().to_string();
        if self.kinds.contains_key(&id) {
            return Err(ConfigError::Invalid(format!("kind {id} already registered")));
        }
        self.kinds.insert(id, Box::new(kind));
        Ok(())
    }

    /// Returns true if the id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.kinds.contains_key(id)
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl EntityFactory for EntityRegistry {
    fn create_from_record(&self, record: &EntityRecord) -> EntityResult<EntityState> {
        let id = record.kind.as_deref().ok_or(EntityError::MissingKind)?;
        let kind = self
            .kinds
            .get(id)
            .ok_or_else(|| EntityError::UnknownKind(id.to_string()))?;
        kind.deserialize(record)
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.kinds.keys().collect();
        ids.sort();
        f.debug_struct("EntityRegistry").field("kinds", &ids).finish()
    }
}
