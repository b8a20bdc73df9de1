//! # Entity Records
//!
//! The serialized form of an entity: a kind identifier, arbitrary
//! kind-specific fields and an optional ordered list of riders.
//!
//! ```toml
//! id = "minecart"
//! Pos = [1.5, 64.0, 2.5]
//!
//! [[Passengers]]
//! id = "zombie"
//! UUID = "1f0e6a4c-6c1d-4b8f-9d55-1c8a2b3e4f50"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigError, EntityError, EntityResult};

/// Key holding the kind identifier.
pub const KIND_KEY: &str = "id";
/// Key holding the stored identity.
pub const UUID_KEY: &str = "UUID";
/// Key holding the rider list.
pub const PASSENGERS_KEY: &str = "Passengers";
/// Key holding the `[x, y, z]` position.
pub const POS_KEY: &str = "Pos";
/// Key holding the `[yaw, pitch]` rotation.
pub const ROTATION_KEY: &str = "Rotation";

/// A kind-specific field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Double(f64),
    /// Text.
    String(String),
    /// Ordered list.
    List(Vec<Tag>),
    /// Nested key/value map.
    Compound(BTreeMap<String, Tag>),
}

impl Tag {
    /// Numeric value, accepting both integers and floats.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// List contents.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Reads a fixed-length numeric list such as `Pos` or `Rotation`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedField` if the tag is not a list of exactly `N`
    /// finite numbers.
    pub fn as_numbers<const N: usize>(&self, field: &str) -> EntityResult<[f64; N]> {
        let malformed = |reason: String| EntityError::MalformedField {
            field: field.to_string(),
            reason,
        };

        let items = self
            .as_list()
            .ok_or_else(|| malformed("expected a list of numbers".to_string()))?;
        if items.len() != N {
            return Err(malformed(format!("expected {N} numbers, got {}", items.len())));
        }

        let mut out = [0.0; N];
        for (slot, item) in out.iter_mut().zip(items) {
            let value = item
                .as_f64()
                .ok_or_else(|| malformed("list contains a non-numeric value".to_string()))?;
            if !value.is_finite() {
                return Err(malformed("list contains a non-finite number".to_string()));
            }
            *slot = value;
        }
        Ok(out)
    }
}

/// One serialized entity and, recursively, its riders.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Kind identifier used to look up the deserializer.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Identity stored with the record. Never reused for the live entity.
    #[serde(rename = "UUID", default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,

    /// Riders, in mount order.
    #[serde(rename = "Passengers", default, skip_serializing_if = "Vec::is_empty")]
    pub passengers: Vec<EntityRecord>,

    /// Everything else, interpreted by the kind.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Tag>,
}

impl EntityRecord {
    /// Creates a record of the given kind with no fields.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Parses a record from TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the text is not a valid record.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Sets the stored identity.
    #[must_use]
    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    /// Sets a kind-specific field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Tag) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Sets the `Pos` field.
    #[must_use]
    pub fn with_pos(self, x: f64, y: f64, z: f64) -> Self {
        self.with_field(
            POS_KEY,
            Tag::List(vec![Tag::Double(x), Tag::Double(y), Tag::Double(z)]),
        )
    }

    /// Appends a rider.
    #[must_use]
    pub fn with_passenger(mut self, passenger: EntityRecord) -> Self {
        self.passengers.push(passenger);
        self
    }

    /// Looks up a kind-specific field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Tag> {
        self.fields.get(key)
    }

    /// Number of records in this subtree, including this one.
    #[must_use]
    pub fn tree_size(&self) -> usize {
        1 + self.passengers.iter().map(Self::tree_size).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_record() {
        let record = EntityRecord::from_toml_str(
            r#"
            id = "minecart"
            Pos = [1.5, 64, 2.5]
            CustomName = "cart"

            [[Passengers]]
            id = "zombie"
            UUID = "1f0e6a4c-6c1d-4b8f-9d55-1c8a2b3e4f50"

            [[Passengers.Passengers]]
            id = "chicken"
            "#,
        )
        .unwrap();

        assert_eq!(record.kind.as_deref(), Some("minecart"));
        assert_eq!(record.tree_size(), 3);
        assert_eq!(record.field("CustomName"), Some(&Tag::String("cart".into())));
        assert_eq!(
            record.field(POS_KEY).unwrap().as_numbers::<3>(POS_KEY).unwrap(),
            [1.5, 64.0, 2.5]
        );

        let rider = &record.passengers[0];
        assert_eq!(rider.kind.as_deref(), Some("zombie"));
        assert!(rider.uuid.is_some());
        assert_eq!(rider.passengers[0].kind.as_deref(), Some("chicken"));
    }

    #[test]
    fn test_record_without_passengers() {
        let record = EntityRecord::from_toml_str("id = \"pig\"").unwrap();
        assert!(record.passengers.is_empty());
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_as_numbers_rejects_bad_shapes() {
        let short = Tag::List(vec![Tag::Int(1), Tag::Int(2)]);
        assert!(matches!(
            short.as_numbers::<3>("Pos"),
            Err(EntityError::MalformedField { .. })
        ));

        let text = Tag::List(vec![Tag::Int(1), Tag::String("x".into()), Tag::Int(2)]);
        assert!(text.as_numbers::<3>("Pos").is_err());

        let nan = Tag::List(vec![Tag::Double(f64::NAN), Tag::Int(0), Tag::Int(0)]);
        assert!(nan.as_numbers::<3>("Pos").is_err());

        assert!(Tag::Int(4).as_numbers::<3>("Pos").is_err());
    }

    #[test]
    fn test_builder_helpers() {
        let record = EntityRecord::new("boat")
            .with_pos(1.0, 2.0, 3.0)
            .with_passenger(EntityRecord::new("villager"));
        assert_eq!(record.tree_size(), 2);
        assert!(record.field(POS_KEY).is_some());
    }
}
