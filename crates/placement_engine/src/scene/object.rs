//! Placed objects
//!
//! A placed object owns its transform and a handful of catalog facts. It has
//! no collision knowledge: the controller sets the collision flag as a UI hint
//! and the detector owns the bounding box.

use bitflags::bitflags;
use serde::{Serialize, Deserialize};

use crate::foundation::math::{Transform, Vec3};

slotmap::new_key_type! {
    /// Identifier of a placed object, stable for the object's lifetime
    pub struct ObjectId;
}

bitflags! {
    /// Behaviour flags derived from an object's category
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CategoryFlags: u32 {
        /// Object can hold other objects (shelves, cabinets)
        const CONTAINER = 1 << 0;
        /// Object is assembled from several parts (dining sets, sectionals)
        const COMPOSITE = 1 << 1;
    }
}

/// Furniture catalog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    /// Chairs and stools
    Chair,
    /// Tables of any kind
    Table,
    /// Sofas and armchairs
    Sofa,
    /// Beds
    Bed,
    /// Desks
    Desk,
    /// Closed storage
    Cabinet,
    /// Open storage
    Shelf,
    /// Wardrobes
    Wardrobe,
    /// Lamps and light fixtures
    Lamp,
    /// Table plus chairs sold as one piece
    DiningSet,
    /// Multi-section sofa
    Sectional,
    /// Anything else
    #[default]
    Other,
}

impl ObjectCategory {
    /// Container/composite flags for this category
    pub fn flags(self) -> CategoryFlags {
        match self {
            Self::Cabinet | Self::Shelf | Self::Wardrobe => CategoryFlags::CONTAINER,
            Self::DiningSet | Self::Sectional => CategoryFlags::COMPOSITE,
            _ => CategoryFlags::empty(),
        }
    }
}

/// Everything needed to add an object to the scene
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    /// Catalog identifier (what the user picked)
    pub catalog_id: String,
    /// Model identifier sent to the precise overlap service
    pub model_id: Option<String>,
    /// Catalog category
    pub category: ObjectCategory,
    /// Initial transform
    pub transform: Transform,
}

impl ObjectDescriptor {
    /// Describe an object whose model id equals its catalog id
    pub fn new(catalog_id: impl Into<String>, category: ObjectCategory) -> Self {
        let catalog_id = catalog_id.into();
        Self {
            model_id: Some(catalog_id.clone()),
            catalog_id,
            category,
            transform: Transform::identity(),
        }
    }

    /// Builder pattern: Set the model id used by the overlap service
    pub fn with_model_id(mut self, model_id: Option<String>) -> Self {
        self.model_id = model_id;
        self
    }

    /// Builder pattern: Set the initial transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder pattern: Set the initial position
    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }
}

/// An object placed in the room
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    id: ObjectId,
    catalog_id: String,
    model_id: Option<String>,
    category: ObjectCategory,
    transform: Transform,
    colliding: bool,
}

impl PlacedObject {
    /// Create an object from its descriptor
    pub fn new(id: ObjectId, descriptor: ObjectDescriptor) -> Self {
        Self {
            id,
            catalog_id: descriptor.catalog_id,
            model_id: descriptor.model_id,
            category: descriptor.category,
            transform: descriptor.transform,
            colliding: false,
        }
    }

    /// Object identifier
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Catalog identifier
    pub fn catalog_id(&self) -> &str {
        &self.catalog_id
    }

    /// Model identifier for the precise overlap service
    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    /// Catalog category
    pub fn category(&self) -> ObjectCategory {
        self.category
    }

    /// Full transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the full transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Set position
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Euler rotation in radians
    pub fn rotation(&self) -> Vec3 {
        self.transform.rotation
    }

    /// Set Euler rotation in radians
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
    }

    /// Per-axis scale
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Set per-axis scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }

    /// Whether the last move attempt left this object flagged as colliding
    pub fn colliding(&self) -> bool {
        self.colliding
    }

    /// Set the collision hint shown by the presentation layer
    pub fn set_colliding(&mut self, colliding: bool) {
        self.colliding = colliding;
    }
}
