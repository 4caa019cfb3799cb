//! Bounding geometry supplied by the renderer
//!
//! Objects never compute their own boxes. Whatever draws them reports the
//! world-space geometry for the current transform, and the detector derives
//! the box from that.

use std::collections::HashMap;

use super::{PlacedObject, AABB};
use crate::foundation::math::{Point3, Vec3};

/// World-space vertex cloud of one rendered object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldGeometry {
    vertices: Vec<Point3>,
}

impl WorldGeometry {
    /// Wrap world-space vertices
    pub fn new(vertices: Vec<Point3>) -> Self {
        Self { vertices }
    }

    /// World-space vertices
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Check if there is no geometry at all
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Smallest enclosing world-space AABB
    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(&self.vertices)
    }
}

impl From<AABB> for WorldGeometry {
    fn from(aabb: AABB) -> Self {
        Self::new(aabb.corners().to_vec())
    }
}

/// Renderer-side source of world geometry for an object's current transform
pub trait GeometryProvider {
    /// Geometry of `object` as it would be drawn right now
    fn world_geometry(&self, object: &PlacedObject) -> WorldGeometry;
}

/// Model-space bounds for a set of catalog entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelCatalog {
    local_bounds: HashMap<String, AABB>,
}

impl ModelCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model whose local box is centered on its origin
    pub fn with_model(mut self, id: impl Into<String>, half_extents: Vec3) -> Self {
        self.insert(id, AABB::from_center_extents(Vec3::zeros(), half_extents));
        self
    }

    /// Register a model with an arbitrary local box
    pub fn insert(&mut self, id: impl Into<String>, local_bounds: AABB) {
        self.local_bounds.insert(id.into(), local_bounds);
    }

    /// Local box of a model
    pub fn get(&self, id: &str) -> Option<&AABB> {
        self.local_bounds.get(id)
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.local_bounds.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.local_bounds.is_empty()
    }
}

/// Geometry provider that emits the eight transformed corners of each
/// catalog entry's model-space box
///
/// Stands in for a mesh renderer wherever only the boxes matter: tools,
/// headless sessions and tests.
#[derive(Debug, Clone)]
pub struct ModelBoundsGeometry {
    catalog: ModelCatalog,
    fallback: AABB,
}

impl ModelBoundsGeometry {
    /// Create a provider over a catalog keyed by catalog id
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            catalog,
            fallback: AABB::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5)),
        }
    }

    /// Local box used for catalog ids missing from the catalog
    pub fn with_fallback(mut self, fallback: AABB) -> Self {
        self.fallback = fallback;
        self
    }

    /// Underlying catalog
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }
}

impl GeometryProvider for ModelBoundsGeometry {
    fn world_geometry(&self, object: &PlacedObject) -> WorldGeometry {
        let local = self.catalog.get(object.catalog_id()).unwrap_or(&self.fallback);
        let corners = local
            .corners()
            .map(|corner| object.transform().transform_point(corner));
        WorldGeometry::new(corners.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use crate::scene::{ObjectCategory, ObjectDescriptor, ObjectId};
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn object(catalog_id: &str, transform: Transform) -> PlacedObject {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        PlacedObject::new(
            ids.insert(()),
            ObjectDescriptor::new(catalog_id, ObjectCategory::Other).with_transform(transform),
        )
    }

    #[test]
    fn test_catalog_bounds_follow_transform() {
        let provider = ModelBoundsGeometry::new(
            ModelCatalog::new().with_model("bed", Vec3::new(1.0, 0.25, 2.0)),
        );
        let bed = object("bed", Transform::from_position(Vec3::new(0.0, 0.25, 1.0)).with_uniform_scale(2.0));

        let bounds = provider.world_geometry(&bed).bounds().unwrap();

        assert_relative_eq!(bounds.min, Vec3::new(-2.0, -0.25, -3.0), epsilon = 1e-5);
        assert_relative_eq!(bounds.max, Vec3::new(2.0, 0.75, 5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_unknown_catalog_id_uses_fallback() {
        let provider = ModelBoundsGeometry::new(ModelCatalog::new());
        let thing = object("mystery", Transform::from_position(Vec3::new(1.0, 1.0, 1.0)));

        let bounds = provider.world_geometry(&thing).bounds().unwrap();

        assert_relative_eq!(bounds.center(), Vec3::new(1.0, 1.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(bounds.extents(), Vec3::new(0.5, 0.5, 0.5), epsilon = 1e-5);
    }

    #[test]
    fn test_geometry_from_aabb() {
        let aabb = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        let geometry = WorldGeometry::from(aabb);

        assert_eq!(geometry.vertices().len(), 8);
        assert_eq!(geometry.bounds(), Some(aabb));
        assert!(WorldGeometry::default().bounds().is_none());
    }
}
