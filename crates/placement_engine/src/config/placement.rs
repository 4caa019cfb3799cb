//! # Placement Configuration
//!
//! Settings for one room-layout session: the room boundary document, the
//! containment tolerance and diagnostics toggles.

use serde::{Serialize, Deserialize};

use super::{Config, ConfigError};
use crate::scene::RoomBoundaryDocument;

/// Default containment tolerance in world units
pub const DEFAULT_CONTAINMENT_EPSILON: f32 = 1e-3;

/// Configuration for a placement session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Log filter used when the application initializes logging
    pub log_level: String,
    /// How far an object may poke past a wall or the ceiling before
    /// containment fails
    pub containment_epsilon: f32,
    /// Record debug-draw shapes for every registered bounding box
    pub debug_draw: bool,
    /// Room boundary document (six named extents)
    pub room: RoomBoundaryDocument,
}

impl PlacementConfig {
    /// Create a configuration for the given room
    pub fn new(room: RoomBoundaryDocument) -> Self {
        Self {
            room,
            ..Self::default()
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set containment tolerance
    pub fn with_containment_epsilon(mut self, epsilon: f32) -> Self {
        self.containment_epsilon = epsilon;
        self
    }

    /// Enable debug drawing of bounding boxes
    pub fn with_debug_draw(mut self, enabled: bool) -> Self {
        self.debug_draw = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.containment_epsilon.is_finite() || self.containment_epsilon < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "containment_epsilon must be a non-negative number, got {}",
                self.containment_epsilon
            )));
        }

        self.room.validate().map_err(ConfigError::Invalid)
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            containment_epsilon: DEFAULT_CONTAINMENT_EPSILON,
            debug_draw: false,
            room: RoomBoundaryDocument::default(),
        }
    }
}

impl Config for PlacementConfig {}
