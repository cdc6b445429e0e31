//! Math utilities and types
//!
//! Provides the 2D vector type used for positions and velocities, and the
//! axis-aligned box used for containment tests.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Axis-aligned bounding box in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner (smallest x and y)
    pub min: Vec2,
    /// Maximum corner (largest x and y)
    pub max: Vec2,
}

impl Aabb2 {
    /// Create a box from its corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a box from a center and a half-extent per axis
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Create a square box from a center and a half-width
    pub fn from_center_half_width(center: Vec2, half_width: f32) -> Self {
        Self::from_center_half_extents(center, Vec2::new(half_width, half_width))
    }

    /// Bounding square of a circle
    pub fn from_circle(center: Vec2, radius: f32) -> Self {
        Self::from_center_half_width(center, radius)
    }

    /// Center of the box
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Half of the size along each axis
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Width and height of the box
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Whether `other` lies fully inside this box. Shared edges count as inside.
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }
}
