//! Ground plane and tagged box volumes
//!
//! The arena floor is the plane `y = 0` tagged [`SurfaceTag::Ground`]. Any
//! additional surface is an axis-aligned box: stairs are solid from above,
//! obstacles only report contact.

use glam::Vec3;

use crate::contact::SurfaceTag;

/// Distance below which a part counts as touching a surface.
pub const CONTACT_SLOP: f32 = 0.01;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Volume {
    pub tag: SurfaceTag,
    pub min: Vec3,
    pub max: Vec3,
}

impl Volume {
    #[must_use]
    pub fn new(tag: SurfaceTag, min: Vec3, max: Vec3) -> Self {
        Self {
            tag,
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Whether a sphere at `center` with `radius` touches the box.
    #[must_use]
    pub fn touches(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        center.distance(closest) <= radius + CONTACT_SLOP
    }

    /// Whether the volume supports bodies resting on top of it.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        matches!(self.tag, SurfaceTag::Stairs | SurfaceTag::Ground)
    }

    /// Top of the volume if `point` lies over its footprint.
    #[must_use]
    pub fn support_height(&self, point: Vec3) -> Option<f32> {
        let inside = point.x >= self.min.x
            && point.x <= self.max.x
            && point.z >= self.min.z
            && point.z <= self.max.z
            && point.y >= self.min.y;
        (inside && self.is_solid()).then_some(self.max.y)
    }
}

/// Whether a sphere at `center` touches the ground plane.
#[must_use]
pub fn touches_ground(center: Vec3, radius: f32) -> bool {
    center.y - radius <= CONTACT_SLOP
}

/// Height a sphere at `center` must rest at or above, given solid volumes.
#[must_use]
pub fn support_height(center: Vec3, volumes: &[Volume]) -> f32 {
    volumes
        .iter()
        .filter_map(|v| v.support_height(center))
        .fold(0.0, f32::max)
}
