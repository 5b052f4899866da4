//! Contact tags, flags and events
//!
//! Surfaces in the arena carry a tag. Each body part keeps one flag per
//! relevant tag; the flags are written by whoever handles [`ContactEvent`]s
//! and read by the observation side.

use std::fmt;
use std::str::FromStr;

/// Tag carried by a collidable surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceTag {
    Ground,
    Stairs,
    Obstacle,
    Untagged,
}

impl SurfaceTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SurfaceTag::Ground => "Ground",
            SurfaceTag::Stairs => "Stairs",
            SurfaceTag::Obstacle => "Obstacle",
            SurfaceTag::Untagged => "Untagged",
        }
    }
}

impl fmt::Display for SurfaceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurfaceTag {
    type Err = std::convert::Infallible;

    /// Tags compare exactly; anything unrecognised is [`SurfaceTag::Untagged`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Ground" => SurfaceTag::Ground,
            "Stairs" => SurfaceTag::Stairs,
            "Obstacle" => SurfaceTag::Obstacle,
            _ => SurfaceTag::Untagged,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Exit,
}

/// A body part started or stopped touching a tagged surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactEvent {
    pub part: String,
    pub tag: SurfaceTag,
    pub phase: ContactPhase,
}

impl ContactEvent {
    #[must_use]
    pub fn enter(part: impl Into<String>, tag: SurfaceTag) -> Self {
        Self { part: part.into(), tag, phase: ContactPhase::Enter }
    }

    #[must_use]
    pub fn exit(part: impl Into<String>, tag: SurfaceTag) -> Self {
        Self { part: part.into(), tag, phase: ContactPhase::Exit }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFlags {
    pub touching_ground: bool,
    pub touching_stairs: bool,
    pub touching_obstacle: bool,
}

impl ContactFlags {
    /// Sets the flag tracking `tag`. Untagged surfaces have no flag.
    pub fn set(&mut self, tag: SurfaceTag, touching: bool) {
        match tag {
            SurfaceTag::Ground => self.touching_ground = touching,
            SurfaceTag::Stairs => self.touching_stairs = touching,
            SurfaceTag::Obstacle => self.touching_obstacle = touching,
            SurfaceTag::Untagged => {}
        }
    }

    #[must_use]
    pub fn get(&self, tag: SurfaceTag) -> bool {
        match tag {
            SurfaceTag::Ground => self.touching_ground,
            SurfaceTag::Stairs => self.touching_stairs,
            SurfaceTag::Obstacle => self.touching_obstacle,
            SurfaceTag::Untagged => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
