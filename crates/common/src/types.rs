use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and debug output.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Content-addressed identifier of a loaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// Convert heading/pitch/roll in degrees to a rotation.
///
/// Heading turns about +Z, pitch about +X, roll about +Y, applied as
/// `Rz(h) * Rx(p) * Ry(r)`.
pub fn hpr_to_quat(hpr: Vec3) -> Quat {
    Quat::from_rotation_z(hpr.x.to_radians())
        * Quat::from_rotation_x(hpr.y.to_radians())
        * Quat::from_rotation_y(hpr.z.to_radians())
}

/// Local transform of a node: position, heading/pitch/roll (degrees), scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub hpr: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            hpr: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn rotation(&self) -> Quat {
        hpr_to_quat(self.hpr)
    }

    /// Local matrix: scale, then rotate, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.position)
    }
}

/// Axis-aligned bounding box in model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The box spanning -0.5..0.5 on every axis.
    pub const UNIT: Aabb = Aabb {
        min: Vec3::splat(-0.5),
        max: Vec3::splat(0.5),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// An animation clip bound to an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimClip {
    pub name: String,
    /// Length of one pass through the clip, in seconds.
    pub duration: f32,
    pub frame_rate: f32,
}

impl AnimClip {
    pub fn frame_count(&self) -> u32 {
        ((self.duration * self.frame_rate).round() as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn node_id_uniqueness() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.hpr, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn heading_turns_about_up_axis() {
        // A heading of 90 degrees swings +Y (forward) round to -X.
        let q = hpr_to_quat(Vec3::new(90.0, 0.0, 0.0));
        assert!(approx(q * Vec3::Y, Vec3::NEG_X));
        assert!(approx(q * Vec3::Z, Vec3::Z));
    }

    #[test]
    fn pitch_tilts_forward_axis_up() {
        let q = hpr_to_quat(Vec3::new(0.0, 90.0, 0.0));
        assert!(approx(q * Vec3::Y, Vec3::Z));
    }

    #[test]
    fn matrix_applies_scale_before_translation() {
        let t = Transform {
            position: Vec3::new(-8.0, 42.0, 0.0),
            hpr: Vec3::ZERO,
            scale: Vec3::splat(0.25),
        };
        let p = t.matrix().transform_point3(Vec3::new(4.0, 0.0, 0.0));
        assert!(approx(p, Vec3::new(-7.0, 42.0, 0.0)));
    }

    #[test]
    fn aabb_normalizes_and_unions() {
        let a = Aabb::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(a.min, Vec3::ZERO);
        let b = Aabb::new(Vec3::splat(-2.0), Vec3::splat(-1.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-2.0));
        assert_eq!(u.max, Vec3::ONE);
        assert_eq!(u.size(), Vec3::splat(3.0));
    }

    #[test]
    fn clip_frame_count_never_zero() {
        let clip = AnimClip {
            name: "walk".into(),
            duration: 0.0,
            frame_rate: 24.0,
        };
        assert_eq!(clip.frame_count(), 1);
    }
}
