use glam::{Quat, Vec3};

/// Position and orientation of a placed or tracked thing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Closest point to `p` on the segment `a..b`.
pub fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Whether a sphere of `radius` around `center` touches the segment `a..b`.
pub fn segment_hits_sphere(a: Vec3, b: Vec3, center: Vec3, radius: f32) -> bool {
    closest_point_on_segment(a, b, center).distance_squared(center) <= radius * radius
}

/// Converts to the serializable form carried in observations.
pub fn to_position(v: Vec3) -> artd_types::Position {
    artd_types::Position {
        x: v.x,
        y: v.y,
        z: v.z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::X * 2.0;
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(-1.0, 1.0, 0.0)), a);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(3.0, 1.0, 0.0)), b);
        assert_eq!(
            closest_point_on_segment(a, b, Vec3::new(1.0, 1.0, 0.0)),
            Vec3::X
        );
    }

    #[test]
    fn degenerate_segment_is_a_point() {
        let a = Vec3::ONE;
        assert_eq!(closest_point_on_segment(a, a, Vec3::ZERO), a);
    }

    #[test]
    fn sweep_catches_tunnelling() {
        // A fast step jumps straight over the sphere; the segment still touches it.
        let a = Vec3::new(-1.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        assert!(segment_hits_sphere(a, b, Vec3::new(0.0, 0.2, 0.0), 0.25));
        assert!(!segment_hits_sphere(a, b, Vec3::new(0.0, 0.5, 0.0), 0.25));
    }
}
