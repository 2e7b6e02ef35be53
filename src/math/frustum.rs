//! View frustum planes for caller-side visibility determination.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use cgmath::prelude::*;
use cgmath::{Matrix4, Vector3, Vector4};

/// A set of view frustum planes, stored as bits.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PlaneMask(u8);

impl PlaneMask {
    pub const LEFT: PlaneMask = PlaneMask(0x01);
    pub const RIGHT: PlaneMask = PlaneMask(0x02);
    pub const TOP: PlaneMask = PlaneMask(0x04);
    pub const BOTTOM: PlaneMask = PlaneMask(0x08);
    pub const NEAR: PlaneMask = PlaneMask(0x10);
    pub const FAR: PlaneMask = PlaneMask(0x20);
    pub const ALL: PlaneMask = PlaneMask(0x3F);

    #[inline]
    pub fn empty() -> Self {
        PlaneMask(0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(self, other: PlaneMask) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for PlaneMask {
    type Output = PlaneMask;

    fn bitor(self, rhs: PlaneMask) -> PlaneMask {
        PlaneMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for PlaneMask {
    fn bitor_assign(&mut self, rhs: PlaneMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for PlaneMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [(PlaneMask, &str); 6] = [
            (PlaneMask::LEFT, "LEFT"),
            (PlaneMask::RIGHT, "RIGHT"),
            (PlaneMask::TOP, "TOP"),
            (PlaneMask::BOTTOM, "BOTTOM"),
            (PlaneMask::NEAR, "NEAR"),
            (PlaneMask::FAR, "FAR"),
        ];

        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(v, _)| self.contains(*v))
            .map(|(_, n)| *n)
            .collect();

        write!(f, "PlaneMask({})", names.join(" | "))
    }
}

/// A plane in the `n·p + d = 0` form with a unit normal.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Plane {
    n: Vector3<f32>,
    d: f32,
}

impl Plane {
    fn from_vector4(v: Vector4<f32>) -> Plane {
        let n = Vector3::new(v.x, v.y, v.z);
        let len = n.magnitude();
        if len > ::std::f32::EPSILON {
            Plane {
                n: n / len,
                d: v.w / len,
            }
        } else {
            Plane { n, d: v.w }
        }
    }

    #[inline]
    fn distance(&self, p: Vector3<f32>) -> f32 {
        self.n.dot(p) + self.d
    }
}

/// Tests a sphere against the six planes extracted from the combined
/// `projection * view * world` matrix. Returns the planes the sphere lies
/// entirely outside of; an empty mask means the sphere is at least partially
/// visible.
pub fn sphere_visibility(clip: &Matrix4<f32>, center: Vector3<f32>, radius: f32) -> PlaneMask {
    let r0 = clip.row(0);
    let r1 = clip.row(1);
    let r2 = clip.row(2);
    let r3 = clip.row(3);

    let planes = [
        (PlaneMask::LEFT, Plane::from_vector4(r3 + r0)),
        (PlaneMask::RIGHT, Plane::from_vector4(r3 - r0)),
        (PlaneMask::TOP, Plane::from_vector4(r3 - r1)),
        (PlaneMask::BOTTOM, Plane::from_vector4(r3 + r1)),
        (PlaneMask::NEAR, Plane::from_vector4(r3 + r2)),
        (PlaneMask::FAR, Plane::from_vector4(r3 - r2)),
    ];

    planes
        .iter()
        .fold(PlaneMask::empty(), |mut mask, &(bit, plane)| {
            if plane.distance(center) < -radius {
                mask |= bit;
            }

            mask
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use cgmath::{perspective, Deg, Matrix4, Point3};

    fn camera() -> Matrix4<f32> {
        let projection = perspective(Deg(60.0), 1.0, 1.0, 100.0);
        let view = Matrix4::look_at(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, -1.0),
            Vector3::unit_y(),
        );

        projection * view
    }

    #[test]
    fn inside() {
        let mask = sphere_visibility(&camera(), Vector3::new(0.0, 0.0, -10.0), 1.0);
        assert!(mask.is_empty());
    }

    #[test]
    fn behind() {
        let mask = sphere_visibility(&camera(), Vector3::new(0.0, 0.0, 10.0), 1.0);
        assert!(mask.contains(PlaneMask::NEAR));
        assert!(!mask.contains(PlaneMask::FAR));
    }

    #[test]
    fn beyond_far_plane() {
        let mask = sphere_visibility(&camera(), Vector3::new(0.0, 0.0, -200.0), 1.0);
        assert_eq!(mask, PlaneMask::FAR);
    }

    #[test]
    fn crossing() {
        // Center sits just behind the near plane but the radius reaches into the frustum.
        let mask = sphere_visibility(&camera(), Vector3::new(0.0, 0.0, -0.5), 1.0);
        assert!(mask.is_empty());

        let mask = sphere_visibility(&camera(), Vector3::new(50.0, 0.0, -10.0), 1.0);
        assert_eq!(mask, PlaneMask::RIGHT);
    }
}
