use glam::Vec3;
use serde::{Deserialize, Serialize};

const PARALLEL_EPSILON: f32 = 1e-8;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents.abs();
        Self {
            min: center - h,
            max: center + h,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Height of the top face.
    pub fn top(&self) -> f32 {
        self.max.y
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Strict overlap test: boxes that only touch on a face do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// A half-line with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Result of a ray query against a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray.
    pub t: f32,
    pub point: Vec3,
    /// Outward surface normal at the hit point.
    pub normal: Vec3,
}

impl Ray {
    /// Build a ray, normalizing the direction. Returns `None` for a zero direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test against an AABB. The normal is that of the entry face; a ray
    /// starting inside the box hits at `t = 0` facing back along its dominant axis.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<RayHit> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut enter_axis = None;

        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if d.abs() < PARALLEL_EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                enter_axis = Some(axis);
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        if t_exit < 0.0 {
            return None;
        }

        let abs = self.direction.abs();
        let dominant = if abs.x >= abs.y && abs.x >= abs.z {
            0
        } else if abs.y >= abs.z {
            1
        } else {
            2
        };
        let (t, axis) = if t_enter < 0.0 {
            (0.0, dominant)
        } else {
            (t_enter, enter_axis.unwrap_or(dominant))
        };

        let mut normal = Vec3::ZERO;
        normal[axis] = -self.direction[axis].signum();
        Some(RayHit {
            t,
            point: self.at(t),
            normal,
        })
    }

    /// Nearest non-negative intersection distance with a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t1 = -b - sqrt_d;
        let t2 = -b + sqrt_d;
        if t1 >= 0.0 {
            Some(t1)
        } else if t2 >= 0.0 {
            Some(t2)
        } else {
            None
        }
    }

    /// Distance to a plane given by a point and normal. `None` when parallel or behind.
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        (t >= 0.0).then_some(t)
    }
}

/// Ray and length covering the motion segment `from -> to`.
pub fn segment_ray(from: Vec3, to: Vec3) -> Option<(Ray, f32)> {
    let delta = to - from;
    let len = delta.length();
    if len <= 1e-6 {
        return None;
    }
    Some((
        Ray {
            origin: from,
            direction: delta / len,
        },
        len,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0))
    }

    #[test]
    fn aabb_new_orders_corners() {
        let b = Aabb::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.0, 5.0));
        assert_eq!(b.min, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn aabb_touching_faces_do_not_intersect() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&b.expanded(0.01)));
    }

    #[test]
    fn aabb_union_and_contains() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
        let u = a.union(&b);
        assert!(u.contains_point(Vec3::splat(1.5)));
        assert_eq!(u.size(), Vec3::splat(3.0));
    }

    #[test]
    fn ray_rejects_zero_direction() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn ray_hits_box_front_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z).unwrap();
        let hit = ray.intersect_aabb(&unit_box()).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Z);
        assert!((hit.point.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_hits_top_face_from_above() {
        let ray = Ray::new(Vec3::new(0.2, 10.0, -0.3), Vec3::NEG_Y).unwrap();
        let hit = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(hit.normal, Vec3::Y);
        assert!((hit.point.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_box() {
        let ray = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::X).unwrap();
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn ray_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).unwrap();
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn ray_inside_box_hits_at_zero() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X).unwrap();
        let hit = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(hit.t, 0.0);
        assert_eq!(hit.normal, Vec3::NEG_X);
    }

    #[test]
    fn ray_sphere_nearest_root() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z).unwrap();
        let t = ray.intersect_sphere(Vec3::ZERO, 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
        assert!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn ray_plane_parallel_and_behind() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X).unwrap();
        assert!(ray.intersect_plane(Vec3::new(0.0, 1.0, 0.0), Vec3::Y).is_none());
        assert!(ray.intersect_plane(Vec3::new(-3.0, 0.0, 0.0), Vec3::X).is_none());
        let t = ray.intersect_plane(Vec3::new(3.0, 0.0, 0.0), Vec3::X).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn segment_ray_length_and_direction() {
        let (ray, len) = segment_ray(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((len - 5.0).abs() < 1e-5);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
        assert!(segment_ray(Vec3::ONE, Vec3::ONE).is_none());
    }
}
