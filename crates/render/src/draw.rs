use glam::{Mat4, Quat, Vec3};
use rooftop_kernel::GameWorld;

use crate::camera::CameraMode;

/// Outer band of a ring target.
pub const OUTER_COLOR: [f32; 4] = [0.95, 0.95, 0.92, 1.0];
pub const INNER_COLOR: [f32; 4] = [0.90, 0.18, 0.16, 1.0];
pub const BULL_COLOR: [f32; 4] = [1.00, 0.82, 0.10, 1.0];
const AVATAR_COLOR: [f32; 4] = [0.20, 0.35, 0.75, 1.0];

/// How far splats float above their surface, to avoid z-fighting.
pub const SPLAT_LIFT: f32 = 0.01;

/// Unit primitives every backend provides.
///
/// Cube and quad span `-0.5..0.5`; the quad faces +Z. The sphere has radius
/// one. The ring is a torus of major radius one around the +Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    Cube,
    Ring,
    Sphere,
    Quad,
}

impl MeshKind {
    pub const ALL: [MeshKind; 4] = [MeshKind::Cube, MeshKind::Ring, MeshKind::Sphere, MeshKind::Quad];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawInstance {
    pub mesh: MeshKind,
    pub model: Mat4,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub instances: Vec<DrawInstance>,
}

impl DrawList {
    pub fn count(&self, kind: MeshKind) -> usize {
        self.instances.iter().filter(|i| i.mesh == kind).count()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn push(&mut self, mesh: MeshKind, model: Mat4, color: [f32; 4]) {
        self.instances.push(DrawInstance { mesh, model, color });
    }
}

/// Collect every visible object of the world as primitive instances.
pub fn build_draw_list(world: &GameWorld, mode: CameraMode) -> DrawList {
    let mut list = DrawList::default();

    for piece in &world.city().pieces {
        let b = piece.bounds;
        list.push(
            MeshKind::Cube,
            Mat4::from_scale_rotation_translation(b.size(), Quat::IDENTITY, b.center()),
            piece.color,
        );
    }

    let rings = &world.config().targets;
    for target in world.targets().iter().filter(|t| t.is_active()) {
        let facing = Quat::from_rotation_arc(Vec3::Z, target.normal());
        let bands = [
            (rings.ring_radius, OUTER_COLOR),
            (rings.ring_radius * 2.0 / 3.0, INNER_COLOR),
            (rings.ring_radius / 3.0, BULL_COLOR),
        ];
        for (radius, color) in bands {
            list.push(
                MeshKind::Ring,
                Mat4::from_scale_rotation_translation(Vec3::splat(radius), facing, target.position),
                color,
            );
        }
    }

    let ball_radius = world.config().weapon.ball_radius;
    for ball in world.paintballs() {
        list.push(
            MeshKind::Sphere,
            Mat4::from_scale_rotation_translation(Vec3::splat(ball_radius), Quat::IDENTITY, ball.position),
            ball.color,
        );
    }

    for splat in world.splats().iter() {
        let facing = Quat::from_rotation_arc(Vec3::Z, splat.normal);
        list.push(
            MeshKind::Quad,
            Mat4::from_scale_rotation_translation(
                Vec3::new(splat.radius * 2.0, splat.radius * 2.0, 1.0),
                facing,
                splat.position + splat.normal * SPLAT_LIFT,
            ),
            splat.color,
        );
    }

    if !mode.is_first_person() {
        let avatar = world.avatar();
        let body = avatar.bounds(&world.config().avatar);
        let turn = Quat::from_rotation_y(-avatar.yaw);
        list.push(
            MeshKind::Cube,
            Mat4::from_scale_rotation_translation(body.size(), turn, body.center()),
            AVATAR_COLOR,
        );
    }

    tracing::trace!(instances = list.len(), "draw list built");
    list
}
