use glam::Vec3;
use rooftop_common::Ray;
use rooftop_kernel::GameWorld;

/// Gap kept between a pulled-in third-person camera and the wall it hit.
const WALL_CLEARANCE: f32 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CameraMode {
    #[default]
    FirstPerson,
    /// Behind the avatar's head by `distance`, raised by `height`.
    ThirdPerson { distance: f32, height: f32 },
}

impl CameraMode {
    pub const THIRD_PERSON: CameraMode = CameraMode::ThirdPerson {
        distance: 4.0,
        height: 1.0,
    };

    pub fn toggled(self) -> Self {
        match self {
            CameraMode::FirstPerson => Self::THIRD_PERSON,
            CameraMode::ThirdPerson { .. } => CameraMode::FirstPerson,
        }
    }

    pub fn is_first_person(self) -> bool {
        matches!(self, CameraMode::FirstPerson)
    }
}

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 70.0,
        }
    }
}

impl RenderView {
    /// View following the avatar.
    ///
    /// The third-person camera is pulled toward the head along a ray, so it
    /// never ends up inside a building.
    pub fn for_avatar(world: &GameWorld, mode: CameraMode) -> Self {
        let avatar = world.avatar();
        let head = avatar.eye(&world.config().avatar);
        let forward = avatar.forward();

        let eye = match mode {
            CameraMode::FirstPerson => head,
            CameraMode::ThirdPerson { distance, height } => {
                let desired = head - forward * distance + Vec3::Y * height;
                let offset = desired - head;
                let reach = offset.length();
                match Ray::new(head, offset) {
                    Some(ray) => match world.city().raycast(&ray, reach) {
                        Some(hit) => {
                            tracing::trace!(piece = hit.piece, t = hit.t, "camera pulled in");
                            ray.at((hit.t - WALL_CLEARANCE).max(0.1).min(reach))
                        }
                        None => desired,
                    },
                    None => head,
                }
            }
        };

        Self {
            eye,
            target: head + forward * 10.0,
            ..Self::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }
}
