use glam::{Mat4, Vec3};
use rooftop_render::RenderView;

/// View and projection matrices for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuCamera {
    pub eye: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl GpuCamera {
    pub const NEAR: f32 = 0.05;
    pub const FAR: f32 = 1000.0;

    pub fn from_view(view: &RenderView, aspect: f32) -> Self {
        // A degenerate view (target on the eye) still needs a valid matrix.
        let forward = (view.target - view.eye).try_normalize().unwrap_or(Vec3::NEG_Z);
        // Looking straight up or down, Y cannot be the up vector.
        let up = if forward.abs().y > 0.999 { Vec3::Z } else { Vec3::Y };
        Self {
            eye: view.eye,
            view: Mat4::look_to_rh(view.eye, forward, up),
            projection: Mat4::perspective_rh(
                view.fov_degrees.to_radians(),
                aspect.max(1e-3),
                Self::NEAR,
                Self::FAR,
            ),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_centre() {
        let view = RenderView {
            eye: Vec3::new(0.0, 2.0, 0.0),
            target: Vec3::new(10.0, 2.0, 0.0),
            fov_degrees: 70.0,
        };
        let cam = GpuCamera::from_view(&view, 16.0 / 9.0);
        let clip = cam.view_projection() * view.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn straight_down_stays_finite() {
        let view = RenderView {
            eye: Vec3::new(0.0, 20.0, 0.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        };
        let vp = GpuCamera::from_view(&view, 1.0).view_projection();
        assert!(vp.is_finite());
    }

    #[test]
    fn degenerate_view_is_finite() {
        let view = RenderView {
            eye: Vec3::ONE,
            target: Vec3::ONE,
            fov_degrees: 60.0,
        };
        assert!(GpuCamera::from_view(&view, 0.0).view_projection().is_finite());
    }
}
