use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use rooftop_city::CityConfig;

/// Tube radius of the unit ring, relative to its major radius of one.
pub const TORUS_TUBE: f32 = 0.1;

const STREET_LINE_COLOR: [f32; 4] = [0.85, 0.82, 0.55, 1.0];
/// Lines sit just above the ground slab.
const STREET_LINE_HEIGHT: f32 = 0.02;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Unit cube spanning `-0.5..0.5`, one quad per face for flat normals.
pub(crate) fn cube() -> MeshData {
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(24),
        indices: Vec::with_capacity(36),
    };
    // (normal, tangent u, tangent v) with u x v == normal, so faces wind CCW.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    for (n, u, v) in faces {
        let base = mesh.vertices.len() as u16;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let position = [0, 1, 2].map(|k| n[k] * 0.5 + u[k] * su + v[k] * sv);
            mesh.vertices.push(Vertex { position, normal: n });
        }
        mesh.indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

/// Unit quad in the XY plane facing +Z.
pub(crate) fn quad() -> MeshData {
    let n = [0.0, 0.0, 1.0];
    MeshData {
        vertices: vec![
            Vertex { position: [-0.5, -0.5, 0.0], normal: n },
            Vertex { position: [0.5, -0.5, 0.0], normal: n },
            Vertex { position: [0.5, 0.5, 0.0], normal: n },
            Vertex { position: [-0.5, 0.5, 0.0], normal: n },
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

/// Torus around +Z with major radius one and tube radius [`TORUS_TUBE`].
pub(crate) fn torus(segments: u16, sides: u16) -> MeshData {
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(usize::from(segments + 1) * usize::from(sides + 1)),
        indices: Vec::new(),
    };
    for i in 0..=segments {
        let a = TAU * f32::from(i) / f32::from(segments);
        let (sa, ca) = a.sin_cos();
        for j in 0..=sides {
            let b = TAU * f32::from(j) / f32::from(sides);
            let (sb, cb) = b.sin_cos();
            let normal = [ca * cb, sa * cb, sb];
            let r = 1.0 + TORUS_TUBE * cb;
            mesh.vertices.push(Vertex {
                position: [ca * r, sa * r, TORUS_TUBE * sb],
                normal,
            });
        }
    }
    grid_indices(&mut mesh.indices, segments, sides);
    mesh
}

/// UV sphere of radius one.
pub(crate) fn sphere(stacks: u16, slices: u16) -> MeshData {
    let mut mesh = MeshData {
        vertices: Vec::with_capacity(usize::from(stacks + 1) * usize::from(slices + 1)),
        indices: Vec::new(),
    };
    for i in 0..=stacks {
        let phi = PI * f32::from(i) / f32::from(stacks);
        let (sp, cp) = phi.sin_cos();
        for j in 0..=slices {
            let theta = TAU * f32::from(j) / f32::from(slices);
            let (st, ct) = theta.sin_cos();
            // Sweeping theta clockwise seen from +Y keeps the shared winding outward.
            let p = [sp * ct, cp, -sp * st];
            mesh.vertices.push(Vertex { position: p, normal: p });
        }
    }
    grid_indices(&mut mesh.indices, stacks, slices);
    mesh
}

/// Two triangles per cell of a `(rows + 1) x (cols + 1)` vertex grid.
fn grid_indices(indices: &mut Vec<u16>, rows: u16, cols: u16) {
    let stride = cols + 1;
    for i in 0..rows {
        for j in 0..cols {
            let a = i * stride + j;
            let b = a + stride;
            indices.extend([a, b, a + 1, a + 1, b, b + 1]);
        }
    }
}

/// Centre lines of every street, running the full length of the city.
pub(crate) fn street_lines(config: &CityConfig) -> Vec<LineVertex> {
    let pitch = config.block_pitch();
    let half_street = config.street_width * 0.5;
    let x_len = config.blocks_x as f32 * pitch;
    let z_len = config.blocks_z as f32 * pitch;
    let mut lines = Vec::new();
    let mut push = |from: [f32; 3], to: [f32; 3]| {
        lines.push(LineVertex { position: from, color: STREET_LINE_COLOR });
        lines.push(LineVertex { position: to, color: STREET_LINE_COLOR });
    };
    let y = STREET_LINE_HEIGHT;
    // Streets run between blocks and around the outside.
    for i in 0..=config.blocks_x {
        let x = i as f32 * pitch - half_street;
        push([x, y, -config.street_width], [x, y, z_len]);
    }
    for k in 0..=config.blocks_z {
        let z = k as f32 * pitch - half_street;
        push([-config.street_width, y, z], [x_len, y, z]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn winding_matches_normals(mesh: &MeshData) -> bool {
        mesh.indices.chunks(3).all(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[usize::from(i)].position));
            let face = (b - a).cross(c - a);
            // Degenerate triangles at the sphere poles carry no winding.
            face.length() < 1e-6 || face.dot(Vec3::from(mesh.vertices[usize::from(tri[0])].normal)) > 0.0
        })
    }

    #[test]
    fn cube_is_unit_and_outward() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for v in &mesh.vertices {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
        assert!(winding_matches_normals(&mesh));
    }

    #[test]
    fn quad_faces_plus_z() {
        assert!(winding_matches_normals(&quad()));
    }

    #[test]
    fn torus_stays_on_its_tube() {
        let mesh = torus(32, 12);
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            let ring = (p.x * p.x + p.y * p.y).sqrt();
            let tube = ((ring - 1.0).powi(2) + p.z * p.z).sqrt();
            assert!((tube - TORUS_TUBE).abs() < 1e-4);
        }
        assert!(winding_matches_normals(&mesh));
        assert!(mesh.vertices.len() < usize::from(u16::MAX));
    }

    #[test]
    fn sphere_has_unit_radius() {
        let mesh = sphere(12, 16);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-5);
        }
        assert!(winding_matches_normals(&mesh));
    }

    #[test]
    fn street_lines_cover_every_street() {
        let config = CityConfig::default();
        let lines = street_lines(&config);
        let streets = (config.blocks_x + 1 + config.blocks_z + 1) as usize;
        assert_eq!(lines.len(), streets * 2);
        // The first line runs down the street west of the first block.
        assert_eq!(lines[0].position[0], -config.street_width * 0.5);
    }
}
