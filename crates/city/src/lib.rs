//! Procedural mini-city: seeded block layout, buildings with exterior stairs,
//! rooftop bridges and parapets, plus the collider grid and world raycast used
//! by the simulation.
//!
//! # Invariants
//! - Identical `(config, seed)` pairs produce identical cities.
//! - Every building has exactly one staircase reaching its roof.
//! - Piece ids equal their index in [`City::pieces`].

mod config;
mod generator;
mod grid;

use glam::Vec3;
use rooftop_common::{Aabb, Ray};
use serde::{Deserialize, Serialize};

pub use config::CityConfig;
pub use grid::{CellCoord, ColliderGrid};

/// Errors raised while building a city.
#[derive(Debug, thiserror::Error)]
pub enum CityError {
    #[error("invalid city config: {field} {reason}")]
    InvalidConfig { field: String, reason: String },
    #[error("block size {block_size} leaves no room for stairs of width {stair_width}")]
    NoRoomForStairs { block_size: f32, stair_width: f32 },
}

/// What a piece of city geometry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Ground,
    Building,
    Stair,
    Bridge,
    Parapet,
}

impl PieceKind {
    pub const ALL: [PieceKind; 5] = [
        PieceKind::Ground,
        PieceKind::Building,
        PieceKind::Stair,
        PieceKind::Bridge,
        PieceKind::Parapet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Ground => "ground",
            PieceKind::Building => "building",
            PieceKind::Stair => "stair",
            PieceKind::Bridge => "bridge",
            PieceKind::Parapet => "parapet",
        }
    }
}

/// One solid axis-aligned box of city geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityPiece {
    pub id: usize,
    pub kind: PieceKind,
    pub bounds: Aabb,
    pub color: [f32; 4],
}

/// Nearest surface struck by a world raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub piece: usize,
    pub kind: PieceKind,
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// The generated city: static collision geometry plus gameplay anchors.
#[derive(Debug, Clone)]
pub struct City {
    pub pieces: Vec<CityPiece>,
    /// Avatar feet position at round start.
    pub spawn_point: Vec3,
    /// Candidate centres for ring targets.
    pub target_anchors: Vec<Vec3>,
    pub bounds: Aabb,
    pub grid: ColliderGrid,
}

impl City {
    /// Build a city from a config and seed.
    pub fn generate(config: &CityConfig, seed: u64) -> Result<City, CityError> {
        config.validate()?;
        let _span = tracing::info_span!("city_generate", seed).entered();
        let layout = generator::generate(config, seed)?;

        let mut grid = ColliderGrid::new(config.cell_size);
        grid.rebuild(&layout.pieces);
        let bounds = layout
            .pieces
            .iter()
            .map(|p| p.bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Aabb::new(Vec3::ZERO, Vec3::ZERO));

        let city = City {
            pieces: layout.pieces,
            spawn_point: layout.spawn_point,
            target_anchors: layout.target_anchors,
            bounds,
            grid,
        };
        tracing::info!(
            pieces = city.pieces.len(),
            buildings = city.count(PieceKind::Building),
            bridges = city.count(PieceKind::Bridge),
            anchors = city.target_anchors.len(),
            cells = city.grid.cell_count(),
            "city generated"
        );
        Ok(city)
    }

    pub fn piece(&self, id: usize) -> Option<&CityPiece> {
        self.pieces.get(id)
    }

    /// Number of pieces of one kind.
    pub fn count(&self, kind: PieceKind) -> usize {
        self.pieces.iter().filter(|p| p.kind == kind).count()
    }

    /// Nearest surface along `ray` within `max_t`. Ties go to the lower piece id.
    pub fn raycast(&self, ray: &Ray, max_t: f32) -> Option<SurfaceHit> {
        // Beyond this distance the ray has left the city bounds for good.
        let reach = (ray.origin - self.bounds.center()).length() + self.bounds.half_extents().length();
        let max_t = max_t.min(reach);
        if !(max_t >= 0.0) {
            return None;
        }

        let mut best: Option<SurfaceHit> = None;
        for index in self.grid.pieces_along_ray(ray, max_t) {
            let piece = &self.pieces[index];
            let Some(hit) = ray.intersect_aabb(&piece.bounds) else {
                continue;
            };
            if hit.t > max_t {
                continue;
            }
            if best.is_none_or(|b| hit.t < b.t) {
                best = Some(SurfaceHit {
                    piece: index,
                    kind: piece.kind,
                    t: hit.t,
                    point: hit.point,
                    normal: hit.normal,
                });
            }
        }
        best
    }

    /// Pieces whose bounds strictly overlap `aabb`, in id order.
    pub fn overlapping<'a>(&'a self, aabb: &Aabb) -> impl Iterator<Item = &'a CityPiece> + 'a {
        let aabb = *aabb;
        self.grid
            .pieces_in_aabb(&aabb)
            .into_iter()
            .map(|i| &self.pieces[i])
            .filter(move |p| p.bounds.intersects(&aabb))
    }

    /// Highest surface top at or below `from_y` under the point `(x, z)`.
    pub fn ground_height_at(&self, x: f32, z: f32, from_y: f32) -> Option<f32> {
        let probe = Aabb::new(Vec3::new(x, from_y, z), Vec3::new(x, from_y, z));
        self.grid
            .pieces_in_aabb(&probe)
            .into_iter()
            .map(|i| &self.pieces[i].bounds)
            .filter(|b| x >= b.min.x && x <= b.max.x && z >= b.min.z && z <= b.max.z)
            .map(|b| b.top())
            .filter(|top| *top <= from_y + 1e-4)
            .reduce(f32::max)
    }
}

pub fn crate_info() -> &'static str {
    "rooftop-city v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> City {
        City::generate(&CityConfig::default(), 42).unwrap()
    }

    #[test]
    fn crate_info_contains_name() {
        assert!(crate_info().contains("rooftop-city"));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = city();
        let b = city();
        assert_eq!(a.pieces, b.pieces);
        assert_eq!(a.target_anchors, b.target_anchors);
        assert_eq!(a.spawn_point, b.spawn_point);
    }

    #[test]
    fn different_seeds_differ() {
        let a = city();
        let b = City::generate(&CityConfig::default(), 7).unwrap();
        assert_ne!(a.pieces, b.pieces);
    }

    #[test]
    fn piece_ids_match_indices() {
        let c = city();
        for (i, p) in c.pieces.iter().enumerate() {
            assert_eq!(p.id, i);
            assert!(p.bounds.size().cmpge(Vec3::ZERO).all());
        }
    }

    #[test]
    fn one_building_per_block() {
        let config = CityConfig::default();
        let c = City::generate(&config, 3).unwrap();
        assert_eq!(
            c.count(PieceKind::Building),
            (config.blocks_x * config.blocks_z) as usize
        );
        assert_eq!(c.count(PieceKind::Ground), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CityConfig {
            height_quantum: 0.0,
            ..CityConfig::default()
        };
        assert!(matches!(
            City::generate(&config, 1),
            Err(CityError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn raycast_down_hits_ground_at_spawn() {
        let c = city();
        let origin = c.spawn_point + Vec3::Y * 5.0;
        let ray = Ray::new(origin, Vec3::NEG_Y).unwrap();
        let hit = c.raycast(&ray, 100.0).unwrap();
        assert_eq!(hit.kind, PieceKind::Ground);
        assert!((hit.point.y - 0.0).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn raycast_down_onto_roof() {
        let c = city();
        let roof = c
            .pieces
            .iter()
            .find(|p| p.kind == PieceKind::Building)
            .unwrap();
        let center = roof.bounds.center();
        let ray = Ray::new(Vec3::new(center.x, 100.0, center.z), Vec3::NEG_Y).unwrap();
        let hit = c.raycast(&ray, 200.0).unwrap();
        assert!((hit.point.y - roof.bounds.top()).abs() < 1e-3);
    }

    #[test]
    fn raycast_respects_max_distance() {
        let c = city();
        let ray = Ray::new(c.spawn_point + Vec3::Y * 5.0, Vec3::NEG_Y).unwrap();
        assert!(c.raycast(&ray, 2.0).is_none());
    }

    #[test]
    fn raycast_into_sky_misses() {
        let c = city();
        let ray = Ray::new(Vec3::new(0.0, 50.0, 0.0), Vec3::Y).unwrap();
        assert!(c.raycast(&ray, f32::INFINITY).is_none());
    }

    #[test]
    fn ground_height_under_roof_and_street() {
        let c = city();
        let roof = c
            .pieces
            .iter()
            .find(|p| p.kind == PieceKind::Building)
            .unwrap();
        let center = roof.bounds.center();
        let h = c.ground_height_at(center.x, center.z, 1000.0).unwrap();
        assert!((h - roof.bounds.top()).abs() < 1e-4);
        // From below the roof only the ground counts.
        let h = c.ground_height_at(center.x, center.z, 0.5).unwrap();
        assert_eq!(h, 0.0);
        let s = c.spawn_point;
        assert_eq!(c.ground_height_at(s.x, s.z, 10.0), Some(0.0));
    }

    #[test]
    fn overlapping_finds_ground_under_spawn() {
        let c = city();
        let probe = Aabb::from_center_half_extents(c.spawn_point, Vec3::splat(0.3));
        let kinds: Vec<PieceKind> = c.overlapping(&probe).map(|p| p.kind).collect();
        assert!(kinds.contains(&PieceKind::Ground));
    }

    #[test]
    fn bounds_cover_all_pieces() {
        let c = city();
        for p in &c.pieces {
            assert!(c.bounds.contains_point(p.bounds.min));
            assert!(c.bounds.contains_point(p.bounds.max));
        }
    }
}
