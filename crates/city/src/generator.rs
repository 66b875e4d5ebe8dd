use glam::{Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use rooftop_common::Aabb;

use crate::{CityConfig, CityError, CityPiece, PieceKind};

const GROUND_DEPTH: f32 = 1.0;
const PARAPET_THICKNESS: f32 = 0.25;
const PARAPET_HEIGHT: f32 = 0.5;
/// Clearance kept between a stair step and any bridge deck above it.
const DECK_HEADROOM: f32 = 2.0;
const MIN_DECK_SEGMENT: f32 = 0.3;

const GROUND_COLOR: [f32; 4] = [0.22, 0.23, 0.25, 1.0];
const STAIR_COLOR: [f32; 4] = [0.55, 0.55, 0.58, 1.0];
const BRIDGE_COLOR: [f32; 4] = [0.55, 0.38, 0.24, 1.0];
const BUILDING_COLORS: [[f32; 4]; 6] = [
    [0.93, 0.80, 0.70, 1.0],
    [0.76, 0.86, 0.93, 1.0],
    [0.84, 0.92, 0.78, 1.0],
    [0.95, 0.90, 0.72, 1.0],
    [0.88, 0.78, 0.90, 1.0],
    [0.80, 0.82, 0.84, 1.0],
];

// Wall sides in the order a staircase walks around a building:
// south (-Z face, walking +X), east (+X, +Z), north (+Z, -X), west (-X, -Z).
const SOUTH: usize = 0;
const EAST: usize = 1;
const NORTH: usize = 2;
const WEST: usize = 3;

pub(crate) struct Layout {
    pub pieces: Vec<CityPiece>,
    pub spawn_point: Vec3,
    pub target_anchors: Vec<Vec3>,
}

/// Footprint and roof of one building, in XZ.
#[derive(Debug, Clone)]
struct Plot {
    min: Vec2,
    max: Vec2,
    height: f32,
    color: [f32; 4],
    start_side: usize,
    arrival_side: usize,
    /// Stair step boxes, bottom to top.
    steps: Vec<Aabb>,
    bridged: [bool; 4],
}

impl Plot {
    fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    fn edge(&self) -> f32 {
        self.max.x - self.min.x
    }
}

struct Builder<'a> {
    config: &'a CityConfig,
    rng: Pcg64Mcg,
    pieces: Vec<CityPiece>,
}

impl Builder<'_> {
    fn push(&mut self, kind: PieceKind, bounds: Aabb, color: [f32; 4]) {
        let id = self.pieces.len();
        self.pieces.push(CityPiece {
            id,
            kind,
            bounds,
            color,
        });
    }

    fn plot(&mut self, bx: u32, bz: u32) -> Result<Plot, CityError> {
        let c = self.config;
        let pitch = c.block_pitch();
        let origin = Vec2::new(bx as f32 * pitch, bz as f32 * pitch);

        let lo = c.stair_width + 0.5;
        let hi = (c.stair_width + 2.0).min((c.block_size - 2.0) * 0.5);
        let setback = self.rng.gen_range(lo..hi);
        let min = origin + Vec2::splat(setback);
        let max = origin + Vec2::splat(c.block_size - setback);

        let q = c.height_quantum;
        let lo_level = (c.min_height / q).ceil().max(1.0) as u32;
        let hi_level = ((c.max_height / q).floor() as u32).max(lo_level);
        let level = self.rng.gen_range(lo_level..=hi_level);

        // One lap around the wall; the last side stops short of the first step.
        let side_len = (max.x - min.x) + c.stair_width;
        let capacity = 3 * steps_on_side(side_len, c.stair_run)
            + steps_on_side(side_len - c.stair_width, c.stair_run);
        let cap_level = (capacity as f32 * c.stair_rise / q + 1e-4).floor() as u32;
        if cap_level == 0 {
            return Err(CityError::NoRoomForStairs {
                block_size: c.block_size,
                stair_width: c.stair_width,
            });
        }
        let height = level.min(cap_level) as f32 * q;

        let color = BUILDING_COLORS[self.rng.gen_range(0..BUILDING_COLORS.len())];
        let start_side = self.rng.gen_range(0..4);
        let mut plot = Plot {
            min,
            max,
            height,
            color,
            start_side,
            arrival_side: start_side,
            steps: Vec::new(),
            bridged: [false; 4],
        };
        lay_stairs(&mut plot, c);
        Ok(plot)
    }
}

fn steps_on_side(len: f32, run: f32) -> u32 {
    if len < 0.5 * run {
        0
    } else {
        ((len - 0.5 * run) / run).floor() as u32 + 1
    }
}

/// Start corner and walking direction of a side on the stair centerline.
fn side_frame(side: usize, lo: Vec2, hi: Vec2) -> (Vec2, Vec2) {
    match side {
        SOUTH => (Vec2::new(lo.x, lo.y), Vec2::X),
        EAST => (Vec2::new(hi.x, lo.y), Vec2::Y),
        NORTH => (Vec2::new(hi.x, hi.y), Vec2::NEG_X),
        _ => (Vec2::new(lo.x, hi.y), Vec2::NEG_Y),
    }
}

/// Spiral the staircase around the building from the street up to the roof.
///
/// Each step is a solid pillar from the ground to its tread, one rise above
/// the previous one. The last step on a side widens to fill the corner so the
/// path turns without a gap.
fn lay_stairs(plot: &mut Plot, c: &CityConfig) {
    let w = c.stair_width;
    let run = c.stair_run;
    let half = 0.5 * w;
    let lo = plot.min - Vec2::splat(half);
    let hi = plot.max + Vec2::splat(half);
    let side_len = hi.x - lo.x;

    let count = ((plot.height / c.stair_rise) - 1e-4).ceil().max(1.0) as usize;
    let mut placed = 0;
    for lap in 0..4 {
        let side = (plot.start_side + lap) % 4;
        let last_side = lap == 3;
        let len = if last_side { side_len - w } else { side_len };
        let (start, dir) = side_frame(side, lo, hi);
        let perp = Vec2::new(dir.y.abs(), dir.x.abs()) * half;

        let mut d = 0.0;
        while placed < count && d + 0.5 * run <= len {
            let next = d + run;
            let end = if next + 0.5 * run > len {
                if last_side { len } else { len + half }
            } else {
                next
            };
            let top = if placed + 1 == count {
                plot.height
            } else {
                ((placed + 1) as f32 * c.stair_rise).min(plot.height)
            };
            let a = start + dir * d;
            let b = start + dir * end;
            let min2 = a.min(b) - perp;
            let max2 = a.max(b) + perp;
            plot.steps.push(Aabb::new(
                Vec3::new(min2.x, 0.0, min2.y),
                Vec3::new(max2.x, top, max2.y),
            ));
            plot.arrival_side = side;
            placed += 1;
            d = next;
        }
    }
}

/// Deck segments stepping from roof `a` to roof `b` across the gap along `axis`
/// (0 = X, 1 = Z). Returns `None` when the gap is too short or a deck segment
/// would hang too low over either staircase.
fn bridge_segments(a: &Plot, b: &Plot, axis: usize, c: &CityConfig) -> Option<Vec<Aabb>> {
    let (gap_start, gap_end, cross_lo, cross_hi) = if axis == 0 {
        (a.max.x, b.min.x, a.min.y.max(b.min.y), a.max.y.min(b.max.y))
    } else {
        (a.max.y, b.min.y, a.min.x.max(b.min.x), a.max.x.min(b.max.x))
    };
    let cross_mid = 0.5 * (cross_lo + cross_hi);
    let cross_half = 0.5 * c.bridge_width;
    if cross_hi - cross_lo < c.bridge_width {
        return None;
    }

    let delta = b.height - a.height;
    let segments = ((delta.abs() / c.stair_rise) - 1e-4).ceil().max(1.0) as usize;
    let seg_len = (gap_end - gap_start) / segments as f32;
    if seg_len < MIN_DECK_SEGMENT {
        return None;
    }

    let mut out = Vec::with_capacity(segments);
    for k in 0..segments {
        let top = if delta == 0.0 {
            a.height
        } else {
            a.height + delta * (k + 1) as f32 / (segments + 1) as f32
        };
        let s0 = gap_start + seg_len * k as f32;
        let s1 = s0 + seg_len;
        let (min, max) = if axis == 0 {
            (
                Vec3::new(s0, top - c.bridge_thickness, cross_mid - cross_half),
                Vec3::new(s1, top, cross_mid + cross_half),
            )
        } else {
            (
                Vec3::new(cross_mid - cross_half, top - c.bridge_thickness, s0),
                Vec3::new(cross_mid + cross_half, top, s1),
            )
        };
        let deck = Aabb::new(min, max);
        let blocked = a.steps.iter().chain(&b.steps).any(|step| {
            overlaps_xz(step, &deck) && step.top() + DECK_HEADROOM > deck.min.y
        });
        if blocked {
            return None;
        }
        out.push(deck);
    }
    Some(out)
}

fn overlaps_xz(a: &Aabb, b: &Aabb) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.z < b.max.z && a.max.z > b.min.z
}

fn parapet(plot: &Plot, side: usize) -> Aabb {
    let y0 = plot.height;
    let y1 = plot.height + PARAPET_HEIGHT;
    let t = PARAPET_THICKNESS;
    let (min, max) = (plot.min, plot.max);
    match side {
        SOUTH => Aabb::new(
            Vec3::new(min.x, y0, min.y),
            Vec3::new(max.x, y1, min.y + t),
        ),
        EAST => Aabb::new(
            Vec3::new(max.x - t, y0, min.y),
            Vec3::new(max.x, y1, max.y),
        ),
        NORTH => Aabb::new(
            Vec3::new(min.x, y0, max.y - t),
            Vec3::new(max.x, y1, max.y),
        ),
        _ => Aabb::new(
            Vec3::new(min.x, y0, min.y),
            Vec3::new(min.x + t, y1, max.y),
        ),
    }
}

fn darken(color: [f32; 4], factor: f32) -> [f32; 4] {
    [color[0] * factor, color[1] * factor, color[2] * factor, color[3]]
}

pub(crate) fn generate(config: &CityConfig, seed: u64) -> Result<Layout, CityError> {
    let mut b = Builder {
        config,
        rng: Pcg64Mcg::seed_from_u64(seed),
        pieces: Vec::new(),
    };
    let nx = config.blocks_x;
    let nz = config.blocks_z;
    let pitch = config.block_pitch();
    let extent = Vec2::new(
        nx as f32 * pitch - config.street_width,
        nz as f32 * pitch - config.street_width,
    );

    b.push(
        PieceKind::Ground,
        Aabb::new(
            Vec3::new(-pitch, -GROUND_DEPTH, -pitch),
            Vec3::new(extent.x + pitch, 0.0, extent.y + pitch),
        ),
        GROUND_COLOR,
    );

    let mut plots = Vec::with_capacity((nx * nz) as usize);
    for bz in 0..nz {
        for bx in 0..nx {
            plots.push(b.plot(bx, bz)?);
        }
    }

    let index = |bx: u32, bz: u32| (bz * nx + bx) as usize;
    let mut decks = Vec::new();
    for bz in 0..nz {
        for bx in 0..nx {
            let here = index(bx, bz);
            let neighbours = [(bx + 1 < nx, bx + 1, bz, 0usize), (bz + 1 < nz, bx, bz + 1, 1)];
            for (exists, ox, oz, axis) in neighbours {
                if !exists {
                    continue;
                }
                // Always roll so the stream does not depend on earlier outcomes.
                let roll = b.rng.gen_bool(f64::from(config.bridge_chance));
                let there = index(ox, oz);
                let (pa, pb) = (&plots[here], &plots[there]);
                if !roll || (pa.height - pb.height).abs() > config.max_bridge_height_delta {
                    continue;
                }
                let Some(segments) = bridge_segments(pa, pb, axis, config) else {
                    continue;
                };
                let (side_a, side_b) = if axis == 0 { (EAST, WEST) } else { (NORTH, SOUTH) };
                plots[here].bridged[side_a] = true;
                plots[there].bridged[side_b] = true;
                decks.extend(segments);
            }
        }
    }

    for plot in &plots {
        b.push(
            PieceKind::Building,
            Aabb::new(
                Vec3::new(plot.min.x, 0.0, plot.min.y),
                Vec3::new(plot.max.x, plot.height, plot.max.y),
            ),
            plot.color,
        );
    }
    for plot in &plots {
        for step in &plot.steps {
            b.push(PieceKind::Stair, *step, STAIR_COLOR);
        }
    }
    for deck in decks {
        b.push(PieceKind::Bridge, deck, BRIDGE_COLOR);
    }
    for plot in &plots {
        let mut sides: Vec<usize> = (0..4)
            .filter(|&s| s != plot.arrival_side && !plot.bridged[s])
            .collect();
        sides.shuffle(&mut b.rng);
        for &side in sides.iter().take(2) {
            b.push(PieceKind::Parapet, parapet(plot, side), darken(plot.color, 0.8));
        }
    }

    let mut anchors = Vec::new();
    for plot in &plots {
        let spread = 0.3 * plot.edge();
        for _ in 0..config.targets_per_roof {
            let offset = Vec2::new(
                b.rng.gen_range(-spread..=spread),
                b.rng.gen_range(-spread..=spread),
            );
            let xz = plot.center() + offset;
            let y = plot.height + b.rng.gen_range(3.0..=6.0);
            anchors.push(Vec3::new(xz.x, y, xz.y));
        }
    }
    for bz in 1..nz {
        for bx in 1..nx {
            let x = bx as f32 * pitch - 0.5 * config.street_width;
            let z = bz as f32 * pitch - 0.5 * config.street_width;
            anchors.push(Vec3::new(x, b.rng.gen_range(4.0..=7.0), z));
        }
    }

    let spawn_point = Vec3::new(-0.5 * config.street_width, 0.0, -0.5 * config.street_width);
    tracing::debug!(
        plots = plots.len(),
        arrival_sides = ?plots.iter().map(|p| p.arrival_side).collect::<Vec<_>>(),
        "city layout"
    );

    Ok(Layout {
        pieces: b.pieces,
        spawn_point,
        target_anchors: anchors,
    })
}
