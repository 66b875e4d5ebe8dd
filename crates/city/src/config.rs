use serde::{Deserialize, Serialize};

use crate::CityError;

/// Layout parameters for the procedural city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Number of city blocks along X.
    pub blocks_x: u32,
    /// Number of city blocks along Z.
    pub blocks_z: u32,
    /// Edge length of one square block footprint.
    pub block_size: f32,
    /// Gap between neighbouring blocks.
    pub street_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Building heights are multiples of this.
    pub height_quantum: f32,
    /// Vertical rise of one exterior stair step.
    pub stair_rise: f32,
    /// Horizontal run of one stair step along the wall.
    pub stair_run: f32,
    pub stair_width: f32,
    /// Probability that two neighbouring roofs get a bridge.
    pub bridge_chance: f32,
    pub bridge_width: f32,
    pub bridge_thickness: f32,
    /// Roofs whose heights differ by more than this are never bridged.
    pub max_bridge_height_delta: f32,
    pub targets_per_roof: u32,
    /// Cell size of the collider grid used for queries.
    pub cell_size: f32,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            blocks_x: 4,
            blocks_z: 4,
            block_size: 14.0,
            street_width: 6.0,
            min_height: 4.0,
            max_height: 18.0,
            height_quantum: 2.0,
            stair_rise: 0.4,
            stair_run: 0.6,
            stair_width: 1.6,
            bridge_chance: 0.5,
            bridge_width: 2.4,
            bridge_thickness: 0.3,
            max_bridge_height_delta: 4.0,
            targets_per_roof: 1,
            cell_size: 8.0,
        }
    }
}

impl CityConfig {
    /// Distance between the south-west corners of neighbouring blocks.
    pub fn block_pitch(&self) -> f32 {
        self.block_size + self.street_width
    }

    pub fn validate(&self) -> Result<(), CityError> {
        let positive = [
            ("block_size", self.block_size),
            ("street_width", self.street_width),
            ("min_height", self.min_height),
            ("height_quantum", self.height_quantum),
            ("stair_rise", self.stair_rise),
            ("stair_run", self.stair_run),
            ("stair_width", self.stair_width),
            ("bridge_width", self.bridge_width),
            ("bridge_thickness", self.bridge_thickness),
            ("cell_size", self.cell_size),
            ("max_height", self.max_height),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, "must be positive and finite"));
            }
        }
        if self.blocks_x == 0 || self.blocks_z == 0 {
            return Err(invalid("blocks_x/blocks_z", "need at least one block"));
        }
        if self.min_height > self.max_height {
            return Err(invalid("min_height", "must not exceed max_height"));
        }
        if self.stair_rise > 0.5 * self.block_size {
            return Err(invalid("stair_rise", "must not exceed half the block size"));
        }
        if !(0.0..=1.0).contains(&self.bridge_chance) {
            return Err(invalid("bridge_chance", "must be within [0, 1]"));
        }
        if !(self.max_bridge_height_delta >= 0.0) {
            return Err(invalid("max_bridge_height_delta", "must not be negative"));
        }
        // Stairs live in the setback between the block edge and the wall.
        let min_setback = self.stair_width + 0.5;
        if self.block_size <= 2.0 * min_setback + 2.0 {
            return Err(CityError::NoRoomForStairs {
                block_size: self.block_size,
                stair_width: self.stair_width,
            });
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> CityError {
    CityError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
