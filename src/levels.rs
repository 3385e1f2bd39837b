//! Level table: size tiers mapped to radii and visual assets.
//!
//! The table is owned by the asset layer and handed to the core once at
//! game start; the core never touches raw asset bytes, only opaque handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle into the renderer's texture table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub u32);

/// One size tier: the ball radius and the texture drawn for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub radius: f32,
    pub asset: AssetHandle,
}

/// Errors raised while validating a level table.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    /// The table must contain at least one level.
    Empty,
    /// Every radius must be positive and finite.
    InvalidRadius { level: u32 },
    /// Radii must be strictly increasing with level.
    NonIncreasingRadius { level: u32 },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Empty => write!(f, "level table must not be empty"),
            LevelError::InvalidRadius { level } => {
                write!(f, "level {} radius must be positive and finite", level)
            }
            LevelError::NonIncreasingRadius { level } => {
                write!(f, "level {} radius must exceed the previous level's", level)
            }
        }
    }
}

impl std::error::Error for LevelError {}

/// Ordered, immutable sequence of levels. Index = level, length =
/// `max_level + 1`, radii strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    entries: Vec<LevelEntry>,
}

impl LevelTable {
    /// Validate and build a table from (radius, asset) entries.
    pub fn new(entries: Vec<LevelEntry>) -> Result<Self, LevelError> {
        if entries.is_empty() {
            return Err(LevelError::Empty);
        }
        let mut prev = 0.0_f32;
        for (level, entry) in entries.iter().enumerate() {
            if !entry.radius.is_finite() || entry.radius <= 0.0 {
                return Err(LevelError::InvalidRadius {
                    level: level as u32,
                });
            }
            if entry.radius <= prev {
                return Err(LevelError::NonIncreasingRadius {
                    level: level as u32,
                });
            }
            prev = entry.radius;
        }
        Ok(Self { entries })
    }

    /// Highest valid level (inclusive).
    pub fn max_level(&self) -> u32 {
        (self.entries.len() - 1) as u32
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        false // validated non-empty at construction
    }

    /// Radius for a level. Levels above the table top clamp to the last
    /// entry; merges never produce one, but the lookup stays total.
    pub fn radius_for(&self, level: u32) -> f32 {
        self.entry(level).radius
    }

    /// Asset handle for a level.
    pub fn asset_for(&self, level: u32) -> AssetHandle {
        self.entry(level).asset
    }

    fn entry(&self, level: u32) -> &LevelEntry {
        let idx = (level as usize).min(self.entries.len() - 1);
        &self.entries[idx]
    }
}

/// Geometric 11-level table used across the test suite.
#[cfg(test)]
pub(crate) fn sample_table(levels: u32) -> LevelTable {
    let entries = (0..levels)
        .map(|i| LevelEntry {
            radius: 18.0 * 1.25_f32.powi(i as i32),
            asset: AssetHandle(i),
        })
        .collect();
    LevelTable::new(entries).unwrap()
}
