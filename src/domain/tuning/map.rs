/// Square map side length in map units.
pub const MAP_SIZE: f32 = 800.0;

/// Inset of the sub-square spawn points are sampled from.
pub const SPAWN_PADDING: f32 = 40.0;

/// Minimum distance (along y) between a spawn point and the diagonal seam.
pub const SPAWN_MARGIN: f32 = 80.0;

/// Rejection-sampling attempts before falling back to a fixed spawn point.
pub const SPAWN_MAX_ATTEMPTS: u32 = 100;

/// Geometry of the two-triangle map.
#[derive(Debug, Clone, Copy)]
pub struct MapTuning {
    pub size: f32,
    pub spawn_padding: f32,
    pub spawn_margin: f32,
    pub spawn_max_attempts: u32,
}

impl Default for MapTuning {
    fn default() -> Self {
        Self {
            size: MAP_SIZE,
            spawn_padding: SPAWN_PADDING,
            spawn_margin: SPAWN_MARGIN,
            spawn_max_attempts: SPAWN_MAX_ATTEMPTS,
        }
    }
}
