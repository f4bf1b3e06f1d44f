// Gameplay tuning for snowballs.

pub const SNOWBALL_SPEED: f32 = 8.0;
pub const NORMAL_DAMAGE: i32 = 4;
pub const CHARGED_DAMAGE: i32 = 7;
pub const CHARGE_THRESHOLD: f32 = 0.7;
pub const NORMAL_SNOWBALL_RADIUS: f32 = 8.0;
pub const CHARGED_SNOWBALL_RADIUS: f32 = 12.0;
pub const OUT_OF_BOUNDS_MARGIN: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Distance travelled per tick.
    pub speed: f32,

    pub normal_damage: i32,
    pub charged_damage: i32,

    /// Charge level at or above which a throw deals `charged_damage`.
    pub charge_threshold: f32,

    pub normal_radius: f32,
    pub charged_radius: f32,

    /// How far past the map edge a snowball flies before it is culled.
    pub out_of_bounds_margin: f32,
}

impl ProjectileTuning {
    /// Damage tier for a (clamped) charge level.
    pub fn damage_for_charge(&self, charge_level: f32) -> i32 {
        if charge_level >= self.charge_threshold {
            self.charged_damage
        } else {
            self.normal_damage
        }
    }

    /// Collision radius for a damage tier.
    pub fn radius_for_damage(&self, damage: i32) -> f32 {
        if damage >= self.charged_damage {
            self.charged_radius
        } else {
            self.normal_radius
        }
    }
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: SNOWBALL_SPEED,
            normal_damage: NORMAL_DAMAGE,
            charged_damage: CHARGED_DAMAGE,
            charge_threshold: CHARGE_THRESHOLD,
            normal_radius: NORMAL_SNOWBALL_RADIUS,
            charged_radius: CHARGED_SNOWBALL_RADIUS,
            out_of_bounds_margin: OUT_OF_BOUNDS_MARGIN,
        }
    }
}
