// Two-triangle partition of the square map along the top-left -> bottom-right diagonal.
//
// Red owns the triangle above the diagonal (y < x), blue the one below (y > x).
// The diagonal itself is a neutral seam neither team may stand on.

use crate::domain::state::Team;
use crate::domain::tuning::MapTuning;
use rand::Rng;
use std::f32::consts::FRAC_1_SQRT_2;

#[derive(Debug, Clone, Copy)]
pub struct Territory {
    map: MapTuning,
    radius: f32,
}

impl Territory {
    pub fn new(map: MapTuning, radius: f32) -> Self {
        Self { map, radius }
    }

    pub fn map_size(&self) -> f32 {
        self.map.size
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_in_territory(&self, x: f32, y: f32, team: Team) -> bool {
        let (lo, hi) = self.bounds();
        if x < lo || x > hi || y < lo || y > hi {
            return false;
        }

        match team {
            Team::Red => y <= x - self.radius,
            Team::Blue => y >= x + self.radius,
        }
    }

    /// Uniformly samples a spawn point well clear of the seam.
    ///
    /// Falls back to a fixed in-territory point after `spawn_max_attempts` misses so the
    /// call always terminates, even with padding/margin values that leave no valid area.
    pub fn spawn_position(&self, team: Team, rng: &mut impl Rng) -> (f32, f32) {
        let lo = self.map.spawn_padding;
        let hi = self.map.size - self.map.spawn_padding;
        let margin = self.map.spawn_margin;

        if lo < hi {
            for _ in 0..self.map.spawn_max_attempts {
                let x = rng.random_range(lo..hi);
                let y = rng.random_range(lo..hi);
                let clear_of_seam = match team {
                    Team::Red => y <= x - margin,
                    Team::Blue => y >= x + margin,
                };
                if clear_of_seam && self.is_in_territory(x, y, team) {
                    return (x, y);
                }
            }
        }

        self.fallback_spawn(team)
    }

    /// Fixed launch direction: each team throws straight across the seam.
    pub fn snowball_direction(&self, team: Team) -> (f32, f32) {
        match team {
            Team::Red => (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            Team::Blue => (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
        }
    }

    /// Pins a point to the map bounds and then to the team's side of the seam.
    ///
    /// The result can still be illegal in the two corners where the seam meets the map
    /// edge; callers check `is_in_territory` before committing it.
    pub fn clamp_to_territory(&self, x: f32, y: f32, team: Team) -> (f32, f32) {
        let (lo, hi) = self.bounds();
        let x = x.clamp(lo, hi);
        let mut y = y.clamp(lo, hi);

        match team {
            Team::Red if y > x - self.radius => y = x - self.radius,
            Team::Blue if y < x + self.radius => y = x + self.radius,
            _ => {}
        }

        (x, y.clamp(lo, hi))
    }

    fn bounds(&self) -> (f32, f32) {
        (self.radius, self.map.size - self.radius)
    }

    fn fallback_spawn(&self, team: Team) -> (f32, f32) {
        let near = self.map.size * 0.25;
        let far = self.map.size * 0.75;
        match team {
            Team::Red => (far, near),
            Team::Blue => (near, far),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::player::AGENT_RADIUS;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn territory() -> Territory {
        Territory::new(MapTuning::default(), AGENT_RADIUS)
    }

    #[test]
    fn when_point_is_on_the_diagonal_then_it_belongs_to_neither_team() {
        let t = territory();
        for v in [100.0, 250.5, 400.0, 700.0] {
            assert!(!t.is_in_territory(v, v, Team::Red));
            assert!(!t.is_in_territory(v, v, Team::Blue));
        }
    }

    #[test]
    fn when_point_is_interior_then_at_most_one_team_owns_it() {
        let t = territory();
        let mut x = 20.0;
        while x <= 780.0 {
            let mut y = 20.0;
            while y <= 780.0 {
                let red = t.is_in_territory(x, y, Team::Red);
                let blue = t.is_in_territory(x, y, Team::Blue);
                assert!(!(red && blue), "({x}, {y}) owned by both teams");
                if (y - x).abs() > AGENT_RADIUS {
                    assert!(red ^ blue, "({x}, {y}) should belong to a team");
                }
                y += 7.5;
            }
            x += 7.5;
        }
    }

    #[test]
    fn when_point_is_within_radius_of_an_edge_then_it_is_rejected() {
        let t = territory();
        assert!(!t.is_in_territory(790.0, 100.0, Team::Red));
        assert!(!t.is_in_territory(500.0, 10.0, Team::Red));
        assert!(!t.is_in_territory(10.0, 500.0, Team::Blue));
        assert!(!t.is_in_territory(100.0, 795.0, Team::Blue));
    }

    #[test]
    fn when_spawning_many_times_then_every_point_is_legal() {
        let t = territory();
        let mut rng = StdRng::seed_from_u64(7);
        for team in Team::ALL {
            for _ in 0..1_000 {
                let (x, y) = t.spawn_position(team, &mut rng);
                assert!(t.is_in_territory(x, y, team), "{team} spawn ({x}, {y})");
                assert!((0.0..=800.0).contains(&x));
                assert!((0.0..=800.0).contains(&y));
            }
        }
    }

    #[test]
    fn when_padding_leaves_no_room_then_spawn_falls_back_to_a_legal_point() {
        let map = MapTuning {
            spawn_padding: 390.0,
            spawn_margin: 500.0,
            ..MapTuning::default()
        };
        let t = Territory::new(map, AGENT_RADIUS);
        let mut rng = StdRng::seed_from_u64(1);
        for team in Team::ALL {
            let (x, y) = t.spawn_position(team, &mut rng);
            assert!(t.is_in_territory(x, y, team));
        }
    }

    #[test]
    fn when_asked_for_direction_then_each_team_throws_into_the_other_side() {
        let t = territory();
        let (rx, ry) = t.snowball_direction(Team::Red);
        assert!(rx < 0.0 && ry > 0.0);
        let (bx, by) = t.snowball_direction(Team::Blue);
        assert!(bx > 0.0 && by < 0.0);
        assert!(((rx * rx + ry * ry) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn when_point_crosses_the_seam_then_clamp_slides_it_back_along_y() {
        let t = territory();
        let (x, y) = t.clamp_to_territory(400.0, 395.0, Team::Red);
        assert_eq!((x, y), (400.0, 380.0));
        assert!(t.is_in_territory(x, y, Team::Red));

        let (x, y) = t.clamp_to_territory(400.0, 405.0, Team::Blue);
        assert_eq!((x, y), (400.0, 420.0));
        assert!(t.is_in_territory(x, y, Team::Blue));
    }

    #[test]
    fn when_point_leaves_the_map_then_clamp_pins_it_to_the_edge() {
        let t = territory();
        assert_eq!(t.clamp_to_territory(900.0, -50.0, Team::Red), (780.0, 20.0));
        assert_eq!(t.clamp_to_territory(-50.0, 900.0, Team::Blue), (20.0, 780.0));
    }
}
