use crate::domain::state::{Agent, Projectile};
use crate::domain::tuning::ProjectileTuning;

#[derive(Debug, Clone, Copy)]
pub struct PhysicsConfig {
    pub map_size: f32,
    pub agent_radius: f32,
    pub projectile: ProjectileTuning,
}

/// Straight-line motion; velocity never changes after the throw.
pub fn update_projectile(p: &mut Projectile) {
    p.x += p.vx;
    p.y += p.vy;
}

pub fn is_out_of_bounds(p: &Projectile, cfg: &PhysicsConfig) -> bool {
    let margin = cfg.projectile.out_of_bounds_margin;
    p.x < -margin || p.x > cfg.map_size + margin || p.y < -margin || p.y > cfg.map_size + margin
}

/// Circle-circle test. Snowballs never hit their own team.
pub fn check_collision(p: &Projectile, agent: &Agent, cfg: &PhysicsConfig) -> bool {
    if p.team == agent.team {
        return false;
    }

    let hit_radius = cfg.agent_radius + cfg.projectile.radius_for_damage(p.damage);
    let dx = agent.x - p.x;
    let dy = agent.y - p.y;
    (dx * dx + dy * dy).sqrt() < hit_radius
}

/// Returns whether the agent is stunned afterwards.
pub fn apply_damage(agent: &mut Agent, amount: i32) -> bool {
    if agent.is_stunned {
        return true;
    }

    agent.energy = (agent.energy - amount).max(0);
    agent.is_stunned = agent.energy <= 0;
    agent.is_stunned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::Team;
    use crate::domain::tuning::projectile::{CHARGED_DAMAGE, NORMAL_DAMAGE};

    fn cfg() -> PhysicsConfig {
        PhysicsConfig {
            map_size: 800.0,
            agent_radius: 20.0,
            projectile: ProjectileTuning::default(),
        }
    }

    fn snowball(team: Team, x: f32, y: f32, damage: i32) -> Projectile {
        Projectile {
            id: "s1".to_string(),
            owner_id: "thrower".to_string(),
            team,
            x,
            y,
            vx: -5.0,
            vy: 5.0,
            damage,
        }
    }

    fn agent_at(team: Team, x: f32, y: f32) -> Agent {
        let mut agent = Agent::new("a1", "Target", team, false, 10);
        agent.x = x;
        agent.y = y;
        agent
    }

    #[test]
    fn when_updated_then_projectile_moves_by_its_velocity() {
        let mut p = snowball(Team::Red, 100.0, 100.0, NORMAL_DAMAGE);
        update_projectile(&mut p);
        update_projectile(&mut p);
        assert_eq!((p.x, p.y), (90.0, 110.0));
        assert_eq!((p.vx, p.vy), (-5.0, 5.0));
    }

    #[test]
    fn when_projectile_is_past_the_margin_then_it_is_out_of_bounds() {
        let cfg = cfg();
        assert!(!is_out_of_bounds(&snowball(Team::Red, -99.0, 400.0, 4), &cfg));
        assert!(is_out_of_bounds(&snowball(Team::Red, -101.0, 400.0, 4), &cfg));
        assert!(!is_out_of_bounds(&snowball(Team::Red, 400.0, 900.0, 4), &cfg));
        assert!(is_out_of_bounds(&snowball(Team::Red, 400.0, 901.0, 4), &cfg));
    }

    #[test]
    fn when_teams_match_then_no_collision_even_on_exact_overlap() {
        let cfg = cfg();
        for team in Team::ALL {
            let p = snowball(team, 300.0, 300.0, CHARGED_DAMAGE);
            assert!(!check_collision(&p, &agent_at(team, 300.0, 300.0), &cfg));
        }
    }

    #[test]
    fn when_charged_then_hit_radius_is_larger() {
        let cfg = cfg();
        let target = agent_at(Team::Blue, 330.0, 300.0);
        // 30 units apart: inside 20 + 12, outside 20 + 8.
        assert!(!check_collision(&snowball(Team::Red, 300.0, 300.0, NORMAL_DAMAGE), &target, &cfg));
        assert!(check_collision(&snowball(Team::Red, 300.0, 300.0, CHARGED_DAMAGE), &target, &cfg));
    }

    #[test]
    fn when_distance_equals_radius_sum_then_no_collision() {
        let cfg = cfg();
        let target = agent_at(Team::Blue, 328.0, 300.0);
        assert!(!check_collision(&snowball(Team::Red, 300.0, 300.0, NORMAL_DAMAGE), &target, &cfg));
    }

    #[test]
    fn when_damage_exceeds_energy_then_energy_floors_at_zero_and_agent_is_stunned() {
        let mut agent = agent_at(Team::Blue, 0.0, 0.0);
        assert!(!apply_damage(&mut agent, 4));
        assert_eq!(agent.energy, 6);
        assert!(apply_damage(&mut agent, 7));
        assert_eq!(agent.energy, 0);
        assert!(agent.is_stunned);
    }

    #[test]
    fn when_agent_is_stunned_then_further_damage_is_ignored() {
        let mut agent = agent_at(Team::Blue, 0.0, 0.0);
        agent.energy = 3;
        agent.is_stunned = true;
        assert!(apply_damage(&mut agent, 7));
        assert_eq!(agent.energy, 3);
    }
}
