//! Per-tick entry points.
//!
//! A host drives a region by calling [`update_region`] once, then
//! [`update_agent`] for each agent in ascending id order. Movement is two
//! phase: `update_agent` returns a [`MoveRequest`], the host tries the move,
//! and [`complete_move`] records what happened.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    agent::{Agent, AgentVitals},
    config::SimulationConfig,
    deposit::{deposit, deposit_at_boundary},
    diffusion::diffuse_grid,
    dissipation::dissipate_grid,
    geometry::{Direction, TilePos},
    metrics::RegionMetrics,
    navigation::{choose_candidate, direction_priorities, walkable_candidates},
    region::Region,
    state_machine::{update_mode, AgentAction},
    world::{Neighborhood, WorldQuery},
};

/// Spreads then evaporates every layer of the region once.
pub fn update_region<R: Rng + ?Sized>(
    region: &mut Region,
    config: &SimulationConfig,
    rng: &mut R,
) -> RegionMetrics {
    let diffusion = diffuse_grid(&mut region.grid, &config.diffusion, rng);
    let dissipated = dissipate_grid(&mut region.grid, &config.dissipation);
    let metrics = RegionMetrics::collect(region, diffusion, dissipated);
    debug!(
        target: "trail_sim::region",
        event = "region_tick",
        region = %metrics.region,
        transfers = metrics.transfers,
        diffused = metrics.diffused,
        dissipated = metrics.dissipated,
        trail = metrics.total_trail(),
    );
    metrics
}

/// Step the agent wants the host to attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
    pub destination: TilePos,
}

/// Everything the host must act on after an agent update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTick {
    pub actions: Vec<AgentAction>,
    pub move_request: Option<MoveRequest>,
    /// Trail strength written on the agent's cell this tick.
    pub deposited: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved,
    Blocked,
}

/// Runs the goal rules, lays trail and picks the next step for one agent.
pub fn update_agent<W, R>(
    agent: &mut Agent,
    vitals: &AgentVitals,
    region: &mut Region,
    world: &W,
    config: &SimulationConfig,
    rng: &mut R,
) -> AgentTick
where
    W: WorldQuery + ?Sized,
    R: Rng + ?Sized,
{
    if vitals.spawning {
        trace!(target: "trail_sim::agent", agent = %agent.id, "agent.spawning");
        return AgentTick::default();
    }

    let neighborhood = Neighborhood::scan(world, agent.pos);
    let mut tick = AgentTick {
        actions: update_mode(agent, vitals, &neighborhood, config),
        ..AgentTick::default()
    };

    if agent.last_move_succeeded {
        tick.deposited = deposit(agent, &mut region.grid, &config.deposit);
        agent.last_deposit_amount = tick.deposited;
    }

    if agent.mode.is_stationary() || vitals.fatigued {
        return tick;
    }

    let priorities = direction_priorities(agent.last_direction, rng);
    let candidates = walkable_candidates(agent, &neighborhood, &priorities, &config.navigation, rng);
    if candidates.is_empty() {
        debug!(
            target: "trail_sim::agent",
            event = "immobile",
            agent = %agent.id,
            pos = %agent.pos,
        );
        return tick;
    }

    let choice = choose_candidate(agent, &candidates, &region.grid);
    tick.move_request = Some(MoveRequest {
        direction: choice.direction,
        destination: choice.pos,
    });
    tick
}

/// Applies the host's answer to a [`MoveRequest`].
pub fn complete_move(
    agent: &mut Agent,
    region: &mut Region,
    direction: Direction,
    outcome: MoveOutcome,
    config: &SimulationConfig,
) {
    let destination = match (outcome, agent.pos.step(direction)) {
        (MoveOutcome::Moved, Some(destination)) => destination,
        (MoveOutcome::Moved, None) => {
            warn!(
                target: "trail_sim::agent",
                agent = %agent.id,
                pos = %agent.pos,
                direction = %direction,
                "move reported off the grid; treating as blocked"
            );
            block(agent);
            return;
        }
        (MoveOutcome::Blocked, _) => {
            trace!(target: "trail_sim::agent", agent = %agent.id, direction = %direction, "agent.blocked");
            block(agent);
            return;
        }
    };

    agent.pos = destination;
    agent.last_direction = Some(direction);
    agent.last_move_succeeded = true;
    agent.steps_since_event = agent.steps_since_event.saturating_add(1);
    deposit_at_boundary(agent, &mut region.grid, destination, &config.deposit);
}

fn block(agent: &mut Agent) {
    agent.last_direction = None;
    agent.last_move_succeeded = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        agent::{AgentId, AgentMode},
        config::LayerConfig,
        rng::seeded_rng,
        world::{PointOfInterest, TileLook},
    };

    struct Open;

    impl WorldQuery for Open {
        fn look(&self, _: TilePos) -> Option<TileLook> {
            Some(TileLook::open())
        }
    }

    struct Walled;

    impl WorldQuery for Walled {
        fn look(&self, _: TilePos) -> Option<TileLook> {
            Some(TileLook {
                traits: crate::world::TileTraits::WALL,
                ..TileLook::default()
            })
        }
    }

    struct ResourceAt(TilePos);

    impl WorldQuery for ResourceAt {
        fn look(&self, pos: TilePos) -> Option<TileLook> {
            let mut look = TileLook::open();
            if pos == self.0 {
                look.points.push(PointOfInterest::ResourceNode { available: 100 });
            }
            Some(look)
        }
    }

    fn pos(x: u8, y: u8) -> TilePos {
        TilePos::new(x, y).unwrap()
    }

    fn agent_at(x: u8, y: u8) -> Agent {
        Agent::spawn(AgentId(1), pos(x, y), &LayerConfig::default())
    }

    fn vitals() -> AgentVitals {
        AgentVitals {
            carry_capacity: 50,
            ..AgentVitals::default()
        }
    }

    #[test]
    fn region_tick_spreads_then_evaporates() {
        let mut region = Region::new("W1N1");
        region.grid.set_level("home", pos(25, 25), 200);
        let metrics = update_region(&mut region, &SimulationConfig::default(), &mut seeded_rng(1));
        assert_eq!(metrics.transfers, 1);
        assert_eq!(metrics.diffused, 2);
        // 198 loses 1, the fresh 2 loses 1.
        assert_eq!(metrics.dissipated, 2);
        assert_eq!(region.grid.level("home", pos(25, 25)), 197);
        assert_eq!(metrics.layers["home"].total, 198);
    }

    #[test]
    fn spawning_agent_does_nothing() {
        let mut agent = agent_at(10, 10);
        let mut region = Region::new("W1N1");
        let spawning = AgentVitals {
            spawning: true,
            ..vitals()
        };
        let tick = update_agent(
            &mut agent,
            &spawning,
            &mut region,
            &Open,
            &SimulationConfig::default(),
            &mut seeded_rng(0),
        );
        assert_eq!(tick, AgentTick::default());
        assert_eq!(region.grid.level("home", agent.pos), 0);
    }

    #[test]
    fn fresh_agent_marks_home_and_asks_to_move() {
        let mut agent = agent_at(10, 10);
        let mut region = Region::new("W1N1");
        let tick = update_agent(
            &mut agent,
            &vitals(),
            &mut region,
            &Open,
            &SimulationConfig::default(),
            &mut seeded_rng(0),
        );
        assert_eq!(tick.deposited, 100);
        assert_eq!(region.grid.level("home", pos(10, 10)), 100);
        let request = tick.move_request.expect("open ground allows a move");
        assert_eq!(agent.pos.step(request.direction), Some(request.destination));
    }

    #[test]
    fn fatigue_suppresses_movement() {
        let mut agent = agent_at(10, 10);
        let mut region = Region::new("W1N1");
        let tired = AgentVitals {
            fatigued: true,
            ..vitals()
        };
        let tick = update_agent(
            &mut agent,
            &tired,
            &mut region,
            &Open,
            &SimulationConfig::default(),
            &mut seeded_rng(0),
        );
        assert_eq!(tick.move_request, None);
        assert_eq!(agent.steps_since_event, 1);
    }

    #[test]
    fn harvesting_agent_stays_put() {
        let mut agent = agent_at(10, 10);
        let mut region = Region::new("W1N1");
        let tick = update_agent(
            &mut agent,
            &vitals(),
            &mut region,
            &ResourceAt(pos(11, 11)),
            &SimulationConfig::default(),
            &mut seeded_rng(0),
        );
        assert_eq!(agent.mode, AgentMode::Harvesting);
        assert_eq!(tick.actions, vec![AgentAction::Harvest { target: pos(11, 11) }]);
        assert_eq!(tick.move_request, None);
        assert_eq!(region.grid.level("energy", pos(10, 10)), 100);
    }

    #[test]
    fn boxed_in_agent_is_immobile() {
        let mut agent = agent_at(10, 10);
        let mut region = Region::new("W1N1");
        let tick = update_agent(
            &mut agent,
            &vitals(),
            &mut region,
            &Walled,
            &SimulationConfig::default(),
            &mut seeded_rng(0),
        );
        assert_eq!(tick.move_request, None);
    }

    #[test]
    fn failed_move_skips_next_deposit() {
        let mut agent = agent_at(10, 10);
        agent.last_direction = Some(Direction::Top);
        let mut region = Region::new("W1N1");
        let config = SimulationConfig::default();
        complete_move(&mut agent, &mut region, Direction::Top, MoveOutcome::Blocked, &config);
        assert_eq!(agent.last_direction, None);
        assert!(!agent.last_move_succeeded);
        assert_eq!(agent.pos, pos(10, 10));

        let tick = update_agent(&mut agent, &vitals(), &mut region, &Open, &config, &mut seeded_rng(2));
        assert_eq!(tick.deposited, 0);
        assert_eq!(region.grid.level("home", pos(10, 10)), 0);
    }

    #[test]
    fn successful_move_onto_edge_marks_exit() {
        let mut agent = agent_at(1, 20);
        agent.steps_since_event = 9;
        let mut region = Region::new("W1N1");
        complete_move(
            &mut agent,
            &mut region,
            Direction::Left,
            MoveOutcome::Moved,
            &SimulationConfig::default(),
        );
        assert_eq!(agent.pos, pos(0, 20));
        assert_eq!(agent.last_direction, Some(Direction::Left));
        assert_eq!(agent.steps_since_event, 10);
        assert_eq!(region.grid.level("home", pos(0, 20)), 90);
    }

    #[test]
    fn interior_move_leaves_no_boundary_mark() {
        let mut agent = agent_at(5, 5);
        let mut region = Region::new("W1N1");
        complete_move(
            &mut agent,
            &mut region,
            Direction::BottomRight,
            MoveOutcome::Moved,
            &SimulationConfig::default(),
        );
        assert_eq!(agent.pos, pos(6, 6));
        assert_eq!(region.grid.level("home", pos(6, 6)), 0);
    }

    #[test]
    fn move_off_the_grid_counts_as_blocked() {
        let mut agent = agent_at(0, 0);
        let mut region = Region::new("W1N1");
        complete_move(
            &mut agent,
            &mut region,
            Direction::TopLeft,
            MoveOutcome::Moved,
            &SimulationConfig::default(),
        );
        assert_eq!(agent.pos, pos(0, 0));
        assert!(!agent.last_move_succeeded);
    }
}
