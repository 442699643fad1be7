//! Local gradient following.
//!
//! An agent prefers to keep its heading, then to turn slightly, then to turn
//! hard, and only reverses as a last resort. Within each of those groups the
//! order is shuffled so agents do not all drift the same way. The final pick
//! scores every walkable neighbour by its trail levels; the priority order
//! only breaks ties.

use rand::{seq::SliceRandom, Rng};

use crate::{
    agent::Agent,
    config::NavigationConfig,
    geometry::{Direction, TilePos},
    grid::PheromoneGrid,
    world::Neighborhood,
};

/// A neighbour the agent may step onto this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub direction: Direction,
    pub pos: TilePos,
}

/// Orders all eight directions by preference relative to `last`.
pub fn direction_priorities<R: Rng + ?Sized>(last: Option<Direction>, rng: &mut R) -> Vec<Direction> {
    let Some(heading) = last else {
        let mut all = Direction::ALL.to_vec();
        all.shuffle(rng);
        return all;
    };

    let mut ahead = [heading, heading.rotate(-1), heading.rotate(1)];
    let mut sideways = [heading.rotate(-2), heading.rotate(2)];
    let mut behind = [heading.rotate(-3), heading.rotate(3), heading.opposite()];
    ahead.shuffle(rng);
    sideways.shuffle(rng);
    behind.shuffle(rng);

    let mut priorities = Vec::with_capacity(Direction::ALL.len());
    priorities.extend_from_slice(&ahead);
    priorities.extend_from_slice(&sideways);
    priorities.extend_from_slice(&behind);
    debug_assert_eq!(priorities.len(), Direction::ALL.len());
    priorities
}

/// Neighbours the agent could step onto, sorted by `priorities`.
///
/// Occupied tiles are skipped, except that a searching agent treats each one
/// as passable with probability `occupied_tolerance`.
pub fn walkable_candidates<R: Rng + ?Sized>(
    agent: &Agent,
    neighborhood: &Neighborhood,
    priorities: &[Direction],
    config: &NavigationConfig,
    rng: &mut R,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = neighborhood
        .tiles()
        .iter()
        .filter(|tile| tile.look.is_walkable(true))
        .filter(|tile| {
            !tile.look.occupied
                || (agent.is_searching() && rng.gen_bool(config.occupied_tolerance))
        })
        .map(|tile| Candidate {
            direction: tile.direction,
            pos: tile.pos,
        })
        .collect();

    candidates.sort_by_key(|candidate| {
        priorities
            .iter()
            .position(|&direction| direction == candidate.direction)
            .unwrap_or(usize::MAX)
    });
    candidates
}

/// Trail score of a cell; lower is better. Agents avoid their own trail and
/// climb the one they are searching for.
pub fn score(agent: &Agent, grid: &PheromoneGrid, pos: TilePos) -> i32 {
    let deposited = agent
        .deposit_layer
        .as_deref()
        .map(|layer| grid.level(layer, pos))
        .unwrap_or(0);
    let wanted = grid.level(&agent.search_layer, pos);
    deposited as i32 - 2 * wanted as i32
}

/// Picks the best-scoring candidate; the earliest one wins ties.
///
/// # Panics
///
/// Panics when `candidates` is empty. Callers must treat an empty candidate
/// set as "cannot move" before asking for a direction.
pub fn choose_direction(agent: &Agent, candidates: &[Candidate], grid: &PheromoneGrid) -> Direction {
    choose_candidate(agent, candidates, grid).direction
}

/// Like [`choose_direction`] but returns the whole candidate.
pub fn choose_candidate(agent: &Agent, candidates: &[Candidate], grid: &PheromoneGrid) -> Candidate {
    assert!(
        !candidates.is_empty(),
        "choose_direction requires at least one candidate"
    );
    let mut best = candidates[0];
    let mut best_score = score(agent, grid, best.pos);
    for candidate in &candidates[1..] {
        let candidate_score = score(agent, grid, candidate.pos);
        if candidate_score < best_score {
            best = *candidate;
            best_score = candidate_score;
        }
    }
    best
}
