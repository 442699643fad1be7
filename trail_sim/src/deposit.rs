use crate::{agent::Agent, config::DepositConfig, geometry::TilePos, grid::PheromoneGrid};

/// Lays the agent's trail on its current cell.
///
/// The strength fades with every step since the agent last changed goal and
/// never overwrites a stronger trail. Returns the amount written, or 0 when
/// nothing was written.
pub fn deposit(agent: &Agent, grid: &mut PheromoneGrid, config: &DepositConfig) -> u8 {
    deposit_on(agent, grid, agent.pos, config)
}

/// Same rule as [`deposit`], applied to `destination` when it lies on an edge
/// row or column. Agents leaving the region through an exit would otherwise
/// never mark the exit cell.
pub fn deposit_at_boundary(
    agent: &Agent,
    grid: &mut PheromoneGrid,
    destination: TilePos,
    config: &DepositConfig,
) -> u8 {
    if !destination.is_edge() {
        return 0;
    }
    deposit_on(agent, grid, destination, config)
}

fn deposit_on(agent: &Agent, grid: &mut PheromoneGrid, pos: TilePos, config: &DepositConfig) -> u8 {
    let Some(layer) = agent.deposit_layer.as_deref() else {
        return 0;
    };
    let current = grid.level(layer, pos) as i64;
    let amount = config.amount_after(agent.steps_since_event);
    if amount < current {
        return 0;
    }
    let written = amount.clamp(0, u8::MAX as i64) as u8;
    grid.set_level(layer, pos, written);
    written
}
