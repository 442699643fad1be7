//! Goal transitions for a single agent.
//!
//! The rules run every tick in a fixed order and later rules overwrite the
//! effects of earlier ones. Each transition picks the layer the agent will
//! follow next and the layer it lays behind itself.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    agent::{Agent, AgentMode, AgentVitals},
    config::SimulationConfig,
    geometry::TilePos,
    world::Neighborhood,
};

/// Work the host should perform for the agent this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AgentAction {
    /// Hand carried resources to the home at `target`.
    Transfer { target: TilePos },
    Harvest { target: TilePos },
    Upgrade { target: TilePos },
}

/// Evaluates the goal rules and returns the host actions they produce.
pub fn update_mode(
    agent: &mut Agent,
    vitals: &AgentVitals,
    neighborhood: &Neighborhood,
    config: &SimulationConfig,
) -> Vec<AgentAction> {
    let layers = &config.layers;
    let previous = agent.mode;
    let mut actions = Vec::new();
    let mut working = None;

    // A fatigued agent is still walking the trail it started.
    if vitals.fatigued && agent.last_move_succeeded {
        agent.steps_since_event = agent.steps_since_event.saturating_add(1);
    }

    if let Some(home) = neighborhood.home() {
        let base_full = vitals.carried as u64 + home.stored as u64 > home.capacity as u64;
        let search = if base_full {
            &layers.controller
        } else {
            &layers.energy
        };
        agent.retarget(Some(layers.home.as_str()), search);
        agent.set_searching(true);
        if vitals.is_carrying() {
            actions.push(AgentAction::Transfer { target: home.pos });
        }
    }

    if vitals.has_capacity() {
        if let Some(target) = neighborhood.harvestable_resource() {
            agent.retarget(Some(layers.energy.as_str()), &layers.home);
            agent.set_searching(false);
            actions.push(AgentAction::Harvest { target });
            working = Some(AgentMode::Harvesting);
        }
    }

    if vitals.is_carrying() {
        if let Some(target) = neighborhood.owned_upgrade_target() {
            agent.retarget(Some(layers.controller.as_str()), &layers.home);
            agent.set_searching(false);
            actions.push(AgentAction::Upgrade { target });
            working = Some(AgentMode::Upgrading);
        }
    }

    if agent.is_searching() && agent.steps_since_event >= config.navigation.search_max_steps {
        debug!(
            target: "trail_sim::agent",
            event = "search_timeout",
            agent = %agent.id,
            steps = agent.steps_since_event,
        );
        agent.retarget(None, &layers.home);
        agent.set_searching(false);
    }

    agent.mode = match working {
        Some(mode) => mode,
        None if agent.is_searching() => AgentMode::Searching,
        None => AgentMode::Returning,
    };

    if agent.mode != previous {
        debug!(
            target: "trail_sim::agent",
            event = "mode_change",
            agent = %agent.id,
            from = %previous,
            to = %agent.mode,
            search = %agent.search_layer,
            deposit = agent.deposit_layer.as_deref().unwrap_or("-"),
        );
    } else {
        trace!(target: "trail_sim::agent", agent = %agent.id, mode = %agent.mode);
    }

    actions
}
