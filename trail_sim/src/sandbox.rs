//! Self-contained host for demos, benches and tests.
//!
//! [`SandboxWorld`] plays the part of the game host: it owns agent bodies,
//! terrain and points of interest, answers [`WorldQuery`] lookups and carries
//! out moves and host actions. [`Sandbox`] drives one region tick by tick in
//! the order the library expects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    agent::{Agent, AgentId, AgentVitals},
    config::SimulationConfig,
    geometry::{TilePos, GRID_CELLS},
    metrics::RegionMetrics,
    persistence::{PersistenceError, RegionStore},
    region::Region,
    rng::{region_seed, seeded_rng, SimRng},
    state_machine::AgentAction,
    systems::{complete_move, update_agent, update_region, MoveOutcome},
    world::{PointOfInterest, TileLook, TileTraits, WorldQuery},
};

/// Resource units a body takes from a node per harvest.
pub const HARVEST_PER_TICK: u32 = 2;
/// Resource units a body spends per upgrade.
pub const UPGRADE_PER_TICK: u32 = 1;
/// Ticks of fatigue after stepping into a swamp.
pub const SWAMP_FATIGUE: u32 = 2;

/// Host-side state of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub pos: TilePos,
    pub carried: u32,
    pub carry_capacity: u32,
    pub fatigue: u32,
    pub spawn_ticks: u32,
}

impl Body {
    pub fn new(pos: TilePos, carry_capacity: u32) -> Self {
        Self {
            pos,
            carried: 0,
            carry_capacity,
            fatigue: 0,
            spawn_ticks: 0,
        }
    }

    pub fn vitals(&self) -> AgentVitals {
        AgentVitals {
            carried: self.carried,
            carry_capacity: self.carry_capacity,
            fatigued: self.fatigue > 0,
            spawning: self.spawn_ticks > 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SandboxWorld {
    terrain: Vec<TileTraits>,
    points: BTreeMap<TilePos, Vec<PointOfInterest>>,
    bodies: BTreeMap<AgentId, Body>,
    occupants: BTreeMap<TilePos, AgentId>,
    upgrade_progress: u64,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::open()
    }
}

impl SandboxWorld {
    /// Plain terrain everywhere, nothing placed.
    pub fn open() -> Self {
        Self {
            terrain: vec![TileTraits::empty(); GRID_CELLS],
            points: BTreeMap::new(),
            bodies: BTreeMap::new(),
            occupants: BTreeMap::new(),
            upgrade_progress: 0,
        }
    }

    pub fn set_traits(&mut self, pos: TilePos, traits: TileTraits) {
        self.terrain[pos.index()] = traits;
    }

    /// Sets `traits` on every cell of the inclusive rectangle `from..=to`.
    pub fn fill_traits(&mut self, from: TilePos, to: TilePos, traits: TileTraits) {
        for y in from.y().min(to.y())..=from.y().max(to.y()) {
            for x in from.x().min(to.x())..=from.x().max(to.x()) {
                if let Some(pos) = TilePos::new(x, y) {
                    self.set_traits(pos, traits);
                }
            }
        }
    }

    pub fn traits(&self, pos: TilePos) -> TileTraits {
        self.terrain[pos.index()]
    }

    pub fn place(&mut self, pos: TilePos, point: PointOfInterest) {
        self.points.entry(pos).or_default().push(point);
    }

    pub fn points_at(&self, pos: TilePos) -> &[PointOfInterest] {
        self.points.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Puts a body into the world; refuses tiles that cannot be stood on.
    pub fn add_body(&mut self, id: AgentId, body: Body) -> bool {
        let free = self
            .look(body.pos)
            .map(|look| look.is_walkable(false))
            .unwrap_or(false);
        if !free || self.bodies.contains_key(&id) {
            return false;
        }
        self.occupants.insert(body.pos, id);
        self.bodies.insert(id, body);
        true
    }

    pub fn remove_body(&mut self, id: AgentId) -> Option<Body> {
        let body = self.bodies.remove(&id)?;
        self.occupants.remove(&body.pos);
        Some(body)
    }

    pub fn body(&self, id: AgentId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn is_occupied(&self, pos: TilePos) -> bool {
        self.occupants.contains_key(&pos)
    }

    pub fn upgrade_progress(&self) -> u64 {
        self.upgrade_progress
    }

    /// Resources held by every home structure.
    pub fn stored_total(&self) -> u64 {
        self.points
            .values()
            .flatten()
            .map(|point| match point {
                PointOfInterest::Home { stored, .. } => *stored as u64,
                _ => 0,
            })
            .sum()
    }

    /// Resources carried by every body.
    pub fn carried_total(&self) -> u64 {
        self.bodies.values().map(|body| body.carried as u64).sum()
    }

    /// Cools down fatigue and spawn timers.
    pub fn begin_tick(&mut self) {
        for body in self.bodies.values_mut() {
            body.fatigue = body.fatigue.saturating_sub(1);
            body.spawn_ticks = body.spawn_ticks.saturating_sub(1);
        }
    }

    /// Attempts to move a body onto `destination`.
    pub fn try_move(&mut self, id: AgentId, destination: TilePos) -> MoveOutcome {
        let walkable = self
            .look(destination)
            .map(|look| look.is_walkable(false))
            .unwrap_or(false);
        let Some(body) = self.bodies.get_mut(&id) else {
            return MoveOutcome::Blocked;
        };
        if !walkable {
            return MoveOutcome::Blocked;
        }
        self.occupants.remove(&body.pos);
        self.occupants.insert(destination, id);
        body.pos = destination;
        if self.terrain[destination.index()].contains(TileTraits::SWAMP) {
            body.fatigue = SWAMP_FATIGUE;
        }
        MoveOutcome::Moved
    }

    /// Carries out a host action. Returns the amount of resource moved.
    pub fn apply(&mut self, id: AgentId, action: &AgentAction) -> u32 {
        let Some(body) = self.bodies.get_mut(&id) else {
            return 0;
        };
        match *action {
            AgentAction::Transfer { target } => {
                let homes = self.points.get_mut(&target).into_iter().flatten();
                for point in homes {
                    if let PointOfInterest::Home { stored, capacity } = point {
                        let amount = body.carried.min(capacity.saturating_sub(*stored));
                        *stored += amount;
                        body.carried -= amount;
                        return amount;
                    }
                }
                0
            }
            AgentAction::Harvest { target } => {
                let room = body.carry_capacity.saturating_sub(body.carried);
                let nodes = self.points.get_mut(&target).into_iter().flatten();
                for point in nodes {
                    if let PointOfInterest::ResourceNode { available } = point {
                        if *available == 0 {
                            continue;
                        }
                        let amount = HARVEST_PER_TICK.min(*available).min(room);
                        *available -= amount;
                        body.carried += amount;
                        return amount;
                    }
                }
                0
            }
            AgentAction::Upgrade { target } => {
                let owned = self
                    .points
                    .get(&target)
                    .into_iter()
                    .flatten()
                    .any(|point| matches!(point, PointOfInterest::UpgradeTarget { owned: true }));
                if !owned {
                    return 0;
                }
                let amount = body.carried.min(UPGRADE_PER_TICK);
                body.carried -= amount;
                self.upgrade_progress += amount as u64;
                amount
            }
        }
    }
}

impl WorldQuery for SandboxWorld {
    fn look(&self, pos: TilePos) -> Option<TileLook> {
        Some(TileLook {
            traits: self.terrain[pos.index()],
            occupied: self.is_occupied(pos),
            points: self.points_at(pos).to_vec(),
        })
    }
}

/// Counters for one sandbox tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SandboxReport {
    pub tick: u64,
    pub region: RegionMetrics,
    pub moved: u32,
    pub blocked: u32,
    pub idle: u32,
    pub actions: u32,
}

/// One region, its agents and the world they live in.
#[derive(Debug)]
pub struct Sandbox {
    pub world: SandboxWorld,
    pub region: Region,
    agents: BTreeMap<AgentId, Agent>,
    config: SimulationConfig,
    rng: SimRng,
    tick: u64,
}

impl Sandbox {
    pub fn new(region: Region, world: SandboxWorld, config: SimulationConfig, seed: u64) -> Self {
        let rng = seeded_rng(region_seed(seed, region.name()));
        Self {
            world,
            region,
            agents: BTreeMap::new(),
            config,
            rng,
            tick: 0,
        }
    }

    /// One home, two resource nodes and an owned upgrade target, with a wall
    /// and a swamp patch in between. Agents start packed around the home and
    /// come out of the spawner four per tick; at most 100 are placed.
    pub fn demo(seed: u64, agent_count: usize, config: SimulationConfig) -> Self {
        let mut world = SandboxWorld::open();
        let points = [
            (
                (10, 10),
                PointOfInterest::Home {
                    stored: 0,
                    capacity: 300,
                },
            ),
            ((40, 38), PointOfInterest::ResourceNode { available: 100_000 }),
            ((8, 40), PointOfInterest::ResourceNode { available: 100_000 }),
            ((40, 8), PointOfInterest::UpgradeTarget { owned: true }),
        ];
        for ((x, y), point) in points {
            if let Some(pos) = TilePos::new(x, y) {
                world.place(pos, point);
            }
        }
        let patches = [
            ((25, 10), (25, 35), TileTraits::WALL),
            ((30, 20), (34, 26), TileTraits::SWAMP),
        ];
        for ((x0, y0), (x1, y1), traits) in patches {
            if let (Some(from), Some(to)) = (TilePos::new(x0, y0), TilePos::new(x1, y1)) {
                world.fill_traits(from, to, traits);
            }
        }

        let mut sandbox = Self::new(Region::new("sandbox"), world, config, seed);
        let slots = (12..22u8).flat_map(|y| (12..22u8).filter_map(move |x| TilePos::new(x, y)));
        for (index, pos) in slots.take(agent_count).enumerate() {
            sandbox.spawn_agent(AgentId(index as u64 + 1), pos, 50, (index / 4) as u32);
        }
        info!(
            target: "trail_sim::sandbox",
            seed,
            agents = sandbox.agents.len(),
            "sandbox.demo_ready"
        );
        sandbox
    }

    /// Adds a body and its trail state. Returns `false` if the tile is taken.
    pub fn spawn_agent(
        &mut self,
        id: AgentId,
        pos: TilePos,
        carry_capacity: u32,
        spawn_ticks: u32,
    ) -> bool {
        let body = Body {
            spawn_ticks,
            ..Body::new(pos, carry_capacity)
        };
        if !self.world.add_body(id, body) {
            return false;
        }
        self.agents
            .insert(id, Agent::spawn(id, pos, &self.config.layers));
        true
    }

    /// Removes an agent from the world and drops its stored record.
    pub fn remove_agent<S: RegionStore + ?Sized>(
        &mut self,
        id: AgentId,
        store: &mut S,
    ) -> Result<bool, PersistenceError> {
        let known = self.agents.remove(&id).is_some();
        self.world.remove_body(id);
        store.forget_agent(id)?;
        Ok(known)
    }

    /// Replaces the trail state of an existing agent, e.g. after a restore.
    pub fn replace_agent(&mut self, agent: Agent) -> bool {
        match self.agents.get_mut(&agent.id) {
            Some(slot) => {
                *slot = agent;
                true
            }
            None => false,
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Runs one full tick: region dynamics, then every agent by ascending id.
    pub fn step(&mut self) -> SandboxReport {
        self.tick += 1;
        self.world.begin_tick();
        let mut report = SandboxReport {
            tick: self.tick,
            region: update_region(&mut self.region, &self.config, &mut self.rng),
            ..SandboxReport::default()
        };

        for (id, agent) in self.agents.iter_mut() {
            let Some(vitals) = self.world.body(*id).map(Body::vitals) else {
                continue;
            };
            let tick = update_agent(
                agent,
                &vitals,
                &mut self.region,
                &self.world,
                &self.config,
                &mut self.rng,
            );
            for action in &tick.actions {
                self.world.apply(*id, action);
            }
            report.actions += tick.actions.len() as u32;

            let Some(request) = tick.move_request else {
                report.idle += 1;
                continue;
            };
            let outcome = self.world.try_move(*id, request.destination);
            match outcome {
                MoveOutcome::Moved => report.moved += 1,
                MoveOutcome::Blocked => report.blocked += 1,
            }
            complete_move(agent, &mut self.region, request.direction, outcome, &self.config);
        }

        debug!(
            target: "trail_sim::sandbox",
            tick = self.tick,
            moved = report.moved,
            blocked = report.blocked,
            idle = report.idle,
            actions = report.actions,
            "sandbox.tick"
        );
        report
    }

    /// Persists dirty layers and every agent record.
    pub fn sync<S: RegionStore + ?Sized>(&mut self, store: &mut S) -> Result<usize, PersistenceError> {
        let layers = self.region.sync(store)?;
        for agent in self.agents.values() {
            store.store_agent(agent)?;
        }
        Ok(layers)
    }
}
