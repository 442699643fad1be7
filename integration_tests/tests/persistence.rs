use anyhow::Result;
use trail_sim::{
    AgentId, MemoryStore, PersistenceError, Region, RegionRecord, RegionStore, Sandbox,
    SimulationConfig,
};

#[test]
fn sandbox_state_survives_a_store_round_trip() -> Result<()> {
    let mut sandbox = Sandbox::demo(5, 10, SimulationConfig::builtin());
    for _ in 0..80 {
        sandbox.step();
    }
    let mut store = MemoryStore::new();
    sandbox.sync(&mut store)?;

    let region = Region::load(sandbox.region.name(), &store)?;
    assert_eq!(region.record(), sandbox.region.record());

    for agent in sandbox.agents() {
        let restored = store.load_agent(agent.id)?.expect("agent stored");
        assert_eq!(&restored, agent);
    }
    Ok(())
}

#[test]
fn only_changed_layers_are_rewritten() -> Result<()> {
    let mut sandbox = Sandbox::demo(5, 4, SimulationConfig::builtin());
    let mut store = MemoryStore::new();
    sandbox.step();
    // Diffusion and dissipation touch every layer each tick.
    assert_eq!(sandbox.sync(&mut store)?, 3);
    assert_eq!(sandbox.sync(&mut store)?, 0);
    Ok(())
}

#[test]
fn restored_agent_replaces_live_state() -> Result<()> {
    let mut sandbox = Sandbox::demo(8, 3, SimulationConfig::builtin());
    let mut store = MemoryStore::new();
    sandbox.sync(&mut store)?;
    let saved = store.load_agent(AgentId(1))?.expect("agent stored");
    for _ in 0..20 {
        sandbox.step();
    }
    assert!(sandbox.replace_agent(saved.clone()));
    assert_eq!(sandbox.agent(AgentId(1)), Some(&saved));
    Ok(())
}

#[test]
fn corrupt_layer_rejects_the_region() {
    let mut store = MemoryStore::new();
    let mut record = RegionRecord {
        name: "W1S1".to_string(),
        ..RegionRecord::default()
    };
    record.layers.insert("home".to_string(), vec![0; 2400]);
    store.put_record(&record).expect("raw record stored");

    let err = Region::load("W1S1", &store).expect_err("short layer must fail");
    assert!(matches!(
        err,
        PersistenceError::LayerLength {
            expected: 2500,
            found: 2400,
            ..
        }
    ));
}

#[test]
fn records_serialize_to_json() -> Result<()> {
    let sandbox = Sandbox::demo(2, 6, SimulationConfig::builtin());
    let record = sandbox.region.record();
    let json = serde_json::to_string(&record)?;
    let back: RegionRecord = serde_json::from_str(&json)?;
    assert_eq!(back, record);
    Ok(())
}
