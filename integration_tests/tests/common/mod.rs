#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use trail_sim::{Sandbox, SimulationConfig, CONFIG_PATH_ENV};

/// Points the config env override at the fixture file once per test binary
/// and returns the fixture path.
pub fn ensure_test_config() -> &'static Path {
    static FIXTURE: OnceLock<PathBuf> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/test_simulation_config.json");
        assert!(fixture.is_file(), "fixture config not found: {}", fixture.display());
        std::env::set_var(CONFIG_PATH_ENV, &fixture);
        fixture
    })
}

/// Demo sandbox advanced by `ticks` steps.
pub fn run_sandbox(seed: u64, agents: usize, ticks: usize) -> Sandbox {
    let mut sandbox = Sandbox::demo(seed, agents, SimulationConfig::builtin());
    for _ in 0..ticks {
        sandbox.step();
    }
    sandbox
}
