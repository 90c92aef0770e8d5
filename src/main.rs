use std::env;

use log::info;
use mimo_detection::{Evaluator, SimulationSpec};

/// The environment variable holding the config path when none is given as an argument.
const CONFIG_VAR: &str = "MIMO_CONFIG";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let spec = match env::args().nth(1).or_else(|| env::var(CONFIG_VAR).ok()) {
        Some(path) => {
            info!("reading config {path}");
            SimulationSpec::from_file(path)?
        }
        None => SimulationSpec::bundled()?,
    };

    let report = Evaluator::new(spec).run()?;
    println!("{report}");

    Ok(())
}
