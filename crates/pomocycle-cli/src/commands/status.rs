use pomocycle_core::{Config, SnapshotStore};

use crate::terminal::{clock_line, describe};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::read_or_default();
    let store = SnapshotStore::open()?;
    let mut engine = super::initial_engine(&config, Some(&store), None);
    engine.ensure_cycle();
    let view = engine.view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", describe(&view));
        println!("{}", clock_line(&view).trim_end());
    }
    Ok(())
}
