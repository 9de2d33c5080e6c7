use clap::Subcommand;
use pomocycle_core::{format_time, Config, TimerEngine};

#[derive(Subcommand)]
pub enum CycleAction {
    /// Build a cycle from the configured defaults without touching saved state
    Preview {
        /// Seed for surprise placement
        #[arg(long)]
        seed: Option<u64>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: CycleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CycleAction::Preview { seed, json } => {
            let config = Config::read_or_default();
            let engine = match seed {
                Some(seed) => TimerEngine::with_seed(config.cycle, seed),
                None => TimerEngine::new(config.cycle),
            };
            let Some(cycle) = engine.cycle() else {
                return Err("no cycle could be built".into());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(cycle)?);
                return Ok(());
            }
            let mut total = 0;
            for (i, slot) in cycle.slots.iter().enumerate() {
                total += slot.duration_seconds;
                println!("{:>3}. {:<16} {:>7}", i + 1, slot.label(), slot.duration_label());
            }
            println!(
                "{} slots, {} surprise, {} total",
                cycle.len(),
                cycle.surprise_slots_placed,
                format_time(total)
            );
        }
    }
    Ok(())
}
