use std::io::BufRead;

use pomocycle_core::settings::FIELD_KEYS;
use pomocycle_core::worker::TICK_PERIOD;
use pomocycle_core::{
    spawn_tick_source, Command, Config, CycleSettings, SettingsUpdate, SnapshotStore, TimerEngine,
    Worker, WorkerEvent, WorkerSender,
};

use crate::terminal::TerminalFrontend;

const HELP: &str =
    "commands: start | pause | reset | skip | next | set <field> <value> | help | quit";

pub fn run(seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    // Without a data directory the session still runs, it just is not saved.
    let store = match SnapshotStore::open() {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!("state will not be saved: {e}");
            None
        }
    };
    let engine = super::initial_engine(&config, store.as_ref(), seed);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(session(engine, store, config))
}

async fn session(
    engine: TimerEngine,
    store: Option<SnapshotStore>,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = *engine.settings();
    let frontend = TerminalFrontend::new(config.notifications.clone());
    let (worker, mut handle) = Worker::new(engine, store, frontend, config.autosave.interval());
    let sender = handle.sender();

    let ticks = spawn_tick_source(sender.clone(), TICK_PERIOD);
    std::thread::spawn(move || read_input(sender, settings));

    // Ctrl-C takes the priority path and skips whatever is still queued.
    let ctrl_c = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => handle.shutdown(),
            Err(e) => {
                tracing::warn!("cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        }
    });
    println!("{HELP}");

    let engine = worker.run().await;
    ticks.abort();
    ctrl_c.abort();

    println!("\nstopped in phase {} with {} left", engine.phase(), engine.view().display);
    Ok(())
}

/// Blocking stdin loop. Ends the session on `quit` or end of input.
fn read_input(sender: WorkerSender, mut settings: CycleSettings) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else { continue };

        let delivered = match word {
            "quit" | "exit" | "q" => break,
            "help" | "?" => {
                println!("{HELP}");
                true
            }
            "set" => match (words.next(), words.next()) {
                (Some(field), Some(value)) => {
                    match SettingsUpdate::from(&settings).with_field(field, value) {
                        Ok(update) => {
                            settings.apply(&update);
                            sender.update_settings(update)
                        }
                        Err(e) => {
                            eprintln!("{e}");
                            true
                        }
                    }
                }
                _ => {
                    eprintln!("usage: set <field> <value>  (fields: {})", FIELD_KEYS.join(", "));
                    true
                }
            },
            other => match other.parse::<Command>() {
                Ok(command) => sender.command(command),
                Err(e) => {
                    eprintln!("{e}; {HELP}");
                    true
                }
            },
        };
        if !delivered {
            return;
        }
    }
    sender.send(WorkerEvent::Shutdown);
}
