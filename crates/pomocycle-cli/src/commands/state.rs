use clap::Subcommand;
use pomocycle_core::SnapshotStore;

#[derive(Subcommand)]
pub enum StateAction {
    /// Delete the saved session (next run starts a fresh cycle)
    Clear,
    /// Print the snapshot file location
    Path,
    /// Print the raw snapshot as JSON
    Show,
}

pub fn run(action: StateAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SnapshotStore::open()?;

    match action {
        StateAction::Clear => {
            store.clear()?;
            println!("saved state cleared");
        }
        StateAction::Path => {
            println!("{}", store.path().display());
        }
        StateAction::Show => match store.try_load()? {
            Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            None => println!("no saved state"),
        },
    }
    Ok(())
}
