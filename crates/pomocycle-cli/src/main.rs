use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;
mod notify;
mod terminal;

#[derive(Parser)]
#[command(
    name = "pomocycle",
    version,
    about = "Pomodoro cycles with breaks, long breaks and surprise tasks"
)]
struct Cli {
    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer interactively (reads commands from stdin)
    Run {
        /// Seed for surprise placement in a freshly built cycle
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the saved timer state
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Saved session state
    State {
        #[command(subcommand)]
        action: commands::state::StateAction,
    },
    /// Cycle inspection
    Cycle {
        #[command(subcommand)]
        action: commands::cycle::CycleAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pomocycle={level},pomocycle_core={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Run { seed } => commands::run::run(seed),
        Commands::Status { json } => commands::status::run(json),
        Commands::State { action } => commands::state::run(action),
        Commands::Cycle { action } => commands::cycle::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pomocycle", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
