// Best ball draft assistant entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, stdout is for reports)
// 3. Load config, apply command-line overrides
// 4. Load player data and build the catalog
// 5. Start the session and read commands from stdin

use std::path::{Path, PathBuf};

use anyhow::Context;
use bestball_app::app::{self, AppState, OutputFormat};
use bestball_app::config;
use bestball_app::loader;
use bestball_app::report;
use bestball_core::session::Session;
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(name = "bestball", about = "Best ball draft assistant")]
struct Cli {
    /// Directory holding config/, defaults/, and logs/
    #[clap(long, default_value = ".")]
    base_dir: PathBuf,

    /// Player projections CSV (overrides data_paths.players)
    #[clap(long)]
    players: Option<String>,

    /// Per-team multiplier CSV (overrides data_paths.team_multipliers)
    #[clap(long)]
    multipliers: Option<String>,

    /// Per-team rank CSV (overrides data_paths.team_ranks)
    #[clap(long)]
    team_ranks: Option<String>,

    /// Starting finals emphasis, 0.8 to 1.4
    #[clap(long)]
    emphasis: Option<f64>,

    /// Write query results as JSON
    #[clap(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing
    init_tracing(&cli.base_dir)?;
    info!("Best ball draft assistant starting up");

    // 3. Load config
    let mut config =
        config::load_config_in(&cli.base_dir).context("failed to load configuration")?;
    if let Some(players) = cli.players {
        config.data_paths.players = players;
    }
    if let Some(mult) = cli.multipliers {
        config.data_paths.team_multipliers = Some(mult);
    }
    if let Some(ranks) = cli.team_ranks {
        config.data_paths.team_ranks = Some(ranks);
    }
    if let Some(emphasis) = cli.emphasis {
        config.session.finals_emphasis = emphasis;
    }
    config::validate(&config).context("invalid configuration")?;
    resolve_data_paths(&mut config.data_paths, &cli.base_dir);
    info!(
        "Config loaded: players={}, emphasis={:.2}",
        config.data_paths.players, config.session.finals_emphasis
    );

    // 4. Load player data
    let (catalog, admission) =
        loader::load_catalog(&config).context("failed to load player data")?;
    print!("{}", report::admission(&admission));
    if catalog.metrics_degraded() {
        println!("Warning: no spread in projections or ADP; value scores are neutral");
    }

    // 5. Run the session
    let mut session = Session::new(catalog).with_limits(config.recommendations.limits());
    session
        .set_finals_emphasis(config.session.finals_emphasis)
        .context("invalid finals emphasis")?;

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut state = AppState::new(session, config.equity.clone(), format);
    println!("Type `help` for commands.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    app::run(&mut state, stdin.lock(), &mut stdout).context("input loop failed")?;

    info!("Best ball draft assistant shut down cleanly");
    Ok(())
}

/// Relative data paths are taken from the base directory.
fn resolve_data_paths(paths: &mut config::DataPaths, base_dir: &Path) {
    let resolve = |p: &str| -> String {
        let path = Path::new(p);
        if path.is_absolute() {
            p.to_string()
        } else {
            base_dir.join(path).display().to_string()
        }
    };
    paths.players = resolve(&paths.players);
    paths.team_multipliers = paths.team_multipliers.as_deref().map(resolve);
    paths.team_ranks = paths.team_ranks.as_deref().map(resolve);
}

/// Initialize tracing to log to a file (stdout carries the session output).
fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_file = std::fs::File::create(log_dir.join("bestball.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bestball_core=info,bestball_app=info,warn")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
