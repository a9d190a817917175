// hoopscope entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so the report owns stdout)
// 2. Load config
// 3. Build the payload source
// 4. Spawn the loader and follow its progress
// 5. Print the report, export CSV if configured

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use hoopscope_app::config;
use hoopscope_app::loader::{LoadUpdate, Loader};
use hoopscope_app::report;
use hoopscope_app::source;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("hoopscope starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} players, view = {}",
        config.cohort.player_ids.len(),
        report::describe_selection(config.view.selection)
    );

    // 3. Build the payload source
    let source = source::from_config(&config.source).context("failed to build payload source")?;
    let source: Arc<dyn source::PayloadSource> = Arc::from(source);

    // 4. Spawn the loader and follow its progress
    let (tx, mut rx) = mpsc::channel(64);
    let loader = Loader::new(source, config.cohort.player_ids.clone())
        .with_orientation(config.orientation);
    let handle = tokio::spawn(loader.run(tx));

    while let Some(update) = rx.recv().await {
        match update {
            LoadUpdate::PlayerLoaded { player, events, .. } => {
                info!("Loaded {} ({} events)", player.name, events.len());
            }
            LoadUpdate::PlayerAbsent { player_id } => {
                info!("No data for player {player_id}");
            }
            LoadUpdate::PlayerFailed { player_id, message } => {
                warn!("Skipping player {player_id}: {message}");
            }
            LoadUpdate::Finished { summaries } => {
                info!("Ranked {} players", summaries.len());
            }
        }
    }

    let cohort = handle.await.context("loader task panicked")?;

    // 5. Print the report, export CSV if configured
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::render(&mut out, &cohort, &config.view, &config.court)
        .context("failed to write report")?;

    if let Some(path) = &config.export.summaries_csv {
        report::export_summaries_csv(Path::new(path), &cohort.summaries)
            .context("failed to export summaries")?;
        info!("Summaries written to {path}");
    }

    info!("hoopscope done");
    Ok(())
}

/// Initialize tracing to stderr.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("hoopscope_app=info,hoopscope_core=warn,hoopscope=info,warn")
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
