use std::process::ExitCode;

use replica_demo::{DemoError, build_family, check_copy, engine};
use tracing::{error, info};

fn run() -> Result<(), DemoError> {
    let family = build_family()?;
    let engine = engine();
    info!(
        plugins = ?engine.plugin_names().collect::<Vec<_>>(),
        "engine configured"
    );

    let copy = engine.deep_copy_ref(&family.client)?;
    info!("copied {:?} into {:?}", family.client, copy);

    check_copy(&family, &copy)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    match run() {
        Ok(()) => {
            info!("every check passed");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
