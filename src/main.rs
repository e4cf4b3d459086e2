use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use promptgrid::batch;
use promptgrid::cli::Cli;
use promptgrid::inference::LlamaLoader;
use promptgrid::storage::settings::BatchSettings;
use promptgrid::storage::ProjectLayout;

fn main() -> ExitCode {
    let (cli, env_file) = Cli::parse_with_env_file();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match env_file {
        Ok(Some(path)) => tracing::info!("Loaded environment from {}", path.display()),
        Ok(None) => tracing::debug!("No .env file in {}", cli.root.display()),
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    let settings = BatchSettings::resolve(&cli.overrides());
    let layout = ProjectLayout::new(cli.root.clone());

    let loader = match LlamaLoader::init(settings.verbose) {
        Ok(loader) => loader,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match batch::run(&layout, &settings, &loader) {
        Ok(report) => {
            tracing::info!(
                "Done: {} generation(s), report at {}",
                report.results,
                report.report_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Batch aborted ({:?}): {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}
