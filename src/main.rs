use clap::Parser;
use tidyfold::cli::{Cli, StdinConfirm, run};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // DESKTOP_PATH / DOWNLOADS_PATH may come from a .env file.
    match dotenv::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "could not load .env file"),
    }

    if let Err(e) = run(&cli, &mut StdinConfirm) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
