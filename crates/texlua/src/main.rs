use clap::Parser;
use tracing_subscriber::EnvFilter;

use texlua::cli::Cli;
use texlua::startup::{DryRunEngine, Startup};

fn init_logging() {
    let filter = EnvFilter::try_from_env("TEXLUA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error and every cause below it.
fn report(error: &dyn std::error::Error) {
    eprintln!("{}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let cli = Cli::parse_from(&args);
    let startup = Startup::from_cli(cli, args);

    match startup.run(&mut DryRunEngine) {
        Ok(0) => {}
        Ok(status) => std::process::exit(status),
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    }
}
