mod cli;
mod extract_cmd;
mod page_range;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(code) = extract_cmd::run(&cli) {
        std::process::exit(code);
    }
}
