use clap::Parser;
use tracing_subscriber::EnvFilter;

use rna2dnalign::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Progress goes to stderr so reports on stdout stay machine-readable
    let filter = if cli.verbose {
        EnvFilter::new("rna2dnalign=debug,info")
    } else if cli.quiet {
        EnvFilter::new("rna2dnalign=warn")
    } else {
        EnvFilter::new("rna2dnalign=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Run(args) => {
            cli::run::run(args, cli.format, cli.quiet)?;
        }
        cli::Commands::Map(args) => {
            cli::map::run(args, cli.format)?;
        }
    }

    Ok(())
}
