use clap::Parser;
use launch_ready::cli::commands::{cmd_phases, cmd_scan, cmd_snapshot, init_logging};
use launch_ready::cli::config::{Cli, Commands, ScanSettings, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    init_logging(cli.verbose, &config.logging)?;

    // Resolve settings: CLI > config > env > defaults
    let settings = ScanSettings::from_env(&config)
        .with_overrides(cli.openai_model.as_deref(), cli.trace.as_deref());

    match cli.command {
        Commands::Scan {
            url,
            format,
            output,
            min_score,
        } => {
            let passed = cmd_scan(&url, &format, output.as_deref(), min_score, &settings)?;
            if !passed {
                std::process::exit(1);
            }
        }
        Commands::Snapshot { url } => {
            cmd_snapshot(&url, &settings)?;
        }
        Commands::Phases => cmd_phases(),
    }

    Ok(())
}
