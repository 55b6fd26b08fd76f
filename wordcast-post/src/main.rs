//! wordcast-post - Post a new word of the day

use std::path::PathBuf;

use clap::Parser;
use libwordcast::logging::{self, LogFormat};
use libwordcast::{Config, Credentials, Result, WordcastService};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "wordcast-post")]
#[command(version)]
#[command(about = "Generate a new vocabulary word and post it to X", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "WORDCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Generate and print the post without publishing or saving history
    #[arg(long)]
    dry_run: bool,

    /// Log format (text, json or pretty)
    #[arg(long, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_log_format(s: &str) -> std::result::Result<LogFormat, String> {
    s.parse()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::from_env(cli.log_format, cli.verbose).init();

    // Run the main logic and handle errors
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let credentials = Credentials::from_env(!cli.dry_run)?;
    let service = WordcastService::from_config(&config, credentials)?;

    info!(backend = %config.history.backend, dry_run = cli.dry_run, "Starting run");

    let outcome = if cli.dry_run {
        service.dry_run().await
    } else {
        service.run().await?
    };

    println!("{}", outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "wordcast-post",
            "--dry-run",
            "--log-format",
            "json",
            "-v",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["wordcast-post", "--log-format", "xml"]).is_err());
    }
}
