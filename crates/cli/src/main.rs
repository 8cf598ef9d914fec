use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use popcorn_core::{
    load_config, validate_config, Config, ConfigError, HttpSession, Movie, Transport,
};

/// Exit code when no torrent matches the profile.
const EXIT_NOT_FOUND: u8 = 2;

/// Pick the best torrent of a movie for a profile chain.
#[derive(Debug, Parser)]
#[command(name = "popcorn", version, about)]
struct Args {
    /// Configuration file
    #[arg(long, env = "POPCORN_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Movie (group) ID
    id: String,

    /// Comma separated fallback chain, e.g. "gp,1080p x264,seeded smallest"
    #[arg(long, short)]
    profile: String,

    /// Print a resolved movie field before matching (repeatable)
    #[arg(long = "field", short = 'f')]
    fields: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) => Config::default(),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load config from {:?}", args.config))
        }
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if !args.config.exists() {
        warn!("Config file {:?} not found, using defaults", args.config);
    }

    validate_config(&config).context("Configuration validation failed")?;
    info!("Tracker: {}", config.tracker.base_url);

    let session: Arc<dyn Transport> = Arc::new(
        HttpSession::new(&config.tracker).context("Failed to create tracker session")?,
    );
    let mut movie = Movie::new(args.id.clone(), session);

    for field in &args.fields {
        let value = movie
            .get(field)
            .await
            .with_context(|| format!("Failed to resolve field '{}' of movie {}", field, args.id))?;
        println!("{}: {}", field, value.to_json());
    }

    let best = movie
        .best_match(&args.profile)
        .await
        .with_context(|| format!("Failed to match movie {}", args.id))?;

    match best {
        Some(torrent) => {
            info!("Best match for movie {}: {}", args.id, torrent);
            println!("{}", serde_json::to_string_pretty(torrent.data())?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!(
                "No torrent of movie {} matches profile '{}'",
                args.id, args.profile
            );
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_minimal() {
        let args = Args::try_parse_from(["popcorn", "42", "--profile", "gp,1080p"]).unwrap();
        assert_eq!(args.id, "42");
        assert_eq!(args.profile, "gp,1080p");
        assert!(args.fields.is_empty());
    }

    #[test]
    fn test_args_repeated_fields() {
        let args = Args::try_parse_from([
            "popcorn", "42", "-p", "seeded", "-f", "Title", "--field", "Year",
        ])
        .unwrap();
        assert_eq!(args.fields, vec!["Title", "Year"]);
    }

    #[test]
    fn test_args_profile_required() {
        assert!(Args::try_parse_from(["popcorn", "42"]).is_err());
    }
}
