use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod client;
mod config;
mod error;
mod llm;
mod models;
mod playlist;

#[cfg(test)]
mod playlist_tests;

use crate::client::SpotifyClient;
use crate::config::load_config;
use crate::llm::AnthropicClient;
use crate::playlist::{GenerationRequest, GenerationSettings, PlaylistGenerator};

#[derive(Parser)]
#[command(name = "mood-playlist")]
#[command(about = "Turn a free-text mood description into a Spotify playlist")]
#[command(version)]
struct Args {
    /// What the playlist should feel like, e.g. "rainy sunday morning"
    description: String,

    /// Spotify access token (overrides SPOTIFY_ACCESS_TOKEN)
    #[arg(short = 't', long = "token")]
    token: Option<String>,

    /// Spotify user id (overrides SPOTIFY_USER_ID; looked up from the token if unset)
    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    /// Path to a JSON file overriding generation limits
    #[arg(short = 's', long = "settings")]
    settings_file: Option<String>,

    /// Interpret, search and score, then print the playlist instead of creating it
    #[arg(short = 'd', long = "dry-run")]
    dry_run: bool,

    /// Print the result as JSON
    #[arg(long = "json")]
    json: bool,

    /// Quiet mode - only warnings and errors are logged
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode - log every request and the raw model reply
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mood_playlist={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    // Load configuration from .env
    let config = load_config()?;

    let settings = match &args.settings_file {
        Some(path) => GenerationSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from '{path}'"))?,
        None => GenerationSettings::default(),
    };

    let access_token = args
        .token
        .clone()
        .or_else(|| config.spotify_access_token.clone())
        .context("No Spotify access token: pass --token or set SPOTIFY_ACCESS_TOKEN")?;

    let catalog = SpotifyClient::new(&config.spotify_url, config.http_timeout);
    let model = AnthropicClient::new(&config);

    // Resolve the user and check the token in one call when no id was given
    let user_id = match args.user.clone().or_else(|| config.spotify_user_id.clone()) {
        Some(user_id) => user_id,
        None => {
            tracing::info!("Looking up Spotify user for the access token...");
            catalog
                .current_user_id(&access_token)
                .context("Spotify connection failed")?
        }
    };

    let generator = PlaylistGenerator::new(&catalog, &model, settings);
    let request = GenerationRequest {
        description: args.description.clone(),
        user_id,
        access_token,
    };

    if args.dry_run {
        let draft = generator.preview(request)?;

        println!("\nDRY RUN: playlist '{}' (not created)", draft.name);
        println!("   {}", draft.description);
        for (i, scored) in draft.tracks.iter().enumerate() {
            let features = scored
                .features
                .as_ref()
                .map(|f| {
                    format!(
                        " | E:{:.2} V:{:.2} {:.0}bpm",
                        f.energy, f.valence, f.tempo
                    )
                })
                .unwrap_or_default();
            println!(
                "     {}. \"{}\" by {} [score {}]{}",
                i + 1,
                scored.track.title,
                scored.track.primary_artist,
                scored.score,
                features
            );
        }
        return Ok(());
    }

    let result = generator.generate(request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("\n✓ Created playlist '{}' with {} tracks", result.name, result.track_count);
    println!("   {}", result.url);
    println!("\nPreview:");
    for (i, track) in result.preview.iter().enumerate() {
        println!("   {}. {} - {}", i + 1, track.name, track.artist);
    }

    Ok(())
}
