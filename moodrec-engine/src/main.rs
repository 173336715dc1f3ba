//! moodrec - mood-based song recommendations from the command line
//!
//! Takes the listener's mood as four sliders (angry, calm, feelgood, sad),
//! seeds Spotify recommendations from their top tracks or artists, and prints
//! the candidates that best match the mood.

use anyhow::{Context, Result};
use clap::Parser;
use moodrec_common::config::ConfigResolver;
use moodrec_common::{MoodCategory, MoodVector};
use moodrec_engine::classifier::ClassifierChainModel;
use moodrec_engine::config::{pipeline_config, resolve_access_token, resolve_model_path};
use moodrec_engine::pipeline::{fetch_seeds, publish_playlist, Pipeline, PipelineOutput};
use moodrec_engine::ranker::RankedRow;
use moodrec_engine::spotify::SpotifyClient;
use moodrec_engine::types::{RecommendationRequest, SeedKind, TimeRange, TopItemsRequest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Mood-based song recommendations
#[derive(Debug, Parser)]
#[command(name = "moodrec", version, about)]
struct Cli {
    /// How angry you feel (0-1)
    #[arg(long, default_value_t = 0.0)]
    angry: f64,

    /// How calm you feel (0-1)
    #[arg(long, default_value_t = 0.0)]
    calm: f64,

    /// How good you feel (0-1)
    #[arg(long, default_value_t = 0.0)]
    feelgood: f64,

    /// How sad you feel (0-1)
    #[arg(long, default_value_t = 0.0)]
    sad: f64,

    /// Seed from your top `tracks` or `artists` (or explicit `genres` via --seeds)
    #[arg(long, default_value = "tracks")]
    seed_from: SeedKind,

    /// Explicit seed ids, skipping the top-items lookup (comma separated, max 5)
    #[arg(long, value_delimiter = ',')]
    seeds: Vec<String>,

    /// Target tempo in BPM (0-250)
    #[arg(long, default_value_t = 120)]
    tempo: u32,

    /// Target popularity (0-100); lower finds less known tracks
    #[arg(long, default_value_t = 25)]
    popularity: u32,

    /// Window for top tracks/artists: short_term, medium_term or long_term
    #[arg(long, default_value = "medium_term")]
    time_range: TimeRange,

    /// Skip this many of your top items (0-50)
    #[arg(long, default_value_t = 5)]
    offset: usize,

    /// Save the shown recommendations as a private playlist
    #[arg(long)]
    playlist: bool,

    /// Print the average audio profile of all candidates
    #[arg(long)]
    radar: bool,

    /// Config file (overrides MOODREC_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mood classifier model file
    #[arg(long)]
    model: Option<PathBuf>,

    /// Spotify access token (overrides MOODREC_SPOTIFY_TOKEN and the config file)
    #[arg(long)]
    token: Option<String>,

    /// Print recommendations as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config warnings go to stderr before the configured filter is known
    let bootstrap = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        ConfigResolver::new(cli.config.clone()).resolve()
    })
    .context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting moodrec {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli, config).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, config: moodrec_common::config::TomlConfig) -> Result<()> {
    let mood = MoodVector::new(cli.angry, cli.calm, cli.feelgood, cli.sad)
        .context("Invalid mood")?;
    if cli.offset > 50 {
        anyhow::bail!("--offset must be between 0 and 50, got {}", cli.offset);
    }

    let pipeline_config = pipeline_config(&config)?;
    let page_size = pipeline_config.page_size;

    // Classifier is loaded once and shared read-only
    let model_path = resolve_model_path(cli.model.as_deref(), &config)?;
    let classifier = Arc::new(
        ClassifierChainModel::load(&model_path)
            .with_context(|| format!("Failed to load model {}", model_path.display()))?,
    );

    let token = resolve_access_token(cli.token.as_deref(), &config)?;
    let spotify = Arc::new(SpotifyClient::new(
        config.spotify.api_base.clone(),
        token,
        config.spotify.rate_limit_per_second,
    )?);

    let seeds = if cli.seeds.is_empty() {
        let request = TopItemsRequest::new(cli.seed_from, cli.offset, cli.time_range);
        fetch_seeds(spotify.as_ref(), &request)
            .await
            .context("Failed to fetch seeds")?
    } else {
        cli.seeds.clone()
    };

    let request = RecommendationRequest::new(
        cli.seed_from,
        seeds,
        cli.tempo,
        cli.popularity,
        config.spotify.country.clone(),
    );

    let pipeline = Pipeline::new(pipeline_config, spotify.clone(), classifier);
    let output = pipeline
        .recommend(spotify.as_ref(), &request, &mood)
        .await
        .context("Recommendation failed")?;

    for skipped in &output.skipped {
        warn!(track_id = %skipped.track_id, "Skipped: {}", skipped.reason);
    }

    let page = output.ranked.page(page_size);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(page)?);
    } else {
        print_table(page);
    }

    if cli.radar {
        print_radar(&output);
    }

    if cli.playlist {
        let user_id = config
            .spotify
            .user_id
            .as_deref()
            .context("spotify.user_id must be configured to create playlists")?;
        let playlist_id = publish_playlist(
            spotify.as_ref(),
            user_id,
            &config.spotify.playlist_name,
            &output.ranked,
            page_size,
        )
        .await
        .context("Failed to create playlist")?;
        println!("Playlist '{}' created: {}", config.spotify.playlist_name, playlist_id);
    }

    Ok(())
}

fn print_table(rows: &[RankedRow]) {
    if rows.is_empty() {
        println!("No recommendations found.");
        return;
    }
    let mut header = format!("{:>4}  {:<30}  {:<40}", "#", "Artist", "Track");
    for category in MoodCategory::ALL {
        header.push_str(&format!("  {:>8}", category.label()));
    }
    println!("{}  {:>8}", header, "match");

    for row in rows {
        let mut line = format!(
            "{:>4}  {:<30}  {:<40}",
            row.rank + 1,
            truncate(&row.identity.artist_name, 30),
            truncate(&row.identity.track_name, 40)
        );
        for category in MoodCategory::ALL {
            line.push_str(&format!("  {:>8.3}", row.probability(category)));
        }
        println!("{}  {:>8.3}", line, row.similarity);
    }
}

fn print_radar(output: &PipelineOutput) {
    match output.radar_profile() {
        Some(radar) => {
            println!();
            println!("Average audio profile of {} candidates:", output.features.len());
            for (name, value) in [
                ("valence", radar.valence),
                ("energy", radar.energy),
                ("danceability", radar.danceability),
                ("speechiness", radar.speechiness),
                ("acousticness", radar.acousticness),
                ("instrumentalness", radar.instrumentalness),
                ("liveness", radar.liveness),
            ] {
                println!("  {:<17} {:.3}", name, value);
            }
        }
        None => println!("No candidates to profile."),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}
