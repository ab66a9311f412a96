use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tenki::romaji::{ReadingAnalyzer, VibratoAnalyzer};
use tenki::{AppState, RomajiConverter, TenkiConfig, WeatherClient, web};

#[derive(Parser)]
#[command(name = "tenki", version, about = "Current weather for Japanese cities")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Look up a city through a running service
    Lookup {
        /// City name in Japanese or romaji
        city: String,
        /// Base URL of the service
        #[arg(long, default_value = "http://localhost:8787")]
        server: String,
        /// Save the spoken summary as a WAV file
        #[arg(long)]
        speak: Option<PathBuf>,
        /// VOICEVOX speaker id
        #[arg(long)]
        speaker: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TenkiConfig::load_from_path(cli.config.clone())?;
    init_tracing(&config, cli.verbose);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Lookup {
            city,
            server,
            speak,
            speaker,
        } => lookup(&config, &city, &server, speak, speaker).await,
    }
}

fn init_tracing(config: &TenkiConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn serve(config: TenkiConfig) -> Result<()> {
    let converter = match config.converter.dictionary_path.clone() {
        Some(path) => {
            let reading_field = config.converter.reading_field;
            RomajiConverter::initialize(async move {
                let analyzer =
                    tokio::task::spawn_blocking(move || VibratoAnalyzer::load(&path, reading_field))
                        .await
                        .context("Dictionary loader task failed")??;
                Ok(Arc::new(analyzer) as Arc<dyn ReadingAnalyzer>)
            })
        }
        None => {
            tracing::warn!("No converter dictionary configured; /convert-to-romaji will answer 500");
            RomajiConverter::failed("no dictionary configured")
        }
    };

    let state = AppState::from_config(&config, converter).context("Failed to create HTTP client")?;
    let app = web::app(state, config.server.static_dir.clone());
    web::run(&config.server.host, config.server.port, app).await
}

async fn lookup(
    config: &TenkiConfig,
    city: &str,
    server: &str,
    speak: Option<PathBuf>,
    speaker: Option<u32>,
) -> Result<()> {
    let client = WeatherClient::new(server, config.services.timeout())
        .context("Failed to create HTTP client")?;

    let weather = client.lookup(city).await?;
    if let Some(notice) = &weather.notice {
        println!("{notice}");
    }
    println!("{}", weather.city);
    println!("  Weather:     {}", weather.current.condition().label());
    println!("  Temperature: {}", weather.current.format_temperature());
    if let Some(humidity) = weather.current.humidity {
        println!("  Humidity:    {humidity}%");
    }
    if let Some(wind) = weather.current.wind_speed {
        println!("  Wind:        {wind} km/h");
    }
    println!("  Observed:    {}", weather.current.time);

    if let Some(path) = speak {
        let audio = client.speak(&weather, speaker).await?;
        tokio::fs::write(&path, &audio)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved spoken summary to {}", path.display());
    }
    Ok(())
}
