use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use city_weather::{CityWeatherConfig, WeatherService, cache, logging, web};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "city-weather",
    version,
    about = "Current weather for a city, cached per 15 minute window"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Look up the weather for one city, prompting when none is given
    Lookup {
        /// City name, e.g. `chennai` or `new delhi`
        city: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = CityWeatherConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            web::run(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Lookup { city } => lookup(&config, city.join(" ")).await,
    }
}

async fn lookup(config: &CityWeatherConfig, city: String) -> Result<ExitCode> {
    let city = if city.trim().is_empty() {
        prompt_city()?
    } else {
        city
    };

    if city.trim().is_empty() {
        eprintln!("Invalid City name, try again.");
        return Ok(ExitCode::FAILURE);
    }

    let store = cache::connect_from_config(&config.cache).await;
    let service = WeatherService::from_config(config, store)?;

    match service.get_weather(&city).await {
        Ok(result) => {
            println!("{}", result.format_details());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!("Lookup failed: {}", e);
            eprintln!("Error: {}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn prompt_city() -> Result<String> {
    print!("Type in any Indian Metro City to get the weather: ");
    io::stdout().flush().context("Failed to write prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read city from stdin")?;
    Ok(line.trim().to_string())
}
