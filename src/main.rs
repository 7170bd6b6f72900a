use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use hoopcard::card::{CardContent, CardSection, card_file_name};
use hoopcard::config::CardConfig;
use hoopcard::{CardError, CardGenerator, ErrorKind};

const DEFAULT_PLAYER: &str = "LeBron James";

struct CliArgs {
    player_name: String,
    json: bool,
    no_cache: bool,
}

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hoopcard=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = parse_args();
    let mut cfg = CardConfig::from_env();
    if args.no_cache {
        cfg.cache_enabled = false;
    }

    let generator = CardGenerator::from_config(&cfg)?;
    eprintln!("Generating stats card for {}...", args.player_name);
    let card = match generator.generate_card(&args.player_name) {
        Ok(card) => card,
        Err(err) => return Err(anyhow::anyhow!(user_message(&err))),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&card).context("serialize card content")?;
        println!("{json}");
    } else {
        print_card(&card);
        println!("(suggested image file: {})", card_file_name(&args.player_name));
    }
    Ok(())
}

fn user_message(err: &CardError) -> String {
    match err.kind() {
        ErrorKind::NotFound => err.to_string(),
        ErrorKind::Unavailable => {
            "The stats provider is not responding right now. Please try again later.".to_string()
        }
        ErrorKind::Unexpected => format!("Could not build the stats card ({err})."),
    }
}

fn print_card(card: &CardContent) {
    println!("{}", card.title);
    if !card.subtitle.is_empty() {
        println!("{}", card.subtitle);
    }
    println!();
    for row in card.rows_in(CardSection::Basic) {
        println!("  {}", row.text());
    }
    println!();
    println!("Advanced Stats");
    for row in card.rows_in(CardSection::Advanced) {
        let color = row.color.map(|c| c.to_string()).unwrap_or_default();
        println!("  {:<40} {color}", row.text());
    }
    println!();
    for line in &card.footer {
        println!("{line}");
    }
}

fn parse_args() -> CliArgs {
    let mut json = false;
    let mut no_cache = false;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--no-cache" => no_cache = true,
            _ => words.push(arg),
        }
    }
    let player_name = if words.is_empty() {
        DEFAULT_PLAYER.to_string()
    } else {
        words.join(" ")
    };
    CliArgs {
        player_name,
        json,
        no_cache,
    }
}
